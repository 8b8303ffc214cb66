//! Mechanic evaluator
//!
//! Turns raw rolled terms into a total and an optional pass/fail verdict
//! according to the configured mechanic:
//! - Sum: every die and constant added together, compared to `target`
//! - Pool: each die face (explosions included) meeting `target` is a success;
//!   the roll passes when successes reach `difficulty`
//! - Custom: term-by-term signed sum, requiring at least one die

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RollError;
use crate::executor::RolledTerm;
use crate::formula::Sign;
use crate::mechanic::{Mechanic, MechanicConfig};

/// Outcome of evaluating a roll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Sum of the roll, or number of successes for pools
    pub total: i64,
    pub success: Option<bool>,
    /// What `total` was compared against, when a comparison happened
    pub against: Option<i64>,
}

/// Evaluate `rolled` under `config`
///
/// `extra_constant_modifier` is added to summed totals; dice pools count
/// successes only and ignore it.
pub fn evaluate(
    rolled: &[RolledTerm],
    config: &MechanicConfig,
    extra_constant_modifier: i64,
) -> Result<Evaluation, RollError> {
    match config.mechanic {
        Mechanic::RollAndSum => Ok(evaluate_sum(rolled, config, extra_constant_modifier)),
        Mechanic::DicePool => evaluate_pool(rolled, config),
        Mechanic::Custom => {
            let dice_terms = rolled.iter().filter(|t| t.term.is_dice()).count();
            if dice_terms == 0 {
                return Err(RollError::NoDice {
                    mechanic: config.mechanic,
                });
            }
            if dice_terms == 1 {
                debug!("custom mechanic: single die with flat modifiers");
            } else {
                debug!(dice_terms, "custom mechanic: term-by-term sum");
            }
            Ok(evaluate_sum(rolled, config, extra_constant_modifier))
        }
    }
}

fn evaluate_sum(rolled: &[RolledTerm], config: &MechanicConfig, extra: i64) -> Evaluation {
    let total = rolled
        .iter()
        .map(RolledTerm::value)
        .fold(extra, i64::saturating_add);
    let success = config.target.map(|t| config.criteria.check(total, t));

    debug!(total, target = ?config.target, success = ?success, "evaluated sum");

    Evaluation {
        total,
        success,
        against: config.target,
    }
}

fn evaluate_pool(rolled: &[RolledTerm], config: &MechanicConfig) -> Result<Evaluation, RollError> {
    // Subtracted dice never join the pool
    let pool: Vec<&RolledTerm> = rolled
        .iter()
        .filter(|t| t.term.is_dice() && t.term.sign == Sign::Plus)
        .collect();

    if pool.is_empty() {
        return Err(RollError::NoDice {
            mechanic: config.mechanic,
        });
    }

    let target = config.pool_target();
    let successes = pool
        .iter()
        .flat_map(|t| t.dice())
        .flat_map(|die| die.rolls.iter())
        .filter(|&&face| config.criteria.check(face as i64, target))
        .count() as i64;

    let success = config.difficulty.map(|d| successes >= d);

    debug!(successes, target, difficulty = ?config.difficulty, "evaluated pool");

    Ok(Evaluation {
        total: successes,
        success,
        against: config.difficulty,
    })
}
