//! Roll requests and outcomes
//!
//! `resolve` runs the whole pipeline for one request:
//! parse -> combine modifiers -> execute -> evaluate -> format.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{info, info_span};

use crate::error::{RollError, RollWarning};
use crate::evaluator::evaluate;
use crate::executor::{execute_capped, DieSource, RolledTerm};
use crate::format::{format, modifier_descriptions};
use crate::formula::{self, Sign, TermOrigin};
use crate::mechanic::MechanicConfig;
use crate::modifiers::{combine_checked, ModifierEntry};

/// A single roll request from the hosting application
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RollRequest {
    /// Formula to roll; the config's base formula when `None`
    pub formula: Option<String>,
    pub modifiers: Vec<ModifierEntry>,
    /// Overrides the configured target
    pub target: Option<i64>,
    /// Overrides the configured pool difficulty
    pub difficulty: Option<i64>,
}

impl RollRequest {
    pub fn new(formula: impl Into<String>) -> Self {
        Self {
            formula: Some(formula.into()),
            ..Self::default()
        }
    }

    pub fn with_modifier(mut self, modifier: ModifierEntry) -> Self {
        self.modifiers.push(modifier);
        self
    }

    pub fn with_target(mut self, target: i64) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_difficulty(mut self, difficulty: i64) -> Self {
        self.difficulty = Some(difficulty);
        self
    }
}

/// Everything a caller needs to report a roll
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollOutcome {
    /// Combined formula that was rolled
    pub formula: String,
    pub total: i64,
    pub success: Option<bool>,
    pub rolled_terms: Vec<RolledTerm>,
    pub description: String,
    /// Base dice that landed on their highest face
    pub criticals: u32,
    /// Base dice that landed on 1
    pub fumbles: u32,
    pub warnings: Vec<RollWarning>,
}

/// Resolve `request` under `config`, drawing dice from `source`
///
/// # Errors
/// * Formula text is malformed or out of range
/// * Config (after request overrides) is invalid
/// * Pool or custom mechanic with nothing to roll
pub fn resolve<S: DieSource>(
    config: &MechanicConfig,
    request: &RollRequest,
    source: &mut S,
) -> Result<RollOutcome, RollError> {
    let span = info_span!("roll", mechanic = %config.mechanic);
    let _enter = span.enter();

    let mut config = config.clone();
    if request.target.is_some() {
        config.target = request.target;
    }
    if request.difficulty.is_some() {
        config.difficulty = request.difficulty;
    }
    config.validate()?;

    let text = request.formula.as_deref().unwrap_or(&config.base_formula);
    let base = formula::parse_with(text, config.bounds)?;
    let (combined, mut warnings) = combine_checked(&base, &request.modifiers, config.bounds);

    let rolled = execute_capped(
        &combined,
        config.exploding,
        |sides| config.threshold_for(sides),
        config.explosion_cap,
        source,
    );

    let evaluation = evaluate(&rolled, &config, 0)?;
    let descriptions = modifier_descriptions(&request.modifiers, &rolled);
    let description = format(&rolled, &evaluation, &descriptions);

    warnings.extend(capped_dice(&rolled, config.explosion_cap));

    let (criticals, fumbles) = natural_extremes(&rolled);

    info!(
        formula = %combined,
        total = evaluation.total,
        success = ?evaluation.success,
        "roll resolved"
    );

    Ok(RollOutcome {
        formula: combined.to_string(),
        total: evaluation.total,
        success: evaluation.success,
        rolled_terms: rolled,
        description,
        criticals,
        fumbles,
        warnings,
    })
}

/// One warning per die size that hit the explosion cap
fn capped_dice(rolled: &[RolledTerm], cap: u32) -> Vec<RollWarning> {
    let sizes: BTreeSet<u32> = rolled
        .iter()
        .filter(|t| t.dice().iter().any(|d| d.capped))
        .filter_map(RolledTerm::sides)
        .collect();

    sizes
        .into_iter()
        .rev()
        .map(|sides| RollWarning::ExplosionCapExceeded { sides, cap })
        .collect()
}

fn natural_extremes(rolled: &[RolledTerm]) -> (u32, u32) {
    let mut criticals = 0;
    let mut fumbles = 0;

    for term in rolled
        .iter()
        .filter(|t| t.term.origin == TermOrigin::Base && t.term.sign == Sign::Plus)
    {
        if let Some(sides) = term.sides() {
            for die in term.dice() {
                if die.is_natural_max(sides) {
                    criticals += 1;
                } else if die.is_natural_min() {
                    fumbles += 1;
                }
            }
        }
    }

    (criticals, fumbles)
}
