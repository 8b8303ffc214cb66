//! Roll executor
//!
//! Physically rolls every dice term of a formula, expanding exploding dice.
//! Randomness always comes from a caller-supplied `DieSource`, so a seeded
//! generator (or a scripted sequence) reproduces a roll exactly.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::formula::{Formula, Term, TermKind};
use crate::mechanic::DEFAULT_EXPLOSION_CAP;

/// Source of individual die results
pub trait DieSource {
    /// Roll one die, returning a value in `1..=sides`
    fn roll_die(&mut self, sides: u32) -> u32;
}

impl<R: Rng> DieSource for R {
    fn roll_die(&mut self, sides: u32) -> u32 {
        self.random_range(1..=sides.max(1))
    }
}

/// Replays a fixed sequence of die results
///
/// Values are clamped into the rolled die's range. Once exhausted the
/// sequence starts over; an empty script always rolls 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedRolls {
    rolls: Vec<u32>,
    next: usize,
}

impl ScriptedRolls {
    pub fn new(rolls: impl Into<Vec<u32>>) -> Self {
        Self {
            rolls: rolls.into(),
            next: 0,
        }
    }

    /// Number of results handed out so far
    pub fn consumed(&self) -> usize {
        self.next
    }
}

impl DieSource for ScriptedRolls {
    fn roll_die(&mut self, sides: u32) -> u32 {
        let value = if self.rolls.is_empty() {
            1
        } else {
            self.rolls[self.next % self.rolls.len()]
        };
        self.next += 1;
        value.clamp(1, sides.max(1))
    }
}

/// One physical die: the natural roll followed by any explosions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolledDie {
    pub rolls: Vec<u32>,
    /// Explosions stopped at the safety cap rather than naturally
    pub capped: bool,
}

impl RolledDie {
    pub fn natural(&self) -> u32 {
        self.rolls.first().copied().unwrap_or(0)
    }

    /// Sum of the natural roll and every explosion
    pub fn total(&self) -> i64 {
        self.rolls.iter().map(|&r| r as i64).sum()
    }

    pub fn explosions(&self) -> usize {
        self.rolls.len().saturating_sub(1)
    }

    pub fn is_natural_max(&self, sides: u32) -> bool {
        self.natural() == sides
    }

    pub fn is_natural_min(&self) -> bool {
        self.natural() == 1
    }
}

/// Result of rolling one term
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermResult {
    Dice(Vec<RolledDie>),
    /// Signed constant value
    Constant(i64),
}

/// A term together with what it rolled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolledTerm {
    pub term: Term,
    pub result: TermResult,
}

impl RolledTerm {
    /// Signed contribution of this term to a summed total
    pub fn value(&self) -> i64 {
        match &self.result {
            TermResult::Dice(dice) => self.term.sign.apply(dice.iter().map(RolledDie::total).sum()),
            TermResult::Constant(value) => *value,
        }
    }

    /// Rolled dice, empty for constants
    pub fn dice(&self) -> &[RolledDie] {
        match &self.result {
            TermResult::Dice(dice) => dice,
            TermResult::Constant(_) => &[],
        }
    }

    pub fn sides(&self) -> Option<u32> {
        match self.term.kind {
            TermKind::Dice { sides, .. } => Some(sides),
            TermKind::Constant(_) => None,
        }
    }
}

/// Roll every term of `formula` with the default explosion cap
///
/// `threshold` maps a die's side count to the natural roll at or above
/// which it explodes; it is only consulted when `exploding` is set.
pub fn execute<S: DieSource>(
    formula: &Formula,
    exploding: bool,
    threshold: impl Fn(u32) -> u32,
    source: &mut S,
) -> Vec<RolledTerm> {
    execute_capped(formula, exploding, threshold, DEFAULT_EXPLOSION_CAP, source)
}

/// Roll every term of `formula`, allowing at most `cap` explosions per die
pub fn execute_capped<S: DieSource>(
    formula: &Formula,
    exploding: bool,
    threshold: impl Fn(u32) -> u32,
    cap: u32,
    source: &mut S,
) -> Vec<RolledTerm> {
    formula
        .terms()
        .iter()
        .map(|term| {
            let result = match term.kind {
                TermKind::Dice { count, sides } => {
                    let explode_at = exploding.then(|| threshold(sides));
                    let dice = (0..count)
                        .map(|_| roll_die(sides, explode_at, cap, source))
                        .collect();
                    TermResult::Dice(dice)
                }
                TermKind::Constant(_) => TermResult::Constant(term.constant_value().unwrap_or(0)),
            };
            RolledTerm { term: *term, result }
        })
        .collect()
}

fn roll_die<S: DieSource>(sides: u32, explode_at: Option<u32>, cap: u32, source: &mut S) -> RolledDie {
    let natural = source.roll_die(sides);
    let mut rolls = vec![natural];
    let mut capped = false;

    if let Some(threshold) = explode_at {
        let mut last = natural;
        let mut explosions = 0;
        while last >= threshold {
            if explosions >= cap {
                capped = true;
                warn!(sides, cap, "explosion cap reached, stopping");
                break;
            }
            last = source.roll_die(sides);
            rolls.push(last);
            explosions += 1;
        }
        if explosions > 0 {
            debug!(sides, natural, explosions, "die exploded");
        }
    }

    RolledDie { rolls, capped }
}
