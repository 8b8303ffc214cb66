//! Named roll modifiers
//!
//! Callers (character sheets, roll requests) attach modifiers such as
//! "Strength +3" or "Bless 1d4" to a base formula. Integer modifiers are
//! collapsed into one trailing net constant; dice modifiers are appended
//! as their own terms so they get rolled.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::error::RollWarning;
use crate::formula::{self, BoundsPolicy, Formula, Term, TermOrigin};

/// Value of a modifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModifierValue {
    Integer(i64),
    /// Dice sub-formula such as "1d4"
    DiceExpr(String),
}

impl fmt::Display for ModifierValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModifierValue::Integer(v) => write!(f, "{:+}", v),
            ModifierValue::DiceExpr(expr) => write!(f, "{}", expr),
        }
    }
}

/// A named modifier, kept in caller order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifierEntry {
    pub name: String,
    pub value: ModifierValue,
}

impl ModifierEntry {
    pub fn integer(name: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            value: ModifierValue::Integer(value),
        }
    }

    pub fn dice(name: impl Into<String>, expr: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: ModifierValue::DiceExpr(expr.into()),
        }
    }
}

/// Parses `NAME=VALUE`, where VALUE is an integer or a dice expression
impl FromStr for ModifierEntry {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, value) = s
            .split_once('=')
            .ok_or_else(|| format!("Expected NAME=VALUE, got '{}'", s))?;

        let name = name.trim();
        if name.is_empty() {
            return Err(format!("Missing modifier name in '{}'", s));
        }

        let value = value.trim();
        if value.is_empty() {
            return Err(format!("Missing modifier value in '{}'", s));
        }

        match value.parse::<i64>() {
            Ok(v) => Ok(Self::integer(name, v)),
            Err(_) => Ok(Self::dice(name, value)),
        }
    }
}

/// Merge `modifiers` into `base`, rejecting out-of-range dice modifiers
///
/// Dice modifiers that fail to parse are inert: they add nothing and do not
/// fail the roll.
pub fn combine(base: &Formula, modifiers: &[ModifierEntry]) -> Formula {
    combine_with(base, modifiers, BoundsPolicy::Reject)
}

/// Merge `modifiers` into `base`, parsing dice modifiers with `bounds`
pub fn combine_with(base: &Formula, modifiers: &[ModifierEntry], bounds: BoundsPolicy) -> Formula {
    combine_checked(base, modifiers, bounds).0
}

/// Like `combine_with`, also returning a warning for each inert modifier
pub fn combine_checked(
    base: &Formula,
    modifiers: &[ModifierEntry],
    bounds: BoundsPolicy,
) -> (Formula, Vec<RollWarning>) {
    let mut terms: Vec<Term> = base.terms().to_vec();
    let mut net: Option<i64> = None;
    let mut inert = Vec::new();

    for (index, modifier) in modifiers.iter().enumerate() {
        match &modifier.value {
            ModifierValue::Integer(v) => {
                net = Some(net.unwrap_or(0).saturating_add(*v));
            }
            ModifierValue::DiceExpr(expr) => match formula::parse_with(expr, bounds) {
                Ok(parsed) => {
                    terms.extend(
                        parsed
                            .terms()
                            .iter()
                            .map(|t| t.with_origin(TermOrigin::Modifier(index))),
                    );
                }
                Err(e) => {
                    warn!(modifier = %modifier.name, expr = %expr, "ignoring modifier: {}", e);
                    inert.push(RollWarning::InertModifier {
                        name: modifier.name.clone(),
                        reason: e.to_string(),
                    });
                }
            },
        }
    }

    if let Some(net) = net {
        terms.push(Term::constant(net).with_origin(TermOrigin::NetModifier));
    }

    debug!(modifiers = modifiers.len(), net = ?net, inert = inert.len(), "combined modifiers");

    // base is non-empty, so terms is too
    let formula = Formula::from_terms(terms).unwrap_or_else(|| base.clone());
    (formula, inert)
}
