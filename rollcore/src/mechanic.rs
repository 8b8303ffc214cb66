//! Mechanic configuration
//!
//! A `MechanicConfig` describes how a game system resolves rolls:
//! - Which strategy applies (sum, dice pool, custom)
//! - The base formula rolled when a request names none
//! - How results are compared against a target
//! - Exploding dice parameters
//!
//! The engine only ever reads a config; the hosting application owns and
//! persists it.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ConfigError;
use crate::formula::BoundsPolicy;

/// Per-die target used by dice pools when none is configured
pub const DEFAULT_POOL_TARGET: i64 = 8;

/// Upper bound on explosions per die
pub const DEFAULT_EXPLOSION_CAP: u32 = 1000;

/// Resolution strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mechanic {
    /// Add up every die and modifier
    #[default]
    #[serde(alias = "sum")]
    RollAndSum,
    /// Count dice that meet the target as successes
    #[serde(alias = "pool")]
    DicePool,
    /// System-defined formula, resolved term by term
    Custom,
}

impl FromStr for Mechanic {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', ' '], "_").as_str() {
            "sum" | "roll_and_sum" | "rollandsum" => Ok(Mechanic::RollAndSum),
            "pool" | "dice_pool" | "dicepool" => Ok(Mechanic::DicePool),
            "custom" => Ok(Mechanic::Custom),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for Mechanic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Mechanic::RollAndSum => "sum",
            Mechanic::DicePool => "pool",
            Mechanic::Custom => "custom",
        };
        write!(f, "{}", s)
    }
}

/// Comparison applied between a result and a target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criteria {
    #[default]
    #[serde(alias = ">=")]
    GreaterEqual,
    #[serde(alias = "<=")]
    LessEqual,
    #[serde(alias = "==", alias = "=")]
    Equal,
}

impl Criteria {
    /// Whether `value` satisfies this criteria against `target`
    pub fn check(&self, value: i64, target: i64) -> bool {
        match self {
            Criteria::GreaterEqual => value >= target,
            Criteria::LessEqual => value <= target,
            Criteria::Equal => value == target,
        }
    }
}

impl FromStr for Criteria {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            ">=" | "ge" | "gte" | "greater_equal" | "over" => Ok(Criteria::GreaterEqual),
            "<=" | "le" | "lte" | "less_equal" | "under" => Ok(Criteria::LessEqual),
            "==" | "=" | "eq" | "equal" | "exact" => Ok(Criteria::Equal),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for Criteria {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Criteria::GreaterEqual => ">=",
            Criteria::LessEqual => "<=",
            Criteria::Equal => "==",
        };
        write!(f, "{}", s)
    }
}

/// How a game system resolves a roll
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MechanicConfig {
    pub mechanic: Mechanic,
    /// Formula rolled when a request does not supply one
    pub base_formula: String,
    pub criteria: Criteria,
    /// Total to beat (sum mechanics) or per-die target (pools)
    pub target: Option<i64>,
    pub exploding: bool,
    /// Natural roll that triggers an explosion; defaults to the die's maximum
    pub explode_threshold: Option<u32>,
    /// Successes a dice pool needs to pass
    pub difficulty: Option<i64>,
    pub bounds: BoundsPolicy,
    pub explosion_cap: u32,
}

impl Default for MechanicConfig {
    fn default() -> Self {
        Self {
            mechanic: Mechanic::RollAndSum,
            base_formula: "1d20".to_string(),
            criteria: Criteria::GreaterEqual,
            target: None,
            exploding: false,
            explode_threshold: None,
            difficulty: None,
            bounds: BoundsPolicy::Reject,
            explosion_cap: DEFAULT_EXPLOSION_CAP,
        }
    }
}

impl MechanicConfig {
    /// Sum-based config rolling `base_formula`
    pub fn sum(base_formula: impl Into<String>) -> Self {
        Self {
            base_formula: base_formula.into(),
            ..Self::default()
        }
    }

    /// Dice pool counting dice at or above `target`
    pub fn pool(base_formula: impl Into<String>, target: i64) -> Self {
        Self {
            mechanic: Mechanic::DicePool,
            base_formula: base_formula.into(),
            target: Some(target),
            ..Self::default()
        }
    }

    pub fn with_target(mut self, target: Option<i64>) -> Self {
        self.target = target;
        self
    }

    pub fn with_difficulty(mut self, difficulty: Option<i64>) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Enable exploding dice, optionally with a fixed threshold
    pub fn with_explosion(mut self, threshold: Option<u32>) -> Self {
        self.exploding = true;
        self.explode_threshold = threshold;
        self
    }

    /// Explosion threshold for a die with `sides` faces
    ///
    /// A configured threshold above the die's maximum resolves to the maximum.
    pub fn threshold_for(&self, sides: u32) -> u32 {
        self.explode_threshold
            .map(|t| t.min(sides))
            .unwrap_or(sides)
    }

    /// Per-die target for dice pools
    pub fn pool_target(&self) -> i64 {
        self.target.unwrap_or(DEFAULT_POOL_TARGET)
    }

    /// Check the config for combinations the evaluator cannot honour
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(threshold) = self.explode_threshold {
            if threshold == 0 {
                return Err(ConfigError::InvalidThreshold(threshold));
            }
        }

        match self.mechanic {
            Mechanic::DicePool => {
                let target = self.pool_target();
                if target < 1 {
                    return Err(ConfigError::InvalidTarget {
                        mechanic: self.mechanic,
                        reason: format!("per-die target must be at least 1 (got {})", target),
                    });
                }
                if let Some(difficulty) = self.difficulty {
                    if difficulty < 0 {
                        return Err(ConfigError::InvalidDifficulty(difficulty));
                    }
                }
            }
            Mechanic::RollAndSum | Mechanic::Custom => {
                if self.difficulty.is_some() && self.target.is_none() {
                    return Err(ConfigError::InvalidTarget {
                        mechanic: self.mechanic,
                        reason: "a difficulty was given but no target to compare against".to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}
