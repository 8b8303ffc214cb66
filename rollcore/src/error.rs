//! Error types for formula parsing, configuration and roll resolution

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::mechanic::Mechanic;

/// Errors produced while parsing a dice formula
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The text does not match the formula grammar
    #[error("invalid dice format: '{0}' (expected something like 2d6+3)")]
    Malformed(String),

    /// A dice term asks for too many dice or an unsupported die size
    #[error("too many dice: '{term}' ({reason})")]
    OutOfRange { term: String, reason: String },
}

/// Errors in a mechanic configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid target for {mechanic} mechanic: {reason}")]
    InvalidTarget { mechanic: Mechanic, reason: String },

    #[error("explosion threshold must be at least 1 (got {0})")]
    InvalidThreshold(u32),

    #[error("dice pool difficulty cannot be negative (got {0})")]
    InvalidDifficulty(i64),
}

/// Errors that abort a roll request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RollError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A pool or custom mechanic found nothing to roll
    #[error("no dice to roll for {mechanic} mechanic")]
    NoDice { mechanic: Mechanic },
}

/// Recoverable conditions reported alongside a completed roll
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollWarning {
    /// A die kept exploding until the safety cap stopped it
    #[error("explosion cap of {cap} reached on a d{sides}")]
    ExplosionCapExceeded { sides: u32, cap: u32 },

    /// A dice modifier could not be parsed and was treated as zero
    #[error("modifier '{name}' ignored: {reason}")]
    InertModifier { name: String, reason: String },
}
