//! rollcore - dice-formula resolution engine
//!
//! Turns a dice formula ("2d6+3", "1d20+1d4-2"), a set of named modifiers
//! and a mechanic configuration into a reproducible, explainable roll.
//!
//! The engine is synchronous and holds no state between calls. Randomness
//! is always injected through a [`DieSource`], so any seeded generator
//! reproduces a roll exactly.
//!
//! ```
//! use rollcore::{resolve, MechanicConfig, RollRequest, ScriptedRolls};
//!
//! let config = MechanicConfig::sum("1d20");
//! let request = RollRequest::new("2d6+3");
//! let outcome = resolve(&config, &request, &mut ScriptedRolls::new([4, 2])).unwrap();
//!
//! assert_eq!(outcome.total, 9);
//! assert_eq!(outcome.description, "2d6 [4, 2] +3 = 9");
//! ```

pub mod error;
pub mod evaluator;
pub mod executor;
pub mod format;
pub mod formula;
pub mod mechanic;
pub mod modifiers;
pub mod roll;
pub mod settings;
pub mod shared;

pub use error::{ConfigError, ParseError, RollError, RollWarning};
pub use evaluator::{evaluate, Evaluation};
pub use executor::{execute, execute_capped, DieSource, RolledDie, RolledTerm, ScriptedRolls, TermResult};
pub use formula::{BoundsPolicy, Formula, Sign, Term, TermKind, TermOrigin};
pub use mechanic::{Criteria, Mechanic, MechanicConfig};
pub use modifiers::{combine, combine_checked, combine_with, ModifierEntry, ModifierValue};
pub use roll::{resolve, RollOutcome, RollRequest};
pub use settings::Settings;
pub use shared::SharedSource;
