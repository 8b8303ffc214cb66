//! Dice formulas
//!
//! A formula is an ordered list of signed terms, each either a group of
//! dice ("2d6") or an integer constant ("3"). Formulas are immutable once
//! parsed; the modifier combiner builds new ones rather than editing.

mod parse;

pub use parse::{parse, parse_with};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ParseError;

/// Fewest dice a single term may roll
pub const MIN_DICE: u32 = 1;
/// Most dice a single term may roll
pub const MAX_DICE: u32 = 100;
/// Smallest supported die
pub const MIN_SIDES: u32 = 2;
/// Largest supported die
pub const MAX_SIDES: u32 = 1000;

/// What to do with dice counts or sides outside the supported range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundsPolicy {
    /// Fail with `ParseError::OutOfRange`
    #[default]
    Reject,
    /// Silently pull the value back into range
    Clamp,
}

/// Sign of a term relative to the start of its formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sign {
    Plus,
    Minus,
}

impl Sign {
    /// Apply this sign to a magnitude
    pub fn apply(self, value: i64) -> i64 {
        match self {
            Sign::Plus => value,
            Sign::Minus => -value,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Sign::Plus => '+',
            Sign::Minus => '-',
        }
    }
}

/// The unsigned body of a term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermKind {
    Dice { count: u32, sides: u32 },
    /// Non-negative magnitude; the term's sign carries direction
    Constant(i64),
}

/// Where a term came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermOrigin {
    /// Written in the formula itself
    Base,
    /// Contributed by the modifier at this index
    Modifier(usize),
    /// Net of all integer modifiers
    NetModifier,
}

/// One signed component of a formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Term {
    pub sign: Sign,
    pub kind: TermKind,
    pub origin: TermOrigin,
}

impl Term {
    pub fn dice(sign: Sign, count: u32, sides: u32) -> Self {
        Self {
            sign,
            kind: TermKind::Dice { count, sides },
            origin: TermOrigin::Base,
        }
    }

    /// Constant term from a signed value
    pub fn constant(value: i64) -> Self {
        let sign = if value < 0 { Sign::Minus } else { Sign::Plus };
        Self {
            sign,
            kind: TermKind::Constant(value.checked_abs().unwrap_or(i64::MAX)),
            origin: TermOrigin::Base,
        }
    }

    pub fn with_origin(mut self, origin: TermOrigin) -> Self {
        self.origin = origin;
        self
    }

    pub fn is_dice(&self) -> bool {
        matches!(self.kind, TermKind::Dice { .. })
    }

    /// Signed value of a constant term, `None` for dice
    pub fn constant_value(&self) -> Option<i64> {
        match self.kind {
            TermKind::Constant(value) => Some(self.sign.apply(value)),
            TermKind::Dice { .. } => None,
        }
    }

    /// Smallest and largest signed contribution, ignoring explosions
    fn range(&self) -> (i64, i64) {
        match self.kind {
            TermKind::Constant(value) => {
                let v = self.sign.apply(value);
                (v, v)
            }
            TermKind::Dice { count, sides } => {
                let low = count as i64;
                let high = count as i64 * sides as i64;
                match self.sign {
                    Sign::Plus => (low, high),
                    Sign::Minus => (-high, -low),
                }
            }
        }
    }
}

impl fmt::Display for TermKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TermKind::Dice { count, sides } => write!(f, "{}d{}", count, sides),
            TermKind::Constant(value) => write!(f, "{}", value),
        }
    }
}

/// A parsed, non-empty sequence of terms
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Formula {
    terms: Vec<Term>,
}

impl Formula {
    /// Parse formula text, rejecting out-of-range dice
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        parse(text)
    }

    /// Parse formula text with an explicit bounds policy
    pub fn parse_with(text: &str, bounds: BoundsPolicy) -> Result<Self, ParseError> {
        parse_with(text, bounds)
    }

    /// Build a formula from terms; `None` when `terms` is empty
    pub fn from_terms(terms: Vec<Term>) -> Option<Self> {
        if terms.is_empty() {
            None
        } else {
            Some(Self { terms })
        }
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn has_dice(&self) -> bool {
        self.terms.iter().any(Term::is_dice)
    }

    /// Total number of dice across every dice term
    pub fn dice_count(&self) -> u32 {
        self.terms
            .iter()
            .map(|t| match t.kind {
                TermKind::Dice { count, .. } => count,
                TermKind::Constant(_) => 0,
            })
            .sum()
    }

    /// Lowest possible total without explosions, saturating at the i64 range
    pub fn min(&self) -> i64 {
        self.terms
            .iter()
            .map(|t| t.range().0)
            .fold(0, i64::saturating_add)
    }

    /// Highest possible total without explosions, saturating at the i64 range
    pub fn max(&self) -> i64 {
        self.terms
            .iter()
            .map(|t| t.range().1)
            .fold(0, i64::saturating_add)
    }

    /// Expected total without explosions
    pub fn average(&self) -> f64 {
        self.terms
            .iter()
            .map(|t| match t.kind {
                TermKind::Constant(value) => t.sign.apply(value) as f64,
                TermKind::Dice { count, sides } => {
                    let avg = count as f64 * (1.0 + sides as f64) / 2.0;
                    match t.sign {
                        Sign::Plus => avg,
                        Sign::Minus => -avg,
                    }
                }
            })
            .sum()
    }
}

impl std::str::FromStr for Formula {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, term) in self.terms.iter().enumerate() {
            if i > 0 || term.sign == Sign::Minus {
                write!(f, "{}", term.sign.symbol())?;
            }
            write!(f, "{}", term.kind)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Formula::parse("2d6").unwrap().to_string(), "2d6");
        assert_eq!(Formula::parse("1d20+5").unwrap().to_string(), "1d20+5");
        assert_eq!(Formula::parse("3d8 - 2").unwrap().to_string(), "3d8-2");
        assert_eq!(Formula::parse("d20+1d4-2").unwrap().to_string(), "1d20+1d4-2");
    }

    #[test]
    fn test_display_reparses() {
        for text in ["4d6-1d4+2", "7", "1d1000+100d2", "3+2d6"] {
            let formula = Formula::parse(text).unwrap();
            assert_eq!(Formula::parse(&formula.to_string()).unwrap(), formula);
        }
    }

    #[test]
    fn test_min_max_average() {
        let formula = Formula::parse("2d6+3").unwrap();
        assert_eq!(formula.min(), 5);
        assert_eq!(formula.max(), 15);
        assert_eq!(formula.average(), 10.0);

        let formula = Formula::parse("1d20-1d4").unwrap();
        assert_eq!(formula.min(), -3);
        assert_eq!(formula.max(), 19);
        assert_eq!(formula.average(), 8.0);
    }

    #[test]
    fn test_min_max_saturate() {
        let formula = Formula::parse("9223372036854775807+1").unwrap();
        assert_eq!(formula.max(), i64::MAX);
        assert_eq!(formula.min(), i64::MAX);

        let formula = Formula::parse("1d6-9223372036854775807-9223372036854775807").unwrap();
        assert_eq!(formula.min(), i64::MIN);
        assert_eq!(formula.max(), i64::MIN);
    }

    #[test]
    fn test_dice_count() {
        assert_eq!(Formula::parse("2d6+1d8+4").unwrap().dice_count(), 3);
        assert_eq!(Formula::parse("5").unwrap().dice_count(), 0);
        assert!(!Formula::parse("5").unwrap().has_dice());
    }

    #[test]
    fn test_constant_term_sign() {
        let term = Term::constant(-4);
        assert_eq!(term.sign, Sign::Minus);
        assert_eq!(term.kind, TermKind::Constant(4));
        assert_eq!(term.constant_value(), Some(-4));
        assert_eq!(Term::constant(i64::MIN).constant_value(), Some(-i64::MAX));
    }

    #[test]
    fn test_from_terms_rejects_empty() {
        assert!(Formula::from_terms(Vec::new()).is_none());
        assert!(Formula::from_terms(vec![Term::constant(1)]).is_some());
    }
}
