//! Formula grammar
//!
//! ```text
//! formula  := term (sign term)*
//! term     := [0-9]* "d" [0-9]+  |  [0-9]+
//! sign     := "+" | "-"
//! ```
//!
//! Input is case-insensitive and all whitespace is ignored, so "2D6 + 3"
//! and "2d6+3" are the same formula.

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use super::{BoundsPolicy, Formula, Sign, Term, MAX_DICE, MAX_SIDES, MIN_DICE, MIN_SIDES};
use crate::error::ParseError;

/// Whole-formula shape
static FORMULA_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[0-9]*d[0-9]+|[0-9]+)(?:[+-](?:[0-9]*d[0-9]+|[0-9]+))*$").unwrap());

/// A single signed term; only applied to text FORMULA_REGEX accepted
static TERM_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([+-]?)(?:([0-9]*)d([0-9]+)|([0-9]+))").unwrap());

/// Parse a formula, rejecting dice outside the supported bounds
///
/// # Examples
/// ```
/// use rollcore::formula::parse;
///
/// assert_eq!(parse("2d6+3").unwrap().to_string(), "2d6+3");
/// assert_eq!(parse("D20 - 1").unwrap().to_string(), "1d20-1");
///
/// assert!(parse("2x6").is_err());
/// assert!(parse("101d6").is_err());
/// ```
pub fn parse(text: &str) -> Result<Formula, ParseError> {
    parse_with(text, BoundsPolicy::Reject)
}

/// Parse a formula with the given bounds policy
pub fn parse_with(text: &str, bounds: BoundsPolicy) -> Result<Formula, ParseError> {
    let normalized: String = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();

    if !FORMULA_REGEX.is_match(&normalized) {
        return Err(ParseError::Malformed(text.trim().to_string()));
    }

    let mut terms = Vec::new();
    for caps in TERM_REGEX.captures_iter(&normalized) {
        let sign = match caps.get(1).map(|m| m.as_str()) {
            Some("-") => Sign::Minus,
            _ => Sign::Plus,
        };
        let source = caps.get(0).map(|m| m.as_str()).unwrap_or_default();

        let term = match (caps.get(2), caps.get(3), caps.get(4)) {
            (count, Some(sides), _) => {
                let count = match count.map(|m| m.as_str()) {
                    None | Some("") => 1,
                    Some(digits) => parse_digits(digits),
                };
                let sides = parse_digits(sides.as_str());
                let (count, sides) = check_bounds(count, sides, bounds, source)?;
                Term::dice(sign, count, sides)
            }
            (_, None, Some(value)) => {
                let value: i64 = value.as_str().parse().map_err(|_| ParseError::OutOfRange {
                    term: source.to_string(),
                    reason: "constant is too large".to_string(),
                })?;
                Term {
                    sign,
                    ..Term::constant(value)
                }
            }
            _ => return Err(ParseError::Malformed(text.trim().to_string())),
        };
        terms.push(term);
    }

    let formula = Formula::from_terms(terms).ok_or_else(|| ParseError::Malformed(text.trim().to_string()))?;
    debug!(input = text, formula = %formula, "parsed formula");
    Ok(formula)
}

/// Digits that overflow a u32 saturate; bounds checking rejects or clamps them
fn parse_digits(digits: &str) -> u32 {
    digits.parse().unwrap_or(u32::MAX)
}

fn check_bounds(
    count: u32,
    sides: u32,
    bounds: BoundsPolicy,
    term: &str,
) -> Result<(u32, u32), ParseError> {
    match bounds {
        BoundsPolicy::Clamp => Ok((
            count.clamp(MIN_DICE, MAX_DICE),
            sides.clamp(MIN_SIDES, MAX_SIDES),
        )),
        BoundsPolicy::Reject => {
            let out_of_range = |reason: String| ParseError::OutOfRange {
                term: term.trim_start_matches(['+', '-']).to_string(),
                reason,
            };
            if !(MIN_DICE..=MAX_DICE).contains(&count) {
                return Err(out_of_range(format!(
                    "dice count must be between {} and {}",
                    MIN_DICE, MAX_DICE
                )));
            }
            if !(MIN_SIDES..=MAX_SIDES).contains(&sides) {
                return Err(out_of_range(format!(
                    "die sides must be between {} and {}",
                    MIN_SIDES, MAX_SIDES
                )));
            }
            Ok((count, sides))
        }
    }
}
