//! Result formatter
//!
//! Renders a plain one-line breakdown of a roll:
//!
//! ```text
//! 1d20 [15] +1d4 [[4+2]] +3 +2 Strength +1 Bless (1d4 [1]) = 27 vs 20 (✅)
//! ```
//!
//! Base dice are grouped by die size, largest first. Constants written in
//! the formula follow, then every modifier in caller order.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use crate::evaluator::Evaluation;
use crate::executor::{RolledDie, RolledTerm};
use crate::formula::{Sign, TermOrigin};
use crate::modifiers::{ModifierEntry, ModifierValue};

/// Render the breakdown for a roll
pub fn format(rolled: &[RolledTerm], evaluation: &Evaluation, modifier_descriptions: &[String]) -> String {
    let mut segments: Vec<String> = Vec::new();

    // (size descending, plus before minus) -> dice
    let mut groups: BTreeMap<(Reverse<u32>, u8), Vec<&RolledDie>> = BTreeMap::new();
    for term in rolled.iter().filter(|t| t.term.origin == TermOrigin::Base) {
        if let Some(sides) = term.sides() {
            let sign_order = match term.term.sign {
                Sign::Plus => 0,
                Sign::Minus => 1,
            };
            groups
                .entry((Reverse(sides), sign_order))
                .or_default()
                .extend(term.dice());
        }
    }

    for ((Reverse(sides), sign_order), dice) in &groups {
        let sign = if *sign_order == 0 { Sign::Plus } else { Sign::Minus };
        let group = format!("{}d{} {}", dice.len(), sides, die_list(dice));
        segments.push(signed_segment(sign, group, segments.is_empty()));
    }

    for term in rolled.iter().filter(|t| t.term.origin == TermOrigin::Base) {
        if let Some(value) = term.term.constant_value() {
            segments.push(format!("{:+}", value));
        }
    }

    segments.extend(modifier_descriptions.iter().cloned());

    let mut line = segments.join(" ");
    line.push_str(&format!(" = {}", evaluation.total));

    if let (Some(success), Some(against)) = (evaluation.success, evaluation.against) {
        let marker = if success { "✅" } else { "❌" };
        line.push_str(&format!(" vs {} ({})", against, marker));
    }

    line
}

/// Describe each modifier in caller order, using the dice they rolled
pub fn modifier_descriptions(modifiers: &[ModifierEntry], rolled: &[RolledTerm]) -> Vec<String> {
    modifiers
        .iter()
        .enumerate()
        .map(|(index, modifier)| match &modifier.value {
            ModifierValue::Integer(v) => format!("{:+} {}", v, modifier.name),
            ModifierValue::DiceExpr(expr) => {
                let terms: Vec<&RolledTerm> = rolled
                    .iter()
                    .filter(|t| t.term.origin == TermOrigin::Modifier(index))
                    .collect();

                if terms.is_empty() {
                    return format!("+0 {} (invalid: {})", modifier.name, expr);
                }

                let value = terms.iter().map(|t| t.value()).fold(0, i64::saturating_add);
                let detail: Vec<String> = terms
                    .iter()
                    .enumerate()
                    .map(|(i, t)| {
                        let body = match t.sides() {
                            Some(_) => format!("{} {}", t.term.kind, die_list(&t.dice().iter().collect::<Vec<_>>())),
                            None => t.term.kind.to_string(),
                        };
                        signed_segment(t.term.sign, body, i == 0)
                    })
                    .collect();

                format!("{:+} {} ({})", value, modifier.name, detail.join(" "))
            }
        })
        .collect()
}

fn signed_segment(sign: Sign, body: String, first: bool) -> String {
    match (sign, first) {
        (Sign::Plus, true) => body,
        (sign, _) => format!("{}{}", sign.symbol(), body),
    }
}

fn die_list(dice: &[&RolledDie]) -> String {
    let faces: Vec<String> = dice.iter().map(|d| die_face(d)).collect();
    format!("[{}]", faces.join(", "))
}

fn die_face(die: &RolledDie) -> String {
    match die.rolls.as_slice() {
        [single] if !die.capped => single.to_string(),
        [first, .., last] if die.capped => {
            format!("[{}+…+{} ({} rolls, capped)]", first, last, die.rolls.len())
        }
        rolls => {
            let chain: Vec<String> = rolls.iter().map(|r| r.to_string()).collect();
            let chain = chain.join("+");
            if die.capped {
                format!("[{} (capped)]", chain)
            } else {
                format!("[{}]", chain)
            }
        }
    }
}
