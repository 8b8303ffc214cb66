//! Common test utilities for driving the roll pipeline

use rollcore::{resolve, MechanicConfig, RollOutcome, RollRequest, ScriptedRolls};

/// Resolve `request` with dice drawn from a fixed script
pub fn roll_scripted(config: &MechanicConfig, request: &RollRequest, rolls: &[u32]) -> RollOutcome {
    resolve(config, request, &mut ScriptedRolls::new(rolls)).expect("roll should resolve")
}

/// Every individual face in an outcome, explosions included
#[allow(dead_code)]
pub fn all_faces(outcome: &RollOutcome) -> Vec<u32> {
    outcome
        .rolled_terms
        .iter()
        .flat_map(|t| t.dice())
        .flat_map(|d| d.rolls.iter().copied())
        .collect()
}
