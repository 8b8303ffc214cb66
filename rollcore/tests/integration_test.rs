//! End-to-end roll scenarios through the public `resolve` entry point

mod common;

use common::{all_faces, roll_scripted};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rollcore::{
    resolve, Criteria, Mechanic, MechanicConfig, ModifierEntry, ParseError, RollError, RollRequest,
    SharedSource,
};

#[test]
fn test_sum_scenario() {
    let config = MechanicConfig::sum("1d20");
    let outcome = roll_scripted(&config, &RollRequest::new("2d6+3"), &[4, 2]);

    assert_eq!(outcome.total, 9);
    assert_eq!(outcome.success, None);
    assert!(
        outcome.description.contains("2d6 [4, 2] +3 = 9"),
        "unexpected description: {}",
        outcome.description
    );
}

#[test]
fn test_dice_pool_scenario() {
    let config = MechanicConfig::pool("5d10", 8).with_difficulty(Some(3));
    let outcome = roll_scripted(&config, &RollRequest::default(), &[9, 3, 8, 2, 10]);

    assert_eq!(outcome.total, 3);
    assert_eq!(outcome.success, Some(true));
    assert_eq!(outcome.description, "5d10 [9, 3, 8, 2, 10] = 3 vs 3 (✅)");
}

#[test]
fn test_dice_pool_misses_difficulty() {
    let config = MechanicConfig::pool("5d10", 8).with_difficulty(Some(4));
    let outcome = roll_scripted(&config, &RollRequest::default(), &[9, 3, 8, 2, 10]);

    assert_eq!(outcome.total, 3);
    assert_eq!(outcome.success, Some(false));
    assert!(outcome.description.ends_with("= 3 vs 4 (❌)"));
}

#[test]
fn test_malformed_scenario() {
    let config = MechanicConfig::default();
    let err = resolve(&config, &RollRequest::new("2x6"), &mut StdRng::seed_from_u64(1)).unwrap_err();
    assert!(matches!(err, RollError::Parse(ParseError::Malformed(_))));
    assert!(err.to_string().contains("invalid dice format"));
}

#[test]
fn test_too_many_dice() {
    let config = MechanicConfig::default();
    let err = resolve(&config, &RollRequest::new("101d6"), &mut StdRng::seed_from_u64(1)).unwrap_err();
    assert!(matches!(err, RollError::Parse(ParseError::OutOfRange { .. })));
    assert!(err.to_string().contains("too many dice"));
}

#[test]
fn test_exploding_pool_counts_every_face() {
    let config = MechanicConfig::pool("5d10", 8).with_explosion(None);
    let outcome = roll_scripted(&config, &RollRequest::default(), &[10, 9, 3, 8, 2, 10, 1]);

    // 10 -> 9 explodes once; 10 -> 1 explodes once
    let faces = all_faces(&outcome);
    assert_eq!(faces, vec![10, 9, 3, 8, 2, 10, 1]);
    assert_eq!(outcome.total, 4);
    assert!(outcome.description.starts_with("5d10 [[10+9], 3, 8, 2, [10+1]]"));
}

#[test]
fn test_modifier_order_preserved_regardless_of_sign() {
    let config = MechanicConfig::sum("1d20").with_target(Some(15));
    let request = RollRequest::default()
        .with_modifier(ModifierEntry::integer("Wounded", -2))
        .with_modifier(ModifierEntry::integer("Strength", 4))
        .with_modifier(ModifierEntry::dice("Guidance", "1d4"))
        .with_modifier(ModifierEntry::integer("Cover", -1));
    let outcome = roll_scripted(&config, &request, &[11, 3]);

    assert_eq!(outcome.total, 15);
    assert_eq!(outcome.success, Some(true));
    assert_eq!(
        outcome.description,
        "1d20 [11] -2 Wounded +4 Strength +3 Guidance (1d4 [3]) -1 Cover = 15 vs 15 (✅)"
    );
}

#[test]
fn test_roll_under_system() {
    let mut config = MechanicConfig::sum("1d100").with_target(Some(45));
    config.criteria = Criteria::LessEqual;

    let outcome = roll_scripted(&config, &RollRequest::default(), &[44]);
    assert_eq!(outcome.success, Some(true));

    let outcome = roll_scripted(&config, &RollRequest::default(), &[46]);
    assert_eq!(outcome.success, Some(false));
}

#[test]
fn test_custom_mechanic() {
    let mut config = MechanicConfig::sum("1d20+1d6-1");
    config.mechanic = Mechanic::Custom;
    let outcome = roll_scripted(&config, &RollRequest::default(), &[12, 5]);
    assert_eq!(outcome.total, 16);

    let err = resolve(&config, &RollRequest::new("4+4"), &mut StdRng::seed_from_u64(3)).unwrap_err();
    assert_eq!(
        err,
        RollError::NoDice {
            mechanic: Mechanic::Custom
        }
    );
}

#[test]
fn test_pathological_explosion_terminates() {
    let config = MechanicConfig::sum("3d6").with_explosion(Some(1));
    let outcome = resolve(&config, &RollRequest::default(), &mut StdRng::seed_from_u64(5)).unwrap();

    for term in &outcome.rolled_terms {
        for die in term.dice() {
            assert!(die.capped);
            assert_eq!(die.explosions(), config.explosion_cap as usize);
        }
    }
    assert_eq!(outcome.warnings.len(), 1);
}

#[test]
fn test_seeded_resolve_is_reproducible() {
    let config = MechanicConfig::sum("4d6+1d8").with_explosion(None);
    let request = RollRequest::default().with_modifier(ModifierEntry::dice("Rage", "1d12"));

    let a = resolve(&config, &request, &mut StdRng::seed_from_u64(2024)).unwrap();
    let b = resolve(&config, &request, &mut StdRng::seed_from_u64(2024)).unwrap();
    assert_eq!(a, b);

    let shared = SharedSource::seeded(2024);
    assert_eq!(shared.resolve(&config, &request).unwrap(), a);
}
