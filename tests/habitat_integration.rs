//! Integration tests for the habitat economy
//!
//! These tests follow a colony from founding through construction,
//! upgrades, modifiers, and ticks, verifying the engine's contract:
//! - recalculation is idempotent and rebuilt from scratch
//! - spending is atomic and failed actions leave no partial state
//! - stored resources and population respect their bounds every tick

use ahash::AHashSet;

use ares_colony::character::bonus::{BonusCatalog, BonusContext};
use ares_colony::character::Character;
use ares_colony::core::config::EngineConfig;
use ares_colony::economy::blueprint::BlueprintCatalog;
use ares_colony::economy::modifiers::{ModifierKind, StatKey};
use ares_colony::economy::resources::Resource;
use ares_colony::faction::Faction;
use ares_colony::habitat::actions::{build_building, BuildOutcome};
use ares_colony::habitat::recalc::recalculate_stats;
use ares_colony::habitat::state::Habitat;
use ares_colony::habitat::tick::advance_tick;
use ares_colony::session::GameSession;
use ares_colony::tech::effects::{apply_tech_effects, TechEffect, UnlockState};

fn neutral_faction() -> Faction {
    Faction {
        id: "NEUTRAL".into(),
        name: "Neutral".into(),
        description: String::new(),
        leader_name: String::new(),
        color_hex: "#FFFFFF".into(),
        initial_habitat_type: "Basic Hab".into(),
        starting_bonus: Default::default(),
        initial_buildings: vec![],
        initial_tech: vec![],
    }
}

fn fresh_habitat() -> (Habitat, BlueprintCatalog, EngineConfig) {
    let catalog = BlueprintCatalog::with_defaults();
    let config = EngineConfig::default();
    let habitat = Habitat::new("Scenario Base", &neutral_faction(), &catalog, &config);
    (habitat, catalog, config)
}

/// Scenario 1: a fresh habitat with no faction bonuses and no tech
#[test]
fn test_fresh_habitat_baseline() {
    let (mut habitat, catalog, config) = fresh_habitat();

    assert_eq!(habitat.resources.get(Resource::Energy), 1000.0);
    assert_eq!(habitat.storage_capacity.get(Resource::Energy), 5000.0);
    assert_eq!(habitat.max_population, 50.0);

    advance_tick(&mut habitat, &catalog, &BonusContext::default(), &config, 1.0);
    // Base trickle +5, base draw -5, base module draw -10
    let net = habitat.current_net_production[&Resource::Energy];
    assert!((net - -10.0).abs() < 1e-4);
    assert!((habitat.resources.get(Resource::Energy) - 990.0).abs() < 1e-3);
}

/// Scenario 2: construction debits the exact cost and adds production
#[test]
fn test_build_regolith_extractor() {
    let (mut habitat, catalog, config) = fresh_habitat();
    let unlocked = AHashSet::new();
    let bonuses = BonusContext::default();

    let outcome = build_building(
        &mut habitat,
        "RegolithExtractorMk1",
        &unlocked,
        &catalog,
        &bonuses,
        &config,
    );
    assert!(outcome.is_success(), "{}", outcome.message());

    // Default stock 500 regolith / 1000 energy, cost 70 / 30
    assert_eq!(habitat.resources.get(Resource::RegolithComposites), 430.0);
    assert_eq!(habitat.resources.get(Resource::Energy), 970.0);

    // Gross production +10 at level 1 (regolith has no other source or sink)
    let net = habitat.current_net_production[&Resource::RegolithComposites];
    assert!((net - 10.0).abs() < 1e-4);
}

/// Scenario 3: building the same blueprint twice fails without mutation
#[test]
fn test_duplicate_build_rejected() {
    let (mut habitat, catalog, config) = fresh_habitat();
    let unlocked = AHashSet::new();
    let bonuses = BonusContext::default();

    build_building(&mut habitat, "RegolithExtractorMk1", &unlocked, &catalog, &bonuses, &config);
    let snapshot = habitat.resources.clone();

    let outcome = build_building(
        &mut habitat,
        "RegolithExtractorMk1",
        &unlocked,
        &catalog,
        &bonuses,
        &config,
    );
    assert!(matches!(outcome, BuildOutcome::AlreadyExists { .. }));
    assert_eq!(habitat.resources, snapshot);
    assert_eq!(habitat.building("RegolithExtractorMk1").unwrap().level, 1);
}

/// Scenario 4: a building-stat tech modifier scales that building's output
#[test]
fn test_tech_modifier_scales_production() {
    let (mut habitat, catalog, config) = fresh_habitat();
    let unlocked = AHashSet::new();
    let bonuses = BonusContext::default();

    build_building(&mut habitat, "RegolithExtractorMk1", &unlocked, &catalog, &bonuses, &config);
    let baseline = habitat.current_net_production[&Resource::RegolithComposites];

    let mut unlocks = UnlockState::default();
    apply_tech_effects(
        &[TechEffect::ModifyBuildingStat {
            blueprint_id: "RegolithExtractorMk1".into(),
            stat: StatKey::production(Resource::RegolithComposites),
            kind: ModifierKind::PercentageIncrease,
            value: 0.15,
        }],
        &mut unlocks,
        Some(&mut habitat),
    );
    recalculate_stats(&mut habitat, &catalog, &bonuses, &config);

    let boosted = habitat.current_net_production[&Resource::RegolithComposites];
    assert!((boosted - baseline * 1.15).abs() < 1e-4);
}

/// Scenario 5: a character population-capacity bonus compounds with tech
#[test]
fn test_character_bonus_compounds_with_tech() {
    let (mut habitat, catalog, config) = fresh_habitat();

    // Tech modifier first: +20% population capacity on the base module
    habitat
        .modifiers
        .apply_building("BasicHabitatModule", StatKey::PopulationCapacity, 1.2);

    let bonus_catalog = BonusCatalog::with_defaults();
    let bonuses = BonusContext::collect(&["l1_hardy_colonist".to_string()], &bonus_catalog);
    recalculate_stats(&mut habitat, &catalog, &bonuses, &config);

    // 50 * 1.2 * 1.05, both multiplicative on the same base
    assert!((habitat.max_population - 63.0).abs() < 1e-3);
}

#[test]
fn test_recalculation_idempotent_after_activity() {
    let (mut habitat, catalog, config) = fresh_habitat();
    let unlocked = AHashSet::new();
    let bonuses = BonusContext::default();

    build_building(&mut habitat, "SolarArrayMk1", &unlocked, &catalog, &bonuses, &config);
    build_building(&mut habitat, "WaterIceExtractorMk1", &unlocked, &catalog, &bonuses, &config);
    for _ in 0..5 {
        advance_tick(&mut habitat, &catalog, &bonuses, &config, 1.0);
    }

    recalculate_stats(&mut habitat, &catalog, &bonuses, &config);
    let net = habitat.current_net_production.clone();
    let storage = habitat.storage_capacity.clone();
    let max_pop = habitat.max_population;
    let research = habitat.research_points_production.clone();

    recalculate_stats(&mut habitat, &catalog, &bonuses, &config);
    assert_eq!(habitat.current_net_production, net);
    assert_eq!(habitat.storage_capacity, storage);
    assert_eq!(habitat.max_population, max_pop);
    assert_eq!(habitat.research_points_production, research);
}

#[test]
fn test_bounds_hold_over_long_run() {
    let (mut habitat, catalog, config) = fresh_habitat();
    let unlocked = AHashSet::new();
    let bonuses = BonusContext::default();

    build_building(&mut habitat, "SolarArrayMk1", &unlocked, &catalog, &bonuses, &config);
    build_building(&mut habitat, "WaterIceExtractorMk1", &unlocked, &catalog, &bonuses, &config);
    build_building(&mut habitat, "RegolithExtractorMk1", &unlocked, &catalog, &bonuses, &config);

    for _ in 0..500 {
        advance_tick(&mut habitat, &catalog, &bonuses, &config, 1.0);

        for resource in Resource::ALL {
            let amount = habitat.resources.get(resource);
            let capacity = habitat.storage_capacity.get(resource);
            if resource != Resource::Energy {
                assert!(
                    (0.0..=capacity).contains(&amount),
                    "{:?} out of bounds: {} (cap {})",
                    resource,
                    amount,
                    capacity
                );
            } else {
                assert!(amount <= capacity, "energy above storage cap");
            }
        }
        assert!(habitat.population >= 0.0);
        assert!(habitat.population <= habitat.max_population);
    }
}

#[test]
fn test_storage_capacity_never_reduced_by_spending() {
    let (mut habitat, catalog, config) = fresh_habitat();
    let unlocked = AHashSet::new();
    let bonuses = BonusContext::default();

    let cap_before = habitat.storage_capacity.get(Resource::RegolithComposites);
    build_building(&mut habitat, "RegolithExtractorMk1", &unlocked, &catalog, &bonuses, &config);
    assert_eq!(
        habitat.storage_capacity.get(Resource::RegolithComposites),
        cap_before
    );
}

#[test]
fn test_battery_bank_extends_energy_storage() {
    let (mut habitat, catalog, config) = fresh_habitat();
    let mut unlocked = AHashSet::new();
    unlocked.insert("BatteryBankMk1".to_string());
    let bonuses = BonusContext::default();

    let outcome =
        build_building(&mut habitat, "BatteryBankMk1", &unlocked, &catalog, &bonuses, &config);
    assert!(outcome.is_success());
    assert_eq!(habitat.storage_capacity.get(Resource::Energy), 7000.0);
}

/// End-to-end session flow: faction bonuses, construction, and growth
#[test]
fn test_session_colony_grows() {
    // Start below the base module's capacity so growth has room
    let config = EngineConfig { starting_population: 40.0, ..Default::default() };
    let mut session = GameSession::new(config);
    let character = Character::new("Cmdr. Test", Some("l1_energy_saver".to_string()));
    let player_id = session
        .add_player("Commander", "MUSK_CORP", character)
        .unwrap();

    let population_start = session
        .player(player_id)
        .unwrap()
        .primary_habitat()
        .unwrap()
        .population;

    for _ in 0..50 {
        session.advance_turn();
    }

    let habitat_population = session
        .player(player_id)
        .unwrap()
        .primary_habitat()
        .unwrap()
        .population;
    assert!(habitat_population > population_start);
    assert!(habitat_population <= 50.0 + f32::EPSILON);
}
