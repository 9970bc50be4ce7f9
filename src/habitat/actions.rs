//! Construction and upgrade actions
//!
//! Game-rule failures come back as outcome variants with human-readable
//! messages; nothing here mutates the habitat unless the whole action
//! succeeds.

use ahash::AHashSet;

use crate::character::bonus::BonusContext;
use crate::core::config::EngineConfig;
use crate::economy::blueprint::BlueprintCatalog;
use crate::economy::building::Building;
use crate::economy::resources::Resource;
use crate::habitat::recalc::recalculate_stats;
use crate::habitat::state::Habitat;

/// Blueprints buildable without researching anything
pub const ALWAYS_AVAILABLE: [&str; 5] = [
    "BasicHabitatModule",
    "RegolithExtractorMk1",
    "WaterIceExtractorMk1",
    "SolarArrayMk1",
    "ResearchLab",
];

/// Result of a construction attempt
#[derive(Debug, Clone, PartialEq)]
pub enum BuildOutcome {
    Built { display_name: String },
    AlreadyExists { display_name: String },
    UnknownBlueprint { blueprint_id: String },
    NotUnlocked { display_name: String },
    InsufficientResources { missing: Vec<(Resource, f32)> },
}

impl BuildOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, BuildOutcome::Built { .. })
    }

    pub fn message(&self) -> String {
        match self {
            BuildOutcome::Built { display_name } => {
                format!("Building '{display_name}' constructed (Lv. 1).")
            }
            BuildOutcome::AlreadyExists { display_name } => {
                format!("Building '{display_name}' already exists.")
            }
            BuildOutcome::UnknownBlueprint { blueprint_id } => {
                format!("Blueprint '{blueprint_id}' not found.")
            }
            BuildOutcome::NotUnlocked { display_name } => {
                format!("Building '{display_name}' requires technology not yet unlocked.")
            }
            BuildOutcome::InsufficientResources { missing } => {
                let shortfalls: Vec<String> = missing
                    .iter()
                    .map(|(r, amount)| format!("{amount:.0} {}", r.display_name()))
                    .collect();
                format!("Insufficient resources. Missing: {}.", shortfalls.join(", "))
            }
        }
    }
}

/// Result of an upgrade attempt
#[derive(Debug, Clone, PartialEq)]
pub enum UpgradeOutcome {
    Upgraded { display_name: String, new_level: u32 },
    NotBuilt { blueprint_id: String },
    NoCostSchedule { blueprint_id: String },
    InsufficientResources { missing: Vec<(Resource, f32)> },
}

impl UpgradeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, UpgradeOutcome::Upgraded { .. })
    }

    pub fn message(&self) -> String {
        match self {
            UpgradeOutcome::Upgraded { display_name, new_level } => {
                format!("Building '{display_name}' upgraded to Level {new_level}.")
            }
            UpgradeOutcome::NotBuilt { blueprint_id } => {
                format!("Building '{blueprint_id}' not found or not built.")
            }
            UpgradeOutcome::NoCostSchedule { blueprint_id } => {
                format!("Cannot determine upgrade cost for '{blueprint_id}'.")
            }
            UpgradeOutcome::InsufficientResources { missing } => {
                let shortfalls: Vec<String> = missing
                    .iter()
                    .map(|(r, amount)| format!("{amount:.0} {}", r.display_name()))
                    .collect();
                format!("Insufficient resources. Missing: {}.", shortfalls.join(", "))
            }
        }
    }
}

/// Construct a new building at level 1
///
/// `unlocked` is the player's unlocked-blueprint set; the always-available
/// base set needs no unlock.
pub fn build_building(
    habitat: &mut Habitat,
    blueprint_id: &str,
    unlocked: &AHashSet<String>,
    catalog: &BlueprintCatalog,
    bonuses: &BonusContext,
    config: &EngineConfig,
) -> BuildOutcome {
    if habitat
        .building(blueprint_id)
        .is_some_and(|b| b.is_active())
    {
        let display_name = catalog
            .get(blueprint_id)
            .map(|b| b.display_name.clone())
            .unwrap_or_else(|| blueprint_id.to_string());
        return BuildOutcome::AlreadyExists { display_name };
    }

    let Some(blueprint) = catalog.get(blueprint_id) else {
        tracing::warn!(blueprint_id, "build request for unknown blueprint");
        return BuildOutcome::UnknownBlueprint { blueprint_id: blueprint_id.to_string() };
    };

    let is_unlocked =
        unlocked.contains(blueprint_id) || ALWAYS_AVAILABLE.contains(&blueprint_id);
    if !is_unlocked {
        return BuildOutcome::NotUnlocked { display_name: blueprint.display_name.clone() };
    }

    if !habitat.spend_resources(&blueprint.cost) {
        let (_, missing) = habitat.can_afford(&blueprint.cost);
        return BuildOutcome::InsufficientResources { missing };
    }

    habitat
        .buildings
        .insert(blueprint_id.to_string(), Building::new(blueprint_id, 1));
    recalculate_stats(habitat, catalog, bonuses, config);

    tracing::info!(habitat = %habitat.name, blueprint_id, "building constructed");
    BuildOutcome::Built { display_name: blueprint.display_name.clone() }
}

/// Upgrade an existing building by exactly one level
pub fn upgrade_building(
    habitat: &mut Habitat,
    blueprint_id: &str,
    catalog: &BlueprintCatalog,
    bonuses: &BonusContext,
    config: &EngineConfig,
) -> UpgradeOutcome {
    let Some(building) = habitat.building(blueprint_id) else {
        return UpgradeOutcome::NotBuilt { blueprint_id: blueprint_id.to_string() };
    };
    if !building.is_active() {
        return UpgradeOutcome::NotBuilt { blueprint_id: blueprint_id.to_string() };
    }

    let cost = building.upgrade_cost(catalog);
    if cost.is_empty() {
        return UpgradeOutcome::NoCostSchedule { blueprint_id: blueprint_id.to_string() };
    }

    if !habitat.spend_resources(&cost) {
        let (_, missing) = habitat.can_afford(&cost);
        return UpgradeOutcome::InsufficientResources { missing };
    }

    let building = habitat
        .buildings
        .get_mut(blueprint_id)
        .expect("checked above");
    building.level += 1;
    let new_level = building.level;
    recalculate_stats(habitat, catalog, bonuses, config);

    let display_name = catalog
        .get(blueprint_id)
        .map(|b| b.display_name.clone())
        .unwrap_or_else(|| blueprint_id.to_string());
    tracing::info!(habitat = %habitat.name, blueprint_id, new_level, "building upgraded");
    UpgradeOutcome::Upgraded { display_name, new_level }
}
