//! Habitat recalculation engine
//!
//! Rebuilds net production, storage capacity, population capacity, and
//! research production from scratch on every invocation. Nothing is
//! patched incrementally, so repeated passes with unchanged state produce
//! identical outputs and partial application order can never cause drift.
//!
//! Invoked after construction, upgrades, modifier application, and at the
//! start of every tick.

use ahash::AHashMap;

use crate::character::bonus::{BonusContext, BonusStat, CharacterBonusEffect, ModifierKind};
use crate::core::config::EngineConfig;
use crate::economy::blueprint::{BlueprintCatalog, BlueprintEffect};
use crate::economy::modifiers::{ProductionChannel, StatKey};
use crate::economy::resources::{Resource, StorageCapacity};
use crate::habitat::state::Habitat;

/// Recompute every derived stat of the habitat
///
/// Character-bonus effects arrive pre-grouped in `bonuses`; they are read
/// fresh by the caller on every pass rather than cached on the habitat.
pub fn recalculate_stats(
    habitat: &mut Habitat,
    catalog: &BlueprintCatalog,
    bonuses: &BonusContext,
    config: &EngineConfig,
) {
    let mut storage = StorageCapacity::with_defaults();
    let mut gross_production: AHashMap<Resource, f32> = AHashMap::new();
    let mut total_consumption: AHashMap<Resource, f32> = AHashMap::new();
    let mut research_production: AHashMap<String, f32> = AHashMap::new();
    let mut max_population = 0.0_f32;

    for resource in Resource::ALL {
        gross_production.insert(resource, resource.base_production());
    }
    total_consumption.insert(Resource::Energy, config.base_energy_draw);

    // Deterministic building order. Sums must not depend on order anyway
    // (factors are per-building), but a fixed order keeps repeated passes
    // bit-identical.
    let mut blueprint_ids: Vec<String> = habitat
        .buildings
        .values()
        .filter(|b| b.is_active())
        .map(|b| b.blueprint_id.clone())
        .collect();
    blueprint_ids.sort();

    for blueprint_id in &blueprint_ids {
        let level = habitat.buildings[blueprint_id].level as f32;
        let Some(blueprint) = catalog.get(blueprint_id) else {
            tracing::warn!(
                habitat = %habitat.name,
                blueprint_id = %blueprint_id,
                "dangling blueprint reference, skipping building"
            );
            continue;
        };
        let char_effects = bonuses.building_effects(blueprint_id);

        // Production channels
        for (channel, base_rate) in &blueprint.production_per_level {
            let mut value = base_rate * level;
            let channel_key = StatKey::Production(channel.clone());

            value *= habitat.modifiers.global_factor(&channel_key);
            value *= habitat.modifiers.building_factor(blueprint_id, &channel_key);
            value *= habitat
                .modifiers
                .building_factor(blueprint_id, &StatKey::ProductionRate);
            value *= production_bonus_factor(char_effects, channel);

            match channel {
                ProductionChannel::Resource(resource) => {
                    *gross_production.entry(*resource).or_insert(0.0) += value;
                }
                ProductionChannel::Named(name) => {
                    *research_production.entry(name.clone()).or_insert(0.0) += value;
                }
            }
        }

        // Energy consumption
        let mut energy = blueprint.energy_consumption_per_level * level;
        energy *= habitat.modifiers.global_factor(&StatKey::EnergyConsumption);
        energy *= habitat
            .modifiers
            .building_factor(blueprint_id, &StatKey::EnergyConsumption);
        for effect in char_effects {
            if effect.stat == BonusStat::EnergyConsumption
                && effect.kind == ModifierKind::PercentageDecrease
            {
                energy *= 1.0 - effect.value;
            }
        }
        for &modifier in bonuses.global_energy_mods() {
            if modifier < 1.0 {
                energy *= 1.0 - modifier;
            }
        }
        *total_consumption.entry(Resource::Energy).or_insert(0.0) += energy;

        // Other resource consumption
        for &(resource, base_rate) in &blueprint.resource_consumption_per_level {
            let mut value = base_rate * level;
            let key = StatKey::Consumption(resource);
            value *= habitat.modifiers.global_factor(&key);
            value *= habitat.modifiers.building_factor(blueprint_id, &key);
            *total_consumption.entry(resource).or_insert(0.0) += value;
        }

        // Effects
        for effect in &blueprint.effects_per_level {
            match effect {
                BlueprintEffect::PopulationCapacity(base) => {
                    let mut capacity = base * level;
                    capacity *= habitat
                        .modifiers
                        .global_factor(&StatKey::PopulationCapacity);
                    capacity *= habitat
                        .modifiers
                        .building_factor(blueprint_id, &StatKey::PopulationCapacity);
                    for char_effect in char_effects {
                        if char_effect.stat == BonusStat::PopulationCapacity
                            && char_effect.kind == ModifierKind::PercentageIncrease
                        {
                            capacity *= 1.0 + char_effect.value;
                        }
                    }
                    max_population += capacity;
                }
                BlueprintEffect::StorageCapacity(resource, per_level) => {
                    storage.grant(*resource, per_level * level);
                }
                BlueprintEffect::Inert { name, .. } => {
                    tracing::debug!(
                        blueprint_id = %blueprint_id,
                        effect = %name,
                        "inert building effect, not evaluated by the economy"
                    );
                }
            }
        }
    }

    // Habitat-wide character production bonuses. Fractional values are
    // additive percentages, values above 1 are outright multipliers.
    for resource in Resource::ALL {
        let production = gross_production.entry(resource).or_insert(0.0);
        for &modifier in bonuses.resource_production_mods(resource) {
            if modifier > 0.0 && modifier < 1.0 {
                *production *= 1.0 + modifier;
            } else if modifier > 1.0 {
                *production *= modifier;
            }
        }
    }

    // Population upkeep, proportional to the pre-growth population
    let food_upkeep = habitat.population
        * config.food_per_capita
        * habitat
            .modifiers
            .global_factor(&StatKey::Upkeep(Resource::Food));
    *total_consumption.entry(Resource::Food).or_insert(0.0) += food_upkeep;

    let water_upkeep = habitat.population
        * config.water_per_capita
        * habitat
            .modifiers
            .global_factor(&StatKey::Upkeep(Resource::WaterIce));
    *total_consumption.entry(Resource::WaterIce).or_insert(0.0) += water_upkeep;

    let mut net_production = AHashMap::new();
    for resource in Resource::ALL {
        let production = gross_production.get(&resource).copied().unwrap_or(0.0);
        let consumption = total_consumption.get(&resource).copied().unwrap_or(0.0);
        net_production.insert(resource, production - consumption);
    }

    // Replace every derived output in one step
    habitat.storage_capacity = storage;
    habitat.max_population = max_population;
    habitat.research_points_production = research_production;
    habitat.current_net_production = net_production;

    tracing::debug!(
        habitat = %habitat.name,
        max_population,
        net_energy = habitat
            .current_net_production
            .get(&Resource::Energy)
            .copied()
            .unwrap_or(0.0),
        "stats recalculated"
    );
}

/// Character-bonus factor for one production channel of one building type
///
/// A generic production-output bonus and a channel-specific bonus both
/// apply, multiplicatively, after the tech modifiers.
fn production_bonus_factor(effects: &[CharacterBonusEffect], channel: &ProductionChannel) -> f32 {
    let mut factor = 1.0;
    for effect in effects {
        if effect.kind != ModifierKind::PercentageIncrease {
            continue;
        }
        match &effect.stat {
            BonusStat::ProductionOutput => factor *= 1.0 + effect.value,
            BonusStat::Production(target) if target == channel => factor *= 1.0 + effect.value,
            _ => {}
        }
    }
    factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::bonus::BonusCatalog;

    fn neutral_habitat() -> (Habitat, BlueprintCatalog, EngineConfig) {
        // Federated-Nations-like blank faction: no bonuses, no buildings
        let faction = crate::faction::Faction {
            id: "NEUTRAL".into(),
            name: "Neutral".into(),
            description: String::new(),
            leader_name: String::new(),
            color_hex: "#FFFFFF".into(),
            initial_habitat_type: "Basic Hab".into(),
            starting_bonus: Default::default(),
            initial_buildings: vec![],
            initial_tech: vec![],
        };
        let catalog = BlueprintCatalog::with_defaults();
        let config = EngineConfig::default();
        let habitat = Habitat::new("Neutral Base", &faction, &catalog, &config);
        (habitat, catalog, config)
    }

    #[test]
    fn test_base_module_sets_population_capacity() {
        let (habitat, _, _) = neutral_habitat();
        assert_eq!(habitat.max_population, 50.0);
    }

    #[test]
    fn test_net_energy_of_fresh_habitat() {
        let (habitat, _, _) = neutral_habitat();
        // Base trickle 5 - base draw 5 - module draw 10
        let net = habitat.current_net_production[&Resource::Energy];
        assert!((net - -10.0).abs() < 1e-4);
    }

    #[test]
    fn test_recalculation_is_idempotent() {
        let (mut habitat, catalog, config) = neutral_habitat();
        let bonuses = BonusContext::default();

        recalculate_stats(&mut habitat, &catalog, &bonuses, &config);
        let first_net = habitat.current_net_production.clone();
        let first_cap = habitat.storage_capacity.clone();
        let first_pop = habitat.max_population;

        recalculate_stats(&mut habitat, &catalog, &bonuses, &config);
        assert_eq!(habitat.current_net_production, first_net);
        assert_eq!(habitat.storage_capacity, first_cap);
        assert_eq!(habitat.max_population, first_pop);
    }

    #[test]
    fn test_level_zero_building_excluded() {
        let (mut habitat, catalog, config) = neutral_habitat();
        habitat.buildings.insert(
            "SolarArrayMk1".into(),
            crate::economy::building::Building::new("SolarArrayMk1", 0),
        );
        let before = habitat.current_net_production[&Resource::Energy];
        recalculate_stats(&mut habitat, &catalog, &BonusContext::default(), &config);
        assert_eq!(habitat.current_net_production[&Resource::Energy], before);
    }

    #[test]
    fn test_dangling_blueprint_skipped() {
        let (mut habitat, catalog, config) = neutral_habitat();
        habitat.buildings.insert(
            "DemolishedPrototype".into(),
            crate::economy::building::Building::new("DemolishedPrototype", 2),
        );
        // Must not panic, and must leave the rest of the pass intact
        recalculate_stats(&mut habitat, &catalog, &BonusContext::default(), &config);
        assert_eq!(habitat.max_population, 50.0);
    }

    #[test]
    fn test_storage_effect_scales_with_level() {
        let (mut habitat, catalog, config) = neutral_habitat();
        habitat.buildings.insert(
            "BatteryBankMk1".into(),
            crate::economy::building::Building::new("BatteryBankMk1", 3),
        );
        recalculate_stats(&mut habitat, &catalog, &BonusContext::default(), &config);
        // 5000 default + 3 * 2000
        assert_eq!(habitat.storage_capacity.get(Resource::Energy), 11000.0);
    }

    #[test]
    fn test_building_tech_modifier_scales_production() {
        let (mut habitat, catalog, config) = neutral_habitat();
        habitat.buildings.insert(
            "RegolithExtractorMk1".into(),
            crate::economy::building::Building::new("RegolithExtractorMk1", 1),
        );
        recalculate_stats(&mut habitat, &catalog, &BonusContext::default(), &config);
        let baseline = habitat.current_net_production[&Resource::RegolithComposites];

        habitat.modifiers.apply_building(
            "RegolithExtractorMk1",
            StatKey::production(Resource::RegolithComposites),
            1.15,
        );
        recalculate_stats(&mut habitat, &catalog, &BonusContext::default(), &config);
        let boosted = habitat.current_net_production[&Resource::RegolithComposites];

        // 10/tick at level 1, boosted by 15%
        assert!((boosted - baseline - 1.5).abs() < 1e-4);
    }

    #[test]
    fn test_population_capacity_bonus_compounds_with_tech() {
        let (mut habitat, catalog, config) = neutral_habitat();
        habitat
            .modifiers
            .apply_building("BasicHabitatModule", StatKey::PopulationCapacity, 1.2);

        let bonus_catalog = BonusCatalog::with_defaults();
        let active = vec!["l1_hardy_colonist".to_string()];
        let bonuses = BonusContext::collect(&active, &bonus_catalog);

        recalculate_stats(&mut habitat, &catalog, &bonuses, &config);
        // 50 * 1.2 (tech) * 1.05 (character)
        assert!((habitat.max_population - 63.0).abs() < 1e-3);
    }

    #[test]
    fn test_character_energy_saver_reduces_consumption() {
        let (mut habitat, catalog, config) = neutral_habitat();
        let bonus_catalog = BonusCatalog::with_defaults();
        let bonuses =
            BonusContext::collect(&["l1_energy_saver".to_string()], &bonus_catalog);

        recalculate_stats(&mut habitat, &catalog, &bonuses, &config);
        // Module draw 10 * 0.95 = 9.5; base trickle 5 - base draw 5 - 9.5
        let net = habitat.current_net_production[&Resource::Energy];
        assert!((net - -9.5).abs() < 1e-4);
    }

    #[test]
    fn test_global_production_dual_rule() {
        let (mut habitat, catalog, config) = neutral_habitat();
        habitat.buildings.insert(
            "RegolithExtractorMk1".into(),
            crate::economy::building::Building::new("RegolithExtractorMk1", 1),
        );

        // Fractional value: additive percentage
        let mut catalog_frac = BonusCatalog::new();
        catalog_frac.add(crate::character::bonus::CharacterBonus {
            id: "frac".into(),
            display_name: "Frac".into(),
            description: String::new(),
            tier: 2,
            cost_bp: 0,
            effects: vec![crate::character::bonus::CharacterBonusEffect::new(
                crate::character::bonus::BonusTarget::ResourceProduction(
                    Resource::RegolithComposites,
                ),
                BonusStat::Production(ProductionChannel::Resource(Resource::RegolithComposites)),
                ModifierKind::PercentageIncrease,
                0.5,
            )],
        });
        let ctx = BonusContext::collect(&["frac".to_string()], &catalog_frac);
        recalculate_stats(&mut habitat, &catalog, &ctx, &config);
        let gross_frac = habitat.current_net_production[&Resource::RegolithComposites];
        // 10 * (1 + 0.5) = 15
        assert!((gross_frac - 15.0).abs() < 1e-4);

        // Value above 1: outright multiplier
        let mut catalog_mult = BonusCatalog::new();
        catalog_mult.add(crate::character::bonus::CharacterBonus {
            id: "mult".into(),
            display_name: "Mult".into(),
            description: String::new(),
            tier: 2,
            cost_bp: 0,
            effects: vec![crate::character::bonus::CharacterBonusEffect::new(
                crate::character::bonus::BonusTarget::ResourceProduction(
                    Resource::RegolithComposites,
                ),
                BonusStat::Production(ProductionChannel::Resource(Resource::RegolithComposites)),
                ModifierKind::PercentageIncrease,
                2.0,
            )],
        });
        let ctx = BonusContext::collect(&["mult".to_string()], &catalog_mult);
        recalculate_stats(&mut habitat, &catalog, &ctx, &config);
        let gross_mult = habitat.current_net_production[&Resource::RegolithComposites];
        // 10 * 2 = 20
        assert!((gross_mult - 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_upkeep_scales_with_population() {
        let (mut habitat, catalog, config) = neutral_habitat();
        recalculate_stats(&mut habitat, &catalog, &BonusContext::default(), &config);
        // 50 colonists: food 5.0/tick, water 2.5/tick
        assert!((habitat.current_net_production[&Resource::Food] - -5.0).abs() < 1e-4);
        assert!((habitat.current_net_production[&Resource::WaterIce] - -2.5).abs() < 1e-4);

        habitat.population = 100.0;
        recalculate_stats(&mut habitat, &catalog, &BonusContext::default(), &config);
        assert!((habitat.current_net_production[&Resource::Food] - -10.0).abs() < 1e-4);
    }

    #[test]
    fn test_research_production_from_lab() {
        let (mut habitat, catalog, config) = neutral_habitat();
        habitat.buildings.insert(
            "ResearchLab".into(),
            crate::economy::building::Building::new("ResearchLab", 2),
        );
        recalculate_stats(&mut habitat, &catalog, &BonusContext::default(), &config);
        assert_eq!(habitat.research_points_production["ResearchPoints"], 20.0);
    }
}
