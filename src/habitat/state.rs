//! Habitat state - resources, buildings, and derived stats

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::character::bonus::BonusContext;
use crate::core::config::EngineConfig;
use crate::economy::blueprint::BlueprintCatalog;
use crate::economy::building::Building;
use crate::economy::modifiers::{ModifierRegistry, ProductionChannel, StatKey};
use crate::economy::resources::{Resource, ResourceLedger, StorageCapacity};
use crate::faction::Faction;
use crate::habitat::recalc::recalculate_stats;

/// The guaranteed starting module of every habitat
pub const BASE_MODULE_ID: &str = "BasicHabitatModule";

/// A player's habitat
///
/// Created once at game start and never destroyed during a session. The
/// derived fields (`current_net_production`, `storage_capacity`,
/// `max_population`, `research_points_production`) are owned by the
/// recalculation engine and replaced wholesale on every pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Habitat {
    pub name: String,
    pub faction_id: String,
    pub habitat_type: String,
    pub resources: ResourceLedger,
    pub storage_capacity: StorageCapacity,
    pub buildings: AHashMap<String, Building>,
    pub population: f32,
    pub max_population: f32,
    pub population_growth_rate: f32,
    /// 0.0 to 1.0, scales population growth
    pub morale: f32,
    pub modifiers: ModifierRegistry,
    pub current_net_production: AHashMap<Resource, f32>,
    pub research_points_production: AHashMap<String, f32>,
}

impl Habitat {
    /// Found a habitat for a faction
    ///
    /// Seeds starting resources, faction modifiers, and the initial
    /// building set (faction buildings plus the guaranteed base module),
    /// then runs the first recalculation.
    pub fn new(
        name: impl Into<String>,
        faction: &Faction,
        catalog: &BlueprintCatalog,
        config: &EngineConfig,
    ) -> Self {
        let mut habitat = Self {
            name: name.into(),
            faction_id: faction.id.clone(),
            habitat_type: faction.initial_habitat_type.clone(),
            resources: ResourceLedger::with_initial_amounts(),
            storage_capacity: StorageCapacity::with_defaults(),
            buildings: AHashMap::new(),
            population: config.starting_population,
            max_population: 0.0,
            population_growth_rate: config.population_growth_rate,
            morale: config.starting_morale,
            modifiers: ModifierRegistry::new(),
            current_net_production: AHashMap::new(),
            research_points_production: AHashMap::new(),
        };

        habitat.apply_faction_bonuses(faction);
        habitat.setup_initial_buildings(faction, catalog);
        habitat.add_base_module(catalog);

        recalculate_stats(&mut habitat, catalog, &BonusContext::default(), config);

        tracing::info!(
            habitat = %habitat.name,
            faction = %faction.id,
            "habitat founded"
        );
        habitat
    }

    /// Seed faction starting bonuses into the ledger and modifier registry
    fn apply_faction_bonuses(&mut self, faction: &Faction) {
        let bonus = &faction.starting_bonus;

        self.resources
            .add(&bonus.starting_resources_bonus, &self.storage_capacity);

        if let Some(modifier) = bonus.energy_production_modifier {
            self.modifiers
                .apply_global(StatKey::production(Resource::Energy), modifier);
        }
        for &(resource, modifier) in &bonus.resource_production_modifiers {
            self.modifiers
                .apply_global(StatKey::production(resource), modifier);
        }
        for (track, modifier) in &bonus.research_speed_modifiers {
            self.modifiers.apply_global(
                StatKey::Production(ProductionChannel::research(track)),
                *modifier,
            );
        }
    }

    fn setup_initial_buildings(&mut self, faction: &Faction, catalog: &BlueprintCatalog) {
        for blueprint_id in &faction.initial_buildings {
            if !catalog.contains(blueprint_id) {
                tracing::warn!(
                    blueprint_id = %blueprint_id,
                    faction = %faction.id,
                    "initial faction building not in catalog, skipping"
                );
                continue;
            }
            let building = self
                .buildings
                .entry(blueprint_id.clone())
                .or_insert_with(|| Building::new(blueprint_id.clone(), 1));
            if building.level < 1 {
                building.level = 1;
            }
        }
    }

    /// Every habitat gets the base module at level 1, regardless of faction
    fn add_base_module(&mut self, catalog: &BlueprintCatalog) {
        if !catalog.contains(BASE_MODULE_ID) {
            tracing::error!("blueprint for {BASE_MODULE_ID} missing from catalog");
            return;
        }
        let building = self
            .buildings
            .entry(BASE_MODULE_ID.to_string())
            .or_insert_with(|| Building::new(BASE_MODULE_ID, 1));
        if building.level < 1 {
            building.level = 1;
        }
    }

    /// Look up a building, active or not
    pub fn building(&self, blueprint_id: &str) -> Option<&Building> {
        self.buildings.get(blueprint_id)
    }

    pub fn can_afford(&self, costs: &[(Resource, f32)]) -> (bool, Vec<(Resource, f32)>) {
        self.resources.can_afford(costs)
    }

    pub fn spend_resources(&mut self, costs: &[(Resource, f32)]) -> bool {
        let spent = self.resources.spend(costs);
        if !spent {
            let (_, missing) = self.resources.can_afford(costs);
            tracing::warn!(habitat = %self.name, ?missing, "failed to spend resources");
        }
        spent
    }

    /// Formatted status report for display
    pub fn status_report(&self) -> String {
        let mut report = format!(
            "--- Habitat Report: {} (Faction: {}) ---\n",
            self.name, self.faction_id
        );
        report += &format!(
            "Population: {:.0} / {:.0} (Morale: {:.2})\n",
            self.population, self.max_population, self.morale
        );

        report += "Research Points Production (/tick):\n";
        if self.research_points_production.is_empty() {
            report += "  None\n";
        } else {
            let mut tracks: Vec<_> = self.research_points_production.iter().collect();
            tracks.sort_by(|a, b| a.0.cmp(b.0));
            for (track, amount) in tracks {
                report += &format!("  {track}: {amount:.2}\n");
            }
        }

        report += "Resources & Net Production (/tick):\n";
        for resource in Resource::ALL {
            let amount = self.resources.get(resource);
            let net = self
                .current_net_production
                .get(&resource)
                .copied()
                .unwrap_or(0.0);
            let sign = if net >= 0.0 { "+" } else { "" };
            report += &format!(
                "  - {}: {:.2} / {:.0} ({}{:.2}/tick)\n",
                resource.display_name(),
                amount,
                self.storage_capacity.get(resource),
                sign,
                net
            );
        }

        report += "Installed Buildings:\n";
        let mut active: Vec<_> = self.buildings.values().filter(|b| b.is_active()).collect();
        if active.is_empty() {
            report += "  None\n";
        } else {
            active.sort_by(|a, b| a.blueprint_id.cmp(&b.blueprint_id));
            for building in active {
                report += &format!("  - {} (Lv. {})\n", building.blueprint_id, building.level);
            }
        }
        report
    }
}
