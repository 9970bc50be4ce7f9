//! Faction catalog - starting-bonus descriptors consumed at habitat
//! construction
//!
//! A faction seeds the modifier registry, the starting building set, and
//! initial resource stocks once when a player's first habitat is founded.
//! It is never consulted again during the simulation.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::economy::resources::Resource;

/// Bonuses a faction grants at game start
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StartingBonus {
    /// Global multiplier on energy production (1.0 = none)
    pub energy_production_modifier: Option<f32>,
    /// Global multipliers on specific resource production
    pub resource_production_modifiers: Vec<(Resource, f32)>,
    /// Multipliers on research-point tracks, by track name
    /// (empty name = the generic ResearchPoints pool)
    pub research_speed_modifiers: Vec<(String, f32)>,
    /// Extra starting stock on top of the defaults
    pub starting_resources_bonus: Vec<(Resource, f32)>,
}

/// A playable faction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Faction {
    pub id: String,
    pub name: String,
    pub description: String,
    pub leader_name: String,
    pub color_hex: String,
    pub initial_habitat_type: String,
    pub starting_bonus: StartingBonus,
    /// Buildings placed at level 1 when the habitat is founded
    pub initial_buildings: Vec<String>,
    /// Technologies unlocked for free at game start
    pub initial_tech: Vec<String>,
}

/// Catalog of playable factions
#[derive(Debug, Clone, Default)]
pub struct FactionCatalog {
    factions: AHashMap<String, Faction>,
}

impl FactionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, faction: Faction) {
        self.factions.insert(faction.id.clone(), faction);
    }

    pub fn get(&self, id: &str) -> Option<&Faction> {
        self.factions.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Faction> {
        self.factions.values()
    }

    /// Load the built-in faction set
    pub fn with_defaults() -> Self {
        use Resource::*;

        let mut catalog = Self::new();

        catalog.add(Faction {
            id: "MUSK_CORP".into(),
            name: "SpaceX-Tesla Alliance / Musk Corporation".into(),
            description: "Leader in terraforming and Earth-Mars trade corridors. \
                          Economic autonomy and advanced technology."
                .into(),
            leader_name: "Elon Reeve Musk II".into(),
            color_hex: "#E82127".into(),
            initial_habitat_type: "Tesla 'Starbase' Hab Mk.II".into(),
            starting_bonus: StartingBonus {
                energy_production_modifier: Some(1.05),
                research_speed_modifiers: vec![("TerraformingTech".into(), 1.15)],
                starting_resources_bonus: vec![(Energy, 500.0)],
                ..Default::default()
            },
            initial_buildings: vec!["SolarArrayMk1".into()],
            initial_tech: vec!["energy_t1_power_distribution".into()],
        });

        catalog.add(Faction {
            id: "EURASIAN_ALLIANCE".into(),
            name: "Great Eurasian Alliance".into(),
            description: "Controls vast territories and heavy-metal mines. \
                          Collectivist social model and advanced fusion reactors."
                .into(),
            leader_name: "President Chen Bolin".into(),
            color_hex: "#004F9F".into(),
            initial_habitat_type: "Kupol-Grad 'Titan' Mining Outpost".into(),
            starting_bonus: StartingBonus {
                resource_production_modifiers: vec![
                    (RegolithComposites, 1.1),
                    (RareEarthElements, 1.05),
                ],
                starting_resources_bonus: vec![(RegolithComposites, 200.0)],
                ..Default::default()
            },
            initial_buildings: vec!["RegolithExtractorMk1".into()],
            initial_tech: vec!["hab_t1_regolith_extraction".into()],
        });

        catalog.add(Faction {
            id: "INDO_PACIFIC_BLOCK".into(),
            name: "Indo-Pacific Block".into(),
            description: "The most advanced AI and robotics technology. Martian \
                          New Bangalore is an innovation hub for life support and \
                          vertical agriculture."
                .into(),
            leader_name: "Prime Minister Kenji Tanaka".into(),
            color_hex: "#BC002D".into(),
            initial_habitat_type: "'Sakura-Net' AI Nexus".into(),
            starting_bonus: StartingBonus {
                research_speed_modifiers: vec![("AI_Robotics".into(), 1.2)],
                starting_resources_bonus: vec![(RareEarthElements, 50.0)],
                ..Default::default()
            },
            initial_buildings: vec!["ResearchLab".into()],
            initial_tech: vec!["data_t1_computational_theory".into()],
        });

        catalog.add(Faction {
            id: "NEW_ISRAEL".into(),
            name: "New Israel and Spiritual Communities".into(),
            description: "Known for desalination and water purification \
                          technologies. Autonomous enclaves."
                .into(),
            leader_name: "Rabbi David Cohen".into(),
            color_hex: "#0038B8".into(),
            initial_habitat_type: "'Kinneret Spring' Water Reclamation Site".into(),
            starting_bonus: StartingBonus {
                resource_production_modifiers: vec![(WaterIce, 1.15)],
                starting_resources_bonus: vec![(WaterIce, 200.0)],
                ..Default::default()
            },
            initial_buildings: vec!["WaterIceExtractorMk1".into()],
            initial_tech: vec!["hab_t1_water_ice_mining".into()],
        });

        catalog
    }
}
