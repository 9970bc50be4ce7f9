//! Building blueprints - static definitions of what can be constructed
//!
//! Blueprints specify construction cost, per-level production channels,
//! per-level consumption, and per-level effects (population capacity,
//! storage capacity, or named effects the economy engine ignores).
//! The catalog is loaded once and never mutated afterwards.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::economy::modifiers::ProductionChannel;
use crate::economy::resources::Resource;

/// One per-level effect declared by a blueprint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BlueprintEffect {
    /// Adds population capacity, scaled by level and capacity modifiers
    PopulationCapacity(f32),
    /// Raises the storage cap of one resource, scaled by level
    StorageCapacity(Resource, f32),
    /// Named effect the numeric engine does not evaluate (unlock flags,
    /// morale bonuses, study-speed modifiers, ...)
    Inert { name: String, value: f32 },
}

/// A building blueprint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blueprint {
    /// Unique identifier
    pub id: String,
    /// Human-readable name
    pub display_name: String,
    /// Construction cost (also the base of the upgrade-cost schedule)
    pub cost: Vec<(Resource, f32)>,
    /// Output channels per level
    pub production_per_level: Vec<(ProductionChannel, f32)>,
    /// Energy drawn per level
    pub energy_consumption_per_level: f32,
    /// Non-energy resources drawn per level
    pub resource_consumption_per_level: Vec<(Resource, f32)>,
    /// Effects granted per level
    pub effects_per_level: Vec<BlueprintEffect>,
}

/// Catalog of all known blueprints, keyed by id
#[derive(Debug, Clone, Default)]
pub struct BlueprintCatalog {
    blueprints: AHashMap<String, Blueprint>,
}

impl BlueprintCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a blueprint to the catalog
    pub fn add(&mut self, blueprint: Blueprint) {
        self.blueprints.insert(blueprint.id.clone(), blueprint);
    }

    /// Get a blueprint by id
    pub fn get(&self, id: &str) -> Option<&Blueprint> {
        self.blueprints.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.blueprints.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.blueprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blueprints.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Blueprint> {
        self.blueprints.values()
    }

    /// Load the built-in blueprint set
    pub fn with_defaults() -> Self {
        use BlueprintEffect::*;
        use ProductionChannel as Ch;
        use Resource::*;

        let mut catalog = Self::new();

        catalog.add(Blueprint {
            id: "BasicHabitatModule".into(),
            display_name: "Basic Habitat Module".into(),
            cost: vec![(RegolithComposites, 200.0), (Energy, 50.0)],
            production_per_level: vec![],
            energy_consumption_per_level: 10.0,
            resource_consumption_per_level: vec![],
            effects_per_level: vec![
                PopulationCapacity(50.0),
                Inert { name: "basic_life_support".into(), value: 50.0 },
            ],
        });

        catalog.add(Blueprint {
            id: "RegolithExtractorMk1".into(),
            display_name: "Regolith Extractor Mk1".into(),
            cost: vec![(RegolithComposites, 70.0), (Energy, 30.0)],
            production_per_level: vec![(Ch::Resource(RegolithComposites), 10.0)],
            energy_consumption_per_level: 10.0,
            resource_consumption_per_level: vec![],
            effects_per_level: vec![],
        });

        catalog.add(Blueprint {
            id: "WaterIceExtractorMk1".into(),
            display_name: "Water Ice Extractor Mk1".into(),
            cost: vec![(RegolithComposites, 80.0), (Energy, 40.0)],
            production_per_level: vec![(Ch::Resource(WaterIce), 5.0)],
            energy_consumption_per_level: 12.0,
            resource_consumption_per_level: vec![],
            effects_per_level: vec![],
        });

        catalog.add(Blueprint {
            id: "WaterIceExtractorMk2".into(),
            display_name: "Water Ice Extractor Mk2".into(),
            cost: vec![
                (RegolithComposites, 150.0),
                (RareEarthElements, 30.0),
                (Energy, 60.0),
            ],
            production_per_level: vec![(Ch::Resource(WaterIce), 10.0)],
            energy_consumption_per_level: 18.0,
            resource_consumption_per_level: vec![],
            effects_per_level: vec![],
        });

        catalog.add(Blueprint {
            id: "SolarArrayMk1".into(),
            display_name: "Solar Array Mk1".into(),
            cost: vec![(RegolithComposites, 100.0), (RareEarthElements, 10.0)],
            production_per_level: vec![(Ch::Resource(Energy), 25.0)],
            energy_consumption_per_level: 0.0,
            resource_consumption_per_level: vec![],
            effects_per_level: vec![],
        });

        catalog.add(Blueprint {
            id: "SolarArrayMk2".into(),
            display_name: "Solar Array Mk2".into(),
            cost: vec![
                (RegolithComposites, 180.0),
                (RareEarthElements, 25.0),
                (Energy, 50.0),
            ],
            production_per_level: vec![(Ch::Resource(Energy), 45.0)],
            energy_consumption_per_level: 0.0,
            resource_consumption_per_level: vec![],
            effects_per_level: vec![],
        });

        catalog.add(Blueprint {
            id: "BatteryBankMk1".into(),
            display_name: "Battery Bank Mk1".into(),
            cost: vec![
                (RegolithComposites, 150.0),
                (RareEarthElements, 40.0),
                (Energy, 20.0),
            ],
            production_per_level: vec![],
            energy_consumption_per_level: 1.0,
            resource_consumption_per_level: vec![],
            effects_per_level: vec![StorageCapacity(Energy, 2000.0)],
        });

        catalog.add(Blueprint {
            id: "GeothermalPlantMk1".into(),
            display_name: "Geothermal Plant Mk1".into(),
            cost: vec![
                (RegolithComposites, 400.0),
                (RareEarthElements, 100.0),
                (Energy, 150.0),
            ],
            production_per_level: vec![(Ch::Resource(Energy), 100.0)],
            energy_consumption_per_level: 5.0,
            resource_consumption_per_level: vec![],
            effects_per_level: vec![],
        });

        catalog.add(Blueprint {
            id: "CompactFusionReactorMk1".into(),
            display_name: "Compact Fusion Reactor Mk1".into(),
            cost: vec![
                (RegolithComposites, 1000.0),
                (RareEarthElements, 400.0),
                (Energy, 500.0),
            ],
            production_per_level: vec![(Ch::Resource(Energy), 500.0)],
            energy_consumption_per_level: 10.0,
            resource_consumption_per_level: vec![],
            effects_per_level: vec![],
        });

        catalog.add(Blueprint {
            id: "ResearchLab".into(),
            display_name: "Research Lab".into(),
            cost: vec![
                (RegolithComposites, 200.0),
                (RareEarthElements, 80.0),
                (WaterIce, 50.0),
                (Energy, 70.0),
            ],
            production_per_level: vec![(Ch::research(""), 10.0)],
            energy_consumption_per_level: 25.0,
            resource_consumption_per_level: vec![],
            effects_per_level: vec![],
        });

        catalog.add(Blueprint {
            id: "EducationCenter".into(),
            display_name: "Education Center".into(),
            cost: vec![
                (RegolithComposites, 250.0),
                (RareEarthElements, 50.0),
                (Energy, 60.0),
            ],
            production_per_level: vec![(Ch::research(""), 3.0)],
            energy_consumption_per_level: 35.0,
            resource_consumption_per_level: vec![],
            effects_per_level: vec![Inert { name: "local_skill_gain_modifier".into(), value: 0.05 }],
        });

        catalog.add(Blueprint {
            id: "XenoArchaeologyLabLv1".into(),
            display_name: "Xenoarchaeology Lab Lv1".into(),
            cost: vec![
                (RegolithComposites, 500.0),
                (RareEarthElements, 200.0),
                (Energy, 150.0),
            ],
            production_per_level: vec![(Ch::research("Xeno"), 5.0)],
            energy_consumption_per_level: 50.0,
            resource_consumption_per_level: vec![],
            effects_per_level: vec![Inert {
                name: "alien_artifact_study_speed_modifier".into(),
                value: 0.05,
            }],
        });

        catalog.add(Blueprint {
            id: "BioLabLv1".into(),
            display_name: "Biotech Lab Lv1".into(),
            cost: vec![
                (RegolithComposites, 300.0),
                (RareEarthElements, 100.0),
                (WaterIce, 100.0),
                (Energy, 100.0),
            ],
            production_per_level: vec![(Ch::research("Bio"), 5.0)],
            energy_consumption_per_level: 40.0,
            resource_consumption_per_level: vec![],
            effects_per_level: vec![Inert {
                name: "biotech_research_speed_modifier".into(),
                value: 0.05,
            }],
        });

        catalog.add(Blueprint {
            id: "HydroponicsFarmMk1".into(),
            display_name: "Hydroponics Farm Mk1".into(),
            cost: vec![
                (RegolithComposites, 200.0),
                (WaterIce, 100.0),
                (Energy, 60.0),
            ],
            production_per_level: vec![(Ch::Resource(Food), 10.0)],
            energy_consumption_per_level: 25.0,
            resource_consumption_per_level: vec![(WaterIce, 1.0)],
            effects_per_level: vec![],
        });

        catalog.add(Blueprint {
            id: "AdvancedHydroponicsFarm".into(),
            display_name: "Advanced Hydroponics Farm".into(),
            cost: vec![
                (RegolithComposites, 400.0),
                (WaterIce, 150.0),
                (RareEarthElements, 50.0),
                (Energy, 100.0),
            ],
            production_per_level: vec![(Ch::Resource(Food), 25.0)],
            energy_consumption_per_level: 40.0,
            resource_consumption_per_level: vec![(WaterIce, 2.0)],
            effects_per_level: vec![Inert {
                name: "water_consumption_efficiency".into(),
                value: 0.1,
            }],
        });

        catalog.add(Blueprint {
            id: "BioRecyclingPlant".into(),
            display_name: "Bio Recycling Plant".into(),
            cost: vec![
                (RegolithComposites, 250.0),
                (WaterIce, 80.0),
                (Energy, 70.0),
            ],
            production_per_level: vec![
                (Ch::Resource(WaterIce), 1.0),
                (Ch::Resource(RegolithComposites), 2.0),
            ],
            energy_consumption_per_level: 30.0,
            resource_consumption_per_level: vec![],
            effects_per_level: vec![Inert { name: "waste_reduction_modifier".into(), value: 0.1 }],
        });

        catalog.add(Blueprint {
            id: "GHGFactoryMk1".into(),
            display_name: "Greenhouse Gas Factory Mk1".into(),
            cost: vec![
                (RegolithComposites, 600.0),
                (WaterIce, 200.0),
                (Energy, 180.0),
            ],
            production_per_level: vec![(Ch::Named("TerraformingGas".into()), 5.0)],
            energy_consumption_per_level: 80.0,
            resource_consumption_per_level: vec![(WaterIce, 5.0)],
            effects_per_level: vec![],
        });

        catalog.add(Blueprint {
            id: "LargeHabitatDome".into(),
            display_name: "Large Habitat Dome".into(),
            cost: vec![
                (RegolithComposites, 2500.0),
                (RareEarthElements, 500.0),
                (WaterIce, 1000.0),
                (Energy, 800.0),
            ],
            production_per_level: vec![],
            energy_consumption_per_level: 150.0,
            resource_consumption_per_level: vec![],
            effects_per_level: vec![
                PopulationCapacity(500.0),
                Inert { name: "advanced_life_support".into(), value: 500.0 },
            ],
        });

        catalog.add(Blueprint {
            id: "SealedEcosystemDome".into(),
            display_name: "Sealed Ecosystem Dome".into(),
            cost: vec![
                (RegolithComposites, 5000.0),
                (RareEarthElements, 1000.0),
                (WaterIce, 3000.0),
                (Food, 1000.0),
                (Energy, 1500.0),
            ],
            production_per_level: vec![
                (Ch::Resource(Food), 100.0),
                (Ch::Resource(WaterIce), 20.0),
            ],
            energy_consumption_per_level: 250.0,
            resource_consumption_per_level: vec![],
            effects_per_level: vec![
                PopulationCapacity(300.0),
                Inert { name: "morale_from_environment_bonus".into(), value: 0.15 },
            ],
        });

        catalog.add(Blueprint {
            id: "ArcologyCore".into(),
            display_name: "Arcology Core".into(),
            cost: vec![
                (RegolithComposites, 10000.0),
                (RareEarthElements, 3000.0),
                (WaterIce, 5000.0),
                (Energy, 2000.0),
            ],
            production_per_level: vec![],
            energy_consumption_per_level: 500.0,
            resource_consumption_per_level: vec![],
            effects_per_level: vec![
                PopulationCapacity(2000.0),
                Inert { name: "self_sufficiency_modifier".into(), value: 0.1 },
                Inert { name: "morale_bonus".into(), value: 0.1 },
            ],
        });

        catalog
    }

    /// Load blueprints from a TOML file, merged over nothing (fresh catalog)
    pub fn load_from_toml(path: &std::path::Path) -> Result<Self, CatalogError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| CatalogError::Io(e.to_string()))?;
        Self::parse_toml(&content)
    }

    /// Parse blueprints from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self, CatalogError> {
        let toml_data: TomlBlueprints =
            toml::from_str(content).map_err(|e| CatalogError::Parse(e.to_string()))?;

        let mut catalog = Self::new();
        for blueprint in toml_data.blueprints {
            catalog.add(blueprint.into_blueprint()?);
        }
        Ok(catalog)
    }
}

/// Error type for catalog loading
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Unknown resource: {0}")]
    UnknownResource(String),
    #[error("Unknown effect '{effect}' in blueprint {blueprint}")]
    UnknownEffect { blueprint: String, effect: String },
}

/// TOML representation of a blueprints file
#[derive(Debug, Deserialize)]
struct TomlBlueprints {
    blueprints: Vec<TomlBlueprint>,
}

/// TOML representation of a single blueprint
#[derive(Debug, Deserialize)]
struct TomlBlueprint {
    id: String,
    display_name: String,
    #[serde(default)]
    cost: Vec<TomlResourceAmount>,
    #[serde(default)]
    production: Vec<TomlChannelAmount>,
    #[serde(default)]
    energy_consumption_per_level: f32,
    #[serde(default)]
    consumption: Vec<TomlResourceAmount>,
    #[serde(default)]
    effects: Vec<TomlEffect>,
}

#[derive(Debug, Deserialize)]
struct TomlResourceAmount {
    resource: String,
    amount: f32,
}

#[derive(Debug, Deserialize)]
struct TomlChannelAmount {
    channel: String,
    amount: f32,
}

#[derive(Debug, Deserialize)]
struct TomlEffect {
    effect: String,
    resource: Option<String>,
    value: f32,
}

impl TomlBlueprint {
    fn into_blueprint(self) -> Result<Blueprint, CatalogError> {
        let cost = self
            .cost
            .into_iter()
            .map(|ra| ra.into_resource_amount())
            .collect::<Result<Vec<_>, _>>()?;

        let production_per_level = self
            .production
            .into_iter()
            .map(|ca| {
                // Keys that name a resource are resource channels; anything
                // else is a named output (research tracks, terraforming gas)
                let channel = match Resource::parse(&ca.channel) {
                    Some(resource) => ProductionChannel::Resource(resource),
                    None => ProductionChannel::Named(ca.channel),
                };
                Ok((channel, ca.amount))
            })
            .collect::<Result<Vec<_>, CatalogError>>()?;

        let resource_consumption_per_level = self
            .consumption
            .into_iter()
            .map(|ra| ra.into_resource_amount())
            .collect::<Result<Vec<_>, _>>()?;

        let mut effects_per_level = Vec::new();
        for effect in self.effects {
            match effect.effect.as_str() {
                "population_capacity" => {
                    effects_per_level.push(BlueprintEffect::PopulationCapacity(effect.value));
                }
                "storage_capacity" => {
                    let key = effect.resource.ok_or_else(|| CatalogError::UnknownEffect {
                        blueprint: self.id.clone(),
                        effect: "storage_capacity without resource".into(),
                    })?;
                    let resource = Resource::parse(&key)
                        .ok_or_else(|| CatalogError::UnknownResource(key.clone()))?;
                    effects_per_level.push(BlueprintEffect::StorageCapacity(resource, effect.value));
                }
                name => {
                    effects_per_level.push(BlueprintEffect::Inert {
                        name: name.to_string(),
                        value: effect.value,
                    });
                }
            }
        }

        Ok(Blueprint {
            id: self.id,
            display_name: self.display_name,
            cost,
            production_per_level,
            energy_consumption_per_level: self.energy_consumption_per_level,
            resource_consumption_per_level,
            effects_per_level,
        })
    }
}

impl TomlResourceAmount {
    fn into_resource_amount(self) -> Result<(Resource, f32), CatalogError> {
        let resource = Resource::parse(&self.resource)
            .ok_or(CatalogError::UnknownResource(self.resource))?;
        Ok((resource, self.amount))
    }
}
