//! Technology tree - prerequisite graph with research gating

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::economy::modifiers::{ModifierKind, ProductionChannel, StatKey};
use crate::economy::resources::Resource;
use crate::habitat::state::Habitat;
use crate::tech::effects::{TechEffect, UnlockState};

/// One researchable technology
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Technology {
    pub id: String,
    pub display_name: String,
    pub description: String,
    pub tier: u8,
    /// Research points required to complete
    pub cost_rp: f32,
    /// Technologies that must be researched first
    pub prerequisites: Vec<String>,
    /// Buildings that must exist at the given level in the primary habitat
    pub building_prerequisites: Vec<(String, u32)>,
    /// Resources spent from the primary habitat when research starts
    pub cost_resources: Vec<(Resource, f32)>,
    pub effects: Vec<TechEffect>,
}

/// Why a technology can or cannot be researched
#[derive(Debug, Clone, PartialEq)]
pub enum ResearchGate {
    Available,
    UnknownTechnology { tech_id: String },
    AlreadyResearched,
    MissingPrerequisite { tech_id: String },
    MissingBuilding { blueprint_id: String, required_level: u32 },
    InsufficientResources { missing: Vec<(Resource, f32)> },
}

impl ResearchGate {
    pub fn is_available(&self) -> bool {
        matches!(self, ResearchGate::Available)
    }

    pub fn message(&self) -> String {
        match self {
            ResearchGate::Available => "Available for research.".into(),
            ResearchGate::UnknownTechnology { tech_id } => {
                format!("Technology '{tech_id}' not found.")
            }
            ResearchGate::AlreadyResearched => "Already researched.".into(),
            ResearchGate::MissingPrerequisite { tech_id } => {
                format!("Missing prerequisite technology: '{tech_id}'.")
            }
            ResearchGate::MissingBuilding { blueprint_id, required_level } => {
                format!("Requires '{blueprint_id}' at level {required_level}.")
            }
            ResearchGate::InsufficientResources { missing } => {
                let shortfalls: Vec<String> = missing
                    .iter()
                    .map(|(r, amount)| format!("{amount:.0} {}", r.display_name()))
                    .collect();
                format!("Insufficient resources. Missing: {}.", shortfalls.join(", "))
            }
        }
    }
}

/// The directed prerequisite graph of technologies
#[derive(Debug, Clone, Default)]
pub struct TechTree {
    technologies: AHashMap<String, Technology>,
}

impl TechTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, tech: Technology) {
        self.technologies.insert(tech.id.clone(), tech);
    }

    pub fn get(&self, id: &str) -> Option<&Technology> {
        self.technologies.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.technologies.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Technology> {
        self.technologies.values()
    }

    /// Check every research gate for a technology
    pub fn can_research(
        &self,
        tech_id: &str,
        unlocks: &UnlockState,
        habitat: &Habitat,
    ) -> ResearchGate {
        let Some(tech) = self.get(tech_id) else {
            return ResearchGate::UnknownTechnology { tech_id: tech_id.to_string() };
        };

        if unlocks.technologies.contains(tech_id) {
            return ResearchGate::AlreadyResearched;
        }

        for prereq in &tech.prerequisites {
            if !unlocks.technologies.contains(prereq) {
                return ResearchGate::MissingPrerequisite { tech_id: prereq.clone() };
            }
        }

        for (blueprint_id, required_level) in &tech.building_prerequisites {
            let current_level = habitat
                .building(blueprint_id)
                .map(|b| b.level)
                .unwrap_or(0);
            if current_level < *required_level {
                return ResearchGate::MissingBuilding {
                    blueprint_id: blueprint_id.clone(),
                    required_level: *required_level,
                };
            }
        }

        if !tech.cost_resources.is_empty() {
            let (affordable, missing) = habitat.can_afford(&tech.cost_resources);
            if !affordable {
                return ResearchGate::InsufficientResources { missing };
            }
        }

        ResearchGate::Available
    }

    /// Load the built-in technology set
    pub fn with_defaults() -> Self {
        use ModifierKind::*;
        use Resource::*;
        use TechEffect::*;

        let mut tree = Self::new();

        // --- Habitation & industry ---
        tree.add(Technology {
            id: "hab_t1_basic_shelters".into(),
            display_name: "Basic Martian Shelters".into(),
            description: "Construction techniques for the first pressurized habitats.".into(),
            tier: 1,
            cost_rp: 100.0,
            prerequisites: vec![],
            building_prerequisites: vec![],
            cost_resources: vec![],
            effects: vec![UnlockBuilding { blueprint_id: "BasicHabitatModule".into() }],
        });

        tree.add(Technology {
            id: "hab_t1_regolith_extraction".into(),
            display_name: "Basic Regolith Extraction".into(),
            description: "Unlocks the regolith extractor for construction materials.".into(),
            tier: 1,
            cost_rp: 150.0,
            prerequisites: vec![],
            building_prerequisites: vec![],
            cost_resources: vec![],
            effects: vec![UnlockBuilding { blueprint_id: "RegolithExtractorMk1".into() }],
        });

        tree.add(Technology {
            id: "hab_t1_water_ice_mining".into(),
            display_name: "Water Ice Mining".into(),
            description: "Technology to extract and process subsurface water ice.".into(),
            tier: 1,
            cost_rp: 200.0,
            prerequisites: vec![],
            building_prerequisites: vec![],
            cost_resources: vec![],
            effects: vec![UnlockBuilding { blueprint_id: "WaterIceExtractorMk1".into() }],
        });

        tree.add(Technology {
            id: "hab_t2_improved_life_support".into(),
            display_name: "Improved Life Support".into(),
            description: "Improves the efficiency of life-support systems.".into(),
            tier: 2,
            cost_rp: 500.0,
            prerequisites: vec!["hab_t1_water_ice_mining".into()],
            building_prerequisites: vec![("BasicHabitatModule".into(), 1)],
            cost_resources: vec![],
            effects: vec![
                ModifyBuildingStat {
                    blueprint_id: "BasicHabitatModule".into(),
                    stat: StatKey::Other("life_support_efficiency_modifier".into()),
                    kind: PercentageIncrease,
                    value: 0.1,
                },
                ModifyBuildingStat {
                    blueprint_id: "LargeHabitatDome".into(),
                    stat: StatKey::Other("life_support_efficiency_modifier".into()),
                    kind: PercentageIncrease,
                    value: 0.1,
                },
                ModifyBuildingStat {
                    blueprint_id: "ArcologyCore".into(),
                    stat: StatKey::Other("life_support_efficiency_modifier".into()),
                    kind: PercentageIncrease,
                    value: 0.1,
                },
            ],
        });

        tree.add(Technology {
            id: "hab_t2_hydroponics".into(),
            display_name: "Elementary Hydroponics".into(),
            description: "Enables basic food cultivation.".into(),
            tier: 2,
            cost_rp: 700.0,
            prerequisites: vec!["hab_t1_water_ice_mining".into()],
            building_prerequisites: vec![("BasicHabitatModule".into(), 1)],
            cost_resources: vec![],
            effects: vec![
                UnlockBuilding { blueprint_id: "HydroponicsFarmMk1".into() },
                ModifyBuildingStat {
                    blueprint_id: "HydroponicsFarmMk1".into(),
                    stat: StatKey::production(Food),
                    kind: PercentageIncrease,
                    value: 0.05,
                },
            ],
        });

        tree.add(Technology {
            id: "hab_t2_improved_regolith_processing".into(),
            display_name: "Improved Regolith Processing".into(),
            description: "Raises the yield of regolith extractors.".into(),
            tier: 2,
            cost_rp: 450.0,
            prerequisites: vec!["hab_t1_regolith_extraction".into()],
            building_prerequisites: vec![],
            cost_resources: vec![],
            effects: vec![ModifyBuildingStat {
                blueprint_id: "RegolithExtractorMk1".into(),
                stat: StatKey::production(RegolithComposites),
                kind: PercentageIncrease,
                value: 0.15,
            }],
        });

        tree.add(Technology {
            id: "hab_t3_advanced_water_extraction".into(),
            display_name: "Advanced Water Extraction".into(),
            description: "Second-generation ice extractors and improved drills.".into(),
            tier: 3,
            cost_rp: 1800.0,
            prerequisites: vec!["hab_t1_water_ice_mining".into()],
            building_prerequisites: vec![("ResearchLab".into(), 1)],
            cost_resources: vec![],
            effects: vec![
                UnlockBuilding { blueprint_id: "WaterIceExtractorMk2".into() },
                ModifyBuildingStat {
                    blueprint_id: "WaterIceExtractorMk1".into(),
                    stat: StatKey::production(WaterIce),
                    kind: PercentageIncrease,
                    value: 0.1,
                },
            ],
        });

        // --- Energy ---
        tree.add(Technology {
            id: "energy_t1_power_distribution".into(),
            display_name: "Basic Power Distribution".into(),
            description: "Base technologies for energy distribution.".into(),
            tier: 1,
            cost_rp: 100.0,
            prerequisites: vec![],
            building_prerequisites: vec![],
            cost_resources: vec![],
            effects: vec![UnlockBuilding { blueprint_id: "SolarArrayMk1".into() }],
        });

        tree.add(Technology {
            id: "energy_t1_capacitor_tech".into(),
            display_name: "Basic Capacitor Technology".into(),
            description: "Improves grid stability and short-term storage.".into(),
            tier: 1,
            cost_rp: 180.0,
            prerequisites: vec!["energy_t1_power_distribution".into()],
            building_prerequisites: vec![],
            cost_resources: vec![],
            effects: vec![UnlockBuilding { blueprint_id: "BatteryBankMk1".into() }],
        });

        tree.add(Technology {
            id: "energy_t2_solar_efficiency".into(),
            display_name: "Improved Solar Efficiency".into(),
            description: "Unlocks Solar Array Mk2.".into(),
            tier: 2,
            cost_rp: 650.0,
            prerequisites: vec!["energy_t1_power_distribution".into()],
            building_prerequisites: vec![("ResearchLab".into(), 1)],
            cost_resources: vec![],
            effects: vec![
                UnlockBuilding { blueprint_id: "SolarArrayMk2".into() },
                ModifyBuildingStat {
                    blueprint_id: "SolarArrayMk1".into(),
                    stat: StatKey::production(Energy),
                    kind: PercentageIncrease,
                    value: 0.1,
                },
            ],
        });

        tree.add(Technology {
            id: "energy_t3_compact_fusion".into(),
            display_name: "Compact Fusion".into(),
            description: "Development of compact fusion reactors.".into(),
            tier: 3,
            cost_rp: 3500.0,
            prerequisites: vec!["energy_t2_solar_efficiency".into()],
            building_prerequisites: vec![("ResearchLab".into(), 3)],
            cost_resources: vec![(RareEarthElements, 250.0), (RegolithComposites, 500.0)],
            effects: vec![UnlockBuilding { blueprint_id: "CompactFusionReactorMk1".into() }],
        });

        tree.add(Technology {
            id: "energy_t3_helium3_prospecting".into(),
            display_name: "Helium-3 Prospecting".into(),
            description: "Techniques to locate and estimate helium-3 deposits.".into(),
            tier: 3,
            cost_rp: 2200.0,
            prerequisites: vec!["energy_t3_compact_fusion".into()],
            building_prerequisites: vec![],
            cost_resources: vec![],
            effects: vec![EnableAction {
                action: "ResourceProspecting:scan_for_helium3".into(),
            }],
        });

        tree.add(Technology {
            id: "energy_t5_antimatter_power_theory".into(),
            display_name: "Antimatter Power Theory".into(),
            description: "Theoretical research on antimatter containment for power.".into(),
            tier: 5,
            cost_rp: 75000.0,
            prerequisites: vec!["energy_t3_compact_fusion".into()],
            building_prerequisites: vec![],
            cost_resources: vec![(RareEarthElements, 2500.0)],
            effects: vec![UnlockResearchBranch { branch: "AntimatterTech".into() }],
        });

        // --- Exploration ---
        tree.add(Technology {
            id: "expl_t1_basic_rovers".into(),
            display_name: "Basic Rovers".into(),
            description: "Development of short-range exploration rovers.".into(),
            tier: 1,
            cost_rp: 120.0,
            prerequisites: vec![],
            building_prerequisites: vec![],
            cost_resources: vec![],
            effects: vec![UnlockUnit { unit_id: "ScoutRoverMk1".into() }],
        });

        // --- Biotech ---
        tree.add(Technology {
            id: "biotech_t2_waste_recycling".into(),
            display_name: "Biological Waste Recycling".into(),
            description: "Base technologies for recycling organic waste.".into(),
            tier: 2,
            cost_rp: 600.0,
            prerequisites: vec![
                "hab_t1_regolith_extraction".into(),
                "hab_t1_water_ice_mining".into(),
            ],
            building_prerequisites: vec![],
            cost_resources: vec![],
            effects: vec![UnlockBuilding { blueprint_id: "BioRecyclingPlant".into() }],
        });

        tree.add(Technology {
            id: "biotech_t2_genetic_crop_adaptation".into(),
            display_name: "Genetic Crop Adaptation".into(),
            description: "Genetically adapted crops with better yields.".into(),
            tier: 2,
            cost_rp: 800.0,
            prerequisites: vec!["hab_t2_hydroponics".into()],
            building_prerequisites: vec![("ResearchLab".into(), 1)],
            cost_resources: vec![],
            effects: vec![
                UnlockBuilding { blueprint_id: "AdvancedHydroponicsFarm".into() },
                ModifyBuildingStat {
                    blueprint_id: "HydroponicsFarmMk1".into(),
                    stat: StatKey::production(Food),
                    kind: PercentageIncrease,
                    value: 0.1,
                },
            ],
        });

        // --- Data & AI ---
        tree.add(Technology {
            id: "data_t1_computational_theory".into(),
            display_name: "Basic Computational Theory".into(),
            description: "Foundations for more complex software and hardware.".into(),
            tier: 1,
            cost_rp: 150.0,
            prerequisites: vec![],
            building_prerequisites: vec![("ResearchLab".into(), 1)],
            cost_resources: vec![],
            effects: vec![ModifyBuildingStat {
                blueprint_id: "ResearchLab".into(),
                stat: StatKey::Production(ProductionChannel::research("")),
                kind: PercentageIncrease,
                value: 0.05,
            }],
        });

        tree.add(Technology {
            id: "data_t2_ai_assisted_research".into(),
            display_name: "AI-Assisted Research".into(),
            description: "AI accelerates research in every laboratory.".into(),
            tier: 2,
            cost_rp: 700.0,
            prerequisites: vec!["data_t1_computational_theory".into()],
            building_prerequisites: vec![("ResearchLab".into(), 1)],
            cost_resources: vec![],
            effects: vec![ModifyGlobalStat {
                stat: StatKey::Production(ProductionChannel::research("")),
                kind: PercentageIncrease,
                value: 0.1,
            }],
        });

        tree.add(Technology {
            id: "data_t5_reality_simulation".into(),
            display_name: "Reality Simulation".into(),
            description: "Full-fidelity colony simulations for planning.".into(),
            tier: 5,
            cost_rp: 60000.0,
            prerequisites: vec!["data_t2_ai_assisted_research".into()],
            building_prerequisites: vec![],
            cost_resources: vec![],
            effects: vec![EnableFeature { feature: "RealitySimulation".into() }],
        });

        // --- Endgame ---
        tree.add(Technology {
            id: "final_t5_interstellar_colonization_protocol".into(),
            display_name: "Interstellar Colonization Protocol".into(),
            description: "The culmination of Martian research: preparation for \
                          interstellar travel."
                .into(),
            tier: 5,
            cost_rp: 100000.0,
            prerequisites: vec!["energy_t5_antimatter_power_theory".into()],
            building_prerequisites: vec![],
            cost_resources: vec![(RareEarthElements, 10000.0), (WaterIce, 50000.0)],
            effects: vec![
                EventTrigger { event: "InterstellarProgramLaunched".into() },
                WinConditionUnlock { condition: "InterstellarVictory".into() },
            ],
        });

        tree
    }
}
