//! Character bonuses - declarative effect records consumed by the
//! habitat recalculation engine
//!
//! A bonus is a catalog entry with a list of effects. Effects targeting
//! building types, habitat-global stats, or resource production feed the
//! economy; player-scope effects are opaque to the engine and recorded on
//! the player only.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::economy::modifiers::ProductionChannel;
use crate::economy::resources::Resource;

pub use crate::economy::modifiers::ModifierKind;

/// What a bonus effect targets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BonusTarget {
    /// Player-scope effect; opaque to the habitat engine
    Player,
    /// Habitat-wide effect
    HabitatGlobal,
    /// One building type, by blueprint id
    BuildingType(String),
    /// Gross production of one resource, habitat-wide
    ResourceProduction(Resource),
    /// One unit type; outside the economy engine
    UnitType(String),
}

/// Which stat a bonus effect modifies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BonusStat {
    /// Every production channel of the targeted building type
    ProductionOutput,
    /// One specific production channel
    Production(ProductionChannel),
    /// Energy drawn by the targeted building type
    EnergyConsumption,
    /// Energy drawn by all buildings (habitat-global)
    BuildingEnergyConsumption,
    /// Population capacity granted by the targeted building type
    PopulationCapacity,
    /// Colony morale
    Morale,
    /// Stats outside the economy engine (trade, discovery, policy, ...)
    Other(String),
}

/// One declarative bonus effect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterBonusEffect {
    pub target: BonusTarget,
    pub stat: BonusStat,
    pub kind: ModifierKind,
    pub value: f32,
}

impl CharacterBonusEffect {
    pub fn new(target: BonusTarget, stat: BonusStat, kind: ModifierKind, value: f32) -> Self {
        Self { target, stat, kind, value }
    }
}

/// A purchasable character bonus
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterBonus {
    pub id: String,
    pub display_name: String,
    pub description: String,
    pub tier: u8,
    pub cost_bp: u32,
    pub effects: Vec<CharacterBonusEffect>,
}

/// Catalog of every defined bonus
#[derive(Debug, Clone, Default)]
pub struct BonusCatalog {
    bonuses: AHashMap<String, CharacterBonus>,
    level1_ids: Vec<String>,
}

impl BonusCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, bonus: CharacterBonus) {
        if bonus.tier == 1 {
            self.level1_ids.push(bonus.id.clone());
        }
        self.bonuses.insert(bonus.id.clone(), bonus);
    }

    pub fn get(&self, id: &str) -> Option<&CharacterBonus> {
        self.bonuses.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.bonuses.contains_key(id)
    }

    /// Pick a random level-1 starting bonus
    pub fn random_level1<R: rand::Rng>(&self, rng: &mut R) -> Option<&CharacterBonus> {
        if self.level1_ids.is_empty() {
            return None;
        }
        let idx = rng.gen_range(0..self.level1_ids.len());
        self.get(&self.level1_ids[idx])
    }

    /// Load the built-in bonus set
    pub fn with_defaults() -> Self {
        use BonusStat::*;
        use BonusTarget::*;
        use ModifierKind::*;

        let mut catalog = Self::new();

        catalog.add(CharacterBonus {
            id: "l1_sharp_mind".into(),
            display_name: "Sharp Mind".into(),
            description: "+5% base research speed".into(),
            tier: 1,
            cost_bp: 2,
            effects: vec![CharacterBonusEffect::new(
                Player,
                Other("research_speed_modifier_all".into()),
                PercentageIncrease,
                0.05,
            )],
        });

        catalog.add(CharacterBonus {
            id: "l1_engineer_touch".into(),
            display_name: "Engineer's Touch".into(),
            description: "-5% regolith construction costs".into(),
            tier: 1,
            cost_bp: 2,
            effects: vec![CharacterBonusEffect::new(
                HabitatGlobal,
                Other("building_cost_modifier_REGOLITH_COMPOSITES".into()),
                PercentageDecrease,
                0.05,
            )],
        });

        catalog.add(CharacterBonus {
            id: "l1_hardy_colonist".into(),
            display_name: "Hardy Colonist".into(),
            description: "+5% population capacity from habitat modules".into(),
            tier: 1,
            cost_bp: 2,
            effects: vec![CharacterBonusEffect::new(
                BuildingType("BasicHabitatModule".into()),
                PopulationCapacity,
                PercentageIncrease,
                0.05,
            )],
        });

        catalog.add(CharacterBonus {
            id: "l1_silver_tongue".into(),
            display_name: "Silver Tongue".into(),
            description: "+5% base colony morale".into(),
            tier: 1,
            cost_bp: 2,
            effects: vec![CharacterBonusEffect::new(
                HabitatGlobal,
                Morale,
                FlatIncrease,
                0.05,
            )],
        });

        catalog.add(CharacterBonus {
            id: "l1_energy_saver".into(),
            display_name: "Energy Saver".into(),
            description: "-5% energy consumption of all buildings".into(),
            tier: 1,
            cost_bp: 2,
            effects: vec![CharacterBonusEffect::new(
                HabitatGlobal,
                BuildingEnergyConsumption,
                PercentageDecrease,
                0.05,
            )],
        });

        catalog.add(CharacterBonus {
            id: "l1_born_leader".into(),
            display_name: "Born Leader".into(),
            description: "+1 policy slot".into(),
            tier: 1,
            cost_bp: 2,
            effects: vec![CharacterBonusEffect::new(
                Player,
                Other("policy_slots".into()),
                FlatIncrease,
                1.0,
            )],
        });

        catalog.add(CharacterBonus {
            id: "l1_lucky_scout".into(),
            display_name: "Lucky Scout".into(),
            description: "+5% special resource discovery chance".into(),
            tier: 1,
            cost_bp: 2,
            effects: vec![CharacterBonusEffect::new(
                Player,
                Other("rare_resource_discovery_modifier".into()),
                PercentageIncrease,
                0.05,
            )],
        });

        catalog.add(CharacterBonus {
            id: "l1_thrifty_manager".into(),
            display_name: "Thrifty Manager".into(),
            description: "+3% trade efficiency".into(),
            tier: 1,
            cost_bp: 2,
            effects: vec![CharacterBonusEffect::new(
                Player,
                Other("trade_efficiency_modifier".into()),
                PercentageIncrease,
                0.03,
            )],
        });

        catalog.add(CharacterBonus {
            id: "l1_combat_veteran".into(),
            display_name: "Combat Veteran".into(),
            description: "+5% basic combat unit effectiveness".into(),
            tier: 1,
            cost_bp: 2,
            effects: vec![CharacterBonusEffect::new(
                UnitType("CombatRoverMk1".into()),
                Other("combat_strength_modifier".into()),
                PercentageIncrease,
                0.05,
            )],
        });

        catalog.add(CharacterBonus {
            id: "l1_resourceful_recycler".into(),
            display_name: "Resourceful Recycler".into(),
            description: "+10% recycling plant output".into(),
            tier: 1,
            cost_bp: 2,
            effects: vec![CharacterBonusEffect::new(
                BuildingType("BioRecyclingPlant".into()),
                ProductionOutput,
                PercentageIncrease,
                0.10,
            )],
        });

        catalog.add(CharacterBonus {
            id: "t2_master_builder".into(),
            display_name: "Master Builder".into(),
            description: "-10% construction costs, +5% construction speed".into(),
            tier: 2,
            cost_bp: 4,
            effects: vec![
                CharacterBonusEffect::new(
                    HabitatGlobal,
                    Other("building_cost_modifier_all".into()),
                    PercentageDecrease,
                    0.10,
                ),
                CharacterBonusEffect::new(
                    HabitatGlobal,
                    Other("construction_speed_modifier".into()),
                    PercentageIncrease,
                    0.05,
                ),
            ],
        });

        catalog.add(CharacterBonus {
            id: "t2_geologist_instinct".into(),
            display_name: "Geologist's Instinct".into(),
            description: "+10% regolith production colony-wide".into(),
            tier: 2,
            cost_bp: 4,
            effects: vec![CharacterBonusEffect::new(
                ResourceProduction(Resource::RegolithComposites),
                Production(ProductionChannel::Resource(Resource::RegolithComposites)),
                PercentageIncrease,
                0.10,
            )],
        });

        catalog.add(CharacterBonus {
            id: "t3_ai_synergy".into(),
            display_name: "AI Synergy".into(),
            description: "+5% global habitat efficiency with an active AI node".into(),
            tier: 3,
            cost_bp: 8,
            effects: vec![CharacterBonusEffect::new(
                Player,
                Other("ai_synergy_bonus".into()),
                PercentageIncrease,
                0.05,
            )],
        });

        catalog
    }
}

/// Active bonus effects grouped for one recalculation pass
///
/// Rebuilt from the bonus catalog every recalculation; bonus acquisition
/// is rare relative to recalculation, and reading fresh keeps the pass
/// correct without cache invalidation.
#[derive(Debug, Clone, Default)]
pub struct BonusContext {
    per_building: AHashMap<String, Vec<CharacterBonusEffect>>,
    global_energy_mods: Vec<f32>,
    resource_production_mods: AHashMap<Resource, Vec<f32>>,
}

impl BonusContext {
    /// Group the effects of the given active bonus ids
    pub fn collect<'a>(
        active_ids: impl IntoIterator<Item = &'a String>,
        catalog: &BonusCatalog,
    ) -> Self {
        let mut ctx = Self::default();
        for id in active_ids {
            let Some(bonus) = catalog.get(id) else {
                tracing::warn!(bonus_id = %id, "active bonus not in catalog, skipping");
                continue;
            };
            for effect in &bonus.effects {
                match &effect.target {
                    BonusTarget::BuildingType(blueprint_id) => {
                        ctx.per_building
                            .entry(blueprint_id.clone())
                            .or_default()
                            .push(effect.clone());
                    }
                    BonusTarget::HabitatGlobal => {
                        if effect.stat == BonusStat::BuildingEnergyConsumption {
                            ctx.global_energy_mods.push(effect.value);
                        }
                        // Morale and player-facing stats are applied
                        // outside the recalculation pass
                    }
                    BonusTarget::ResourceProduction(resource) => {
                        ctx.resource_production_mods
                            .entry(*resource)
                            .or_default()
                            .push(effect.value);
                    }
                    BonusTarget::Player | BonusTarget::UnitType(_) => {}
                }
            }
        }
        ctx
    }

    /// Effects targeting one building type
    pub fn building_effects(&self, blueprint_id: &str) -> &[CharacterBonusEffect] {
        self.per_building
            .get(blueprint_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Habitat-global building-energy-consumption modifier values
    pub fn global_energy_mods(&self) -> &[f32] {
        &self.global_energy_mods
    }

    /// Habitat-global production modifier values for one resource
    pub fn resource_production_mods(&self, resource: Resource) -> &[f32] {
        self.resource_production_mods
            .get(&resource)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
