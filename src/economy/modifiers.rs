//! Layered stat modifiers applied during habitat recalculation
//!
//! Modifiers are multiplicative factors keyed by a structured [`StatKey`]
//! and scoped either globally or to one building type. Factors compose by
//! multiplication as they are applied, so insertion order never changes
//! the result.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::economy::resources::Resource;

/// How a declarative effect modifies its stat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModifierKind {
    PercentageIncrease,
    PercentageDecrease,
    FlatIncrease,
}

impl ModifierKind {
    /// Multiplicative factor for a percentage effect of the given
    /// magnitude. Flat effects are not multiplicative; callers handle
    /// them separately.
    pub fn factor(&self, value: f32) -> Option<f32> {
        match self {
            ModifierKind::PercentageIncrease => Some(1.0 + value),
            ModifierKind::PercentageDecrease => Some(1.0 - value),
            ModifierKind::FlatIncrease => None,
        }
    }
}

/// A production or consumption target: a physical resource, or a named
/// abstract output such as a research-point track
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductionChannel {
    Resource(Resource),
    Named(String),
}

impl ProductionChannel {
    /// The channel for a research-point track ("Xeno", "Bio", ...).
    /// An empty track name is the generic ResearchPoints pool.
    pub fn research(track: &str) -> Self {
        if track.is_empty() {
            ProductionChannel::Named("ResearchPoints".to_string())
        } else {
            ProductionChannel::Named(format!("ResearchPoints_{track}"))
        }
    }

    /// Label used for report output and research-production map keys
    pub fn label(&self) -> String {
        match self {
            ProductionChannel::Resource(r) => r.name().to_string(),
            ProductionChannel::Named(name) => name.clone(),
        }
    }
}

/// Structured modifier key
///
/// Replaces composed strings like `"WATER_ICE_production_modifier"` so the
/// target channel never has to be recovered by string parsing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatKey {
    /// Production of one channel (resource or named output)
    Production(ProductionChannel),
    /// Generic production-rate scaling for a whole building type
    ProductionRate,
    /// Energy drawn by buildings
    EnergyConsumption,
    /// Non-energy resource drawn by buildings
    Consumption(Resource),
    /// Population-capacity grants from building effects
    PopulationCapacity,
    /// Per-capita upkeep draw (distinct from building consumption)
    Upkeep(Resource),
    /// Stats the numeric engine does not evaluate (unlock flags,
    /// construction speed, life-support efficiency, ...)
    Other(String),
}

impl StatKey {
    /// Production key for a plain resource channel
    pub fn production(resource: Resource) -> Self {
        StatKey::Production(ProductionChannel::Resource(resource))
    }
}

/// Multiplicative stat modifiers, scoped globally or per building type
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModifierRegistry {
    global: AHashMap<StatKey, f32>,
    per_building: AHashMap<String, AHashMap<StatKey, f32>>,
}

impl ModifierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Multiply a factor into the global table (missing entries are 1.0)
    pub fn apply_global(&mut self, key: StatKey, factor: f32) {
        let entry = self.global.entry(key).or_insert(1.0);
        *entry *= factor;
    }

    /// Multiply a factor into one building type's table
    pub fn apply_building(&mut self, blueprint_id: &str, key: StatKey, factor: f32) {
        let entry = self
            .per_building
            .entry(blueprint_id.to_string())
            .or_default()
            .entry(key)
            .or_insert(1.0);
        *entry *= factor;
    }

    /// Global factor for a stat (1.0 when never modified)
    pub fn global_factor(&self, key: &StatKey) -> f32 {
        self.global.get(key).copied().unwrap_or(1.0)
    }

    /// Building-type factor for a stat (1.0 when never modified)
    pub fn building_factor(&self, blueprint_id: &str, key: &StatKey) -> f32 {
        self.per_building
            .get(blueprint_id)
            .and_then(|mods| mods.get(key))
            .copied()
            .unwrap_or(1.0)
    }
}
