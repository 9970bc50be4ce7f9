//! Building instances - leveled copies of a blueprint owned by a habitat

use serde::{Deserialize, Serialize};

use crate::economy::blueprint::BlueprintCatalog;
use crate::economy::resources::Resource;

/// One constructed building
///
/// Level 0 is a placeholder state; such buildings are excluded from every
/// aggregation pass. Level is the only field that mutates after
/// construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    pub blueprint_id: String,
    pub level: u32,
}

impl Building {
    pub fn new(blueprint_id: impl Into<String>, level: u32) -> Self {
        Self { blueprint_id: blueprint_id.into(), level }
    }

    /// Whether this building participates in aggregation
    pub fn is_active(&self) -> bool {
        self.level >= 1
    }

    /// Cost of the next level: `ceil(base * (level + 1))` per resource
    ///
    /// Empty when the building is not yet built or its blueprint has no
    /// cost schedule.
    pub fn upgrade_cost(&self, catalog: &BlueprintCatalog) -> Vec<(Resource, f32)> {
        if self.level < 1 {
            return Vec::new();
        }
        let Some(blueprint) = catalog.get(&self.blueprint_id) else {
            return Vec::new();
        };
        let factor = (self.level + 1) as f32;
        blueprint
            .cost
            .iter()
            .map(|&(resource, base)| (resource, (base * factor).ceil()))
            .collect()
    }
}
