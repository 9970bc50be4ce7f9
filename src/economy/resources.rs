//! Resource enumeration and the habitat resource ledger
//!
//! Resources form a closed set used as map keys throughout the engine.
//! The ledger enforces the afford/spend protocol: spending is atomic and
//! adding clamps at storage capacity.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// A physical resource tracked by every habitat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resource {
    WaterIce,
    RegolithComposites,
    RareEarthElements,
    Energy,
    Food,
}

impl Resource {
    /// Every resource, in a fixed deterministic order
    pub const ALL: [Resource; 5] = [
        Resource::WaterIce,
        Resource::RegolithComposites,
        Resource::RareEarthElements,
        Resource::Energy,
        Resource::Food,
    ];

    /// Canonical identifier used in data files and modifier keys
    pub fn name(&self) -> &'static str {
        match self {
            Resource::WaterIce => "WATER_ICE",
            Resource::RegolithComposites => "REGOLITH_COMPOSITES",
            Resource::RareEarthElements => "RARE_EARTH_ELEMENTS",
            Resource::Energy => "ENERGY",
            Resource::Food => "FOOD",
        }
    }

    /// Human-readable name for reports and the UI layer
    pub fn display_name(&self) -> &'static str {
        match self {
            Resource::WaterIce => "Water Ice",
            Resource::RegolithComposites => "Regolith Composites",
            Resource::RareEarthElements => "Rare Earth Elements",
            Resource::Energy => "Energy",
            Resource::Food => "Food",
        }
    }

    /// Resolve a resource from its canonical or display name, case-insensitively
    pub fn parse(key: &str) -> Option<Resource> {
        let lowered = key.to_lowercase();
        Resource::ALL.iter().copied().find(|r| {
            r.name().to_lowercase() == lowered || r.display_name().to_lowercase() == lowered
        })
    }

    /// Default starting stock for a new habitat
    pub fn initial_amount(&self) -> f32 {
        match self {
            Resource::WaterIce => 250.0,
            Resource::RegolithComposites => 500.0,
            Resource::RareEarthElements => 50.0,
            Resource::Energy => 1000.0,
            Resource::Food => 150.0,
        }
    }

    /// Default storage capacity before building effects
    pub fn default_storage(&self) -> f32 {
        match self {
            Resource::WaterIce => 5000.0,
            Resource::RegolithComposites => 10000.0,
            Resource::RareEarthElements => 1000.0,
            Resource::Energy => 5000.0,
            Resource::Food => 2000.0,
        }
    }

    /// Non-building baseline production per tick
    ///
    /// Energy has a minimal trickle; everything else comes from buildings.
    pub fn base_production(&self) -> f32 {
        match self {
            Resource::Energy => 5.0,
            _ => 0.0,
        }
    }
}

/// Per-resource storage limits, rebuilt from scratch every recalculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageCapacity {
    caps: AHashMap<Resource, f32>,
}

impl StorageCapacity {
    /// Capacity table holding the default cap for every resource
    pub fn with_defaults() -> Self {
        let mut caps = AHashMap::new();
        for resource in Resource::ALL {
            caps.insert(resource, resource.default_storage());
        }
        Self { caps }
    }

    pub fn get(&self, resource: Resource) -> f32 {
        self.caps.get(&resource).copied().unwrap_or(0.0)
    }

    /// Raise the cap for a resource (building storage effects)
    pub fn grant(&mut self, resource: Resource, amount: f32) {
        *self.caps.entry(resource).or_insert(0.0) += amount;
    }
}

impl Default for StorageCapacity {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Resources currently stored by a habitat
///
/// Every resource always has an entry. Quantities are non-negative except
/// energy, which may go negative to signal a deficit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceLedger {
    amounts: AHashMap<Resource, f32>,
}

impl ResourceLedger {
    /// Empty ledger with every resource at zero
    pub fn new() -> Self {
        let mut amounts = AHashMap::new();
        for resource in Resource::ALL {
            amounts.insert(resource, 0.0);
        }
        Self { amounts }
    }

    /// Ledger seeded with the default starting amounts
    pub fn with_initial_amounts() -> Self {
        let mut ledger = Self::new();
        for resource in Resource::ALL {
            ledger.amounts.insert(resource, resource.initial_amount());
        }
        ledger
    }

    pub fn get(&self, resource: Resource) -> f32 {
        self.amounts.get(&resource).copied().unwrap_or(0.0)
    }

    /// Overwrite a stored quantity. Callers are responsible for clamping;
    /// the tick driver uses this after applying net production.
    pub fn set(&mut self, resource: Resource, amount: f32) {
        self.amounts.insert(resource, amount);
    }

    /// Check whether all costs can be met
    ///
    /// Returns `(true, empty)` iff nothing is short; otherwise the second
    /// element maps each short resource to its shortfall. Repeated entries
    /// for one resource are summed before the check.
    pub fn can_afford(&self, costs: &[(Resource, f32)]) -> (bool, Vec<(Resource, f32)>) {
        let mut required: AHashMap<Resource, f32> = AHashMap::new();
        for &(resource, amount) in costs {
            *required.entry(resource).or_insert(0.0) += amount;
        }

        let mut missing = Vec::new();
        for resource in Resource::ALL {
            let Some(&needed) = required.get(&resource) else {
                continue;
            };
            let available = self.get(resource);
            if available < needed {
                missing.push((resource, needed - available));
            }
        }
        (missing.is_empty(), missing)
    }

    /// Spend resources atomically: either every cost is debited or none is
    pub fn spend(&mut self, costs: &[(Resource, f32)]) -> bool {
        let (affordable, _) = self.can_afford(costs);
        if !affordable {
            return false;
        }
        for &(resource, amount) in costs {
            let current = self.get(resource);
            self.amounts.insert(resource, current - amount);
        }
        true
    }

    /// Add quantities, clamping each result at its storage capacity
    ///
    /// Negative amounts are rejected with a warning; debits must go
    /// through [`ResourceLedger::spend`].
    pub fn add(&mut self, amounts: &[(Resource, f32)], capacity: &StorageCapacity) {
        for &(resource, amount) in amounts {
            if amount < 0.0 {
                tracing::warn!(
                    resource = resource.name(),
                    amount,
                    "ignoring negative add; use spend for debits"
                );
                continue;
            }
            let current = self.get(resource);
            let new_amount = (current + amount).min(capacity.get(resource));
            self.amounts.insert(resource, new_amount);
        }
    }
}

impl Default for ResourceLedger {
    fn default() -> Self {
        Self::new()
    }
}
