//! Economy layer - resources, modifiers, blueprints, and building instances

pub mod blueprint;
pub mod building;
pub mod modifiers;
pub mod resources;

pub use blueprint::{Blueprint, BlueprintCatalog, BlueprintEffect, CatalogError};
pub use building::Building;
pub use modifiers::{ModifierKind, ModifierRegistry, ProductionChannel, StatKey};
pub use resources::{Resource, ResourceLedger, StorageCapacity};
