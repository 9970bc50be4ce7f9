//! Habitat layer - the aggregate root of the colony economy
//!
//! A habitat owns its resource ledger, buildings, and modifier registry.
//! The recalculation engine rebuilds net production, storage capacity, and
//! population capacity from scratch; the tick driver applies them to
//! stored quantities and grows the population.

pub mod actions;
pub mod recalc;
pub mod state;
pub mod tick;

pub use actions::{build_building, upgrade_building, BuildOutcome, UpgradeOutcome};
pub use recalc::recalculate_stats;
pub use state::Habitat;
pub use tick::{advance_tick, TickOutcome};
