//! Technology layer - research tree, declarative effects, and unlock state

pub mod effects;
pub mod tree;

pub use effects::{apply_tech_effects, TechEffect, UnlockState};
pub use tree::{ResearchGate, TechTree, Technology};
