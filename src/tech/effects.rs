//! Technology effects and their application
//!
//! Effects are a closed sum type matched exhaustively, so an unhandled
//! effect kind is a compile error rather than a log line at runtime.
//! Modifier effects write into the habitat's registry; unlock effects
//! write into the player's [`UnlockState`]; event and win-condition
//! effects are recorded for the out-of-scope host systems.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::economy::modifiers::{ModifierKind, StatKey};
use crate::habitat::state::Habitat;

/// One declarative technology effect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TechEffect {
    /// Make a blueprint constructible
    UnlockBuilding { blueprint_id: String },
    /// Make a unit type available (unit system is an external collaborator)
    UnlockUnit { unit_id: String },
    /// Modify one stat of one building type
    ModifyBuildingStat {
        blueprint_id: String,
        stat: StatKey,
        kind: ModifierKind,
        value: f32,
    },
    /// Modify one stat habitat-wide
    ModifyGlobalStat { stat: StatKey, kind: ModifierKind, value: f32 },
    /// Enable a special action for the player
    EnableAction { action: String },
    /// Enable a game feature for the player
    EnableFeature { feature: String },
    /// Reveal a research branch
    UnlockResearchBranch { branch: String },
    /// Fire a named event (event system is an external collaborator)
    EventTrigger { event: String },
    /// Unlock a victory condition
    WinConditionUnlock { condition: String },
}

/// Everything a player has unlocked
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnlockState {
    pub technologies: AHashSet<String>,
    pub buildings: AHashSet<String>,
    pub units: AHashSet<String>,
    pub features: AHashSet<String>,
    pub actions: AHashSet<String>,
    pub research_branches: AHashSet<String>,
    pub win_conditions: AHashSet<String>,
}

/// Apply a technology's effects
///
/// Returns `true` if any habitat modifier changed, in which case the
/// caller must trigger a recalculation.
pub fn apply_tech_effects(
    effects: &[TechEffect],
    unlocks: &mut UnlockState,
    habitat: Option<&mut Habitat>,
) -> bool {
    let mut habitat = habitat;
    let mut modifiers_changed = false;

    for effect in effects {
        match effect {
            TechEffect::UnlockBuilding { blueprint_id } => {
                unlocks.buildings.insert(blueprint_id.clone());
                tracing::info!(blueprint_id = %blueprint_id, "building unlocked");
            }
            TechEffect::UnlockUnit { unit_id } => {
                unlocks.units.insert(unit_id.clone());
            }
            TechEffect::ModifyBuildingStat { blueprint_id, stat, kind, value } => {
                let Some(habitat) = habitat.as_deref_mut() else {
                    tracing::warn!(
                        blueprint_id = %blueprint_id,
                        "no habitat to receive building modifier, skipping"
                    );
                    continue;
                };
                match kind.factor(*value) {
                    Some(factor) => {
                        habitat
                            .modifiers
                            .apply_building(blueprint_id, stat.clone(), factor);
                        modifiers_changed = true;
                    }
                    None => tracing::debug!(
                        blueprint_id = %blueprint_id,
                        ?stat,
                        "flat building modifier has no multiplicative form, skipping"
                    ),
                }
            }
            TechEffect::ModifyGlobalStat { stat, kind, value } => {
                let Some(habitat) = habitat.as_deref_mut() else {
                    tracing::warn!(?stat, "no habitat to receive global modifier, skipping");
                    continue;
                };
                match kind.factor(*value) {
                    Some(factor) => {
                        habitat.modifiers.apply_global(stat.clone(), factor);
                        modifiers_changed = true;
                    }
                    None => tracing::debug!(
                        ?stat,
                        "flat global modifier has no multiplicative form, skipping"
                    ),
                }
            }
            TechEffect::EnableAction { action } => {
                unlocks.actions.insert(action.clone());
            }
            TechEffect::EnableFeature { feature } => {
                unlocks.features.insert(feature.clone());
            }
            TechEffect::UnlockResearchBranch { branch } => {
                unlocks.research_branches.insert(branch.clone());
            }
            TechEffect::EventTrigger { event } => {
                tracing::info!(event = %event, "event triggered");
            }
            TechEffect::WinConditionUnlock { condition } => {
                unlocks.win_conditions.insert(condition.clone());
            }
        }
    }

    modifiers_changed
}
