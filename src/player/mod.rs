//! Player aggregate - habitats, unlock state, and the research pipeline

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::character::bonus::{BonusCatalog, BonusContext};
use crate::character::Character;
use crate::core::config::EngineConfig;
use crate::core::error::ColonyError;
use crate::core::types::{HabitatId, PlayerId};
use crate::economy::blueprint::BlueprintCatalog;
use crate::faction::Faction;
use crate::habitat::actions::{build_building, upgrade_building, BuildOutcome, UpgradeOutcome};
use crate::habitat::recalc::recalculate_stats;
use crate::habitat::state::Habitat;
use crate::habitat::tick::{advance_tick, TickOutcome};
use crate::tech::effects::{apply_tech_effects, UnlockState};
use crate::tech::tree::{ResearchGate, TechTree};

/// Research in progress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchProject {
    pub tech_id: String,
    pub progress_rp: f32,
}

/// One player: a faction, a character, habitats, and unlocks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub faction_id: String,
    pub character: Character,
    pub habitats: AHashMap<HabitatId, Habitat>,
    habitat_order: Vec<HabitatId>,
    next_habitat_id: u32,
    pub unlocks: UnlockState,
    pub current_research: Option<ResearchProject>,
}

impl Player {
    /// Create a player and apply the faction's starting unlocks
    ///
    /// Faction starting techs are unlocked free of prerequisites and
    /// cost; their modifier effects land once a habitat exists. Faction
    /// initial buildings count as unlocked for construction purposes.
    pub fn new(
        name: impl Into<String>,
        faction: &Faction,
        character: Character,
        tree: &TechTree,
        catalog: &BlueprintCatalog,
        bonus_catalog: &BonusCatalog,
        config: &EngineConfig,
    ) -> Self {
        let mut player = Self {
            id: PlayerId::new(),
            name: name.into(),
            faction_id: faction.id.clone(),
            character,
            habitats: AHashMap::new(),
            habitat_order: Vec::new(),
            next_habitat_id: 1,
            unlocks: UnlockState::default(),
            current_research: None,
        };

        for blueprint_id in &faction.initial_buildings {
            player.unlocks.buildings.insert(blueprint_id.clone());
        }

        for tech_id in &faction.initial_tech {
            if tree.contains(tech_id) {
                player.unlock_technology(tech_id, tree, catalog, bonus_catalog, config);
            } else {
                tracing::warn!(tech_id = %tech_id, "faction starting tech not in tree");
            }
        }

        tracing::info!(player = %player.name, faction = %faction.id, "player initialized");
        player
    }

    /// Take ownership of a habitat, returning its id
    pub fn add_habitat(&mut self, habitat: Habitat) -> HabitatId {
        let id = HabitatId(self.next_habitat_id);
        self.next_habitat_id += 1;
        self.habitats.insert(id, habitat);
        self.habitat_order.push(id);
        id
    }

    pub fn habitat(&self, id: HabitatId) -> Option<&Habitat> {
        self.habitats.get(&id)
    }

    /// The player's first habitat
    pub fn primary_habitat(&self) -> Option<&Habitat> {
        self.habitat_order.first().and_then(|id| self.habitats.get(id))
    }

    pub fn primary_habitat_id(&self) -> Option<HabitatId> {
        self.habitat_order.first().copied()
    }

    pub fn primary_habitat_mut(&mut self) -> Option<&mut Habitat> {
        self.habitat_order
            .first()
            .and_then(|id| self.habitats.get_mut(id))
    }

    /// Group this player's active character-bonus effects for one pass
    pub fn bonus_context(&self, bonus_catalog: &BonusCatalog) -> BonusContext {
        BonusContext::collect(&self.character.active_bonus_ids, bonus_catalog)
    }

    /// Recalculate every habitat (after bonus acquisition or similar
    /// out-of-band modifier changes)
    pub fn refresh_habitats(
        &mut self,
        catalog: &BlueprintCatalog,
        bonus_catalog: &BonusCatalog,
        config: &EngineConfig,
    ) {
        let bonuses = BonusContext::collect(&self.character.active_bonus_ids, bonus_catalog);
        for habitat in self.habitats.values_mut() {
            recalculate_stats(habitat, catalog, &bonuses, config);
        }
    }

    /// Total research-point production per track across all habitats
    pub fn total_research_production(&self) -> AHashMap<String, f32> {
        let mut totals: AHashMap<String, f32> = AHashMap::new();
        for habitat in self.habitats.values() {
            for (track, amount) in &habitat.research_points_production {
                *totals.entry(track.clone()).or_insert(0.0) += amount;
            }
        }
        totals
    }

    /// Gate check for a research project
    pub fn can_research(&self, tech_id: &str, tree: &TechTree) -> ResearchGate {
        let Some(habitat) = self.primary_habitat() else {
            return ResearchGate::UnknownTechnology { tech_id: tech_id.to_string() };
        };
        tree.can_research(tech_id, &self.unlocks, habitat)
    }

    /// Start researching, spending the resource cost from the primary
    /// habitat
    pub fn start_research(&mut self, tech_id: &str, tree: &TechTree) -> ResearchGate {
        let gate = self.can_research(tech_id, tree);
        if !gate.is_available() {
            return gate;
        }
        let tech = tree.get(tech_id).expect("gated above");

        if !tech.cost_resources.is_empty() {
            let Some(habitat) = self.primary_habitat_mut() else {
                return ResearchGate::UnknownTechnology { tech_id: tech_id.to_string() };
            };
            if !habitat.spend_resources(&tech.cost_resources) {
                let (_, missing) = habitat.can_afford(&tech.cost_resources);
                return ResearchGate::InsufficientResources { missing };
            }
        }

        self.current_research = Some(ResearchProject {
            tech_id: tech_id.to_string(),
            progress_rp: 0.0,
        });
        tracing::info!(player = %self.name, tech_id, "research started");
        ResearchGate::Available
    }

    /// Advance the current research project by this tick's research output
    pub fn update_research(
        &mut self,
        tree: &TechTree,
        catalog: &BlueprintCatalog,
        bonus_catalog: &BonusCatalog,
        config: &EngineConfig,
    ) {
        let Some(project) = &self.current_research else {
            return;
        };
        let Some(tech) = tree.get(&project.tech_id) else {
            tracing::error!(
                tech_id = %project.tech_id,
                "current research project not in tree, resetting"
            );
            self.current_research = None;
            return;
        };
        let cost_rp = tech.cost_rp;

        let produced = self
            .total_research_production()
            .get("ResearchPoints")
            .copied()
            .unwrap_or(0.0);
        if produced <= 0.0 {
            return;
        }

        let project = self.current_research.as_mut().expect("checked above");
        project.progress_rp += produced;
        if project.progress_rp >= cost_rp {
            let completed = project.tech_id.clone();
            self.current_research = None;
            tracing::info!(player = %self.name, tech_id = %completed, "research complete");
            self.unlock_technology(&completed, tree, catalog, bonus_catalog, config);
        }
    }

    /// Add a tech to the unlocked set and apply its effects
    pub fn unlock_technology(
        &mut self,
        tech_id: &str,
        tree: &TechTree,
        catalog: &BlueprintCatalog,
        bonus_catalog: &BonusCatalog,
        config: &EngineConfig,
    ) {
        let Some(tech) = tree.get(tech_id) else {
            tracing::error!(tech_id, "attempted to unlock non-existent tech");
            return;
        };
        if self.unlocks.technologies.contains(tech_id) {
            tracing::debug!(tech_id, "tech already unlocked");
            return;
        }
        self.unlocks.technologies.insert(tech_id.to_string());

        let primary = self
            .habitat_order
            .first()
            .and_then(|id| self.habitats.get_mut(id));
        let modifiers_changed = apply_tech_effects(&tech.effects, &mut self.unlocks, primary);

        if modifiers_changed {
            let bonuses =
                BonusContext::collect(&self.character.active_bonus_ids, bonus_catalog);
            if let Some(habitat) = self
                .habitat_order
                .first()
                .and_then(|id| self.habitats.get_mut(id))
            {
                recalculate_stats(habitat, catalog, &bonuses, config);
            }
        }
    }

    /// Acquire a character bonus and propagate it into habitat stats
    pub fn acquire_character_bonus(
        &mut self,
        bonus_id: &str,
        catalog: &BlueprintCatalog,
        bonus_catalog: &BonusCatalog,
        config: &EngineConfig,
    ) -> crate::character::AdvanceOutcome {
        let outcome = self.character.acquire_bonus(bonus_id, bonus_catalog);
        if outcome.is_success() {
            self.refresh_habitats(catalog, bonus_catalog, config);
        }
        outcome
    }

    /// Construct a building in one of this player's habitats
    pub fn action_build(
        &mut self,
        habitat_id: HabitatId,
        blueprint_id: &str,
        catalog: &BlueprintCatalog,
        bonus_catalog: &BonusCatalog,
        config: &EngineConfig,
    ) -> Result<BuildOutcome, ColonyError> {
        let bonuses = BonusContext::collect(&self.character.active_bonus_ids, bonus_catalog);
        let habitat = self
            .habitats
            .get_mut(&habitat_id)
            .ok_or_else(|| ColonyError::HabitatNotFound(format!("{habitat_id:?}")))?;
        Ok(build_building(
            habitat,
            blueprint_id,
            &self.unlocks.buildings,
            catalog,
            &bonuses,
            config,
        ))
    }

    /// Upgrade a building in one of this player's habitats
    pub fn action_upgrade(
        &mut self,
        habitat_id: HabitatId,
        blueprint_id: &str,
        catalog: &BlueprintCatalog,
        bonus_catalog: &BonusCatalog,
        config: &EngineConfig,
    ) -> Result<UpgradeOutcome, ColonyError> {
        let bonuses = BonusContext::collect(&self.character.active_bonus_ids, bonus_catalog);
        let habitat = self
            .habitats
            .get_mut(&habitat_id)
            .ok_or_else(|| ColonyError::HabitatNotFound(format!("{habitat_id:?}")))?;
        Ok(upgrade_building(habitat, blueprint_id, catalog, &bonuses, config))
    }

    /// Per-tick update: habitats first, then research progress
    pub fn update(
        &mut self,
        tree: &TechTree,
        catalog: &BlueprintCatalog,
        bonus_catalog: &BonusCatalog,
        config: &EngineConfig,
        time_delta: f32,
    ) -> Vec<(HabitatId, TickOutcome)> {
        let bonuses = BonusContext::collect(&self.character.active_bonus_ids, bonus_catalog);
        let mut outcomes = Vec::new();
        for id in &self.habitat_order {
            if let Some(habitat) = self.habitats.get_mut(id) {
                let outcome = advance_tick(habitat, catalog, &bonuses, config, time_delta);
                outcomes.push((*id, outcome));
            }
        }
        self.update_research(tree, catalog, bonus_catalog, config);
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::faction::FactionCatalog;

    struct Fixture {
        player: Player,
        tree: TechTree,
        catalog: BlueprintCatalog,
        bonus_catalog: BonusCatalog,
        config: EngineConfig,
    }

    fn fixture(faction_id: &str, bonus_id: Option<&str>) -> Fixture {
        let factions = FactionCatalog::with_defaults();
        let faction = factions.get(faction_id).unwrap();
        let tree = TechTree::with_defaults();
        let catalog = BlueprintCatalog::with_defaults();
        let bonus_catalog = BonusCatalog::with_defaults();
        let config = EngineConfig::default();

        let character = Character::new("Test Leader", bonus_id.map(str::to_string));
        let mut player = Player::new(
            "Tester",
            faction,
            character,
            &tree,
            &catalog,
            &bonus_catalog,
            &config,
        );
        let habitat = Habitat::new("Prime Base", faction, &catalog, &config);
        player.add_habitat(habitat);
        player.refresh_habitats(&catalog, &bonus_catalog, &config);

        Fixture { player, tree, catalog, bonus_catalog, config }
    }

    #[test]
    fn test_faction_initial_tech_unlocked() {
        let f = fixture("EURASIAN_ALLIANCE", None);
        assert!(f
            .player
            .unlocks
            .technologies
            .contains("hab_t1_regolith_extraction"));
        assert!(f.player.unlocks.buildings.contains("RegolithExtractorMk1"));
    }

    #[test]
    fn test_research_pipeline_completes() {
        let mut f = fixture("INDO_PACIFIC_BLOCK", None);
        // ResearchLab level 1 from faction: 10 RP/tick

        let gate = f.player.start_research("hab_t1_basic_shelters", &f.tree);
        assert!(gate.is_available());
        assert!(f.player.current_research.is_some());

        // 100 RP at 10/tick: 10 ticks
        for _ in 0..10 {
            f.player
                .update(&f.tree, &f.catalog, &f.bonus_catalog, &f.config, 1.0);
        }
        assert!(f.player.current_research.is_none());
        assert!(f
            .player
            .unlocks
            .technologies
            .contains("hab_t1_basic_shelters"));
    }

    #[test]
    fn test_research_modifier_applies_to_habitat() {
        let mut f = fixture("NEW_ISRAEL", None);
        let habitat_id = *f.player.habitats.keys().next().unwrap();
        f.player
            .habitats
            .get_mut(&habitat_id)
            .unwrap()
            .resources
            .set(crate::economy::resources::Resource::RareEarthElements, 200.0);
        let outcome = f
            .player
            .action_build(habitat_id, "ResearchLab", &f.catalog, &f.bonus_catalog, &f.config)
            .unwrap();
        assert!(outcome.is_success());
        let rp_before = f.player.total_research_production()["ResearchPoints"];

        f.player.unlock_technology(
            "data_t1_computational_theory",
            &f.tree,
            &f.catalog,
            &f.bonus_catalog,
            &f.config,
        );
        let rp_after = f.player.total_research_production()["ResearchPoints"];
        assert!((rp_after - rp_before * 1.05).abs() < 1e-4);
    }

    #[test]
    fn test_unlock_is_idempotent() {
        let mut f = fixture("INDO_PACIFIC_BLOCK", None);
        f.player.unlock_technology(
            "data_t2_ai_assisted_research",
            &f.tree,
            &f.catalog,
            &f.bonus_catalog,
            &f.config,
        );
        let rp_once = f.player.total_research_production()["ResearchPoints"];

        // Unlocking again must not re-apply the modifier
        f.player.unlock_technology(
            "data_t2_ai_assisted_research",
            &f.tree,
            &f.catalog,
            &f.bonus_catalog,
            &f.config,
        );
        let rp_twice = f.player.total_research_production()["ResearchPoints"];
        assert_eq!(rp_once, rp_twice);
    }

    #[test]
    fn test_build_through_player() {
        let mut f = fixture("EURASIAN_ALLIANCE", None);
        let habitat_id = *f.player.habitats.keys().next().unwrap();

        let outcome = f
            .player
            .action_build(
                habitat_id,
                "WaterIceExtractorMk1",
                &f.catalog,
                &f.bonus_catalog,
                &f.config,
            )
            .unwrap();
        assert!(outcome.is_success());
        assert!(f
            .player
            .habitat(habitat_id)
            .unwrap()
            .building("WaterIceExtractorMk1")
            .is_some());
    }

    #[test]
    fn test_character_bonus_acquisition_refreshes_stats() {
        let mut f = fixture("EURASIAN_ALLIANCE", None);
        f.player.character.bonus_points_available = 2;

        let pop_before = f.player.primary_habitat().unwrap().max_population;
        let outcome = f.player.acquire_character_bonus(
            "l1_hardy_colonist",
            &f.catalog,
            &f.bonus_catalog,
            &f.config,
        );
        assert!(outcome.is_success());
        let pop_after = f.player.primary_habitat().unwrap().max_population;
        // +5% on the base module's 50
        assert!((pop_after - pop_before * 1.05).abs() < 1e-3);
    }

    #[test]
    fn test_starting_bonus_active_from_fixture() {
        let f = fixture("EURASIAN_ALLIANCE", Some("l1_hardy_colonist"));
        assert!((f.player.primary_habitat().unwrap().max_population - 52.5).abs() < 1e-3);
    }
}
