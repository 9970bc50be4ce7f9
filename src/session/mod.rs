//! Game session - the explicit context object hosting one single-player
//! game
//!
//! Owns the catalogs, the players, and the turn counter. Everything the
//! engine touches flows through this object; there is no global state.
//! Callers are responsible for serializing mutating calls against one
//! session (single-threaded model).

use ahash::AHashMap;

use crate::character::bonus::BonusCatalog;
use crate::character::Character;
use crate::core::config::EngineConfig;
use crate::core::error::{ColonyError, Result};
use crate::core::types::{PlayerId, Tick};
use crate::economy::blueprint::BlueprintCatalog;
use crate::faction::FactionCatalog;
use crate::habitat::state::Habitat;
use crate::habitat::tick::TickOutcome;
use crate::player::Player;
use crate::tech::tree::TechTree;

/// One hosted game
#[derive(Debug)]
pub struct GameSession {
    pub config: EngineConfig,
    pub blueprints: BlueprintCatalog,
    pub tech_tree: TechTree,
    pub factions: FactionCatalog,
    pub bonuses: BonusCatalog,
    players: AHashMap<PlayerId, Player>,
    player_order: Vec<PlayerId>,
    pub current_turn: Tick,
}

impl GameSession {
    /// Session with the built-in catalogs
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            blueprints: BlueprintCatalog::with_defaults(),
            tech_tree: TechTree::with_defaults(),
            factions: FactionCatalog::with_defaults(),
            bonuses: BonusCatalog::with_defaults(),
            players: AHashMap::new(),
            player_order: Vec::new(),
            current_turn: 0,
        }
    }

    /// Add a player and found their starting habitat
    pub fn add_player(
        &mut self,
        name: impl Into<String>,
        faction_id: &str,
        character: Character,
    ) -> Result<PlayerId> {
        let faction = self
            .factions
            .get(faction_id)
            .ok_or_else(|| ColonyError::UnknownFaction(faction_id.to_string()))?;

        let name = name.into();
        let mut player = Player::new(
            &name,
            faction,
            character,
            &self.tech_tree,
            &self.blueprints,
            &self.bonuses,
            &self.config,
        );

        let habitat_name = format!("{} Prime Base", faction.name);
        let habitat = Habitat::new(habitat_name, faction, &self.blueprints, &self.config);
        player.add_habitat(habitat);
        // Fold the character's starting bonuses into the initial stats
        player.refresh_habitats(&self.blueprints, &self.bonuses, &self.config);

        let id = player.id;
        self.players.insert(id, player);
        self.player_order.push(id);
        tracing::info!(player = %name, faction = %faction_id, "player joined session");
        Ok(id)
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(&id)
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.player_order.iter().filter_map(|id| self.players.get(id))
    }

    /// Advance the game by one turn, updating every player
    pub fn advance_turn(&mut self) -> Vec<(PlayerId, Vec<(crate::core::types::HabitatId, TickOutcome)>)> {
        self.current_turn += 1;
        let mut results = Vec::new();
        for id in &self.player_order {
            if let Some(player) = self.players.get_mut(id) {
                let outcomes = player.update(
                    &self.tech_tree,
                    &self.blueprints,
                    &self.bonuses,
                    &self.config,
                    1.0,
                );
                results.push((*id, outcomes));
            }
        }
        tracing::debug!(turn = self.current_turn, "turn advanced");
        results
    }

    /// Construct a building in a player's primary habitat
    pub fn build(
        &mut self,
        player_id: PlayerId,
        blueprint_id: &str,
    ) -> Result<crate::habitat::actions::BuildOutcome> {
        let player = self
            .players
            .get_mut(&player_id)
            .ok_or(ColonyError::PlayerNotFound(player_id))?;
        let habitat_id = player
            .primary_habitat_id()
            .ok_or_else(|| ColonyError::HabitatNotFound("primary".into()))?;
        player.action_build(
            habitat_id,
            blueprint_id,
            &self.blueprints,
            &self.bonuses,
            &self.config,
        )
    }

    /// Upgrade a building in a player's primary habitat
    pub fn upgrade(
        &mut self,
        player_id: PlayerId,
        blueprint_id: &str,
    ) -> Result<crate::habitat::actions::UpgradeOutcome> {
        let player = self
            .players
            .get_mut(&player_id)
            .ok_or(ColonyError::PlayerNotFound(player_id))?;
        let habitat_id = player
            .primary_habitat_id()
            .ok_or_else(|| ColonyError::HabitatNotFound("primary".into()))?;
        player.action_upgrade(
            habitat_id,
            blueprint_id,
            &self.blueprints,
            &self.bonuses,
            &self.config,
        )
    }

    /// Start a research project for a player
    pub fn start_research(
        &mut self,
        player_id: PlayerId,
        tech_id: &str,
    ) -> Result<crate::tech::tree::ResearchGate> {
        let player = self
            .players
            .get_mut(&player_id)
            .ok_or(ColonyError::PlayerNotFound(player_id))?;
        Ok(player.start_research(tech_id, &self.tech_tree))
    }

    /// Status report for a player's primary habitat
    pub fn status_report(&self, player_id: PlayerId) -> Result<String> {
        let player = self
            .players
            .get(&player_id)
            .ok_or(ColonyError::PlayerNotFound(player_id))?;
        let habitat = player
            .primary_habitat()
            .ok_or_else(|| ColonyError::HabitatNotFound("primary".into()))?;

        let mut report = habitat.status_report();
        if let Some(project) = &player.current_research {
            let cost = self
                .tech_tree
                .get(&project.tech_id)
                .map(|t| t.cost_rp)
                .unwrap_or(0.0);
            report += &format!(
                "Researching: {} ({:.0}/{:.0} RP)\n",
                project.tech_id, project.progress_rp, cost
            );
        }
        Ok(report)
    }
}
