//! Character sheet, progression, and bonus acquisition

pub mod bonus;

pub use bonus::{
    BonusCatalog, BonusContext, BonusStat, BonusTarget, CharacterBonus, CharacterBonusEffect,
    ModifierKind,
};

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Attribute points spendable on top of the 1-per-attribute base at level 1
pub const SPENDABLE_ATTRIBUTE_POINTS_LVL1: u32 = 17;

const XP_PER_LEVEL_BASE: u64 = 1000;
const XP_PER_LEVEL_FACTOR: f32 = 1.5;
const ATTRIBUTE_POINTS_PER_LEVEL: u32 = 2;
const BONUS_POINTS_PER_N_LEVELS: u32 = 2;
const BONUS_POINTS_GAIN_AMOUNT: u32 = 1;
const ATTRIBUTE_MAX: u32 = 10;

/// The six character attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CharacterAttribute {
    Strength,
    Perception,
    Endurance,
    Charisma,
    Intelligence,
    Agility,
}

impl CharacterAttribute {
    pub const ALL: [CharacterAttribute; 6] = [
        CharacterAttribute::Strength,
        CharacterAttribute::Perception,
        CharacterAttribute::Endurance,
        CharacterAttribute::Charisma,
        CharacterAttribute::Intelligence,
        CharacterAttribute::Agility,
    ];
}

/// Result of trying to spend points or acquire a bonus
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceOutcome {
    Applied,
    InsufficientPoints,
    AttributeAtMax,
    BonusAlreadyActive,
    BonusNotFound,
}

impl AdvanceOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AdvanceOutcome::Applied)
    }
}

/// A playable colony leader
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub level: u32,
    pub xp: u64,
    pub xp_to_next_level: u64,
    pub attributes: AHashMap<CharacterAttribute, u32>,
    pub attribute_points_available: u32,
    pub bonus_points_available: u32,
    pub active_bonus_ids: Vec<String>,
}

impl Character {
    pub fn new(name: impl Into<String>, starting_bonus_id: Option<String>) -> Self {
        let mut attributes = AHashMap::new();
        for attr in CharacterAttribute::ALL {
            attributes.insert(attr, 1);
        }
        Self {
            name: name.into(),
            level: 1,
            xp: 0,
            xp_to_next_level: XP_PER_LEVEL_BASE,
            attributes,
            attribute_points_available: 0,
            bonus_points_available: 0,
            active_bonus_ids: starting_bonus_id.into_iter().collect(),
        }
    }

    /// Set initial attribute values (each within 1..=10)
    pub fn with_attributes(mut self, values: &[(CharacterAttribute, u32)]) -> Self {
        for &(attr, value) in values {
            if (1..=ATTRIBUTE_MAX).contains(&value) {
                self.attributes.insert(attr, value);
            } else {
                tracing::warn!(?attr, value, character = %self.name, "invalid attribute value");
            }
        }
        self
    }

    pub fn attribute(&self, attr: CharacterAttribute) -> u32 {
        self.attributes.get(&attr).copied().unwrap_or(1)
    }

    /// Points spent beyond the base of 1 per attribute
    pub fn attribute_points_spent(&self) -> u32 {
        self.attributes.values().map(|v| v - 1).sum()
    }

    /// Grant XP, levelling up as thresholds are crossed
    pub fn add_xp(&mut self, amount: u64) {
        if amount == 0 {
            return;
        }
        self.xp += amount;
        while self.xp >= self.xp_to_next_level {
            self.level_up();
        }
    }

    fn level_up(&mut self) {
        self.xp -= self.xp_to_next_level;
        self.level += 1;
        self.xp_to_next_level = (XP_PER_LEVEL_BASE as f32
            * XP_PER_LEVEL_FACTOR.powi(self.level as i32 - 1)) as u64;
        self.attribute_points_available += ATTRIBUTE_POINTS_PER_LEVEL;
        if self.level % BONUS_POINTS_PER_N_LEVELS == 0 {
            self.bonus_points_available += BONUS_POINTS_GAIN_AMOUNT;
        }
        tracing::info!(
            character = %self.name,
            level = self.level,
            "character levelled up"
        );
    }

    /// Spend one available attribute point on the given attribute
    pub fn spend_attribute_point(&mut self, attr: CharacterAttribute) -> AdvanceOutcome {
        if self.attribute_points_available < 1 {
            return AdvanceOutcome::InsufficientPoints;
        }
        let value = self.attributes.entry(attr).or_insert(1);
        if *value >= ATTRIBUTE_MAX {
            return AdvanceOutcome::AttributeAtMax;
        }
        *value += 1;
        self.attribute_points_available -= 1;
        AdvanceOutcome::Applied
    }

    /// Check whether a bonus can be acquired right now
    pub fn can_acquire_bonus(&self, bonus_id: &str, catalog: &BonusCatalog) -> AdvanceOutcome {
        if self.active_bonus_ids.iter().any(|id| id == bonus_id) {
            return AdvanceOutcome::BonusAlreadyActive;
        }
        let Some(bonus) = catalog.get(bonus_id) else {
            return AdvanceOutcome::BonusNotFound;
        };
        if self.bonus_points_available < bonus.cost_bp {
            return AdvanceOutcome::InsufficientPoints;
        }
        AdvanceOutcome::Applied
    }

    /// Acquire a bonus, spending bonus points
    pub fn acquire_bonus(&mut self, bonus_id: &str, catalog: &BonusCatalog) -> AdvanceOutcome {
        let gate = self.can_acquire_bonus(bonus_id, catalog);
        if !gate.is_success() {
            return gate;
        }
        let cost = catalog.get(bonus_id).map(|b| b.cost_bp).unwrap_or(0);
        self.bonus_points_available -= cost;
        self.active_bonus_ids.push(bonus_id.to_string());
        tracing::info!(character = %self.name, bonus_id, "bonus acquired");
        AdvanceOutcome::Applied
    }
}
