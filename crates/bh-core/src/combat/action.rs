//! Player actions, skills, and consumable items

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use super::player::BuffStat;

/// What the player asked to do on their turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerAction {
    Attack,
    Skill(SkillId),
    Item(ItemId),
    Retreat,
}

/// Resolved effect of a skill or item
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ActionEffect {
    /// Strike the enemy with `multiplier` times normal damage
    Strike { multiplier: f32, ignore_defense: bool },
    /// Restore a percentage of max HP
    HealPercent(i32),
    /// Restore a flat amount of HP
    Heal(i32),
    RestoreMp(i32),
    Buff { stat: BuffStat, amount: i32, turns: u32 },
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
pub enum SkillId {
    #[strum(serialize = "Piercing Strike")]
    PiercingStrike,
    Mend,
    #[strum(serialize = "Iron Skin")]
    IronSkin,
}

impl SkillId {
    pub const fn mp_cost(self) -> i32 {
        match self {
            SkillId::PiercingStrike => 6,
            SkillId::Mend => 8,
            SkillId::IronSkin => 5,
        }
    }

    pub const fn effect(self) -> ActionEffect {
        match self {
            SkillId::PiercingStrike => ActionEffect::Strike {
                multiplier: 1.5,
                ignore_defense: true,
            },
            SkillId::Mend => ActionEffect::HealPercent(30),
            SkillId::IronSkin => ActionEffect::Buff {
                stat: BuffStat::Defense,
                amount: 6,
                turns: 2,
            },
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
pub enum ItemId {
    Tonic,
    Ether,
    Whetstone,
}

impl ItemId {
    pub const fn effect(self) -> ActionEffect {
        match self {
            ItemId::Tonic => ActionEffect::Heal(40),
            ItemId::Ether => ActionEffect::RestoreMp(25),
            ItemId::Whetstone => ActionEffect::Buff {
                stat: BuffStat::Attack,
                amount: 5,
                turns: 3,
            },
        }
    }
}
