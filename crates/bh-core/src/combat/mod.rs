//! Turn-based combat
//!
//! The `CombatSession` alternates player turns (pick an action, watch it resolve)
//! with enemy turns (dodge a bullet storm). It owns the projectile engine, the
//! arena, the Death Defiance state, and the pre-combat snapshot of the player
//! used to roll back on retreat or defeat.

mod action;
mod bars;
mod defiance;
mod enemy;
mod player;
mod session;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::geometry::Rect;

pub use action::{ActionEffect, ItemId, PlayerAction, SkillId};
pub use bars::{CombatBars, StatBar};
pub use defiance::DeathDefiance;
pub use enemy::Enemy;
pub use player::{Buff, BuffStat, BuffTracker, Inventory, PlayerSnapshot, PlayerStats};
pub use session::{CombatSession, HitResolution};

/// Where the turn state machine currently is
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
pub enum TurnPhase {
    /// Dialogue box showing; skip advances it
    DialogueIdle,
    PlayerSelect,
    ItemMenu,
    SkillMenu,
    /// The chosen action is playing out
    AttackSequence,
    /// Waiting for the player to confirm before the enemy acts
    DelayedTransition,
    /// Bullet storm
    EnemyTurn,
    /// Storm cleared, holding before the turn ends
    EndPhaseDelay,
    /// The enemy has been defeated
    Defeated,
    /// Combat ended by retreat or the player's death
    Concluded,
}

impl TurnPhase {
    /// Phases in which the player may pick an action
    pub const fn accepts_actions(self) -> bool {
        matches!(self, TurnPhase::PlayerSelect | TurnPhase::ItemMenu | TurnPhase::SkillMenu)
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, TurnPhase::Defeated | TurnPhase::Concluded)
    }
}

/// How an encounter ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum CombatOutcome {
    Victory,
    Retreated,
    Lost,
}

/// Final deltas handed to the persistence layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatReport {
    pub outcome: CombatOutcome,
    pub hp: i32,
    pub mp: i32,
    pub gold_gained: u32,
    pub experience_gained: u32,
    /// Consumables deducted from the inventory, empty unless victorious
    pub consumables_used: Vec<(ItemId, u32)>,
    pub turns: u32,
    pub elapsed: f32,
}

/// Player-side input for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInput {
    pub player_hitbox: Rect,
    /// Dialogue-skip key pressed this frame
    pub skip_pressed: bool,
}

impl FrameInput {
    pub fn new(player_hitbox: Rect) -> Self {
        Self {
            player_hitbox,
            skip_pressed: false,
        }
    }

    pub fn with_skip(mut self) -> Self {
        self.skip_pressed = true;
        self
    }
}

/// What happened during one `advance`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    /// HP actually lost this frame
    pub damage_taken: i32,
    /// HP actually restored by healing bullets
    pub healed: i32,
    /// Hits blocked by immunity or Death Defiance
    pub hits_blocked: u32,
    pub batches_spawned: u32,
    pub death_defied: bool,
    /// Set when the phase changed this frame
    pub transition: Option<(TurnPhase, TurnPhase)>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_only_menu_phases_accept_actions() {
        let accepting: Vec<_> = TurnPhase::iter().filter(|p| p.accepts_actions()).collect();
        assert_eq!(
            accepting,
            vec![TurnPhase::PlayerSelect, TurnPhase::ItemMenu, TurnPhase::SkillMenu]
        );
    }

    #[test]
    fn test_terminal_phases() {
        assert!(TurnPhase::Defeated.is_terminal());
        assert!(TurnPhase::Concluded.is_terminal());
        assert!(!TurnPhase::EnemyTurn.is_terminal());
    }
}
