//! Attack pattern generation
//!
//! A pattern strategy turns an enemy context and the arena bounds into a batch
//! of projectile specs. Each strategy cycles through its own phases, one step
//! per `generate` call, and keeps a smoothed estimate of player velocity for
//! predictive aiming. The `PatternManager` hands strategies out shuffle-bag
//! style, one per enemy turn.

mod cage;
mod manager;
mod mending;
mod needle;
pub mod placement;
mod spiral;
mod tracker;
mod weave;

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{ATTACK_MODIFIER_SCALE, MIN_HIT_DAMAGE};
use crate::geometry::ArenaBounds;
use crate::projectile::ProjectileSpec;
use crate::rng::GameRng;

pub use cage::ThreadCage;
pub use manager::PatternManager;
pub use mending::MendingSeeds;
pub use needle::NeedleBarrage;
pub use spiral::SpiralBurst;
pub use tracker::PlayerTracker;
pub use weave::WeavingGrid;

/// Static tuning of one pattern
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatternConfig {
    pub damage_min: f32,
    pub damage_max: f32,
    pub speed_multiplier: f32,
    /// Pause after the last bullet clears before the enemy turn ends
    pub end_phase_delay: f32,
    /// Arena size this pattern is designed for
    pub arena: ArenaBounds,
    /// Healing patterns emit negative-damage bullets
    pub healing: bool,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            damage_min: 3.0,
            damage_max: 6.0,
            speed_multiplier: 1.0,
            end_phase_delay: 1.0,
            arena: ArenaBounds::default(),
            healing: false,
        }
    }
}

/// What the enemy exposes to its patterns each frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyContext {
    /// Last known player hitbox center
    pub player_position: Vec2,
    pub enemy_position: Vec2,
    pub attack_modifier: f32,
    pub arena: ArenaBounds,
    pub max_bullets: u32,
    pub attack_interval: f32,
    pub pattern: Option<PatternConfig>,
}

/// Mutable cycle data owned by one strategy instance
#[derive(Debug, Clone, PartialEq)]
pub struct PatternState {
    pub phase: usize,
    pub phase_count: usize,
    /// Number of batches generated so far, never reset
    pub spawn_cycle: u64,
    pub tracker: PlayerTracker,
}

impl PatternState {
    pub fn new(phase_count: usize) -> Self {
        Self {
            phase: 0,
            phase_count: phase_count.max(1),
            spawn_cycle: 0,
            tracker: PlayerTracker::default(),
        }
    }

    /// Phase to use for this call; moves the cycle on by one
    pub fn next_phase(&mut self) -> usize {
        let current = self.phase;
        self.phase = (self.phase + 1) % self.phase_count;
        self.spawn_cycle += 1;
        current
    }
}

/// One attack pattern
pub trait PatternStrategy: fmt::Debug {
    fn name(&self) -> &'static str;

    fn config(&self) -> &PatternConfig;

    fn state(&self) -> &PatternState;

    fn state_mut(&mut self) -> &mut PatternState;

    /// Produce the next batch of projectile specs
    fn generate(
        &mut self,
        ctx: &EnemyContext,
        arena: &ArenaBounds,
        rng: &mut GameRng,
    ) -> Vec<ProjectileSpec>;

    /// Feed the player's position once per simulated frame
    fn observe(&mut self, player_position: Vec2) {
        self.state_mut().tracker.observe(player_position);
    }
}

/// `uniform(min, max) * (1 + modifier * 0.1)`, negated for healing patterns
///
/// The rounded magnitude never drops below `MIN_HIT_DAMAGE`, so a weak
/// enemy (negative modifier) still fires bullets that hurt or heal.
pub fn roll_damage(config: &PatternConfig, ctx: &EnemyContext, rng: &mut GameRng) -> i32 {
    let base = rng.range_f32(config.damage_min, config.damage_max);
    let scaled = base * (1.0 + ctx.attack_modifier * ATTACK_MODIFIER_SCALE);
    let amount = (scaled.round() as i32).max(MIN_HIT_DAMAGE);
    if config.healing { -amount } else { amount }
}

/// Attack damage regardless of the pattern's healing flag
pub fn roll_attack_damage(config: &PatternConfig, ctx: &EnemyContext, rng: &mut GameRng) -> i32 {
    roll_damage(&PatternConfig { healing: false, ..*config }, ctx, rng)
}

/// Scale a base speed by the pattern's multiplier
pub fn pattern_speed(config: &PatternConfig, base: f32) -> f32 {
    base * config.speed_multiplier
}

/// Every built-in strategy, in a fixed order
pub fn standard_patterns() -> Vec<Box<dyn PatternStrategy>> {
    vec![
        Box::new(NeedleBarrage::new()),
        Box::new(ThreadCage::new()),
        Box::new(WeavingGrid::new()),
        Box::new(SpiralBurst::new()),
        Box::new(MendingSeeds::new()),
    ]
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn context(arena: ArenaBounds) -> EnemyContext {
        EnemyContext {
            player_position: arena.center() + Vec2::new(0.0, arena.height * 0.25),
            enemy_position: Vec2::new(arena.width * 0.5, 30.0),
            attack_modifier: 0.0,
            arena,
            max_bullets: 3,
            attack_interval: 0.5,
            pattern: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_cycles() {
        let mut state = PatternState::new(3);
        let phases: Vec<_> = (0..7).map(|_| state.next_phase()).collect();
        assert_eq!(phases, vec![0, 1, 2, 0, 1, 2, 0]);
        assert_eq!(state.spawn_cycle, 7);
    }

    #[test]
    fn test_damage_scaling_with_modifier() {
        let config = PatternConfig {
            damage_min: 10.0,
            damage_max: 10.0,
            ..PatternConfig::default()
        };
        let mut ctx = test_support::context(ArenaBounds::default());
        ctx.attack_modifier = 5.0;
        let mut rng = GameRng::new(1);
        // 10 * (1 + 5 * 0.1)
        assert_eq!(roll_damage(&config, &ctx, &mut rng), 15);
    }

    #[test]
    fn test_weak_enemy_still_deals_minimum_damage() {
        let config = PatternConfig {
            damage_min: 10.0,
            damage_max: 10.0,
            ..PatternConfig::default()
        };
        let mut ctx = test_support::context(ArenaBounds::default());
        ctx.attack_modifier = -20.0;
        let mut rng = GameRng::new(1);
        assert_eq!(roll_damage(&config, &ctx, &mut rng), MIN_HIT_DAMAGE);
    }

    #[test]
    fn test_damage_within_range() {
        let config = PatternConfig {
            damage_min: 4.0,
            damage_max: 7.0,
            ..PatternConfig::default()
        };
        let ctx = test_support::context(ArenaBounds::default());
        let mut rng = GameRng::new(2);
        for _ in 0..200 {
            let d = roll_damage(&config, &ctx, &mut rng);
            assert!((4..=7).contains(&d));
        }
    }

    #[test]
    fn test_healing_damage_is_negative() {
        let config = PatternConfig {
            healing: true,
            ..PatternConfig::default()
        };
        let ctx = test_support::context(ArenaBounds::default());
        let mut rng = GameRng::new(3);
        assert!(roll_damage(&config, &ctx, &mut rng) < 0);
        assert!(roll_attack_damage(&config, &ctx, &mut rng) > 0);
    }

    #[test]
    fn test_every_standard_pattern_generates() {
        let arena = ArenaBounds::default();
        let ctx = test_support::context(arena);
        let mut rng = GameRng::new(11);
        for mut pattern in standard_patterns() {
            for _ in 0..pattern.state().phase_count {
                let batch = pattern.generate(&ctx, &arena, &mut rng);
                assert!(!batch.is_empty(), "{} produced an empty batch", pattern.name());
                for spec in &batch {
                    assert!(spec.position.is_finite());
                    assert!(spec.velocity.is_finite());
                }
            }
        }
    }
}
