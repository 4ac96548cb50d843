//! Mending seeds: slow drifting seeds that heal on contact

use glam::Vec2;

use super::{
    EnemyContext, PatternConfig, PatternState, PatternStrategy, pattern_speed, roll_attack_damage,
    roll_damage,
};
use crate::geometry::{ArenaBounds, Color, direction_to};
use crate::projectile::{BulletShape, ProjectileSpec};
use crate::rng::GameRng;

const SEED_SIZE: f32 = 10.0;
const DRIFT_SPEED: f32 = 55.0;
const SWAY: f32 = 20.0;
const SEED_TELEGRAPH: f32 = 0.3;
const THORN_SPEED: f32 = 160.0;
const THORN_TELEGRAPH: f32 = 0.55;

/// A healing pattern; phase two mixes in a few thorns worth dodging
#[derive(Debug, Clone)]
pub struct MendingSeeds {
    config: PatternConfig,
    state: PatternState,
}

impl MendingSeeds {
    pub const NAME: &'static str = "mending_seeds";

    pub fn new() -> Self {
        Self::with_config(PatternConfig {
            damage_min: 3.0,
            damage_max: 6.0,
            speed_multiplier: 0.8,
            end_phase_delay: 0.8,
            arena: ArenaBounds::new(360.0, 300.0),
            healing: true,
        })
    }

    pub fn with_config(config: PatternConfig) -> Self {
        Self {
            config,
            state: PatternState::new(2),
        }
    }

    fn seeds(&self, ctx: &EnemyContext, arena: &ArenaBounds, rng: &mut GameRng) -> Vec<ProjectileSpec> {
        let count = rng.range_u32(3, 5) as usize;
        let speed = pattern_speed(&self.config, DRIFT_SPEED);
        (0..count)
            .map(|_| {
                let x = rng.range_f32(SEED_SIZE, arena.width - SEED_SIZE);
                let velocity = Vec2::new(rng.range_f32(-SWAY, SWAY), speed);
                ProjectileSpec::new(Vec2::new(x, SEED_SIZE), velocity, roll_damage(&self.config, ctx, rng))
                    .with_size(SEED_SIZE)
                    .with_shape(BulletShape::Seed)
                    .with_color(Color::MEND_GREEN)
                    .with_glow(0.7)
                    .with_telegraph(SEED_TELEGRAPH)
            })
            .collect()
    }

    fn thorns(&self, ctx: &EnemyContext, arena: &ArenaBounds, rng: &mut GameRng) -> Vec<ProjectileSpec> {
        let count = rng.range_u32(3, 4) as usize;
        let speed = pattern_speed(&self.config, THORN_SPEED);
        let target = arena.clamp_point(ctx.player_position);
        (0..count)
            .map(|i| {
                let origin = Vec2::new(arena.width * (i as f32 + 0.5) / count as f32, SEED_SIZE);
                ProjectileSpec::new(
                    origin,
                    direction_to(origin, target) * speed,
                    roll_attack_damage(&self.config, ctx, rng),
                )
                .with_shape(BulletShape::Needle)
                .with_color(Color::NEEDLE_SILVER)
                .with_trail(2.0)
                .with_telegraph(THORN_TELEGRAPH)
            })
            .collect()
    }
}

impl Default for MendingSeeds {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternStrategy for MendingSeeds {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn config(&self) -> &PatternConfig {
        &self.config
    }

    fn state(&self) -> &PatternState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut PatternState {
        &mut self.state
    }

    fn generate(&mut self, ctx: &EnemyContext, arena: &ArenaBounds, rng: &mut GameRng) -> Vec<ProjectileSpec> {
        match self.state.next_phase() {
            0 => self.seeds(ctx, arena, rng),
            _ => {
                let mut batch = self.seeds(ctx, arena, rng);
                batch.extend(self.thorns(ctx, arena, rng));
                batch
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::test_support::context;

    #[test]
    fn test_seeds_heal() {
        let arena = ArenaBounds::new(360.0, 300.0);
        let ctx = context(arena);
        let mut rng = GameRng::new(43);
        let batch = MendingSeeds::new().generate(&ctx, &arena, &mut rng);
        assert!((3..=5).contains(&batch.len()));
        assert!(batch.iter().all(|s| s.is_healing()));
    }

    #[test]
    fn test_second_phase_mixes_thorns() {
        let arena = ArenaBounds::new(360.0, 300.0);
        let ctx = context(arena);
        let mut rng = GameRng::new(47);
        let mut pattern = MendingSeeds::new();
        pattern.generate(&ctx, &arena, &mut rng);
        let mixed = pattern.generate(&ctx, &arena, &mut rng);
        assert!(mixed.iter().any(|s| s.is_healing()));
        assert!(mixed.iter().any(|s| s.damage > 0));
        assert_eq!(pattern.state().phase, 0);
    }
}
