//! Needle barrage: fast aimed needles with staggered telegraphs

use glam::Vec2;

use super::placement::spread_between;
use super::{
    EnemyContext, PatternConfig, PatternState, PatternStrategy, pattern_speed, roll_damage,
};
use crate::geometry::{ArenaBounds, Color, direction_to};
use crate::projectile::{BulletShape, ProjectileSpec};
use crate::rng::GameRng;

const NEEDLE_SPEED: f32 = 240.0;
const NEEDLE_SIZE: f32 = 6.0;
const NEEDLE_TRAIL: f32 = 3.0;
/// Frames of smoothed velocity to lead the player by
const LEAD_FACTOR: f32 = 12.0;
const AIM_JITTER: f32 = 18.0;
const BASE_TELEGRAPH: f32 = 0.45;
const TELEGRAPH_STAGGER: f32 = 0.07;
const FAN_SPREAD: f32 = 0.5;

#[derive(Debug, Clone)]
pub struct NeedleBarrage {
    config: PatternConfig,
    state: PatternState,
}

impl NeedleBarrage {
    pub const NAME: &'static str = "needle_barrage";

    pub fn new() -> Self {
        Self::with_config(PatternConfig {
            damage_min: 4.0,
            damage_max: 7.0,
            speed_multiplier: 1.0,
            end_phase_delay: 1.2,
            arena: ArenaBounds::new(420.0, 320.0),
            healing: false,
        })
    }

    pub fn with_config(config: PatternConfig) -> Self {
        Self {
            config,
            state: PatternState::new(3),
        }
    }

    fn needle(&self, ctx: &EnemyContext, position: Vec2, direction: Vec2, rng: &mut GameRng) -> ProjectileSpec {
        let speed = pattern_speed(&self.config, NEEDLE_SPEED);
        ProjectileSpec::new(position, direction * speed, roll_damage(&self.config, ctx, rng))
            .with_size(NEEDLE_SIZE)
            .with_shape(BulletShape::Needle)
            .with_color(Color::NEEDLE_SILVER)
            .with_trail(NEEDLE_TRAIL)
    }

    /// 4 to 7 needles from the top edge, aimed at where the player is heading
    fn aimed_volley(&self, ctx: &EnemyContext, arena: &ArenaBounds, rng: &mut GameRng) -> Vec<ProjectileSpec> {
        let target = arena.clamp_point(self.state.tracker.predict(ctx.player_position, LEAD_FACTOR));
        let count = rng.range_u32(4, 7) as usize;
        (0..count)
            .map(|i| {
                let origin = Vec2::new(rng.range_f32(NEEDLE_SIZE, arena.width - NEEDLE_SIZE), NEEDLE_SIZE);
                let jitter = Vec2::new(
                    rng.range_f32(-AIM_JITTER, AIM_JITTER),
                    rng.range_f32(-AIM_JITTER, AIM_JITTER),
                );
                self.needle(ctx, origin, direction_to(origin, target + jitter), rng)
                    .with_telegraph(BASE_TELEGRAPH + TELEGRAPH_STAGGER * i as f32)
            })
            .collect()
    }

    /// Horizontal rows from alternating sides with one row left open
    fn side_rain(&self, ctx: &EnemyContext, arena: &ArenaBounds, rng: &mut GameRng) -> Vec<ProjectileSpec> {
        let rows = rng.range_u32(5, 8) as usize;
        let open = rng.range_u32(1, (rows - 2) as u32) as usize;
        let ys = spread_between(
            Vec2::new(0.0, NEEDLE_SIZE * 2.0),
            Vec2::new(0.0, arena.height - NEEDLE_SIZE * 2.0),
            rows,
        );
        ys.into_iter()
            .enumerate()
            .filter(|(i, _)| *i != open)
            .map(|(i, p)| {
                let from_left = i % 2 == 0;
                let (x, dir) = if from_left {
                    (NEEDLE_SIZE, Vec2::X)
                } else {
                    (arena.width - NEEDLE_SIZE, Vec2::NEG_X)
                };
                self.needle(ctx, Vec2::new(x, p.y), dir, rng)
                    .with_telegraph(BASE_TELEGRAPH + TELEGRAPH_STAGGER * i as f32)
            })
            .collect()
    }

    /// Five needles fanned around the aim line from the enemy
    fn converging_fan(&self, ctx: &EnemyContext, arena: &ArenaBounds, rng: &mut GameRng) -> Vec<ProjectileSpec> {
        let origin = arena.clamp_point(ctx.enemy_position);
        let target = self.state.tracker.predict(ctx.player_position, LEAD_FACTOR);
        let aim = direction_to(origin, target).to_angle();
        (0..5)
            .map(|i| {
                let offset = (i as f32 - 2.0) * FAN_SPREAD * 0.5;
                let dir = Vec2::from_angle(aim + offset);
                // outer needles fire first
                let order = 2 - (i as i32 - 2).abs();
                self.needle(ctx, origin, dir, rng)
                    .with_telegraph(BASE_TELEGRAPH + TELEGRAPH_STAGGER * order as f32)
                    .with_glow(0.4)
            })
            .collect()
    }
}

impl Default for NeedleBarrage {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternStrategy for NeedleBarrage {
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
            0 => self.aimed_volley(ctx, arena, rng),
            1 => self.side_rain(ctx, arena, rng),
            _ => self.converging_fan(ctx, arena, rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::test_support::context;

    #[test]
    fn test_volley_size_and_aim() {
        let arena = ArenaBounds::new(420.0, 320.0);
        let ctx = context(arena);
        let mut rng = GameRng::new(7);
        let mut pattern = NeedleBarrage::new();
        let batch = pattern.generate(&ctx, &arena, &mut rng);
        assert!((4..=7).contains(&batch.len()));
        for spec in &batch {
            // every needle heads downward towards the player
            assert!(spec.velocity.y > 0.0);
            assert!(spec.telegraph.is_some());
            assert!(spec.damage > 0);
        }
    }

    #[test]
    fn test_telegraphs_are_staggered() {
        let arena = ArenaBounds::new(420.0, 320.0);
        let ctx = context(arena);
        let mut rng = GameRng::new(7);
        let batch = NeedleBarrage::new().generate(&ctx, &arena, &mut rng);
        let durations: Vec<f32> = batch
            .iter()
            .filter_map(|s| s.telegraph.as_ref().map(|t| t.duration))
            .collect();
        assert!(durations.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_side_rain_leaves_a_row_open() {
        let arena = ArenaBounds::new(420.0, 320.0);
        let ctx = context(arena);
        let mut rng = GameRng::new(13);
        let mut pattern = NeedleBarrage::new();
        pattern.generate(&ctx, &arena, &mut rng);
        let rain = pattern.generate(&ctx, &arena, &mut rng);
        assert!((4..=7).contains(&rain.len()));
        assert!(rain.iter().all(|s| s.velocity.y == 0.0));
    }

    #[test]
    fn test_three_phases_cycle() {
        let arena = ArenaBounds::default();
        let ctx = context(arena);
        let mut rng = GameRng::new(1);
        let mut pattern = NeedleBarrage::new();
        pattern.generate(&ctx, &arena, &mut rng);
        pattern.generate(&ctx, &arena, &mut rng);
        let fan = pattern.generate(&ctx, &arena, &mut rng);
        assert_eq!(fan.len(), 5);
        assert_eq!(pattern.state().phase, 0);
        assert_eq!(pattern.state().spawn_cycle, 3);
    }
}
