//! Spiral burst: rotating spiral arms, exploding seeds, and a late-homing ring

use std::f32::consts::TAU;

use glam::Vec2;

use super::placement::{burst_centers, ring_points};
use super::{
    EnemyContext, PatternConfig, PatternState, PatternStrategy, pattern_speed, roll_damage,
};
use crate::geometry::{ArenaBounds, Color};
use crate::projectile::{BulletShape, DeferredTransition, ProjectileSpec, TransitionEffect};
use crate::rng::GameRng;

const ARM_STEPS: usize = 6;
const ARM_TWIST: f32 = 0.18;
const ARM_SPEED: f32 = 130.0;
const ROTATION_PER_CYCLE: f32 = 0.35;
const ARM_TELEGRAPH: f32 = 0.4;
const ARM_STAGGER: f32 = 0.08;

const MIN_BURST_DISTANCE: f32 = 120.0;
const BURST_INSET: f32 = 40.0;
const SEED_SIZE: f32 = 12.0;
const SEED_TELEGRAPH: f32 = 0.6;
const SEED_FUSE: f32 = 0.35;
/// Seeds flare up halfway through the fuse; transitions count from spawn
const SEED_FLARE_AT: f32 = SEED_TELEGRAPH + SEED_FUSE * 0.5;
const SEED_FLARE_GLOW: f32 = 1.6;
const SHARD_SPEED: f32 = 150.0;
const SHARD_SIZE: f32 = 7.0;
const SHARD_OFFSET: f32 = 6.0;

const HOMING_RING_COUNT: usize = 10;
const HOMING_RING_RADIUS: f32 = 20.0;
const HOMING_RING_SPEED: f32 = 110.0;
const HOMING_DELAY: f32 = 0.7;
const HOMING_DURATION: f32 = 1.2;
const HOMING_STRENGTH: f32 = 2.5;

#[derive(Debug, Clone)]
pub struct SpiralBurst {
    config: PatternConfig,
    state: PatternState,
}

impl SpiralBurst {
    pub const NAME: &'static str = "spiral_burst";

    pub fn new() -> Self {
        Self::with_config(PatternConfig {
            damage_min: 4.0,
            damage_max: 8.0,
            speed_multiplier: 1.1,
            end_phase_delay: 1.4,
            arena: ArenaBounds::new(440.0, 340.0),
            healing: false,
        })
    }

    pub fn with_config(config: PatternConfig) -> Self {
        Self {
            config,
            state: PatternState::new(3),
        }
    }

    fn spiral_arms(&self, ctx: &EnemyContext, arena: &ArenaBounds, rng: &mut GameRng) -> Vec<ProjectileSpec> {
        let origin = arena.center();
        let arms = rng.range_u32(3, 4) as usize;
        let base = self.state.spawn_cycle as f32 * ROTATION_PER_CYCLE;
        let speed = pattern_speed(&self.config, ARM_SPEED);

        let mut batch = Vec::with_capacity(arms * ARM_STEPS);
        for arm in 0..arms {
            let arm_angle = base + TAU * arm as f32 / arms as f32;
            for step in 0..ARM_STEPS {
                let dir = Vec2::from_angle(arm_angle + ARM_TWIST * step as f32);
                batch.push(
                    ProjectileSpec::new(origin, dir * speed, roll_damage(&self.config, ctx, rng))
                        .with_shape(BulletShape::Orb)
                        .with_color(Color::SPIRAL_CYAN)
                        .with_trail(1.0)
                        .with_telegraph(ARM_TELEGRAPH + ARM_STAGGER * step as f32),
                );
            }
        }
        batch
    }

    /// Stationary seeds that burst into rings of shards
    fn burst_seeds(&self, ctx: &EnemyContext, arena: &ArenaBounds, rng: &mut GameRng) -> Vec<ProjectileSpec> {
        let count = rng.range_u32(2, 4) as usize;
        let speed = pattern_speed(&self.config, SHARD_SPEED);

        burst_centers(arena, count, MIN_BURST_DISTANCE, BURST_INSET, rng)
            .into_iter()
            .map(|center| {
                let shards = rng.range_u32(8, 12) as usize;
                let rotation = rng.range_f32(0.0, TAU);
                let children = ring_points(Vec2::ZERO, SHARD_OFFSET, shards, rotation)
                    .into_iter()
                    .map(|p| {
                        ProjectileSpec::new(p.position, p.outward * speed, roll_damage(&self.config, ctx, rng))
                            .with_size(SHARD_SIZE)
                            .with_color(Color::EMBER_ORANGE)
                            .with_trail(1.5)
                    })
                    .collect();

                ProjectileSpec::new(center, Vec2::ZERO, roll_damage(&self.config, ctx, rng))
                    .with_size(SEED_SIZE)
                    .with_shape(BulletShape::Star)
                    .with_color(Color::EMBER_ORANGE)
                    .with_glow(0.8)
                    .with_telegraph(SEED_TELEGRAPH)
                    .with_fuse(SEED_FUSE)
                    .with_transition(DeferredTransition::new(
                        SEED_FLARE_AT,
                        TransitionEffect::SetGlow(SEED_FLARE_GLOW),
                    ))
                    .with_explosion(children)
            })
            .collect()
    }

    /// Outward ring where every other bullet turns on the player after a delay
    fn homing_ring(&self, ctx: &EnemyContext, arena: &ArenaBounds, rng: &mut GameRng) -> Vec<ProjectileSpec> {
        let origin = arena.clamp_point(ctx.enemy_position);
        let speed = pattern_speed(&self.config, HOMING_RING_SPEED);
        let rotation = rng.range_f32(0.0, TAU);

        ring_points(origin, HOMING_RING_RADIUS, HOMING_RING_COUNT, rotation)
            .into_iter()
            .map(|p| {
                let spec = ProjectileSpec::new(p.position, p.outward * speed, roll_damage(&self.config, ctx, rng))
                    .with_color(Color::SPIRAL_CYAN)
                    .with_telegraph(ARM_TELEGRAPH);
                if p.index % 2 == 0 {
                    spec.with_glow(0.5).with_transition(DeferredTransition::new(
                        HOMING_DELAY,
                        TransitionEffect::EnableHoming {
                            duration: HOMING_DURATION,
                            strength: HOMING_STRENGTH,
                        },
                    ))
                } else {
                    spec
                }
            })
            .collect()
    }
}

impl Default for SpiralBurst {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternStrategy for SpiralBurst {
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
            0 => self.spiral_arms(ctx, arena, rng),
            1 => self.burst_seeds(ctx, arena, rng),
            _ => self.homing_ring(ctx, arena, rng),
        }
    }
}
