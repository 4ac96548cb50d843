//! Thread cage: rings and walls of threads closing in, always with a way out

use glam::Vec2;

use super::placement::{escape_gap, ring_points, spread_between};
use super::{
    EnemyContext, PatternConfig, PatternState, PatternStrategy, pattern_speed, roll_damage,
};
use crate::geometry::{ArenaBounds, Color};
use crate::projectile::{BulletShape, DeferredTransition, ProjectileSpec, TransitionEffect};
use crate::rng::GameRng;

const RING_SEGMENTS: usize = 14;
const INNER_SEGMENTS: usize = 12;
const OUTER_SEGMENTS: usize = 16;
const WALL_SEGMENTS: usize = 6;
const GAP_MIN: usize = 1;
const GAP_MAX: usize = 2;
const THREAD_SIZE: f32 = 8.0;
const THREAD_TRAIL: f32 = 1.5;
const CLOSE_SPEED: f32 = 70.0;
const WALL_SPEED: f32 = 60.0;
const TELEGRAPH: f32 = 0.6;
/// Fraction of the smaller arena side used as ring radius
const RING_FILL: f32 = 0.42;
const INNER_RING_SCALE: f32 = 0.65;
const HOMING_DELAY: f32 = 1.0;
const HOMING_DURATION: f32 = 1.5;
const HOMING_STRENGTH: f32 = 2.0;

/// Geometry of one ring of threads
#[derive(Debug, Clone, Copy)]
struct RingLayout {
    radius: f32,
    segments: usize,
    rotation: f32,
    speed: f32,
}

#[derive(Debug, Clone)]
pub struct ThreadCage {
    config: PatternConfig,
    state: PatternState,
}

impl ThreadCage {
    pub const NAME: &'static str = "thread_cage";

    pub fn new() -> Self {
        Self::with_config(PatternConfig {
            damage_min: 5.0,
            damage_max: 9.0,
            speed_multiplier: 0.9,
            end_phase_delay: 1.6,
            arena: ArenaBounds::new(360.0, 360.0),
            healing: false,
        })
    }

    pub fn with_config(config: PatternConfig) -> Self {
        Self {
            config,
            state: PatternState::new(3),
        }
    }

    fn thread(&self, ctx: &EnemyContext, position: Vec2, velocity: Vec2, rng: &mut GameRng) -> ProjectileSpec {
        ProjectileSpec::new(position, velocity, roll_damage(&self.config, ctx, rng))
            .with_size(THREAD_SIZE)
            .with_shape(BulletShape::Thread)
            .with_color(Color::THREAD_CRIMSON)
            .with_trail(THREAD_TRAIL)
            .with_telegraph(TELEGRAPH)
    }

    /// Ring of inward threads around the arena center, open at one spot
    fn closing_ring(
        &self,
        ctx: &EnemyContext,
        arena: &ArenaBounds,
        layout: RingLayout,
        rng: &mut GameRng,
    ) -> Vec<ProjectileSpec> {
        let gap = escape_gap(layout.segments, GAP_MIN, GAP_MAX, rng);
        let speed = pattern_speed(&self.config, layout.speed);
        // threads cross the center and fade out on the far side
        let fuse = 2.0 * layout.radius / speed;
        ring_points(arena.center(), layout.radius, layout.segments, layout.rotation)
            .into_iter()
            .filter(|p| !gap.contains(&p.index))
            .map(|p| self.thread(ctx, p.position, -p.outward * speed, rng).with_fuse(fuse))
            .collect()
    }

    /// Four walls around the center marching inward, cut once along the perimeter
    fn square_cage(&self, ctx: &EnemyContext, arena: &ArenaBounds, rng: &mut GameRng) -> Vec<ProjectileSpec> {
        let half = arena.width.min(arena.height) * RING_FILL;
        let c = arena.center();
        let (tl, tr) = (c + Vec2::new(-half, -half), c + Vec2::new(half, -half));
        let (br, bl) = (c + Vec2::new(half, half), c + Vec2::new(-half, half));
        let walls = [
            (tl, tr, Vec2::Y),
            (tr, br, Vec2::NEG_X),
            (br, bl, Vec2::NEG_Y),
            (bl, tl, Vec2::X),
        ];

        // perimeter order, corners not repeated
        let mut segments: Vec<(Vec2, Vec2)> = Vec::with_capacity(WALL_SEGMENTS * 4);
        for (start, end, normal) in walls {
            let points = spread_between(start, end, WALL_SEGMENTS + 1);
            segments.extend(points.into_iter().take(WALL_SEGMENTS).map(|p| (p, normal)));
        }

        let gap = escape_gap(segments.len(), GAP_MIN, GAP_MAX, rng);
        let speed = pattern_speed(&self.config, WALL_SPEED);
        let fuse = 2.0 * half / speed;
        segments
            .into_iter()
            .enumerate()
            .filter(|(i, _)| !gap.contains(i))
            .map(|(_, (pos, normal))| self.thread(ctx, pos, normal * speed, rng).with_fuse(fuse))
            .collect()
    }

    /// Inner and outer rings, each with its own gap; part of the outer ring starts homing late
    fn double_ring(&self, ctx: &EnemyContext, arena: &ArenaBounds, rng: &mut GameRng) -> Vec<ProjectileSpec> {
        let radius = arena.width.min(arena.height) * RING_FILL;
        let rotation = self.state.spawn_cycle as f32 * 0.4;
        let inner = RingLayout {
            radius: radius * INNER_RING_SCALE,
            segments: INNER_SEGMENTS,
            rotation,
            speed: CLOSE_SPEED * 0.8,
        };
        let mut batch = self.closing_ring(ctx, arena, inner, rng);

        let outer_step = std::f32::consts::TAU / OUTER_SEGMENTS as f32;
        let outer = RingLayout {
            radius,
            segments: OUTER_SEGMENTS,
            rotation: rotation + outer_step * 0.5,
            speed: CLOSE_SPEED,
        };
        let outer = self.closing_ring(ctx, arena, outer, rng);
        batch.extend(outer.into_iter().enumerate().map(|(i, spec)| {
            if i % 3 == 0 {
                spec.with_transition(DeferredTransition::new(
                    HOMING_DELAY,
                    TransitionEffect::EnableHoming {
                        duration: HOMING_DURATION,
                        strength: HOMING_STRENGTH,
                    },
                ))
                .with_glow(0.6)
            } else {
                spec
            }
        }));
        batch
    }
}

impl Default for ThreadCage {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternStrategy for ThreadCage {
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
            0 => {
                let layout = RingLayout {
                    radius: arena.width.min(arena.height) * RING_FILL,
                    segments: RING_SEGMENTS,
                    rotation: rng.range_f32(0.0, std::f32::consts::TAU),
                    speed: CLOSE_SPEED,
                };
                self.closing_ring(ctx, arena, layout, rng)
            }
            1 => self.square_cage(ctx, arena, rng),
            _ => self.double_ring(ctx, arena, rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::test_support::context;

    #[test]
    fn test_ring_has_gap_of_one_or_two() {
        let arena = ArenaBounds::new(360.0, 360.0);
        let ctx = context(arena);
        let mut rng = GameRng::new(3);
        for _ in 0..20 {
            let mut pattern = ThreadCage::new();
            let ring = pattern.generate(&ctx, &arena, &mut rng);
            let missing = RING_SEGMENTS - ring.len();
            assert!((1..=2).contains(&missing));
        }
    }

    #[test]
    fn test_ring_threads_move_inward() {
        let arena = ArenaBounds::new(360.0, 360.0);
        let ctx = context(arena);
        let mut rng = GameRng::new(3);
        let ring = ThreadCage::new().generate(&ctx, &arena, &mut rng);
        let center = arena.center();
        for spec in &ring {
            let next = spec.position + spec.velocity * 0.1;
            assert!(next.distance(center) < spec.position.distance(center));
            assert!(spec.fuse.is_some());
            assert!(arena.rect().contains(spec.position));
        }
    }

    #[test]
    fn test_square_cage_gap() {
        let arena = ArenaBounds::new(360.0, 360.0);
        let ctx = context(arena);
        let mut rng = GameRng::new(4);
        let mut pattern = ThreadCage::new();
        pattern.generate(&ctx, &arena, &mut rng);
        let cage = pattern.generate(&ctx, &arena, &mut rng);
        let missing = WALL_SEGMENTS * 4 - cage.len();
        assert!((1..=2).contains(&missing));
    }

    #[test]
    fn test_double_ring_has_delayed_homing() {
        let arena = ArenaBounds::new(360.0, 360.0);
        let ctx = context(arena);
        let mut rng = GameRng::new(5);
        let mut pattern = ThreadCage::new();
        pattern.generate(&ctx, &arena, &mut rng);
        pattern.generate(&ctx, &arena, &mut rng);
        let rings = pattern.generate(&ctx, &arena, &mut rng);
        assert!(rings.len() > INNER_SEGMENTS);
        let delayed = rings
            .iter()
            .filter(|s| {
                s.transitions
                    .iter()
                    .any(|t| matches!(t.effect, TransitionEffect::EnableHoming { .. }))
            })
            .count();
        assert!(delayed > 0);
        // homing is dormant at spawn
        assert!(rings.iter().all(|s| s.homing.is_none()));
    }
}
