//! Weaving grid: parallel lines of bullets sweeping the arena
//!
//! Each line spans the arena and drifts sideways while its bullets slide along
//! it in alternating directions. Interior lines are skipped at random so the
//! grid always has at least one wide lane to stand in.

use glam::Vec2;

use super::placement::{skipped_lines, spread_between};
use super::{
    EnemyContext, PatternConfig, PatternState, PatternStrategy, pattern_speed, roll_damage,
};
use crate::geometry::{ArenaBounds, Color};
use crate::projectile::{BulletShape, DeferredTransition, ProjectileSpec, TransitionEffect};
use crate::rng::GameRng;

const LINE_COUNT: usize = 7;
const SKIP_CHANCE: f32 = 0.3;
const BULLET_SPACING: f32 = 34.0;
const BULLET_SIZE: f32 = 7.0;
const SWEEP_SPEED: f32 = 45.0;
const SLIDE_SPEED: f32 = 25.0;
const TELEGRAPH: f32 = 0.7;
const LINE_STAGGER: f32 = 0.05;
const RECOLOR_AFTER: f32 = 1.2;
const SPEED_UP: f32 = 1.6;

/// Which family of lines to lay down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Orientation {
    /// Columns drifting right
    Vertical,
    /// Rows drifting down
    Horizontal,
}

#[derive(Debug, Clone)]
pub struct WeavingGrid {
    config: PatternConfig,
    state: PatternState,
}

impl WeavingGrid {
    pub const NAME: &'static str = "weaving_grid";

    pub fn new() -> Self {
        Self::with_config(PatternConfig {
            damage_min: 3.0,
            damage_max: 6.0,
            speed_multiplier: 1.0,
            end_phase_delay: 1.0,
            arena: ArenaBounds::new(480.0, 360.0),
            healing: false,
        })
    }

    pub fn with_config(config: PatternConfig) -> Self {
        Self {
            config,
            state: PatternState::new(3),
        }
    }

    fn lines(
        &self,
        ctx: &EnemyContext,
        arena: &ArenaBounds,
        orientation: Orientation,
        line_count: usize,
        color: Color,
        rng: &mut GameRng,
    ) -> Vec<ProjectileSpec> {
        let skipped = skipped_lines(line_count, SKIP_CHANCE, rng);
        let sweep = pattern_speed(&self.config, SWEEP_SPEED);
        let slide = pattern_speed(&self.config, SLIDE_SPEED);

        // line anchors sit on the near half of the arena so the sweep reaches the rest
        let (across, along, sweep_dir, slide_dir) = match orientation {
            Orientation::Vertical => (arena.width, arena.height, Vec2::X, Vec2::Y),
            Orientation::Horizontal => (arena.height, arena.width, Vec2::Y, Vec2::X),
        };
        let anchors = spread_between(Vec2::ZERO, sweep_dir * (across * 0.5), line_count);
        let per_line = ((along / BULLET_SPACING).floor() as usize).max(2);

        let mut batch = Vec::new();
        for (line, anchor) in anchors.into_iter().enumerate() {
            if skipped[line] {
                continue;
            }
            let sign = if line % 2 == 0 { 1.0 } else { -1.0 };
            let velocity = sweep_dir * sweep + slide_dir * slide * sign;
            let start = anchor + slide_dir * (BULLET_SPACING * 0.5);
            let end = anchor + slide_dir * (along - BULLET_SPACING * 0.5);
            for position in spread_between(start, end, per_line) {
                batch.push(
                    ProjectileSpec::new(position, velocity, roll_damage(&self.config, ctx, rng))
                        .with_size(BULLET_SIZE)
                        .with_shape(BulletShape::Diamond)
                        .with_color(color)
                        .with_telegraph(TELEGRAPH + LINE_STAGGER * line as f32),
                );
            }
        }
        batch
    }

    /// Both families at once; bullets flare gold and speed up partway through
    fn crossed_weave(&self, ctx: &EnemyContext, arena: &ArenaBounds, rng: &mut GameRng) -> Vec<ProjectileSpec> {
        let half = LINE_COUNT.div_ceil(2).max(3);
        let mut batch = self.lines(ctx, arena, Orientation::Vertical, half, Color::WEAVE_VIOLET, rng);
        batch.extend(self.lines(ctx, arena, Orientation::Horizontal, half, Color::WEAVE_VIOLET, rng));
        batch
            .into_iter()
            .map(|spec| {
                spec.with_transition(DeferredTransition::new(
                    RECOLOR_AFTER,
                    TransitionEffect::Recolor(Color::WEAVE_GOLD),
                ))
                .with_transition(DeferredTransition::new(
                    RECOLOR_AFTER,
                    TransitionEffect::ScaleSpeed(SPEED_UP),
                ))
            })
            .collect()
    }
}

impl Default for WeavingGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternStrategy for WeavingGrid {
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
            0 => self.lines(ctx, arena, Orientation::Vertical, LINE_COUNT, Color::WEAVE_VIOLET, rng),
            1 => self.lines(ctx, arena, Orientation::Horizontal, LINE_COUNT, Color::WEAVE_VIOLET, rng),
            _ => self.crossed_weave(ctx, arena, rng),
        }
    }
}
