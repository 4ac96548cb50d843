//! Projectile simulation
//!
//! Bullets move through four states: telegraphing (visible warning, harmless),
//! active (moving and able to collide), exploding (short timer, then spawns its
//! explosion children) and destroyed (removed from the live list).
//!
//! Delayed effects such as late homing or a mid-flight recolor are carried on
//! the bullet as `DeferredTransition` values and evaluated by the engine each
//! frame, so no per-bullet callback owns hidden state.

mod collision;
mod engine;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::consts::{TELEGRAPH_MIN_ALPHA, TIME_EPSILON};
use crate::geometry::Color;

pub use collision::{bullet_hitbox, is_offscreen, offscreen_margin, trail_tail};
pub use engine::{AdvanceReport, HitEvent, ProjectileEngine};

/// Visual shape tag for the renderer
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
pub enum BulletShape {
    #[default]
    Orb,
    Needle,
    Thread,
    Diamond,
    Star,
    Seed,
}

bitflags::bitflags! {
    /// Render hints derived from bullet state each frame
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct RenderFlags: u8 {
        const GLOW       = 0b0000_0001;
        const TELEGRAPH  = 0b0000_0010;
        const HOMING     = 0b0000_0100;
        const EXPLODING  = 0b0000_1000;
        const HEALING    = 0b0001_0000;
    }
}

/// Stable identity of a live bullet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BulletId(pub u64);

/// Warning interval before a bullet can collide
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Telegraph {
    pub duration: f32,
    pub elapsed: f32,
    /// Current warning opacity, ramps up as the telegraph runs out
    pub alpha: f32,
}

impl Telegraph {
    pub fn new(duration: f32) -> Self {
        Self {
            duration: duration.max(0.0),
            elapsed: 0.0,
            alpha: TELEGRAPH_MIN_ALPHA,
        }
    }

    pub fn remaining(&self) -> f32 {
        (self.duration - self.elapsed).max(0.0)
    }

    pub fn is_done(&self) -> bool {
        self.remaining() <= TIME_EPSILON
    }

    /// Time run past the end of the warning
    pub fn overshoot(&self) -> f32 {
        (self.elapsed - self.duration).max(0.0)
    }

    /// Advance the countdown, returning true once it has fully elapsed
    pub fn tick(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        let progress = if self.duration > 0.0 {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        } else {
            1.0
        };
        self.alpha = TELEGRAPH_MIN_ALPHA + (1.0 - TELEGRAPH_MIN_ALPHA) * progress;
        self.is_done()
    }
}

/// Velocity steering towards a moving target over a bounded duration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Homing {
    pub enabled: bool,
    pub remaining: f32,
    pub strength: f32,
    pub target: Vec2,
}

impl Homing {
    pub fn new(duration: f32, strength: f32) -> Self {
        Self {
            enabled: true,
            remaining: duration,
            strength,
            target: Vec2::ZERO,
        }
    }
}

/// What a deferred transition does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TransitionEffect {
    /// Start steering towards the player
    EnableHoming { duration: f32, strength: f32 },
    /// Swap the render color
    Recolor(Color),
    /// Multiply the current velocity
    ScaleSpeed(f32),
    /// Change glow intensity
    SetGlow(f32),
}

/// One-shot effect fired after a bullet has existed for `trigger_after` seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeferredTransition {
    pub elapsed: f32,
    pub trigger_after: f32,
    pub fired: bool,
    pub effect: TransitionEffect,
}

impl DeferredTransition {
    pub fn new(trigger_after: f32, effect: TransitionEffect) -> Self {
        Self {
            elapsed: 0.0,
            trigger_after,
            fired: false,
            effect,
        }
    }

    /// Accumulate time; returns the effect exactly once when the threshold is reached
    pub fn tick(&mut self, dt: f32) -> Option<TransitionEffect> {
        if self.fired {
            return None;
        }
        self.elapsed += dt;
        if self.elapsed + TIME_EPSILON >= self.trigger_after {
            self.fired = true;
            Some(self.effect)
        } else {
            None
        }
    }
}

/// Blueprint for a bullet, produced by pattern strategies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileSpec {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Signed: negative values heal the player
    pub damage: i32,
    pub size: f32,
    pub shape: BulletShape,
    pub color: Color,
    pub glow: f32,
    /// Trail length in multiples of `size`
    pub trail_length: f32,
    pub telegraph: Option<Telegraph>,
    pub homing: Option<Homing>,
    pub transitions: Vec<DeferredTransition>,
    /// Spawned on destruction; positions are offsets from the detonation point
    pub explosion: Vec<ProjectileSpec>,
    /// Active seconds before the bullet detonates on its own
    pub fuse: Option<f32>,
}

impl ProjectileSpec {
    pub fn new(position: Vec2, velocity: Vec2, damage: i32) -> Self {
        Self {
            position,
            velocity,
            damage,
            size: 8.0,
            shape: BulletShape::Orb,
            color: Color::WHITE,
            glow: 0.0,
            trail_length: 0.0,
            telegraph: None,
            homing: None,
            transitions: Vec::new(),
            explosion: Vec::new(),
            fuse: None,
        }
    }

    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    pub fn with_shape(mut self, shape: BulletShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_glow(mut self, glow: f32) -> Self {
        self.glow = glow;
        self
    }

    pub fn with_trail(mut self, trail_length: f32) -> Self {
        self.trail_length = trail_length;
        self
    }

    pub fn with_telegraph(mut self, duration: f32) -> Self {
        self.telegraph = (duration > 0.0).then(|| Telegraph::new(duration));
        self
    }

    pub fn with_homing(mut self, homing: Homing) -> Self {
        self.homing = Some(homing);
        self
    }

    pub fn with_transition(mut self, transition: DeferredTransition) -> Self {
        self.transitions.push(transition);
        self
    }

    pub fn with_explosion(mut self, children: Vec<ProjectileSpec>) -> Self {
        self.explosion = children;
        self
    }

    pub fn with_fuse(mut self, fuse: f32) -> Self {
        self.fuse = Some(fuse);
        self
    }

    pub fn is_healing(&self) -> bool {
        self.damage < 0
    }
}

/// Lifecycle state of a live bullet
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BulletState {
    Telegraphing,
    Active,
    Exploding { remaining: f32 },
    Destroyed,
}

/// A live projectile owned by the engine
#[derive(Debug, Clone, PartialEq)]
pub struct Bullet {
    pub id: BulletId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub damage: i32,
    pub size: f32,
    pub shape: BulletShape,
    pub color: Color,
    pub glow: f32,
    pub trail_length: f32,
    pub telegraph: Option<Telegraph>,
    pub homing: Option<Homing>,
    pub transitions: Vec<DeferredTransition>,
    pub explosion: Vec<ProjectileSpec>,
    pub fuse: Option<f32>,
    pub state: BulletState,
    /// Seconds since spawn
    pub age: f32,
    /// Seconds spent in the active state
    pub active_age: f32,
}

impl Bullet {
    pub fn from_spec(id: BulletId, spec: ProjectileSpec) -> Self {
        let state = match spec.telegraph {
            Some(t) if !t.is_done() => BulletState::Telegraphing,
            _ => BulletState::Active,
        };
        Self {
            id,
            position: spec.position,
            velocity: spec.velocity,
            damage: spec.damage,
            size: spec.size,
            shape: spec.shape,
            color: spec.color,
            glow: spec.glow,
            trail_length: spec.trail_length,
            telegraph: spec.telegraph,
            homing: spec.homing,
            transitions: spec.transitions,
            explosion: spec.explosion,
            fuse: spec.fuse,
            state,
            age: 0.0,
            active_age: 0.0,
        }
    }

    pub fn is_telegraphing(&self) -> bool {
        matches!(self.state, BulletState::Telegraphing)
    }

    /// Only active bullets collide; telegraphing and fading bullets never do
    pub fn can_collide(&self) -> bool {
        matches!(self.state, BulletState::Active)
    }

    pub fn is_healing(&self) -> bool {
        self.damage < 0
    }

    pub fn telegraph_alpha(&self) -> f32 {
        match (self.state, self.telegraph) {
            (BulletState::Telegraphing, Some(t)) => t.alpha,
            _ => 1.0,
        }
    }

    pub fn render_flags(&self) -> RenderFlags {
        let mut flags = RenderFlags::empty();
        if self.glow > 0.0 {
            flags |= RenderFlags::GLOW;
        }
        if self.is_telegraphing() {
            flags |= RenderFlags::TELEGRAPH;
        }
        if self.homing.is_some_and(|h| h.enabled) {
            flags |= RenderFlags::HOMING;
        }
        if matches!(self.state, BulletState::Exploding { .. }) {
            flags |= RenderFlags::EXPLODING;
        }
        if self.is_healing() {
            flags |= RenderFlags::HEALING;
        }
        flags
    }

    pub fn view(&self) -> BulletView {
        BulletView {
            id: self.id,
            position: self.position,
            size: self.size,
            shape: self.shape,
            color: self.color,
            flags: self.render_flags(),
            glow: self.glow,
            trail_length: self.trail_length,
            telegraph_alpha: self.telegraph_alpha(),
        }
    }

    pub(crate) fn apply_effect(&mut self, effect: TransitionEffect) {
        match effect {
            TransitionEffect::EnableHoming { duration, strength } => {
                let target = self.homing.map(|h| h.target).unwrap_or(self.position);
                self.homing = Some(Homing {
                    target,
                    ..Homing::new(duration, strength)
                });
            }
            TransitionEffect::Recolor(color) => self.color = color,
            TransitionEffect::ScaleSpeed(factor) => self.velocity *= factor,
            TransitionEffect::SetGlow(glow) => self.glow = glow,
        }
    }
}

/// Read-only snapshot of one bullet for the renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BulletView {
    pub id: BulletId,
    pub position: Vec2,
    pub size: f32,
    pub shape: BulletShape,
    pub color: Color,
    pub flags: RenderFlags,
    pub glow: f32,
    pub trail_length: f32,
    pub telegraph_alpha: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_without_telegraph_starts_active() {
        let b = Bullet::from_spec(BulletId(1), ProjectileSpec::new(Vec2::ZERO, Vec2::X, 3));
        assert_eq!(b.state, BulletState::Active);
        assert!(b.can_collide());
    }

    #[test]
    fn test_spec_with_telegraph_starts_telegraphing() {
        let spec = ProjectileSpec::new(Vec2::ZERO, Vec2::X, 3).with_telegraph(0.5);
        let b = Bullet::from_spec(BulletId(1), spec);
        assert!(b.is_telegraphing());
        assert!(!b.can_collide());
        assert!(b.render_flags().contains(RenderFlags::TELEGRAPH));
    }

    #[test]
    fn test_zero_telegraph_is_dropped() {
        let spec = ProjectileSpec::new(Vec2::ZERO, Vec2::X, 3).with_telegraph(0.0);
        assert!(spec.telegraph.is_none());
    }

    #[test]
    fn test_telegraph_alpha_ramps() {
        let mut t = Telegraph::new(1.0);
        assert_eq!(t.alpha, TELEGRAPH_MIN_ALPHA);
        assert!(!t.tick(0.5));
        assert!(t.alpha > TELEGRAPH_MIN_ALPHA && t.alpha < 1.0);
        assert!(t.tick(0.5));
        assert!((t.alpha - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_deferred_transition_fires_once() {
        let mut t = DeferredTransition::new(0.3, TransitionEffect::ScaleSpeed(2.0));
        assert_eq!(t.tick(0.2), None);
        assert_eq!(t.tick(0.1), Some(TransitionEffect::ScaleSpeed(2.0)));
        assert!(t.fired);
        assert_eq!(t.tick(5.0), None);
    }

    #[test]
    fn test_enable_homing_effect() {
        let mut b = Bullet::from_spec(BulletId(1), ProjectileSpec::new(Vec2::ZERO, Vec2::X, 3));
        b.apply_effect(TransitionEffect::EnableHoming {
            duration: 1.0,
            strength: 2.0,
        });
        let homing = b.homing.unwrap();
        assert!(homing.enabled);
        assert_eq!(homing.strength, 2.0);
        assert!(b.render_flags().contains(RenderFlags::HOMING));
    }

    #[test]
    fn test_healing_flag() {
        let b = Bullet::from_spec(BulletId(1), ProjectileSpec::new(Vec2::ZERO, Vec2::X, -8));
        assert!(b.is_healing());
        assert!(b.render_flags().contains(RenderFlags::HEALING));
    }
}
