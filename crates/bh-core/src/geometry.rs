//! Arena geometry helpers
//!
//! Axis-aligned boxes, arena bounds and colors. Positions are in arena pixels
//! with the origin at the top-left corner and y growing downwards.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_ARENA_HEIGHT, DEFAULT_ARENA_WIDTH, DEFAULT_DIRECTION, MIN_ARENA_SIZE};
use crate::rng::GameRng;

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub const fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Box centered on `center` extending `half` in each direction
    pub fn from_center(center: Vec2, half: Vec2) -> Self {
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Overlap test; touching edges do not count
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    /// Grow the box by `margin` on every side
    pub fn inflate(&self, margin: f32) -> Rect {
        Rect {
            min: self.min - Vec2::splat(margin),
            max: self.max + Vec2::splat(margin),
        }
    }

    /// Smallest box containing both points
    pub fn spanning(a: Vec2, b: Vec2) -> Rect {
        Rect {
            min: a.min(b),
            max: a.max(b),
        }
    }
}

/// Playable arena, owned by the combat session and passed to patterns by value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArenaBounds {
    pub width: f32,
    pub height: f32,
}

impl Default for ArenaBounds {
    fn default() -> Self {
        Self {
            width: DEFAULT_ARENA_WIDTH,
            height: DEFAULT_ARENA_HEIGHT,
        }
    }
}

impl ArenaBounds {
    /// Build bounds, clamping malformed or tiny dimensions to `MIN_ARENA_SIZE`
    pub fn new(width: f32, height: f32) -> Self {
        Self::clamped(width, height).0
    }

    /// Like `new`, also reporting whether any dimension had to be clamped
    pub fn clamped(width: f32, height: f32) -> (Self, bool) {
        let fix = |v: f32| {
            if v.is_finite() && v >= MIN_ARENA_SIZE {
                (v, false)
            } else {
                (MIN_ARENA_SIZE, true)
            }
        };
        let (width, cw) = fix(width);
        let (height, ch) = fix(height);
        (Self { width, height }, cw || ch)
    }

    pub fn rect(&self) -> Rect {
        Rect::new(Vec2::ZERO, Vec2::new(self.width, self.height))
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }

    /// Uniform point at least `inset` away from every edge
    pub fn random_point(&self, rng: &mut GameRng, inset: f32) -> Vec2 {
        let inset_x = inset.min(self.width * 0.5);
        let inset_y = inset.min(self.height * 0.5);
        Vec2::new(
            rng.range_f32(inset_x, self.width - inset_x),
            rng.range_f32(inset_y, self.height - inset_y),
        )
    }

    /// Clamp a point into the arena
    pub fn clamp_point(&self, point: Vec2) -> Vec2 {
        point.clamp(Vec2::ZERO, Vec2::new(self.width, self.height))
    }
}

/// Normalize `v`, falling back to `DEFAULT_DIRECTION` for zero-length or non-finite input
pub fn safe_direction(v: Vec2) -> Vec2 {
    v.try_normalize().unwrap_or(DEFAULT_DIRECTION)
}

/// Unit vector pointing from `from` towards `to`
pub fn direction_to(from: Vec2, to: Vec2) -> Vec2 {
    safe_direction(to - from)
}

/// RGBA color handed to the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const NEEDLE_SILVER: Color = Color::rgb(210, 220, 235);
    pub const THREAD_CRIMSON: Color = Color::rgb(200, 30, 60);
    pub const WEAVE_VIOLET: Color = Color::rgb(150, 90, 220);
    pub const WEAVE_GOLD: Color = Color::rgb(245, 200, 70);
    pub const SPIRAL_CYAN: Color = Color::rgb(70, 220, 230);
    pub const EMBER_ORANGE: Color = Color::rgb(255, 140, 40);
    pub const MEND_GREEN: Color = Color::rgb(90, 230, 120);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_overlap() {
        let a = Rect::from_center(Vec2::new(10.0, 10.0), Vec2::splat(5.0));
        let b = Rect::from_center(Vec2::new(18.0, 10.0), Vec2::splat(5.0));
        let c = Rect::from_center(Vec2::new(30.0, 10.0), Vec2::splat(5.0));
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let a = Rect::new(Vec2::ZERO, Vec2::splat(10.0));
        let b = Rect::new(Vec2::new(10.0, 0.0), Vec2::new(20.0, 10.0));
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn test_arena_clamps_malformed_bounds() {
        let (arena, clamped) = ArenaBounds::clamped(-40.0, f32::NAN);
        assert!(clamped);
        assert_eq!(arena.width, MIN_ARENA_SIZE);
        assert_eq!(arena.height, MIN_ARENA_SIZE);

        let (arena, clamped) = ArenaBounds::clamped(400.0, 300.0);
        assert!(!clamped);
        assert_eq!(arena.width, 400.0);
    }

    #[test]
    fn test_safe_direction_zero_vector() {
        assert_eq!(safe_direction(Vec2::ZERO), DEFAULT_DIRECTION);
        assert_eq!(direction_to(Vec2::splat(3.0), Vec2::splat(3.0)), DEFAULT_DIRECTION);
        let d = safe_direction(Vec2::new(3.0, 4.0));
        assert!((d.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_random_point_respects_inset() {
        let arena = ArenaBounds::new(200.0, 150.0);
        let mut rng = GameRng::new(3);
        for _ in 0..200 {
            let p = arena.random_point(&mut rng, 20.0);
            assert!(p.x >= 20.0 && p.x <= 180.0);
            assert!(p.y >= 20.0 && p.y <= 130.0);
        }
    }
}
