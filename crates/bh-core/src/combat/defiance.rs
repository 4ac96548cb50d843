//! Death Defiance: one nullified fatal hit per combat

use crate::consts::TIME_EPSILON;

/// Per-session Death Defiance bookkeeping
///
/// `available` starts true for every session and is cleared for good the first
/// time the charm fires. While `remaining` is positive the overlay is active:
/// incoming damage is blocked and the defense bonus applies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeathDefiance {
    available: bool,
    remaining: f32,
    defense_bonus: i32,
}

impl Default for DeathDefiance {
    fn default() -> Self {
        Self::new()
    }
}

impl DeathDefiance {
    pub const fn new() -> Self {
        Self {
            available: true,
            remaining: 0.0,
            defense_bonus: 0,
        }
    }

    pub const fn is_available(&self) -> bool {
        self.available
    }

    pub fn is_active(&self) -> bool {
        self.remaining > 0.0
    }

    pub fn remaining(&self) -> f32 {
        self.remaining.max(0.0)
    }

    /// Whether a lethal hit can be nullified right now
    pub const fn can_trigger(&self, equipped: bool) -> bool {
        equipped && self.available
    }

    /// Spend the charm; returns false when it was already used
    pub fn trigger(&mut self, duration: f32, defense_bonus: i32) -> bool {
        if !self.available {
            return false;
        }
        self.available = false;
        self.remaining = duration.max(0.0);
        self.defense_bonus = defense_bonus;
        true
    }

    /// Count the overlay down; returns true on the frame it ends
    pub fn tick(&mut self, dt: f32) -> bool {
        if !self.is_active() {
            return false;
        }
        self.remaining -= dt;
        if self.remaining <= TIME_EPSILON {
            self.remaining = 0.0;
            self.defense_bonus = 0;
            return true;
        }
        false
    }

    /// Extra defense while the overlay is active
    pub fn defense_bonus(&self) -> i32 {
        if self.is_active() { self.defense_bonus } else { 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_use() {
        let mut dd = DeathDefiance::new();
        assert!(dd.can_trigger(true));
        assert!(!dd.can_trigger(false));
        assert!(dd.trigger(3.0, 9999));
        assert!(!dd.can_trigger(true));
        assert!(!dd.trigger(3.0, 9999));
    }

    #[test]
    fn test_overlay_expires() {
        let mut dd = DeathDefiance::new();
        dd.trigger(1.0, 9999);
        assert!(dd.is_active());
        assert_eq!(dd.defense_bonus(), 9999);
        for _ in 0..9 {
            assert!(!dd.tick(0.1));
        }
        assert!(dd.tick(0.1));
        assert!(!dd.is_active());
        assert_eq!(dd.defense_bonus(), 0);
        assert!(!dd.is_available());
    }
}
