//! Smoothed player velocity for predictive aiming

use glam::Vec2;

use crate::consts::{TRACKER_BLEND, TRACKER_DELTA_GAIN, TRACKER_RETAIN, TRACKER_SAMPLE_INTERVAL};

/// Exponentially smoothed estimate of how the player is moving
///
/// Sampled once every `TRACKER_SAMPLE_INTERVAL` observations:
/// `v = v * 0.7 + delta * 0.2 * 0.3`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerTracker {
    velocity: Vec2,
    last_sample: Option<Vec2>,
    calls: u32,
}

impl PlayerTracker {
    pub fn observe(&mut self, position: Vec2) {
        let Some(last) = self.last_sample else {
            self.last_sample = Some(position);
            return;
        };

        self.calls += 1;
        if self.calls < TRACKER_SAMPLE_INTERVAL {
            return;
        }
        self.calls = 0;

        let delta = position - last;
        self.velocity = self.velocity * TRACKER_RETAIN + delta * TRACKER_DELTA_GAIN * TRACKER_BLEND;
        self.last_sample = Some(position);
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Where to aim: the given position pushed ahead by the velocity estimate
    pub fn predict(&self, position: Vec2, lead_factor: f32) -> Vec2 {
        position + self.velocity * lead_factor
    }

    /// Drop the sampling baseline so the next delta starts fresh.
    ///
    /// The smoothed velocity carries over.
    pub fn reset(&mut self) {
        self.last_sample = None;
        self.calls = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stationary_player_has_no_velocity() {
        let mut t = PlayerTracker::default();
        for _ in 0..50 {
            t.observe(Vec2::new(100.0, 100.0));
        }
        assert_eq!(t.velocity(), Vec2::ZERO);
        assert_eq!(t.predict(Vec2::new(100.0, 100.0), 10.0), Vec2::new(100.0, 100.0));
    }

    #[test]
    fn test_samples_every_fifth_call() {
        let mut t = PlayerTracker::default();
        t.observe(Vec2::ZERO);
        for i in 1..5 {
            t.observe(Vec2::new(i as f32 * 10.0, 0.0));
            assert_eq!(t.velocity(), Vec2::ZERO);
        }
        t.observe(Vec2::new(50.0, 0.0));
        // delta 50 -> 50 * 0.2 * 0.3
        assert!((t.velocity().x - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_smoothing_retains_history() {
        let mut t = PlayerTracker::default();
        t.observe(Vec2::ZERO);
        for _ in 0..5 {
            t.observe(Vec2::new(50.0, 0.0));
        }
        let first = t.velocity().x;
        // player stops: estimate decays by 0.7 per sample
        for _ in 0..5 {
            t.observe(Vec2::new(50.0, 0.0));
        }
        assert!((t.velocity().x - first * 0.7).abs() < 1e-5);
    }

    #[test]
    fn test_prediction_leads_moving_player() {
        let mut t = PlayerTracker::default();
        let mut x = 0.0;
        for _ in 0..100 {
            x += 4.0;
            t.observe(Vec2::new(x, 0.0));
        }
        let aim = t.predict(Vec2::new(x, 0.0), 10.0);
        assert!(aim.x > x);
    }

    #[test]
    fn test_reset_ignores_movement_between_turns() {
        let mut t = PlayerTracker::default();
        for _ in 0..20 {
            t.observe(Vec2::new(100.0, 100.0));
        }
        t.reset();
        // player teleported while no one was watching, then stands still
        for _ in 0..6 {
            t.observe(Vec2::new(300.0, 100.0));
        }
        assert_eq!(t.velocity(), Vec2::ZERO);
        assert_eq!(t.predict(Vec2::new(300.0, 100.0), 12.0), Vec2::new(300.0, 100.0));
    }

    #[test]
    fn test_reset_keeps_smoothed_velocity() {
        let mut t = PlayerTracker::default();
        t.observe(Vec2::ZERO);
        for _ in 0..5 {
            t.observe(Vec2::new(50.0, 0.0));
        }
        let before = t.velocity();
        t.reset();
        assert_eq!(t.velocity(), before);
    }
}
