//! Animated HP/MP bars, separate from the authoritative values

use crate::consts::MIN_BAR_SPEED;

/// A displayed value chasing its target
///
/// Catches up at `gap * rate` units per second with a floor of `MIN_BAR_SPEED`,
/// so big hits drain fast and small ones still settle quickly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatBar {
    displayed: f32,
    target: f32,
    max: f32,
}

impl StatBar {
    pub fn new(value: i32, max: i32) -> Self {
        Self {
            displayed: value as f32,
            target: value as f32,
            max: max.max(1) as f32,
        }
    }

    pub fn set_target(&mut self, value: i32) {
        self.target = value as f32;
    }

    /// Jump straight to the target
    pub fn snap(&mut self) {
        self.displayed = self.target;
    }

    pub fn update(&mut self, dt: f32, rate: f32) {
        let gap = self.target - self.displayed;
        if gap == 0.0 {
            return;
        }
        let step = (gap.abs() * rate).max(MIN_BAR_SPEED) * dt;
        if step >= gap.abs() {
            self.displayed = self.target;
        } else {
            self.displayed += step.copysign(gap);
        }
    }

    pub fn displayed(&self) -> f32 {
        self.displayed
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    /// Displayed fill in `0.0..=1.0`
    pub fn fraction(&self) -> f32 {
        (self.displayed / self.max).clamp(0.0, 1.0)
    }

    pub fn is_settled(&self) -> bool {
        self.displayed == self.target
    }
}

/// The three bars shown during combat
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CombatBars {
    pub player_hp: StatBar,
    pub player_mp: StatBar,
    pub enemy_hp: StatBar,
}

impl CombatBars {
    pub fn update(&mut self, dt: f32, rate: f32) {
        self.player_hp.update(dt, rate);
        self.player_mp.update(dt, rate);
        self.enemy_hp.update(dt, rate);
    }

    pub fn snap(&mut self) {
        self.player_hp.snap();
        self.player_mp.snap();
        self.enemy_hp.snap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moves_towards_target_without_overshoot() {
        let mut bar = StatBar::new(100, 100);
        bar.set_target(40);
        let mut last = bar.displayed();
        for _ in 0..200 {
            bar.update(1.0 / 60.0, 6.0);
            assert!(bar.displayed() <= last);
            assert!(bar.displayed() >= 40.0);
            last = bar.displayed();
        }
        assert!(bar.is_settled());
    }

    #[test]
    fn test_bigger_gap_moves_faster() {
        let mut small = StatBar::new(100, 100);
        let mut big = StatBar::new(100, 100);
        small.set_target(90);
        big.set_target(10);
        small.update(0.05, 6.0);
        big.update(0.05, 6.0);
        assert!(100.0 - big.displayed() > 100.0 - small.displayed());
    }

    #[test]
    fn test_fraction() {
        let mut bar = StatBar::new(25, 50);
        assert!((bar.fraction() - 0.5).abs() < 1e-6);
        bar.set_target(60);
        bar.snap();
        assert_eq!(bar.fraction(), 1.0);
    }

    #[test]
    fn test_rises_for_heals() {
        let mut bar = StatBar::new(10, 100);
        bar.set_target(30);
        bar.update(0.1, 6.0);
        assert!(bar.displayed() > 10.0);
    }
}
