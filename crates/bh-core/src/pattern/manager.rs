//! Shuffle-bag selection of attack patterns

use log::debug;

use super::PatternStrategy;
use crate::error::CombatError;
use crate::rng::GameRng;

/// Holds an enemy's patterns and deals them out without repeats
///
/// Every registered pattern is used once before any is used again. When the
/// bag runs dry it is refilled from the full set.
#[derive(Debug, Default)]
pub struct PatternManager {
    available: Vec<Box<dyn PatternStrategy>>,
    unused: Vec<&'static str>,
    current: Option<&'static str>,
}

impl PatternManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a manager from a list of patterns, rejecting duplicate names
    pub fn with_patterns(
        patterns: impl IntoIterator<Item = Box<dyn PatternStrategy>>,
    ) -> Result<Self, CombatError> {
        let mut manager = Self::new();
        for pattern in patterns {
            manager.register(pattern)?;
        }
        Ok(manager)
    }

    pub fn register(&mut self, pattern: Box<dyn PatternStrategy>) -> Result<(), CombatError> {
        let name = pattern.name();
        if self.contains(name) {
            return Err(CombatError::DuplicatePattern(name.to_string()));
        }
        self.available.push(pattern);
        self.unused.push(name);
        Ok(())
    }

    /// Draw the next pattern from the bag
    pub fn select_next(&mut self, rng: &mut GameRng) -> Result<&mut dyn PatternStrategy, CombatError> {
        if self.available.is_empty() {
            return Err(CombatError::EmptyPatternSet);
        }
        if self.unused.is_empty() {
            self.unused = self.available.iter().map(|p| p.name()).collect();
            debug!("pattern bag refilled with {} patterns", self.unused.len());
        }

        let index = rng.pick_index(self.unused.len()).ok_or(CombatError::EmptyPatternSet)?;
        let name = self.unused.swap_remove(index);
        self.current = Some(name);
        debug!("selected pattern {name}");

        self.get_mut(name)
            .ok_or_else(|| CombatError::UnknownPattern(name.to_string()))
    }

    pub fn current(&self) -> Option<&dyn PatternStrategy> {
        self.current.and_then(|name| self.get(name))
    }

    pub fn current_mut(&mut self) -> Option<&mut dyn PatternStrategy> {
        let name = self.current?;
        self.get_mut(name)
    }

    pub fn current_name(&self) -> Option<&'static str> {
        self.current
    }

    /// Forget the current selection once its turn is over
    pub fn release_current(&mut self) {
        self.current = None;
    }

    pub fn get(&self, name: &str) -> Option<&dyn PatternStrategy> {
        self.available
            .iter()
            .find(|p| p.name() == name)
            .map(|p| p.as_ref())
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut dyn PatternStrategy> {
        let pattern = self.available.iter_mut().find(|p| p.name() == name)?;
        Some(pattern.as_mut())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.available.iter().any(|p| p.name() == name)
    }

    /// Remove a pattern from the pool and the bag
    pub fn remove(&mut self, name: &str) -> Option<Box<dyn PatternStrategy>> {
        let index = self.available.iter().position(|p| p.name() == name)?;
        self.unused.retain(|n| *n != name);
        if self.current == Some(self.available[index].name()) {
            self.current = None;
        }
        Some(self.available.remove(index))
    }

    pub fn clear(&mut self) {
        self.available.clear();
        self.unused.clear();
        self.current = None;
    }

    pub fn len(&self) -> usize {
        self.available.len()
    }

    pub fn is_empty(&self) -> bool {
        self.available.is_empty()
    }

    /// Patterns still waiting in the current bag
    pub fn remaining_in_bag(&self) -> usize {
        self.unused.len()
    }
}
