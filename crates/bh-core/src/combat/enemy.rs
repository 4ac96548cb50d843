//! The enemy side of an encounter

use glam::Vec2;
use log::debug;

use crate::error::CombatError;
use crate::geometry::ArenaBounds;
use crate::pattern::{EnemyContext, PatternConfig, PatternManager, PatternStrategy};
use crate::projectile::ProjectileSpec;
use crate::rng::GameRng;

/// An opponent and the patterns it attacks with
#[derive(Debug)]
pub struct Enemy {
    pub name: String,
    pub hp: i32,
    pub max_hp: i32,
    pub defense: i32,
    /// Scales pattern damage by `1 + modifier * 0.1`
    pub attack_modifier: f32,
    /// Batches spawned per enemy turn
    pub max_bullets: u32,
    /// Seconds between batches
    pub attack_interval: f32,
    pub position: Vec2,
    pub gold_reward: u32,
    pub experience_reward: u32,
    /// Lines the enemy may say after its turn
    pub taunts: Vec<String>,
    patterns: PatternManager,
    player_position: Vec2,
}

impl Enemy {
    pub fn new(name: impl Into<String>, max_hp: i32, patterns: PatternManager) -> Self {
        Self {
            name: name.into(),
            hp: max_hp,
            max_hp,
            defense: 0,
            attack_modifier: 0.0,
            max_bullets: 3,
            attack_interval: 0.5,
            position: Vec2::new(240.0, 30.0),
            gold_reward: 0,
            experience_reward: 0,
            taunts: Vec::new(),
            patterns,
            player_position: Vec2::ZERO,
        }
    }

    pub fn with_defense(mut self, defense: i32) -> Self {
        self.defense = defense;
        self
    }

    pub fn with_attack_modifier(mut self, modifier: f32) -> Self {
        self.attack_modifier = modifier;
        self
    }

    pub fn with_timing(mut self, max_bullets: u32, attack_interval: f32) -> Self {
        self.max_bullets = max_bullets;
        self.attack_interval = attack_interval;
        self
    }

    pub fn with_rewards(mut self, gold: u32, experience: u32) -> Self {
        self.gold_reward = gold;
        self.experience_reward = experience;
        self
    }

    pub fn with_taunts(mut self, taunts: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.taunts = taunts.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Apply damage; returns the amount actually taken
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        let taken = amount.clamp(0, self.hp.max(0));
        self.hp -= taken;
        taken
    }

    pub fn patterns(&self) -> &PatternManager {
        &self.patterns
    }

    pub fn patterns_mut(&mut self) -> &mut PatternManager {
        &mut self.patterns
    }

    pub fn current_pattern_config(&self) -> Option<PatternConfig> {
        self.patterns.current().map(|p| *p.config())
    }

    /// Arena the current pattern asks for, or the default outside an enemy turn
    pub fn arena(&self) -> ArenaBounds {
        self.current_pattern_config()
            .map(|c| c.arena)
            .unwrap_or_default()
    }

    pub fn player_position(&self) -> Vec2 {
        self.player_position
    }

    /// Track the player once per frame; feeds the current pattern's aim predictor
    pub fn observe_player(&mut self, position: Vec2) {
        self.player_position = position;
        if let Some(pattern) = self.patterns.current_mut() {
            pattern.observe(position);
        }
    }

    pub fn context(&self, arena: ArenaBounds) -> EnemyContext {
        EnemyContext {
            player_position: self.player_position,
            enemy_position: self.position,
            attack_modifier: self.attack_modifier,
            arena,
            max_bullets: self.max_bullets,
            attack_interval: self.attack_interval,
            pattern: self.current_pattern_config(),
        }
    }

    /// Draw the pattern for this turn
    pub fn start_turn(&mut self, rng: &mut GameRng) -> Result<PatternConfig, CombatError> {
        let pattern = self.patterns.select_next(rng)?;
        pattern.state_mut().tracker.reset();
        debug!("{} starts turn with {}", self.name, pattern.name());
        Ok(*pattern.config())
    }

    /// Next batch from the current pattern
    pub fn spawn_batch(&mut self, arena: &ArenaBounds, rng: &mut GameRng) -> Result<Vec<ProjectileSpec>, CombatError> {
        let ctx = self.context(*arena);
        let pattern = self
            .patterns
            .current_mut()
            .ok_or(CombatError::EmptyPatternSet)?;
        Ok(pattern.generate(&ctx, arena, rng))
    }

    pub fn end_turn(&mut self) {
        self.patterns.release_current();
    }

    /// A taunt to show after the turn, if the enemy has any
    pub fn pick_taunt(&self, rng: &mut GameRng) -> Option<String> {
        rng.choose(&self.taunts).cloned()
    }
}
