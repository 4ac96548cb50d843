//! The combat turn controller

use std::collections::VecDeque;

use hashbrown::HashMap;
use log::{debug, info, warn};

use super::action::{ActionEffect, ItemId, PlayerAction};
use super::bars::{CombatBars, StatBar};
use super::defiance::DeathDefiance;
use super::enemy::Enemy;
use super::player::{Buff, PlayerSnapshot, PlayerStats};
use super::{CombatOutcome, CombatReport, FrameInput, FrameReport, TurnPhase};
use crate::consts::{MIN_HIT_DAMAGE, TIME_EPSILON};
use crate::error::CombatError;
use crate::geometry::ArenaBounds;
use crate::options::CombatOptions;
use crate::pattern::PatternConfig;
use crate::projectile::{BulletView, ProjectileEngine};
use crate::rng::GameRng;

/// What happened to one incoming hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitResolution {
    /// HP was reduced by this much
    Applied(i32),
    /// Immunity window or Death Defiance absorbed it
    Blocked,
    /// Would have been fatal; Death Defiance fired instead
    Defied,
    /// The player fell and the encounter is over
    Fatal,
}

/// One encounter between the player and an enemy
#[derive(Debug)]
pub struct CombatSession {
    phase: TurnPhase,
    player: PlayerStats,
    enemy: Enemy,
    engine: ProjectileEngine,
    rng: GameRng,
    options: CombatOptions,
    arena: ArenaBounds,

    snapshot: Option<PlayerSnapshot>,
    defiance: DeathDefiance,
    bars: CombatBars,

    pending_action: Option<PlayerAction>,
    /// Consumables used this fight, deducted from the inventory only on victory
    pending_items: HashMap<ItemId, u32>,
    dialogue: VecDeque<String>,
    messages: Vec<String>,
    outcome: Option<CombatOutcome>,
    report: Option<CombatReport>,

    turn_config: Option<PatternConfig>,
    spawn_timer: f32,
    end_phase_timer: f32,
    attack_timer: f32,
    /// Seconds of hit immunity left
    immunity_timer: f32,
    batches_spawned: u32,
    confirm_count: u32,
    turns: u32,
    elapsed: f32,
}

impl CombatSession {
    pub fn new(player: PlayerStats, enemy: Enemy, options: CombatOptions, rng: GameRng) -> Self {
        let arena = ArenaBounds::default();
        let engine = ProjectileEngine::new(arena, &options);
        let bars = CombatBars {
            player_hp: StatBar::new(player.hp, player.max_hp),
            player_mp: StatBar::new(player.mp, player.max_mp),
            enemy_hp: StatBar::new(enemy.hp, enemy.max_hp),
        };
        info!(
            "combat started: {} ({}/{} HP) vs {} ({} HP)",
            player.name, player.hp, player.max_hp, enemy.name, enemy.hp
        );

        let mut dialogue = VecDeque::new();
        dialogue.push_back(format!("{} blocks the way!", enemy.name));

        Self {
            phase: TurnPhase::DialogueIdle,
            snapshot: Some(PlayerSnapshot::capture(&player)),
            player,
            enemy,
            engine,
            rng,
            options,
            arena,
            defiance: DeathDefiance::new(),
            bars,
            pending_action: None,
            pending_items: HashMap::new(),
            dialogue,
            messages: Vec::new(),
            outcome: None,
            report: None,
            turn_config: None,
            spawn_timer: 0.0,
            end_phase_timer: 0.0,
            attack_timer: 0.0,
            immunity_timer: 0.0,
            batches_spawned: 0,
            confirm_count: 0,
            turns: 0,
            elapsed: 0.0,
        }
    }

    // Accessors

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    pub fn player(&self) -> &PlayerStats {
        &self.player
    }

    pub fn enemy(&self) -> &Enemy {
        &self.enemy
    }

    pub fn engine(&self) -> &ProjectileEngine {
        &self.engine
    }

    pub fn arena(&self) -> ArenaBounds {
        self.arena
    }

    pub fn options(&self) -> &CombatOptions {
        &self.options
    }

    pub fn bars(&self) -> &CombatBars {
        &self.bars
    }

    pub fn death_defiance(&self) -> &DeathDefiance {
        &self.defiance
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Line currently in the dialogue box
    pub fn current_dialogue(&self) -> Option<&str> {
        self.dialogue.front().map(String::as_str)
    }

    pub fn outcome(&self) -> Option<CombatOutcome> {
        self.outcome
    }

    pub fn report(&self) -> Option<&CombatReport> {
        self.report.as_ref()
    }

    pub fn is_over(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn turns(&self) -> u32 {
        self.turns
    }

    pub fn batches_spawned(&self) -> u32 {
        self.batches_spawned
    }

    pub fn bullet_views(&self) -> Vec<BulletView> {
        self.engine.views()
    }

    /// Pattern driving the current enemy turn
    pub fn turn_config(&self) -> Option<&PatternConfig> {
        self.turn_config.as_ref()
    }

    pub fn is_immune(&self) -> bool {
        self.immunity_timer > 0.0 || self.defiance.is_active()
    }

    /// Defense used against bullets, including the Death Defiance bonus
    pub fn effective_defense(&self) -> i32 {
        self.player.effective_defense() + self.defiance.defense_bonus()
    }

    /// False on the "off" half of each blink while the immunity window runs
    pub fn player_visible(&self) -> bool {
        if self.immunity_timer <= 0.0 || self.options.blink_interval <= 0.0 {
            return true;
        }
        let since_hit = self.options.immunity_duration - self.immunity_timer;
        (since_hit / self.options.blink_interval) as u32 % 2 == 0
    }

    /// Consumables still usable this fight
    pub fn available_items(&self, item: ItemId) -> u32 {
        let reserved = self.pending_items.get(&item).copied().unwrap_or(0);
        self.player.inventory.count(item).saturating_sub(reserved)
    }

    /// Hand the player back to the caller once combat is over
    pub fn into_player(self) -> PlayerStats {
        self.player
    }

    // Frame stepping

    pub fn advance(&mut self, dt: f32, input: &FrameInput) -> Result<FrameReport, CombatError> {
        if self.phase.is_terminal() {
            return Err(CombatError::CombatOver);
        }
        let dt = dt.max(0.0);
        self.elapsed += dt;
        let before = self.phase;
        let mut report = FrameReport::default();

        self.tick_protection(dt);

        match self.phase {
            TurnPhase::DialogueIdle => {
                if input.skip_pressed {
                    self.dialogue.pop_front();
                }
                if self.dialogue.is_empty() {
                    self.set_phase(TurnPhase::PlayerSelect);
                }
            }
            TurnPhase::PlayerSelect | TurnPhase::ItemMenu | TurnPhase::SkillMenu => {}
            TurnPhase::AttackSequence => {
                self.attack_timer += dt;
                if self.attack_timer + TIME_EPSILON >= self.options.attack_sequence_duration {
                    self.resolve_pending_action();
                }
            }
            TurnPhase::DelayedTransition => {
                if input.skip_pressed {
                    self.confirm_count += 1;
                }
                if self.confirm_count >= self.options.confirm_presses.max(1) {
                    self.begin_enemy_turn()?;
                }
            }
            TurnPhase::EnemyTurn => self.run_enemy_turn(dt, input, &mut report)?,
            TurnPhase::EndPhaseDelay => {
                self.end_phase_timer += dt;
                let delay = self.turn_config.map(|c| c.end_phase_delay).unwrap_or(0.0);
                if self.end_phase_timer + TIME_EPSILON >= delay {
                    self.end_enemy_turn();
                }
            }
            TurnPhase::Defeated | TurnPhase::Concluded => {}
        }

        self.sync_bars(dt);
        if self.phase != before {
            report.transition = Some((before, self.phase));
        }
        Ok(report)
    }

    fn tick_protection(&mut self, dt: f32) {
        if self.immunity_timer > 0.0 {
            self.immunity_timer = (self.immunity_timer - dt).max(0.0);
            if self.immunity_timer <= TIME_EPSILON {
                self.immunity_timer = 0.0;
            }
        }
        if self.defiance.tick(dt) {
            debug!("death defiance expired");
            self.messages.push("Death Defiance fades.".to_string());
        }
    }

    fn sync_bars(&mut self, dt: f32) {
        self.bars.player_hp.set_target(self.player.hp);
        self.bars.player_mp.set_target(self.player.mp);
        self.bars.enemy_hp.set_target(self.enemy.hp);
        self.bars.update(dt, self.options.bar_speed);
    }

    fn set_phase(&mut self, next: TurnPhase) {
        if self.phase != next {
            debug!("phase {} -> {}", self.phase, next);
            self.phase = next;
        }
    }

    // Player turn

    pub fn open_item_menu(&mut self) -> Result<(), CombatError> {
        self.switch_menu(TurnPhase::ItemMenu)
    }

    pub fn open_skill_menu(&mut self) -> Result<(), CombatError> {
        self.switch_menu(TurnPhase::SkillMenu)
    }

    pub fn close_menu(&mut self) -> Result<(), CombatError> {
        self.switch_menu(TurnPhase::PlayerSelect)
    }

    fn switch_menu(&mut self, target: TurnPhase) -> Result<(), CombatError> {
        if self.phase.is_terminal() {
            return Err(CombatError::CombatOver);
        }
        if !self.phase.accepts_actions() {
            return Err(CombatError::ActionNotAllowed { phase: self.phase });
        }
        self.set_phase(target);
        Ok(())
    }

    /// Choose the player's action; rejected choices leave the phase untouched
    pub fn request_action(&mut self, action: PlayerAction) -> Result<(), CombatError> {
        if self.phase.is_terminal() {
            return Err(CombatError::CombatOver);
        }
        if !self.phase.accepts_actions() {
            return Err(CombatError::ActionNotAllowed { phase: self.phase });
        }

        match action {
            PlayerAction::Attack => {}
            PlayerAction::Skill(skill) => {
                let cost = skill.mp_cost();
                if self.player.mp < cost {
                    return Err(self.reject(CombatError::InsufficientResource {
                        resource: "MP",
                        required: cost,
                        available: self.player.mp,
                    }));
                }
                self.player.mp -= cost;
            }
            PlayerAction::Item(item) => {
                if self.available_items(item) == 0 {
                    return Err(self.reject(CombatError::ItemUnavailable {
                        item: item.to_string(),
                    }));
                }
                *self.pending_items.entry(item).or_insert(0) += 1;
            }
            PlayerAction::Retreat => {
                self.messages.push(format!("{} retreats.", self.player.name));
                self.conclude(CombatOutcome::Retreated);
                return Ok(());
            }
        }

        debug!("{} chose {:?}", self.player.name, action);
        self.pending_action = Some(action);
        self.attack_timer = 0.0;
        self.set_phase(TurnPhase::AttackSequence);
        Ok(())
    }

    fn reject(&mut self, err: CombatError) -> CombatError {
        self.messages.push(err.to_string());
        err
    }

    fn resolve_pending_action(&mut self) {
        if let Some(action) = self.pending_action.take() {
            match action {
                PlayerAction::Attack => self.strike(1.0, false, "Attack"),
                PlayerAction::Skill(skill) => self.apply_effect(skill.effect(), &skill.to_string()),
                PlayerAction::Item(item) => self.apply_effect(item.effect(), &item.to_string()),
                PlayerAction::Retreat => {}
            }
        }

        if self.enemy.is_alive() {
            self.confirm_count = 0;
            self.set_phase(TurnPhase::DelayedTransition);
        } else {
            self.messages.push(format!("{} is defeated!", self.enemy.name));
            self.conclude(CombatOutcome::Victory);
        }
    }

    fn apply_effect(&mut self, effect: ActionEffect, source: &str) {
        let name = self.player.name.clone();
        match effect {
            ActionEffect::Strike {
                multiplier,
                ignore_defense,
            } => self.strike(multiplier, ignore_defense, source),
            ActionEffect::HealPercent(percent) => {
                let healed = self.player.heal(self.player.max_hp * percent / 100);
                self.messages.push(format!("{source} restores {healed} HP."));
            }
            ActionEffect::Heal(amount) => {
                let healed = self.player.heal(amount);
                self.messages.push(format!("{source} restores {healed} HP."));
            }
            ActionEffect::RestoreMp(amount) => {
                let restored = self.player.restore_mp(amount);
                self.messages.push(format!("{source} restores {restored} MP."));
            }
            ActionEffect::Buff { stat, amount, turns } => {
                self.player.buffs.add(Buff::new(stat, amount, turns, source));
                self.messages
                    .push(format!("{name} gains +{amount} {stat} for {turns} turns."));
            }
        }
    }

    fn strike(&mut self, multiplier: f32, ignore_defense: bool, source: &str) {
        let roll = self.player.effective_attack() as f32 * multiplier * self.rng.range_f32(0.9, 1.1);
        let defense = if ignore_defense { 0 } else { self.enemy.defense };
        let damage = (roll.round() as i32 - defense).max(MIN_HIT_DAMAGE);
        let dealt = self.enemy.take_damage(damage);
        debug!("{source} hits {} for {dealt}", self.enemy.name);
        self.messages
            .push(format!("{source} deals {dealt} damage to {}.", self.enemy.name));
    }

    // Enemy turn

    fn begin_enemy_turn(&mut self) -> Result<(), CombatError> {
        self.engine.clear();
        self.spawn_timer = 0.0;
        self.end_phase_timer = 0.0;
        self.batches_spawned = 0;

        let config = match self.enemy.start_turn(&mut self.rng) {
            Ok(config) => config,
            Err(err) => {
                warn!("{} cannot attack: {err}", self.enemy.name);
                self.messages.push(format!("{} hesitates.", self.enemy.name));
                self.turn_config = None;
                self.set_phase(TurnPhase::PlayerSelect);
                return Err(err);
            }
        };

        let (arena, clamped) = ArenaBounds::clamped(config.arena.width, config.arena.height);
        if clamped {
            warn!(
                "arena {}x{} clamped to {}x{}",
                config.arena.width, config.arena.height, arena.width, arena.height
            );
        }
        self.arena = arena;
        self.engine.set_viewport(arena);
        self.turn_config = Some(PatternConfig { arena, ..config });
        self.set_phase(TurnPhase::EnemyTurn);
        Ok(())
    }

    fn run_enemy_turn(&mut self, dt: f32, input: &FrameInput, report: &mut FrameReport) -> Result<(), CombatError> {
        self.enemy.observe_player(input.player_hitbox.center());

        let max_batches = self.enemy.max_bullets;
        let interval = self.enemy.attack_interval.max(0.0);
        if self.batches_spawned < max_batches {
            self.spawn_timer += dt;
            while self.batches_spawned < max_batches && self.spawn_timer + TIME_EPSILON >= interval {
                self.spawn_timer -= interval;
                let batch = match self.enemy.spawn_batch(&self.arena, &mut self.rng) {
                    Ok(batch) => batch,
                    Err(err) => {
                        warn!("enemy turn aborted: {err}");
                        self.engine.clear();
                        self.enemy.end_turn();
                        self.set_phase(TurnPhase::PlayerSelect);
                        return Err(err);
                    }
                };
                self.batches_spawned += 1;
                report.batches_spawned += 1;
                debug!(
                    "batch {}/{} spawned {} bullets at {:.2}s",
                    self.batches_spawned,
                    max_batches,
                    batch.len(),
                    self.elapsed
                );
                self.engine.spawn_batch(batch);
            }
        }

        let events = self.engine.advance(dt, &input.player_hitbox);
        for heal in &events.heals {
            report.healed += self.player.heal(heal.amount);
        }
        for hit in &events.damage {
            match self.apply_player_damage(hit.amount) {
                HitResolution::Applied(amount) => report.damage_taken += amount,
                HitResolution::Blocked => report.hits_blocked += 1,
                HitResolution::Defied => report.death_defied = true,
                HitResolution::Fatal => return Ok(()),
            }
        }

        if self.batches_spawned >= max_batches && self.engine.is_empty() {
            debug!("storm cleared at {:.2}s", self.elapsed);
            self.end_phase_timer = 0.0;
            self.set_phase(TurnPhase::EndPhaseDelay);
        }
        Ok(())
    }

    /// Run one incoming hit through immunity, defense and Death Defiance
    pub fn apply_player_damage(&mut self, raw: i32) -> HitResolution {
        if self.phase.is_terminal() || raw <= 0 || self.is_immune() {
            return HitResolution::Blocked;
        }

        let amount = (raw - self.effective_defense()).max(MIN_HIT_DAMAGE);
        if self.player.hp - amount > 0 {
            self.player.hp -= amount;
            self.immunity_timer = self.options.immunity_duration;
            return HitResolution::Applied(amount);
        }

        if self.defiance.can_trigger(self.player.death_defiance)
            && self.defiance.trigger(
                self.options.death_defiance_duration,
                self.options.death_defiance_defense,
            )
        {
            self.player.hp = self.player.max_hp;
            info!("{} triggered Death Defiance", self.player.name);
            self.messages
                .push(format!("Death Defiance! {} refuses to fall.", self.player.name));
            return HitResolution::Defied;
        }

        self.player.hp = 0;
        info!("{} fell to {}", self.player.name, self.enemy.name);
        self.messages.push(format!("{} has fallen...", self.player.name));
        self.conclude(CombatOutcome::Lost);
        HitResolution::Fatal
    }

    fn end_enemy_turn(&mut self) {
        self.enemy.end_turn();
        self.engine.clear();
        self.turn_config = None;
        self.batches_spawned = 0;
        self.spawn_timer = 0.0;
        self.end_phase_timer = 0.0;
        self.turns += 1;

        for buff in self.player.buffs.tick_turn() {
            debug!("buff {} ({}) expired", buff.source, buff.stat);
            self.messages.push(format!("{} wears off.", buff.source));
        }

        match self.enemy.pick_taunt(&mut self.rng) {
            Some(line) => {
                self.dialogue.push_back(line);
                self.set_phase(TurnPhase::DialogueIdle);
            }
            None => self.set_phase(TurnPhase::PlayerSelect),
        }
    }

    // Conclusion

    fn conclude(&mut self, outcome: CombatOutcome) {
        let mut consumables_used = Vec::new();
        let (mut gold_gained, mut experience_gained) = (0, 0);

        match outcome {
            CombatOutcome::Victory => {
                for (item, count) in self.pending_items.drain() {
                    let taken = self.player.inventory.take(item, count);
                    if taken > 0 {
                        consumables_used.push((item, taken));
                    }
                }
                consumables_used.sort_by_key(|(item, _)| *item as u8);
                gold_gained = self.enemy.gold_reward;
                experience_gained = self.enemy.experience_reward;
                self.player.gold += gold_gained;
                self.player.experience += experience_gained;
                self.player.buffs.clear();
                self.snapshot = None;
                self.set_phase(TurnPhase::Defeated);
            }
            CombatOutcome::Retreated | CombatOutcome::Lost => {
                if let Some(snapshot) = self.snapshot.take() {
                    snapshot.restore(&mut self.player);
                }
                self.pending_items.clear();
                self.set_phase(TurnPhase::Concluded);
            }
        }

        self.engine.clear();
        self.enemy.end_turn();
        self.pending_action = None;
        self.immunity_timer = 0.0;
        self.outcome = Some(outcome);
        self.report = Some(CombatReport {
            outcome,
            hp: self.player.hp,
            mp: self.player.mp,
            gold_gained,
            experience_gained,
            consumables_used,
            turns: self.turns,
            elapsed: self.elapsed,
        });
        self.sync_bars(0.0);
        self.bars.snap();
        info!("combat over: {outcome} after {} turns", self.turns);
    }
}
