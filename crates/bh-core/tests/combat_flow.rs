//! Combat turn controller: enemy turn timing, Death Defiance, rollback and commit

use bh_core::combat::{HitResolution, Inventory};
use bh_core::pattern::{EnemyContext, PatternConfig, PatternState, standard_patterns};
use bh_core::{
    ArenaBounds, CombatError, CombatOptions, CombatOutcome, CombatSession, Enemy, FrameInput,
    GameRng, ItemId, PatternManager, PatternStrategy, PlayerAction, PlayerStats, ProjectileSpec,
    Rect, SkillId, TurnPhase,
};
use glam::Vec2;

// ============================================================================
// Helpers
// ============================================================================

const PLAYER_CENTER: Vec2 = Vec2::new(400.0, 300.0);

/// One bullet per batch; `lethal` aims it straight at the player
#[derive(Debug)]
struct Pulse {
    config: PatternConfig,
    state: PatternState,
    damage: i32,
    lethal: bool,
}

impl Pulse {
    fn boxed(end_phase_delay: f32, damage: i32, lethal: bool) -> Box<dyn PatternStrategy> {
        Box::new(Self {
            config: PatternConfig {
                end_phase_delay,
                ..PatternConfig::default()
            },
            state: PatternState::new(1),
            damage,
            lethal,
        })
    }
}

impl PatternStrategy for Pulse {
    fn name(&self) -> &'static str {
        "pulse"
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

    fn generate(&mut self, ctx: &EnemyContext, _: &ArenaBounds, _: &mut GameRng) -> Vec<ProjectileSpec> {
        self.state.next_phase();
        let spec = if self.lethal {
            ProjectileSpec::new(ctx.player_position, Vec2::ZERO, self.damage)
        } else {
            // a corner spark that burns out almost immediately
            ProjectileSpec::new(Vec2::new(20.0, 20.0), Vec2::ZERO, self.damage).with_fuse(0.05)
        };
        vec![spec]
    }
}

fn enemy_with(pattern: Box<dyn PatternStrategy>, hp: i32, max_bullets: u32, interval: f32) -> Enemy {
    let patterns = PatternManager::with_patterns([pattern]).unwrap();
    Enemy::new("Lantern Moth", hp, patterns)
        .with_timing(max_bullets, interval)
        .with_rewards(20, 45)
}

fn hero() -> PlayerStats {
    PlayerStats::new("Ada", 40, 20, 9, 2).with_inventory(
        Inventory::new()
            .with_item(ItemId::Tonic, 2)
            .with_item(ItemId::Ether, 1),
    )
}

fn input() -> FrameInput {
    FrameInput::new(Rect::from_center(PLAYER_CENTER, Vec2::splat(6.0)))
}

fn start(player: PlayerStats, enemy: Enemy) -> CombatSession {
    let mut session = CombatSession::new(player, enemy, CombatOptions::default(), GameRng::new(2024));
    session.advance(0.0, &input().with_skip()).unwrap();
    assert_eq!(session.phase(), TurnPhase::PlayerSelect);
    session
}

/// Play out the chosen action and confirm through to the start of the enemy turn
fn into_enemy_turn(session: &mut CombatSession, action: PlayerAction) {
    session.request_action(action).unwrap();
    for _ in 0..100 {
        if session.phase() != TurnPhase::AttackSequence {
            break;
        }
        session.advance(0.1, &input()).unwrap();
    }
    assert_eq!(session.phase(), TurnPhase::DelayedTransition);
    session.advance(0.0, &input().with_skip()).unwrap();
    session.advance(0.0, &input().with_skip()).unwrap();
    assert_eq!(session.phase(), TurnPhase::EnemyTurn);
}

/// Step until the phase leaves the enemy turn, returning whether Death Defiance fired
fn finish_enemy_turn(session: &mut CombatSession) -> bool {
    let mut defied = false;
    for _ in 0..2000 {
        if !matches!(session.phase(), TurnPhase::EnemyTurn | TurnPhase::EndPhaseDelay) {
            break;
        }
        let report = session.advance(0.05, &input()).unwrap();
        defied |= report.death_defied;
    }
    defied
}

// ============================================================================
// Enemy turn timing
// ============================================================================

#[test]
fn test_enemy_turn_timeline() {
    let enemy = enemy_with(Pulse::boxed(2.0, 3, false), 500, 3, 0.5);
    let mut session = start(hero(), enemy);
    into_enemy_turn(&mut session, PlayerAction::Attack);

    let dt = 0.1;
    let mut spawn_times = Vec::new();
    let mut cleared_at = None;
    let mut done_at = None;

    for frame in 1..=60 {
        let t = frame as f32 * dt;
        let report = session.advance(dt, &input()).unwrap();
        for _ in 0..report.batches_spawned {
            spawn_times.push(t);
        }
        match report.transition {
            Some((TurnPhase::EnemyTurn, TurnPhase::EndPhaseDelay)) => {
                assert!(session.engine().is_empty());
                cleared_at = Some(t);
            }
            Some((TurnPhase::EndPhaseDelay, TurnPhase::PlayerSelect)) => {
                done_at = Some(t);
                break;
            }
            _ => {}
        }
    }

    assert_eq!(spawn_times.len(), 3);
    for (got, want) in spawn_times.iter().zip([0.5, 1.0, 1.5]) {
        assert!((got - want).abs() < 1e-3, "spawn at {got}, expected {want}");
    }
    let cleared_at = cleared_at.expect("storm never cleared");
    let done_at = done_at.expect("turn never ended");
    assert!((cleared_at - 1.5).abs() < 1e-3);
    assert!((done_at - cleared_at - 2.0).abs() < 1e-3);
    assert_eq!(session.turns(), 1);
}

#[test]
fn test_end_phase_delay_counts_from_clear() {
    let enemy = enemy_with(Pulse::boxed(0.5, 3, false), 500, 1, 0.2);
    let mut session = start(hero(), enemy);
    into_enemy_turn(&mut session, PlayerAction::Attack);
    session.advance(0.2, &input()).unwrap();
    // fuse spent on the spawn frame, storm cleared at once
    assert_eq!(session.phase(), TurnPhase::EndPhaseDelay);
    session.advance(0.3, &input()).unwrap();
    assert_eq!(session.phase(), TurnPhase::EndPhaseDelay);
    session.advance(0.2, &input()).unwrap();
    assert_eq!(session.phase(), TurnPhase::PlayerSelect);
}

#[test]
fn test_arena_follows_pattern() {
    let mut patterns = PatternManager::new();
    patterns
        .register(Box::new(bh_core::pattern::ThreadCage::new()))
        .unwrap();
    let enemy = Enemy::new("Spinner", 500, patterns).with_timing(1, 0.5);
    let mut session = start(hero(), enemy);
    into_enemy_turn(&mut session, PlayerAction::Attack);
    assert_eq!(session.arena(), ArenaBounds::new(360.0, 360.0));
}

// ============================================================================
// Death Defiance
// ============================================================================

#[test]
fn test_death_defiance_only_once() {
    let mut session = start(hero().with_death_defiance(true), enemy_with(Pulse::boxed(0.5, 3, false), 500, 1, 0.5));

    assert_eq!(session.apply_player_damage(1000), HitResolution::Defied);
    assert_eq!(session.player().hp, 40);
    assert!(session.death_defiance().is_active());
    assert!(session.effective_defense() >= 9999);
    // overlay blocks everything while it lasts
    assert_eq!(session.apply_player_damage(1000), HitResolution::Blocked);

    for _ in 0..32 {
        session.advance(0.1, &input()).unwrap();
    }
    assert!(!session.death_defiance().is_active());
    assert!(!session.death_defiance().is_available());

    assert_eq!(session.apply_player_damage(1000), HitResolution::Fatal);
    assert_eq!(session.outcome(), Some(CombatOutcome::Lost));
    assert_eq!(session.phase(), TurnPhase::Concluded);
}

#[test]
fn test_death_defiance_through_bullets() {
    let enemy = enemy_with(Pulse::boxed(0.5, 1000, true), 100_000, 1, 0.3);
    let mut session = start(hero().with_death_defiance(true), enemy);

    let mut defied = 0;
    for _ in 0..10 {
        if session.is_over() {
            break;
        }
        into_enemy_turn(&mut session, PlayerAction::Attack);
        if finish_enemy_turn(&mut session) {
            defied += 1;
        }
    }

    assert_eq!(defied, 1);
    assert_eq!(session.outcome(), Some(CombatOutcome::Lost));
    assert!(session.messages().iter().any(|m| m.starts_with("Death Defiance!")));
}

#[test]
fn test_without_charm_first_lethal_hit_ends_combat() {
    let mut session = start(hero(), enemy_with(Pulse::boxed(0.5, 3, false), 500, 1, 0.5));
    assert_eq!(session.apply_player_damage(1000), HitResolution::Fatal);
    assert_eq!(session.advance(0.1, &input()), Err(CombatError::CombatOver));
}

// ============================================================================
// Snapshot rollback and commit
// ============================================================================

#[test]
fn test_defeat_rolls_back_and_discards_items() {
    let before = hero();
    let mut session = start(before.clone(), enemy_with(Pulse::boxed(0.5, 1000, true), 100_000, 1, 0.3));

    into_enemy_turn(&mut session, PlayerAction::Skill(SkillId::IronSkin));
    finish_enemy_turn(&mut session);

    assert_eq!(session.outcome(), Some(CombatOutcome::Lost));
    let report = session.report().cloned().unwrap();
    assert!(report.consumables_used.is_empty());
    assert_eq!(report.gold_gained, 0);

    let after = session.into_player();
    assert_eq!(after, before);
}

#[test]
fn test_retreat_discards_consumables() {
    let mut session = start(hero(), enemy_with(Pulse::boxed(0.5, 3, false), 500, 1, 0.5));
    into_enemy_turn(&mut session, PlayerAction::Item(ItemId::Ether));
    finish_enemy_turn(&mut session);
    session.request_action(PlayerAction::Retreat).unwrap();

    let player = session.into_player();
    assert_eq!(player.inventory.count(ItemId::Ether), 1);
    assert_eq!(player.inventory.count(ItemId::Tonic), 2);
}

#[test]
fn test_victory_commits_once() {
    let mut session = start(hero(), enemy_with(Pulse::boxed(0.5, 3, false), 40, 1, 0.5));
    into_enemy_turn(&mut session, PlayerAction::Item(ItemId::Tonic));
    finish_enemy_turn(&mut session);
    into_enemy_turn(&mut session, PlayerAction::Item(ItemId::Tonic));
    finish_enemy_turn(&mut session);

    // keep swinging until the moth drops
    for _ in 0..20 {
        if session.is_over() {
            break;
        }
        session.request_action(PlayerAction::Attack).unwrap();
        for _ in 0..100 {
            if session.phase() != TurnPhase::AttackSequence {
                break;
            }
            session.advance(0.1, &input()).unwrap();
        }
        if session.phase() == TurnPhase::DelayedTransition {
            session.advance(0.0, &input().with_skip()).unwrap();
            session.advance(0.0, &input().with_skip()).unwrap();
            finish_enemy_turn(&mut session);
        }
    }

    assert_eq!(session.phase(), TurnPhase::Defeated);
    let report = session.report().cloned().unwrap();
    assert_eq!(report.outcome, CombatOutcome::Victory);
    assert_eq!(report.consumables_used, vec![(ItemId::Tonic, 2)]);
    assert_eq!(report.gold_gained, 20);
    assert_eq!(report.experience_gained, 45);

    let player = session.into_player();
    assert_eq!(player.inventory.count(ItemId::Tonic), 0);
    assert_eq!(player.inventory.count(ItemId::Ether), 1);
    assert_eq!(player.gold, 20);
}

// ============================================================================
// Built-in patterns
// ============================================================================

#[test]
fn test_standard_bag_deals_each_pattern_once() {
    let mut manager = PatternManager::with_patterns(standard_patterns()).unwrap();
    let mut rng = GameRng::new(99);
    let mut names: Vec<&str> = (0..manager.len())
        .map(|_| manager.select_next(&mut rng).unwrap().name())
        .collect();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), 5);
}

#[test]
fn test_full_encounter_with_standard_patterns_stays_consistent() {
    let patterns = PatternManager::with_patterns(standard_patterns()).unwrap();
    let enemy = Enemy::new("Weaver", 120, patterns)
        .with_timing(3, 0.6)
        .with_attack_modifier(1.0);
    let mut session = CombatSession::new(
        PlayerStats::new("Ada", 80, 30, 14, 3),
        enemy,
        CombatOptions::default(),
        GameRng::new(5),
    );

    let mut t = 0.0;
    while !session.is_over() && t < 600.0 {
        let skip = matches!(session.phase(), TurnPhase::DialogueIdle | TurnPhase::DelayedTransition);
        let frame = if skip { input().with_skip() } else { input() };
        if session.phase() == TurnPhase::PlayerSelect {
            session.request_action(PlayerAction::Attack).unwrap();
        }
        session.advance(1.0 / 30.0, &frame).unwrap();
        t += 1.0 / 30.0;

        let hp = session.player().hp;
        assert!((0..=80).contains(&hp));
        for view in session.bullet_views() {
            assert!(view.position.is_finite());
        }
    }
    assert!(session.is_over());
}
