//! Headless encounter runner
//!
//! Plays one fight against an enemy carrying every built-in pattern, with a
//! scripted autopilot on both the menus and the dodging.

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use glam::Vec2;
use log::{LevelFilter, info, warn};
use serde::Serialize;

use bh_core::combat::{BuffStat, Inventory};
use bh_core::pattern::standard_patterns;
use bh_core::projectile::RenderFlags;
use bh_core::{
    ArenaBounds, BulletView, CombatOptions, CombatReport, CombatSession, Enemy, FrameInput,
    GameRng, ItemId, PatternManager, PlayerAction, PlayerStats, Rect, SkillId, TurnPhase,
};

const FRAME: f32 = 1.0 / 60.0;
const PLAYER_HALF_EXTENT: f32 = 5.0;
const PLAYER_SPEED: f32 = 170.0;
/// Bullets closer than this push the autopilot away
const DANGER_RADIUS: f32 = 70.0;
const ARENA_MARGIN: f32 = 12.0;

/// Run one bullet-hell encounter without a renderer
#[derive(Parser, Debug)]
#[command(name = "bh-sim")]
#[command(author, version, about = "Simulate a combat encounter", long_about = None)]
struct Args {
    /// RNG seed; the same seed replays the same fight
    #[arg(short = 's', long = "seed", default_value_t = 1)]
    seed: u64,

    /// Options file (rc text, or JSON with a .json extension)
    #[arg(short = 'o', long = "options")]
    options: Option<PathBuf>,

    /// Stop the simulation after this much game time
    #[arg(long = "max-seconds", default_value_t = 600.0)]
    max_seconds: f32,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(short = 'l', long = "log-level", default_value = "info")]
    log_level: LevelFilter,

    /// Print the final report as JSON
    #[arg(long = "json")]
    json: bool,

    /// Equip the Death Defiance charm
    #[arg(long = "charm")]
    charm: bool,
}

#[derive(Debug, Serialize)]
struct Summary {
    seed: u64,
    finished: bool,
    report: Option<CombatReport>,
    messages: Vec<String>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    env_logger::Builder::new().filter_level(args.log_level).init();

    let options = match &args.options {
        Some(path) => CombatOptions::load_from_file(path)?,
        None => CombatOptions::default(),
    };

    let player = PlayerStats::new("Wanderer", 90, 30, 12, 3)
        .with_inventory(
            Inventory::new()
                .with_item(ItemId::Tonic, 3)
                .with_item(ItemId::Ether, 1)
                .with_item(ItemId::Whetstone, 1),
        )
        .with_death_defiance(args.charm);
    let enemy = Enemy::new("Loom Warden", 160, PatternManager::with_patterns(standard_patterns())?)
        .with_defense(2)
        .with_attack_modifier(1.0)
        .with_timing(3, 0.6)
        .with_rewards(40, 120)
        .with_taunts(["The loom never stops.", "Another thread to cut."]);

    let mut session = CombatSession::new(player, enemy, options, GameRng::new(args.seed));
    let mut pilot = Autopilot::new(session.arena());

    while !session.is_over() && session.elapsed() < args.max_seconds {
        if session.phase().accepts_actions() {
            let action = pilot.choose(&session);
            if let Err(err) = session.request_action(action) {
                warn!("autopilot action rejected: {err}");
                session.request_action(PlayerAction::Attack)?;
            }
        }

        let input = pilot.frame(&session);
        match session.advance(FRAME, &input) {
            Ok(report) => {
                if let Some((from, to)) = report.transition {
                    info!("{from} -> {to} at {:.2}s", session.elapsed());
                    if to == TurnPhase::EnemyTurn {
                        let pattern = session.enemy().patterns().current_name().unwrap_or("none");
                        info!("{} attacks with {pattern}", session.enemy().name);
                    }
                }
            }
            // the enemy had nothing to throw; the player simply goes again
            Err(bh_core::CombatError::EmptyPatternSet) => {}
            Err(err) => return Err(err.into()),
        }
    }

    let summary = Summary {
        seed: args.seed,
        finished: session.is_over(),
        report: session.report().cloned(),
        messages: session.messages().to_vec(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        for line in &summary.messages {
            println!("{line}");
        }
        match &summary.report {
            Some(report) => println!(
                "{} after {} turns ({:.1}s): HP {} MP {} gold +{} exp +{}",
                report.outcome,
                report.turns,
                report.elapsed,
                report.hp,
                report.mp,
                report.gold_gained,
                report.experience_gained
            ),
            None => println!("unfinished after {:.1}s", session.elapsed()),
        }
    }
    Ok(())
}

/// Scripted player: heals when low, spends MP on strikes, and steers away from bullets
struct Autopilot {
    position: Vec2,
    arena: ArenaBounds,
}

impl Autopilot {
    fn new(arena: ArenaBounds) -> Self {
        Self {
            position: home(arena),
            arena,
        }
    }

    fn choose(&self, session: &CombatSession) -> PlayerAction {
        let player = session.player();
        if player.hp * 100 < player.max_hp * 35 && session.available_items(ItemId::Tonic) > 0 {
            return PlayerAction::Item(ItemId::Tonic);
        }
        if player.hp * 2 < player.max_hp && player.mp >= SkillId::Mend.mp_cost() {
            return PlayerAction::Skill(SkillId::Mend);
        }
        if player.mp < SkillId::PiercingStrike.mp_cost() && session.available_items(ItemId::Ether) > 0 {
            return PlayerAction::Item(ItemId::Ether);
        }
        if player.buffs.total(BuffStat::Attack) == 0 && session.available_items(ItemId::Whetstone) > 0 {
            return PlayerAction::Item(ItemId::Whetstone);
        }
        if player.mp >= SkillId::PiercingStrike.mp_cost() {
            return PlayerAction::Skill(SkillId::PiercingStrike);
        }
        PlayerAction::Attack
    }

    fn frame(&mut self, session: &CombatSession) -> FrameInput {
        if session.arena() != self.arena {
            self.arena = session.arena();
            self.position = home(self.arena);
        }
        if session.phase() == TurnPhase::EnemyTurn {
            self.dodge(&session.bullet_views());
        }

        let input = FrameInput::new(Rect::from_center(self.position, Vec2::splat(PLAYER_HALF_EXTENT)));
        match session.phase() {
            TurnPhase::DialogueIdle | TurnPhase::DelayedTransition => input.with_skip(),
            _ => input,
        }
    }

    fn dodge(&mut self, bullets: &[BulletView]) {
        let mut push = Vec2::ZERO;
        for bullet in bullets {
            if bullet.telegraph_alpha < 1.0 || bullet.flags.contains(RenderFlags::HEALING) {
                continue;
            }
            let away = self.position - bullet.position;
            let distance = away.length();
            if distance > 0.0 && distance < DANGER_RADIUS {
                push += away / distance * (1.0 - distance / DANGER_RADIUS);
            }
        }
        // drift back towards home when nothing is close
        let drift = (home(self.arena) - self.position) * 0.02;
        let step = if push == Vec2::ZERO { drift } else { push.normalize_or_zero() * PLAYER_SPEED * FRAME };

        let min = Vec2::splat(ARENA_MARGIN);
        let max = Vec2::new(self.arena.width, self.arena.height) - ARENA_MARGIN;
        self.position = (self.position + step).clamp(min, max);
    }
}

fn home(arena: ArenaBounds) -> Vec2 {
    Vec2::new(arena.width * 0.5, arena.height * 0.7)
}
