//! bh-core: Core simulation for bullet-hell turn-based combat
//!
//! This crate contains the pattern strategies, the projectile engine and the
//! combat turn controller, with no rendering, audio or input dependencies.
//! Everything is frame-stepped through `advance(dt)` and every random choice
//! goes through an injected `GameRng`, so whole encounters replay from a seed.

pub mod combat;
pub mod error;
pub mod geometry;
pub mod options;
pub mod pattern;
pub mod projectile;

mod consts;
mod rng;

pub use combat::{
    CombatOutcome, CombatReport, CombatSession, Enemy, FrameInput, FrameReport, ItemId,
    PlayerAction, PlayerStats, SkillId, TurnPhase,
};
pub use consts::*;
pub use error::CombatError;
pub use geometry::{ArenaBounds, Color, Rect};
pub use options::{CombatOptions, OptionsError};
pub use pattern::{PatternManager, PatternStrategy};
pub use projectile::{BulletView, ProjectileEngine, ProjectileSpec};
pub use rng::GameRng;
