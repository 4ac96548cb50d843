//! Core combat constants
//!
//! Values shared by the projectile engine, the pattern strategies and the
//! turn controller. Runtime-tunable durations live in `CombatOptions`.

/// Smallest usable arena edge, in pixels
pub const MIN_ARENA_SIZE: f32 = 120.0;

/// Default arena dimensions when an enemy does not ask for anything else
pub const DEFAULT_ARENA_WIDTH: f32 = 480.0;
pub const DEFAULT_ARENA_HEIGHT: f32 = 360.0;

/// Timers within this distance of their threshold count as elapsed.
///
/// Frame deltas are summed in f32, so `0.9 + 0.1` may land a hair short of 1.0.
pub const TIME_EPSILON: f32 = 1e-4;

/// Direction used when a normalization input has zero length
pub const DEFAULT_DIRECTION: glam::Vec2 = glam::Vec2::new(0.0, 1.0);

/// Player velocity estimate: sample once every N observations
pub const TRACKER_SAMPLE_INTERVAL: u32 = 5;
/// Weight kept from the previous velocity estimate
pub const TRACKER_RETAIN: f32 = 0.7;
/// Gain applied to the raw position delta before blending
pub const TRACKER_DELTA_GAIN: f32 = 0.2;
/// Blend weight given to the new (gained) delta
pub const TRACKER_BLEND: f32 = 0.3;

/// Damage multiplier per point of enemy attack modifier
pub const ATTACK_MODIFIER_SCALE: f32 = 0.1;

/// Fraction of the bullet size used as its collision half-extent
pub const BULLET_HITBOX_SCALE: f32 = 0.4;

/// Telegraph alpha at the start of the warning interval
pub const TELEGRAPH_MIN_ALPHA: f32 = 0.25;

/// Burst-center placement retries before giving up on spacing
pub const BURST_PLACEMENT_ATTEMPTS: u32 = 12;

/// Minimum damage a landed hit deals after defense
pub const MIN_HIT_DAMAGE: i32 = 1;

/// Display bars never move slower than this many points per second
pub const MIN_BAR_SPEED: f32 = 12.0;
