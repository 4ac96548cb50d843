//! Live projectile list
//!
//! Bullets live in stable slots. A bullet removed during `advance` leaves a
//! tombstone that is reused by later spawns, and the slot vector is compacted
//! once tombstones pile up. Explosion children produced during a pass are
//! queued and only become live at the start of the next `advance`.

use glam::Vec2;
use log::debug;

use super::collision::{bullet_hitbox, is_offscreen};
use super::{Bullet, BulletId, BulletState, BulletView, ProjectileSpec};
use crate::consts::TIME_EPSILON;
use crate::geometry::{ArenaBounds, Rect, safe_direction};
use crate::options::CombatOptions;

/// A bullet reaching the player
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitEvent {
    pub bullet: BulletId,
    /// Always positive: damage for attacks, restored HP for heals
    pub amount: i32,
    pub position: Vec2,
}

/// Everything that happened during one `advance` call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdvanceReport {
    pub damage: Vec<HitEvent>,
    pub heals: Vec<HitEvent>,
    /// Explosion children queued this frame, already in arena coordinates
    pub spawned: Vec<ProjectileSpec>,
    /// Bullets that left the live list this frame
    pub removed: usize,
}

/// Owner of every live projectile
#[derive(Debug, Clone)]
pub struct ProjectileEngine {
    slots: Vec<Option<Bullet>>,
    free: Vec<usize>,
    pending: Vec<ProjectileSpec>,
    live: usize,
    next_id: u64,
    viewport: Rect,
    explosion_duration: f32,
    max_bullet_age: f32,
    compact_threshold: usize,
}

impl ProjectileEngine {
    pub fn new(arena: ArenaBounds, options: &CombatOptions) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            pending: Vec::new(),
            live: 0,
            next_id: 1,
            viewport: arena.rect(),
            explosion_duration: options.explosion_duration,
            max_bullet_age: options.max_bullet_age,
            compact_threshold: options.compact_threshold.max(1),
        }
    }

    pub fn set_viewport(&mut self, arena: ArenaBounds) {
        self.viewport = arena.rect();
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    /// Number of live bullets, excluding queued children
    pub fn len(&self) -> usize {
        self.live
    }

    /// No live bullets and nothing queued for next frame
    pub fn is_empty(&self) -> bool {
        self.live == 0 && self.pending.is_empty()
    }

    pub fn pending_children(&self) -> usize {
        self.pending.len()
    }

    /// Slot vector length, tombstones included
    pub fn capacity_used(&self) -> usize {
        self.slots.len()
    }

    /// Make a spec live immediately
    pub fn spawn(&mut self, spec: ProjectileSpec) -> BulletId {
        let id = BulletId(self.next_id);
        self.next_id += 1;
        let bullet = Bullet::from_spec(id, spec);
        match self.free.pop() {
            Some(index) => self.slots[index] = Some(bullet),
            None => self.slots.push(Some(bullet)),
        }
        self.live += 1;
        id
    }

    pub fn spawn_batch(&mut self, specs: impl IntoIterator<Item = ProjectileSpec>) -> Vec<BulletId> {
        specs.into_iter().map(|spec| self.spawn(spec)).collect()
    }

    pub fn get(&self, id: BulletId) -> Option<&Bullet> {
        self.iter().find(|b| b.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bullet> {
        self.slots.iter().flatten()
    }

    /// Render snapshot of every live bullet
    pub fn views(&self) -> Vec<BulletView> {
        self.iter().map(Bullet::view).collect()
    }

    /// Drop every bullet and queued child
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.pending.clear();
        self.live = 0;
    }

    /// Step every bullet by `dt` against the player's hitbox
    pub fn advance(&mut self, dt: f32, player: &Rect) -> AdvanceReport {
        // Children queued last frame join before anything moves
        let queued = std::mem::take(&mut self.pending);
        for spec in queued {
            self.spawn(spec);
        }

        let mut report = AdvanceReport::default();
        let step = StepContext {
            dt,
            player,
            viewport: &self.viewport,
            explosion_duration: self.explosion_duration,
            max_bullet_age: self.max_bullet_age,
        };

        for (index, slot) in self.slots.iter_mut().enumerate() {
            let Some(bullet) = slot.as_mut() else {
                continue;
            };
            step.run(bullet, &mut report, &mut self.pending);
            if bullet.state == BulletState::Destroyed {
                *slot = None;
                self.free.push(index);
                self.live -= 1;
                report.removed += 1;
            }
        }

        if self.free.len() >= self.compact_threshold && self.free.len() > self.live {
            self.compact();
        }

        report
    }

    fn compact(&mut self) {
        let before = self.slots.len();
        self.slots.retain(Option::is_some);
        self.free.clear();
        debug!("compacted projectile slots {} -> {}", before, self.slots.len());
    }
}

/// Per-frame parameters shared by every bullet in one pass
struct StepContext<'a> {
    dt: f32,
    player: &'a Rect,
    viewport: &'a Rect,
    explosion_duration: f32,
    max_bullet_age: f32,
}

impl StepContext<'_> {
    fn run(&self, bullet: &mut Bullet, report: &mut AdvanceReport, pending: &mut Vec<ProjectileSpec>) {
        let dt = self.dt;

        match bullet.state {
            BulletState::Destroyed => return,
            BulletState::Exploding { remaining } => {
                let remaining = remaining - dt;
                if remaining <= TIME_EPSILON {
                    let origin = bullet.position;
                    for mut child in std::mem::take(&mut bullet.explosion) {
                        child.position += origin;
                        report.spawned.push(child.clone());
                        pending.push(child);
                    }
                    bullet.state = BulletState::Destroyed;
                } else {
                    bullet.state = BulletState::Exploding { remaining };
                }
                return;
            }
            BulletState::Telegraphing | BulletState::Active => {}
        }

        bullet.age += dt;
        let fired: Vec<_> = bullet
            .transitions
            .iter_mut()
            .filter_map(|t| t.tick(dt))
            .collect();
        for effect in fired {
            bullet.apply_effect(effect);
        }

        // the part of the frame left after the warning runs out still moves the bullet
        let moving = if bullet.state == BulletState::Telegraphing {
            let carry = match bullet.telegraph.as_mut() {
                Some(telegraph) => {
                    if !telegraph.tick(dt) {
                        return;
                    }
                    telegraph.overshoot()
                }
                None => dt,
            };
            bullet.state = BulletState::Active;
            carry
        } else {
            dt
        };
        if moving > 0.0 {
            steer(bullet, self.player.center(), moving);
            bullet.position += bullet.velocity * moving;
            bullet.active_age += moving;
        }

        if bullet.damage != 0 && bullet_hitbox(bullet).overlaps(self.player) {
            let event = HitEvent {
                bullet: bullet.id,
                amount: bullet.damage.abs(),
                position: bullet.position,
            };
            if bullet.is_healing() {
                report.heals.push(event);
            } else {
                report.damage.push(event);
            }
            self.finish(bullet);
            return;
        }

        let fuse_spent = bullet.fuse.is_some_and(|f| bullet.active_age + TIME_EPSILON >= f);
        if fuse_spent || bullet.age >= self.max_bullet_age {
            self.finish(bullet);
            return;
        }

        if is_offscreen(bullet, self.viewport) {
            self.finish(bullet);
        }
    }

    /// Detonate if there are children to release, otherwise vanish
    fn finish(&self, bullet: &mut Bullet) {
        bullet.state = if bullet.explosion.is_empty() {
            BulletState::Destroyed
        } else {
            BulletState::Exploding {
                remaining: self.explosion_duration,
            }
        };
    }
}

/// Blend velocity towards the target, keeping the current speed
fn steer(bullet: &mut Bullet, target: Vec2, dt: f32) {
    let Some(homing) = bullet.homing.as_mut() else {
        return;
    };
    if !homing.enabled {
        return;
    }
    homing.target = target;

    let speed = bullet.velocity.length();
    let desired = safe_direction(homing.target - bullet.position) * speed;
    let blend = (homing.strength * dt).clamp(0.0, 1.0);
    let steered = bullet.velocity.lerp(desired, blend);
    bullet.velocity = safe_direction(steered) * speed;

    homing.remaining -= dt;
    if homing.remaining <= TIME_EPSILON {
        homing.enabled = false;
    }
}
