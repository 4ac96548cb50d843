//! Hitbox and off-screen tests

use glam::Vec2;

use super::Bullet;
use crate::consts::BULLET_HITBOX_SCALE;
use crate::geometry::{Rect, safe_direction};

/// Collision box of a bullet, a bit smaller than its drawn size
pub fn bullet_hitbox(bullet: &Bullet) -> Rect {
    Rect::from_center(bullet.position, Vec2::splat(bullet.size * BULLET_HITBOX_SCALE))
}

/// End point of the drawn trail, behind the bullet along its velocity
pub fn trail_tail(bullet: &Bullet) -> Vec2 {
    let length = bullet.trail_length * bullet.size;
    bullet.position - safe_direction(bullet.velocity) * length
}

/// Extra space around the viewport before a bullet may be culled
pub fn offscreen_margin(bullet: &Bullet) -> f32 {
    bullet.size + bullet.trail_length * bullet.size
}

/// True once the bullet and its whole trail are outside the viewport plus margin
pub fn is_offscreen(bullet: &Bullet, viewport: &Rect) -> bool {
    let bounds = viewport.inflate(offscreen_margin(bullet));
    let body = Rect::spanning(bullet.position, trail_tail(bullet)).inflate(bullet.size * 0.5);
    !body.overlaps(&bounds)
}
