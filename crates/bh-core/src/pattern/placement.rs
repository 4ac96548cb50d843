//! Shared geometry for pattern layouts: rings, escape gaps, grid skips, burst centers

use std::f32::consts::TAU;
use std::ops::Range;

use glam::Vec2;

use crate::consts::BURST_PLACEMENT_ATTEMPTS;
use crate::geometry::ArenaBounds;
use crate::rng::GameRng;

/// A point on a ring with its outward unit direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingPoint {
    pub index: usize,
    pub position: Vec2,
    pub outward: Vec2,
}

/// `count` evenly spaced points on a circle, starting at `rotation` radians
pub fn ring_points(center: Vec2, radius: f32, count: usize, rotation: f32) -> Vec<RingPoint> {
    if count == 0 {
        return Vec::new();
    }
    let step = TAU / count as f32;
    (0..count)
        .map(|index| {
            let outward = Vec2::from_angle(rotation + step * index as f32);
            RingPoint {
                index,
                position: center + outward * radius,
                outward,
            }
        })
        .collect()
}

/// A run of consecutive segments to leave out of a ring or cage
///
/// The gap never includes the first or last segment. Rings with fewer than three
/// segments have no interior to cut and get an empty range.
pub fn escape_gap(segments: usize, min_len: usize, max_len: usize, rng: &mut GameRng) -> Range<usize> {
    if segments < 3 {
        return 0..0;
    }
    let interior = segments - 2;
    let max_len = max_len.clamp(1, interior);
    let min_len = min_len.clamp(1, max_len);
    let len = rng.range_u32(min_len as u32, max_len as u32) as usize;
    // start in 1..=segments-1-len keeps both ends intact
    let start = rng.range_u32(1, (segments - 1 - len) as u32) as usize;
    start..start + len
}

/// Which grid lines to leave out
///
/// Edge lines are always kept. Every interior line is skipped with
/// `skip_chance`; if that skips nothing, one interior line is forced out.
pub fn skipped_lines(line_count: usize, skip_chance: f32, rng: &mut GameRng) -> Vec<bool> {
    let mut skipped = vec![false; line_count];
    if line_count < 3 {
        return skipped;
    }
    for flag in skipped.iter_mut().take(line_count - 1).skip(1) {
        *flag = rng.chance(skip_chance);
    }
    if !skipped.iter().any(|&s| s) {
        let forced = rng.range_u32(1, (line_count - 2) as u32) as usize;
        skipped[forced] = true;
    }
    skipped
}

/// Pick burst centers that keep `min_distance` from each other
///
/// Each center gets `BURST_PLACEMENT_ATTEMPTS` tries; if none of them is far
/// enough from the centers already placed, the last unconstrained point is used.
pub fn burst_centers(
    arena: &ArenaBounds,
    count: usize,
    min_distance: f32,
    inset: f32,
    rng: &mut GameRng,
) -> Vec<Vec2> {
    let min_sq = min_distance * min_distance;
    let mut centers: Vec<Vec2> = Vec::with_capacity(count);

    for _ in 0..count {
        let mut candidate = arena.random_point(rng, inset);
        for _ in 1..BURST_PLACEMENT_ATTEMPTS {
            if centers.iter().all(|c| c.distance_squared(candidate) >= min_sq) {
                break;
            }
            candidate = arena.random_point(rng, inset);
        }
        centers.push(candidate);
    }
    centers
}

/// `count` positions evenly spread between two points, ends included
pub fn spread_between(start: Vec2, end: Vec2, count: usize) -> Vec<Vec2> {
    match count {
        0 => Vec::new(),
        1 => vec![start.lerp(end, 0.5)],
        _ => (0..count)
            .map(|i| start.lerp(end, i as f32 / (count - 1) as f32))
            .collect(),
    }
}
