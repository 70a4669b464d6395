//! Collision tests.
//!
//! Two kinds of contact exist in the arena:
//! - a head reaching a food pellet (eating)
//! - a head touching another snake's body sample in the grid (death)

use crate::spatial::{GridEntry, SpatialGrid};
use glam::Vec2;

/// Extra distance added to the head radius when testing against bodies.
pub const BODY_HIT_PADDING: f32 = 15.0;

/// Distance under which a head eats a pellet.
#[inline]
pub fn food_reach(head_radius: f32, food_radius: f32) -> f32 {
    head_radius + food_radius * 2.0
}

/// Distance under which a head hits a body sample.
#[inline]
pub fn body_reach(head_radius: f32) -> f32 {
    head_radius + BODY_HIT_PADDING
}

/// Strict "closer than" test on squared distance.
#[inline]
pub fn within(a: Vec2, b: Vec2, reach: f32) -> bool {
    a.distance_squared(b) < reach * reach
}

/// First body sample of another snake within `reach` of `head`.
///
/// Samples owned by `me` are skipped, so a snake never collides with itself.
pub fn find_body_hit(grid: &SpatialGrid, me: usize, head: Vec2, reach: f32) -> Option<&GridEntry> {
    grid.candidates(head, reach)
        .find(|entry| entry.owner != me && within(head, entry.position, reach))
}
