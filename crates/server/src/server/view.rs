//! Per-client view culling and state compaction.

use crate::entity::{Food, Snake};
use crate::world::World;
use glam::Vec2;
use protocol::{FoodView, ServerMessage, SnakeView};

/// Target number of body points sent per snake.
const POINTS_PER_SNAKE: usize = 60;

/// Coordinate rounding used on the wire.
#[inline]
fn wire_coord(v: f32) -> i32 {
    (v + 0.5) as i32
}

/// Headings are sent with two decimals.
#[inline]
fn wire_angle(a: f32) -> f32 {
    (a * 100.0 + 0.5) as i32 as f32 / 100.0
}

/// Inclusive square window test.
#[inline]
fn in_view(center: Vec2, p: Vec2, range: f32) -> bool {
    let d = p - center;
    d.x.abs() <= range && d.y.abs() <= range
}

/// Point the view of `viewer` is centered on.
///
/// A dead snake is still mapped to its connection until respawn; its view
/// falls back to the world center.
pub fn view_center(world: &World, viewer: &Snake) -> Vec2 {
    if viewer.alive {
        viewer.head()
    } else {
        Vec2::splat(world.world_size() / 2.0)
    }
}

/// Compact form of a snake: every `len / 60`-th point plus the tail.
pub fn snake_view(snake: &Snake) -> SnakeView {
    let stride = (snake.len() / POINTS_PER_SNAKE).max(1);
    let mut points = Vec::with_capacity((snake.len() / stride + 1) * 2);
    for seg in snake.segments.iter().step_by(stride) {
        points.push(wire_coord(seg.x));
        points.push(wire_coord(seg.y));
    }
    let tail = snake.tail();
    points.push(wire_coord(tail.x));
    points.push(wire_coord(tail.y));

    SnakeView {
        id: snake.id.clone(),
        name: snake.name.clone(),
        points,
        palette_idx: snake.palette_idx,
        length: snake.len(),
        angle: wire_angle(snake.angle),
        boosting: snake.boosting,
        score: snake.score(),
    }
}

pub fn food_view(food: &Food) -> FoodView {
    FoodView {
        x: wire_coord(food.position.x),
        y: wire_coord(food.position.y),
        color: food.color.to_string(),
        radius: food.radius,
    }
}

/// Build the state message for the client controlling `snake_id`.
///
/// Returns `None` when that snake is no longer in the registry.
pub fn build_snapshot(world: &World, snake_id: &str, view_range: f32) -> Option<ServerMessage> {
    let viewer = world.snake(snake_id)?;
    let center = view_center(world, viewer);

    let snakes = world
        .snakes()
        .iter()
        .filter(|s| s.alive && in_view(center, s.head(), view_range))
        .map(snake_view)
        .collect();
    let foods = world
        .foods()
        .iter()
        .filter(|f| in_view(center, f.position, view_range))
        .map(food_view)
        .collect();

    Some(ServerMessage::State {
        snakes,
        foods,
        you: snake_id.to_string(),
    })
}
