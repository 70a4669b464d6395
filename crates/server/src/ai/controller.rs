//! Per-snake AI decisions.

use crate::entity::{Food, Snake};
use glam::Vec2;
use rand::Rng;

/// Distance from the edges inside which the AI turns back to the center.
const BOUNDARY_MARGIN: f32 = 400.0;
const BOUNDARY_COOLDOWN: f32 = 60.0;

/// Heads closer than this count as a threat.
const THREAT_RADIUS: f32 = 120.0;
/// A snake is a threat only if longer than this fraction of our length.
const THREAT_SIZE_RATIO: f32 = 0.8;
/// Full width of the random offset added to the escape heading.
const EVADE_JITTER: f32 = 0.5;
/// Boost away from threats only above this length.
const EVADE_BOOST_LENGTH: usize = 25;
const EVADE_COOLDOWN: f32 = 30.0;

/// Food closer than this is ignored (already being eaten).
const FOOD_MIN_DIST: f32 = 20.0;
/// Food farther than this is not considered.
const FOOD_MAX_DIST: f32 = 300.0;
const SEEK_JITTER: f32 = 0.3;
const SEEK_COOLDOWN: f32 = 15.0;
const SEEK_COOLDOWN_SPREAD: f32 = 10.0;

/// Full width of the random change applied to the wander heading.
const WANDER_TURN: f32 = 2.0;
const WANDER_COOLDOWN: f32 = 40.0;
const WANDER_COOLDOWN_SPREAD: f32 = 60.0;

/// Decision state carried by an AI snake between ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AiBrain {
    /// Ticks until the next food/wander decision.
    pub timer: f32,
    /// Persistent heading used while wandering.
    pub wander_angle: f32,
}

impl AiBrain {
    pub fn new(wander_angle: f32) -> Self {
        Self {
            timer: 0.0,
            wander_angle,
        }
    }
}

/// Which rule produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    AvoidBoundary,
    Evade,
    SeekFood,
    Wander,
}

/// A new heading and boost state for an AI snake.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Steering {
    pub behavior: Behavior,
    pub target_angle: f32,
    pub boosting: bool,
}

impl Steering {
    pub fn apply(&self, snake: &mut Snake) {
        snake.target_angle = self.target_angle;
        snake.boosting = self.boosting;
    }
}

/// Run one decision step for `snakes[me]`.
///
/// Returns `None` while the cooldown runs and nothing urgent happens.
/// Threats are taken in registry order; the first qualifying one wins.
pub fn think<R: Rng>(
    me: usize,
    brain: &mut AiBrain,
    snakes: &[Snake],
    foods: &[Food],
    world_size: f32,
    rng: &mut R,
) -> Option<Steering> {
    let snake = &snakes[me];
    if !snake.alive {
        return None;
    }
    brain.timer -= 1.0;

    let head = snake.head();
    let lo = BOUNDARY_MARGIN;
    let hi = world_size - BOUNDARY_MARGIN;
    if head.x < lo || head.x > hi || head.y < lo || head.y > hi {
        let to_center = Vec2::splat(world_size / 2.0) - head;
        brain.timer = BOUNDARY_COOLDOWN;
        return Some(Steering {
            behavior: Behavior::AvoidBoundary,
            target_angle: to_center.to_angle(),
            boosting: false,
        });
    }

    let threat = snakes.iter().enumerate().find(|&(i, other)| {
        i != me
            && other.alive
            && head.distance_squared(other.head()) < THREAT_RADIUS * THREAT_RADIUS
            && other.len() as f32 > snake.len() as f32 * THREAT_SIZE_RATIO
    });
    if let Some((_, other)) = threat {
        let away = head - other.head();
        brain.timer = EVADE_COOLDOWN;
        return Some(Steering {
            behavior: Behavior::Evade,
            target_angle: away.to_angle() + jitter(rng, EVADE_JITTER),
            boosting: snake.len() > EVADE_BOOST_LENGTH,
        });
    }

    if brain.timer > 0.0 {
        return None;
    }

    let min_d2 = FOOD_MIN_DIST * FOOD_MIN_DIST;
    let nearest = foods
        .iter()
        .map(|f| (f, head.distance_squared(f.position)))
        .filter(|&(_, d2)| d2 > min_d2)
        .fold(None, |best: Option<(&Food, f32)>, (f, d2)| match best {
            Some((_, best_d2)) if best_d2 <= d2 => best,
            _ => Some((f, d2)),
        })
        .filter(|&(_, d2)| d2 < FOOD_MAX_DIST * FOOD_MAX_DIST);

    if let Some((food, _)) = nearest {
        brain.timer = SEEK_COOLDOWN + rng.random::<f32>() * SEEK_COOLDOWN_SPREAD;
        return Some(Steering {
            behavior: Behavior::SeekFood,
            target_angle: (food.position - head).to_angle() + jitter(rng, SEEK_JITTER),
            boosting: false,
        });
    }

    brain.wander_angle += jitter(rng, WANDER_TURN);
    brain.timer = WANDER_COOLDOWN + rng.random::<f32>() * WANDER_COOLDOWN_SPREAD;
    Some(Steering {
        behavior: Behavior::Wander,
        target_angle: brain.wander_angle,
        boosting: false,
    })
}

/// Uniform offset in `[-width/2, width/2)`.
#[inline]
fn jitter<R: Rng>(rng: &mut R, width: f32) -> f32 {
    (rng.random::<f32>() - 0.5) * width
}
