//! Snake agent: body, heading, movement and growth.

use super::palette::PALETTES;
use crate::ai::AiBrain;
use crate::config::Config;
use glam::Vec2;
use rand::Rng;
use std::collections::VecDeque;
use std::f32::consts::{PI, TAU};

/// Id prefix of player-controlled snakes.
pub const PLAYER_PREFIX: &str = "p_";
/// Id prefix of autonomous snakes.
pub const AI_PREFIX: &str = "ai_";

const MIN_BODY_RADIUS: f32 = 6.0;
const MAX_BODY_RADIUS: f32 = 22.0;
const RADIUS_PER_SEGMENT: f32 = 0.08;
const HEAD_RADIUS_SCALE: f32 = 1.15;

/// Width of the band along each edge where heads get pushed back inward.
const SOFT_MARGIN: f32 = 150.0;
/// Fraction of the band overshoot undone per tick.
const SOFT_PUSH: f32 = 0.1;
/// Hard clamp distance from each edge.
const HARD_MARGIN: f32 = 10.0;

/// Chance per boosting tick of shedding a pellet at the old tail.
const BOOST_DROP_CHANCE: f64 = 0.3;
/// On death, one pellet per this many segments.
const DEATH_DROP_STRIDE: usize = 3;
/// Full width of the positional jitter applied to death pellets.
const DEATH_DROP_JITTER: f32 = 10.0;

/// Movement parameters shared by every snake in a world.
#[derive(Debug, Clone, Copy)]
pub struct SnakeParams {
    pub initial_length: usize,
    pub segment_gap: f32,
    pub base_speed: f32,
    pub boost_speed: f32,
    pub turn_rate: f32,
    pub world_size: f32,
}

impl SnakeParams {
    pub fn from_config(config: &Config) -> Self {
        Self {
            initial_length: config.snake.initial_length.max(1),
            segment_gap: config.snake.segment_gap,
            base_speed: config.snake.base_speed,
            boost_speed: config.snake.boost_speed,
            turn_rate: config.snake.turn_rate,
            world_size: config.world.size,
        }
    }
}

/// Wrap an angle into `(-PI, PI]`.
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    let a = angle % TAU;
    if a > PI {
        a - TAU
    } else if a <= -PI {
        a + TAU
    } else {
        a
    }
}

/// A snake in the arena.
#[derive(Debug, Clone)]
pub struct Snake {
    /// Unique id, `p_<n>` for players and `ai_<n>` for AI.
    pub id: String,
    pub name: String,
    /// Body points, head first.
    pub segments: VecDeque<Vec2>,
    /// Current heading in radians.
    pub angle: f32,
    /// Heading the snake is turning toward.
    pub target_angle: f32,
    pub boosting: bool,
    pub alive: bool,
    /// Index into the shared palette table.
    pub palette_idx: usize,
    /// Decision state, present only on AI snakes.
    pub brain: Option<AiBrain>,
    initial_length: usize,
}

impl Snake {
    /// Create a player snake at a random spot near the world center.
    pub fn player<R: Rng>(serial: u64, name: String, params: &SnakeParams, rng: &mut R) -> Self {
        let head = random_spawn_point(params.world_size, rng);
        Self::spawn(format!("{PLAYER_PREFIX}{serial}"), name, head, params, rng)
    }

    /// Create an AI snake at a random spot near the world center.
    pub fn ai<R: Rng>(serial: u64, name: String, params: &SnakeParams, rng: &mut R) -> Self {
        let head = random_spawn_point(params.world_size, rng);
        let mut snake = Self::spawn(format!("{AI_PREFIX}{serial}"), name, head, params, rng);
        snake.brain = Some(AiBrain::new(snake.angle));
        snake
    }

    /// Create a snake with a random heading and palette, body trailing behind `head`.
    pub fn spawn<R: Rng>(id: String, name: String, head: Vec2, params: &SnakeParams, rng: &mut R) -> Self {
        let angle = rng.random::<f32>() * TAU;
        let mut snake = Self {
            id,
            name,
            segments: VecDeque::with_capacity(params.initial_length * 2),
            angle,
            target_angle: angle,
            boosting: false,
            alive: true,
            palette_idx: rng.random_range(0..PALETTES.len()),
            brain: None,
            initial_length: params.initial_length,
        };
        snake.segments.resize(params.initial_length, head);
        snake.place_at(head, params.segment_gap);
        snake
    }

    /// Move the whole body so the head sits at `head`, laid out straight behind it.
    pub fn place_at(&mut self, head: Vec2, segment_gap: f32) {
        let back = -Vec2::from_angle(self.angle) * segment_gap;
        for (i, seg) in self.segments.iter_mut().enumerate() {
            *seg = head + back * i as f32;
        }
    }

    #[inline]
    pub fn is_ai(&self) -> bool {
        self.id.starts_with(AI_PREFIX)
    }

    #[inline]
    pub fn head(&self) -> Vec2 {
        self.segments[0]
    }

    #[inline]
    pub fn tail(&self) -> Vec2 {
        self.segments[self.segments.len() - 1]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Length at spawn, also the floor below which boosting stops.
    #[inline]
    pub fn initial_length(&self) -> usize {
        self.initial_length
    }

    /// Segments gained beyond the initial body.
    #[inline]
    pub fn score(&self) -> usize {
        self.len().saturating_sub(self.initial_length)
    }

    #[inline]
    pub fn body_radius(&self) -> f32 {
        (MIN_BODY_RADIUS + self.len() as f32 * RADIUS_PER_SEGMENT).min(MAX_BODY_RADIUS)
    }

    #[inline]
    pub fn head_radius(&self) -> f32 {
        self.body_radius() * HEAD_RADIUS_SCALE
    }

    /// Whether the boost is in effect this tick.
    #[inline]
    pub fn is_boost_active(&self) -> bool {
        self.boosting && self.len() > self.initial_length
    }

    /// Apply player input. A missing heading leaves the current target alone.
    pub fn steer(&mut self, heading: Option<f32>, boost: bool) {
        if let Some(heading) = heading {
            self.target_angle = heading;
        }
        self.boosting = boost;
    }

    /// Advance one tick: turn, move the head, trim the tail.
    ///
    /// Returns the vacated tail point when a boost pellet should be shed there.
    pub fn advance<R: Rng>(&mut self, params: &SnakeParams, rng: &mut R) -> Option<Vec2> {
        if !self.alive {
            return None;
        }

        self.angle += normalize_angle(self.target_angle - self.angle) * params.turn_rate;

        let boosted = self.is_boost_active();
        let speed = if boosted {
            params.boost_speed
        } else {
            params.base_speed
        };
        let head = self.head() + Vec2::from_angle(self.angle) * speed;
        self.segments.push_front(keep_inside(head, params.world_size));

        if boosted {
            let vacated = self.segments.pop_back();
            self.segments.pop_back();
            vacated.filter(|_| rng.random_bool(BOOST_DROP_CHANCE))
        } else {
            self.segments.pop_back();
            None
        }
    }

    /// Append `n` segments at the tail; they unfold as the snake moves.
    pub fn grow(&mut self, n: usize) {
        let tail = self.tail();
        self.segments.extend(std::iter::repeat_n(tail, n));
    }

    /// Kill the snake. Returns the points where its body turns into food,
    /// or nothing if it was already dead.
    pub fn die<R: Rng>(&mut self, rng: &mut R) -> Vec<Vec2> {
        if !self.alive {
            return Vec::new();
        }
        self.alive = false;

        self.segments
            .iter()
            .step_by(DEATH_DROP_STRIDE)
            .map(|&seg| {
                let jitter = Vec2::new(rng.random::<f32>() - 0.5, rng.random::<f32>() - 0.5);
                seg + jitter * DEATH_DROP_JITTER
            })
            .collect()
    }
}

/// Soft push away from the edge band, then a hard clamp.
fn keep_inside(mut p: Vec2, world_size: f32) -> Vec2 {
    let lo = SOFT_MARGIN;
    let hi = world_size - SOFT_MARGIN;
    if p.x < lo {
        p.x += (lo - p.x) * SOFT_PUSH;
    }
    if p.y < lo {
        p.y += (lo - p.y) * SOFT_PUSH;
    }
    if p.x > hi {
        p.x -= (p.x - hi) * SOFT_PUSH;
    }
    if p.y > hi {
        p.y -= (p.y - hi) * SOFT_PUSH;
    }
    p.clamp(
        Vec2::splat(HARD_MARGIN),
        Vec2::splat(world_size - HARD_MARGIN),
    )
}

/// Random point in the middle third of the world.
fn random_spawn_point<R: Rng>(world_size: f32, rng: &mut R) -> Vec2 {
    let spread = world_size / 3.0;
    let center = Vec2::splat(world_size / 2.0);
    center + Vec2::new(rng.random::<f32>() - 0.5, rng.random::<f32>() - 0.5) * spread
}
