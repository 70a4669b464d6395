//! World state management.
//!
//! Owns every snake and pellet in the arena and runs the per-tick pipeline.

use crate::ai::{random_name, think};
use crate::collision::{body_reach, find_body_hit, food_reach, within};
use crate::config::Config;
use crate::entity::{Food, FoodOrigin, Snake, SnakeParams};
use crate::spatial::SpatialGrid;
use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;
use std::time::{Duration, Instant};

/// Body samples start at this segment; the neck never collides.
const GRID_FIRST_SEGMENT: usize = 8;
/// Every n-th segment from the first one goes into the grid.
const GRID_STRIDE: usize = 2;

/// Extra length given to each new AI snake, drawn from `0..AI_EXTRA_LENGTH`.
const AI_EXTRA_LENGTH: usize = 60;
/// Distance band for AI spawned near a player.
const NEAR_PLAYER_MIN: f32 = 800.0;
const NEAR_PLAYER_SPREAD: f32 = 1200.0;
/// Near-player spawns are clamped this far inside the edges.
const NEAR_PLAYER_EDGE: f32 = 200.0;
/// Chance that an initial AI is placed near a player.
const INITIAL_NEAR_PLAYER_CHANCE: f64 = 0.5;

/// Reported for each snake that died this tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeathNotice {
    pub snake_id: String,
    pub score: usize,
    pub length: usize,
}

/// Pellet ids added and removed during the current tick.
#[derive(Debug, Default, Clone)]
pub struct FoodEvents {
    pub added: Vec<u64>,
    pub removed: Vec<u64>,
}

impl FoodEvents {
    fn clear(&mut self) {
        self.added.clear();
        self.removed.clear();
    }
}

/// Time spent in each group of tick phases.
#[derive(Debug, Default, Clone, Copy)]
pub struct PhaseTimings {
    pub ai: Duration,
    pub movement: Duration,
    pub collisions: Duration,
    pub upkeep: Duration,
}

/// Outcome of one simulation step.
#[derive(Debug, Default)]
pub struct TickReport {
    pub deaths: Vec<DeathNotice>,
    pub eaten: usize,
    pub reaped: usize,
    pub spawned_ai: usize,
    pub timings: PhaseTimings,
}

/// The game world containing all snakes and food.
#[derive(Debug)]
pub struct World {
    params: SnakeParams,
    food_count: usize,
    food_radius: f32,
    ai_count: usize,

    /// Snakes in insertion order; scans run in this order.
    snakes: Vec<Snake>,
    foods: Vec<Food>,
    grid: SpatialGrid,
    food_events: FoodEvents,

    rng: StdRng,
    /// Shared serial for `p_` and `ai_` ids.
    next_serial: u64,
    next_food_id: u64,
}

impl World {
    pub fn new(config: &Config) -> Self {
        let rng = match config.world.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            params: SnakeParams::from_config(config),
            food_count: config.food.count,
            food_radius: config.food.radius,
            ai_count: config.ai.count,
            snakes: Vec::new(),
            foods: Vec::with_capacity(config.food.count * 2),
            grid: SpatialGrid::new(config.world.size, config.world.grid_cell),
            food_events: FoodEvents::default(),
            rng,
            next_serial: 1,
            next_food_id: 1,
        }
    }

    /// Fill the arena with ambient food and the configured AI population.
    pub fn populate(&mut self) {
        while self.foods.len() < self.food_count {
            self.add_ambient_food();
        }
        for _ in 0..self.ai_count {
            self.spawn_ai(false);
        }
        self.food_events.clear();
    }

    #[inline]
    pub fn world_size(&self) -> f32 {
        self.params.world_size
    }

    #[inline]
    pub fn params(&self) -> &SnakeParams {
        &self.params
    }

    #[inline]
    pub fn snakes(&self) -> &[Snake] {
        &self.snakes
    }

    #[inline]
    pub fn foods(&self) -> &[Food] {
        &self.foods
    }

    #[inline]
    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    /// Pellet changes recorded by the last step.
    #[inline]
    pub fn food_events(&self) -> &FoodEvents {
        &self.food_events
    }

    pub fn snake(&self, id: &str) -> Option<&Snake> {
        self.snakes.iter().find(|s| s.id == id)
    }

    pub fn snake_mut(&mut self, id: &str) -> Option<&mut Snake> {
        self.snakes.iter_mut().find(|s| s.id == id)
    }

    /// Number of live AI snakes.
    pub fn alive_ai(&self) -> usize {
        self.snakes.iter().filter(|s| s.is_ai() && s.alive).count()
    }

    fn take_serial(&mut self) -> u64 {
        let serial = self.next_serial;
        self.next_serial += 1;
        serial
    }

    /// Spawn a player snake and return its id.
    pub fn spawn_player(&mut self, name: String) -> String {
        let serial = self.take_serial();
        let snake = Snake::player(serial, name, &self.params, &mut self.rng);
        let id = snake.id.clone();
        self.snakes.push(snake);
        id
    }

    /// Spawn an AI snake and return its id.
    ///
    /// With `near_player` the snake is placed 800 to 2000 units from a random
    /// live player (when one exists); otherwise that happens half of the time.
    pub fn spawn_ai(&mut self, near_player: bool) -> String {
        let serial = self.take_serial();
        let name = random_name(&mut self.rng);
        let mut snake = Snake::ai(serial, name, &self.params, &mut self.rng);

        if near_player || self.rng.random_bool(INITIAL_NEAR_PLAYER_CHANCE) {
            if let Some(head) = self.point_near_player() {
                snake.place_at(head, self.params.segment_gap);
            }
        }
        snake.grow(self.rng.random_range(0..AI_EXTRA_LENGTH));

        let id = snake.id.clone();
        self.snakes.push(snake);
        id
    }

    fn point_near_player(&mut self) -> Option<Vec2> {
        let players: Vec<Vec2> = self
            .snakes
            .iter()
            .filter(|s| !s.is_ai() && s.alive)
            .map(|s| s.head())
            .collect();
        if players.is_empty() {
            return None;
        }
        let anchor = players[self.rng.random_range(0..players.len())];
        let bearing = self.rng.random::<f32>() * TAU;
        let dist = NEAR_PLAYER_MIN + self.rng.random::<f32>() * NEAR_PLAYER_SPREAD;

        let size = self.params.world_size;
        let edge = NEAR_PLAYER_EDGE.min(size / 2.0);
        let point = anchor + Vec2::from_angle(bearing) * dist;
        Some(point.clamp(Vec2::splat(edge), Vec2::splat(size - edge)))
    }

    /// Kill a snake outside of the collision phase, dropping its body as food.
    /// Returns false if the snake is missing or already dead.
    pub fn kill(&mut self, id: &str) -> bool {
        let Some(snake) = self.snakes.iter_mut().find(|s| s.id == id) else {
            return false;
        };
        if !snake.alive {
            return false;
        }
        let drops = snake.die(&mut self.rng);
        for point in drops {
            self.add_food(point, FoodOrigin::DeathDrop);
        }
        true
    }

    fn add_food(&mut self, position: Vec2, origin: FoodOrigin) -> u64 {
        let id = self.next_food_id;
        self.next_food_id += 1;
        let food = Food::new(id, position, origin, self.food_radius, &mut self.rng);
        self.foods.push(food);
        self.food_events.added.push(id);
        id
    }

    fn add_ambient_food(&mut self) -> u64 {
        let id = self.next_food_id;
        self.next_food_id += 1;
        let food = Food::ambient(id, self.params.world_size, self.food_radius, &mut self.rng);
        self.foods.push(food);
        self.food_events.added.push(id);
        id
    }

    /// Run one simulation tick.
    ///
    /// `is_owned` tells whether a player snake id is still mapped to a live
    /// connection; dead player snakes without an owner are removed.
    pub fn step(&mut self, is_owned: impl Fn(&str) -> bool) -> TickReport {
        let mut report = TickReport::default();
        self.food_events.clear();

        let t = Instant::now();
        self.run_ai();
        report.timings.ai = t.elapsed();

        let t = Instant::now();
        self.advance_snakes();
        self.rebuild_grid();
        report.timings.movement = t.elapsed();

        let t = Instant::now();
        report.eaten = self.resolve_food();
        report.deaths = self.resolve_snake_collisions();
        report.timings.collisions = t.elapsed();

        let t = Instant::now();
        report.reaped = self.reap(is_owned);
        report.spawned_ai = self.maintain_population();
        report.timings.upkeep = t.elapsed();

        report
    }

    /// Let every live AI snake pick a heading.
    fn run_ai(&mut self) {
        for i in 0..self.snakes.len() {
            let Some(mut brain) = self.snakes[i].brain else {
                continue;
            };
            let steering = think(
                i,
                &mut brain,
                &self.snakes,
                &self.foods,
                self.params.world_size,
                &mut self.rng,
            );
            let snake = &mut self.snakes[i];
            snake.brain = Some(brain);
            if let Some(steering) = steering {
                steering.apply(snake);
            }
        }
    }

    /// Move every live snake, shedding boost pellets.
    fn advance_snakes(&mut self) {
        for i in 0..self.snakes.len() {
            if let Some(point) = self.snakes[i].advance(&self.params, &mut self.rng) {
                self.add_food(point, FoodOrigin::BoostDrop);
            }
        }
    }

    /// Re-index body samples of live snakes.
    fn rebuild_grid(&mut self) {
        self.grid.clear();
        for (owner, snake) in self.snakes.iter().enumerate().filter(|(_, s)| s.alive) {
            for (segment, &position) in snake
                .segments
                .iter()
                .enumerate()
                .skip(GRID_FIRST_SEGMENT)
                .step_by(GRID_STRIDE)
            {
                self.grid.insert(owner, segment, position);
            }
        }
    }

    /// Heads eat pellets in reach. Returns the number eaten.
    fn resolve_food(&mut self) -> usize {
        let mut eaten = 0;
        for snake in self.snakes.iter_mut().filter(|s| s.alive) {
            let head = snake.head();
            let reach = food_reach(snake.head_radius(), self.food_radius);
            let mut i = self.foods.len();
            while i > 0 {
                i -= 1;
                if within(head, self.foods[i].position, reach) {
                    let food = self.foods.swap_remove(i);
                    snake.grow(food.value);
                    self.food_events.removed.push(food.id);
                    eaten += 1;
                }
            }
        }
        eaten
    }

    /// Heads touching another snake's body die and drop food.
    fn resolve_snake_collisions(&mut self) -> Vec<DeathNotice> {
        let mut deaths = Vec::new();
        for i in 0..self.snakes.len() {
            let snake = &self.snakes[i];
            if !snake.alive {
                continue;
            }
            let head = snake.head();
            if find_body_hit(&self.grid, i, head, body_reach(snake.head_radius())).is_none() {
                continue;
            }

            let snake = &mut self.snakes[i];
            let drops = snake.die(&mut self.rng);
            deaths.push(DeathNotice {
                snake_id: snake.id.clone(),
                score: snake.score(),
                length: snake.len(),
            });
            for point in drops {
                self.add_food(point, FoodOrigin::DeathDrop);
            }
        }
        deaths
    }

    /// Drop dead AI snakes and dead player snakes nobody controls.
    fn reap(&mut self, is_owned: impl Fn(&str) -> bool) -> usize {
        let before = self.snakes.len();
        self.snakes
            .retain(|s| s.alive || (!s.is_ai() && is_owned(&s.id)));
        before - self.snakes.len()
    }

    /// Top up AI snakes and ambient food. Returns the number of AI spawned.
    fn maintain_population(&mut self) -> usize {
        let missing = self.ai_count.saturating_sub(self.alive_ai());
        for _ in 0..missing {
            self.spawn_ai(true);
        }
        while self.foods.len() < self.food_count {
            self.add_ambient_food();
        }
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn empty_config() -> Config {
        let mut config = Config::default();
        config.world.seed = Some(42);
        config.food.count = 0;
        config.ai.count = 0;
        config
    }

    fn place(world: &mut World, id: &str, head: Vec2, angle: f32) {
        let gap = world.params.segment_gap;
        let snake = world.snake_mut(id).unwrap();
        snake.angle = angle;
        snake.target_angle = angle;
        snake.place_at(head, gap);
    }

    #[test]
    fn test_populate_fills_floors() {
        let mut config = Config::default();
        config.world.seed = Some(1);
        config.food.count = 120;
        config.ai.count = 4;
        let mut world = World::new(&config);
        world.populate();

        assert_eq!(world.foods().len(), 120);
        assert_eq!(world.alive_ai(), 4);
        assert!(world.snakes().iter().all(|s| s.id.starts_with("ai_")));
        assert!(world.food_events().added.is_empty());
        for snake in world.snakes() {
            assert!(snake.len() >= 20 && snake.len() < 80);
        }
    }

    #[test]
    fn test_ids_share_one_serial() {
        let mut world = World::new(&empty_config());
        assert_eq!(world.spawn_player("A".to_string()), "p_1");
        assert_eq!(world.spawn_ai(false), "ai_2");
        assert_eq!(world.spawn_player("B".to_string()), "p_3");
    }

    #[test]
    fn test_head_eats_food_in_reach() {
        let mut world = World::new(&empty_config());
        let id = world.spawn_player("A".to_string());
        place(&mut world, &id, Vec2::splat(3000.0), 0.0);
        let near = world.add_food(Vec2::new(3010.0, 3000.0), FoodOrigin::DeathDrop);
        let far = world.add_food(Vec2::new(3200.0, 3000.0), FoodOrigin::Ambient);

        let report = world.step(|_| true);
        assert_eq!(report.eaten, 1);
        assert_eq!(world.snake(&id).unwrap().len(), 23);
        assert_eq!(world.food_events().removed, vec![near]);
        assert!(world.foods().iter().all(|f| f.id != near));
        assert!(world.foods().iter().any(|f| f.id == far));
    }

    #[test]
    fn test_head_on_body_dies() {
        let mut world = World::new(&empty_config());
        let a = world.spawn_player("A".to_string());
        let b = world.spawn_player("B".to_string());
        place(&mut world, &b, Vec2::new(3000.0, 3000.0), 0.0);
        // A points straight at B's body from just above it.
        place(&mut world, &a, Vec2::new(2960.0, 3020.0), -FRAC_PI_2);

        let report = world.step(|_| true);
        assert_eq!(report.deaths.len(), 1);
        assert_eq!(report.deaths[0].snake_id, a);
        assert_eq!(report.deaths[0].length, 20);
        assert_eq!(report.deaths[0].score, 0);
        assert!(!world.snake(&a).unwrap().alive);
        assert!(world.snake(&b).unwrap().alive);

        // Body turned into death drops.
        assert_eq!(world.foods().len(), 7);
        assert_eq!(world.food_events().added.len(), 7);
        assert!(world.foods().iter().all(|f| f.origin == FoodOrigin::DeathDrop));

        // Dead snakes leave the grid on the next rebuild.
        world.step(|_| true);
        assert_eq!(world.grid().len(), 6);
    }

    #[test]
    fn test_own_body_never_kills() {
        let mut world = World::new(&empty_config());
        let id = world.spawn_player("A".to_string());
        place(&mut world, &id, Vec2::splat(3000.0), 0.0);
        world.snake_mut(&id).unwrap().grow(200);
        world.snake_mut(&id).unwrap().target_angle = std::f32::consts::PI;
        for _ in 0..120 {
            let report = world.step(|_| true);
            assert!(report.deaths.is_empty());
        }
        assert!(world.snake(&id).unwrap().alive);
    }

    #[test]
    fn test_reap_rules() {
        let mut world = World::new(&empty_config());
        let owned = world.spawn_player("A".to_string());
        let orphan = world.spawn_player("B".to_string());
        let idle = world.spawn_player("C".to_string());
        let bot = world.spawn_ai(false);
        place(&mut world, &owned, Vec2::new(1000.0, 1000.0), 0.0);
        place(&mut world, &orphan, Vec2::new(2000.0, 1000.0), 0.0);
        place(&mut world, &idle, Vec2::new(3000.0, 1000.0), 0.0);
        place(&mut world, &bot, Vec2::new(4000.0, 1000.0), 0.0);
        world.kill(&owned);
        world.kill(&orphan);
        world.kill(&bot);

        let keep = owned.clone();
        let report = world.step(move |id| id == keep);
        assert_eq!(report.reaped, 2);
        assert!(world.snake(&owned).is_some());
        assert!(world.snake(&orphan).is_none());
        assert!(world.snake(&bot).is_none());
        // Alive snakes survive even without an owner.
        assert!(world.snake(&idle).is_some());
    }

    #[test]
    fn test_kill_is_once() {
        let mut world = World::new(&empty_config());
        let id = world.spawn_player("A".to_string());
        assert!(world.kill(&id));
        assert!(!world.kill(&id));
        assert!(!world.kill("p_999"));
        assert_eq!(world.foods().len(), 7);
    }

    #[test]
    fn test_population_is_restored() {
        let mut config = Config::default();
        config.world.seed = Some(9);
        config.food.count = 50;
        config.ai.count = 3;
        let mut world = World::new(&config);
        world.populate();
        world.spawn_player("Rex".to_string());

        let victim = world.snakes().iter().find(|s| s.is_ai()).unwrap().id.clone();
        world.kill(&victim);
        world.step(|_| true);

        assert_eq!(world.alive_ai(), 3);
        assert!(world.snakes().iter().all(|s| !s.is_ai() || s.alive));
        assert!(world.foods().len() >= 50);
    }

    #[test]
    fn test_ai_spawns_near_player() {
        let mut world = World::new(&empty_config());
        let player = world.spawn_player("Rex".to_string());
        place(&mut world, &player, Vec2::new(1000.0, 5000.0), 0.0);
        for _ in 0..20 {
            let id = world.spawn_ai(true);
            let head = world.snake(&id).unwrap().head();
            assert!(head.distance(Vec2::new(1000.0, 5000.0)) <= 2000.0 + 1e-2);
            assert!(head.x >= 200.0 && head.x <= 5800.0);
            assert!(head.y >= 200.0 && head.y <= 5800.0);
        }
    }

    #[test]
    fn test_bodies_stay_in_bounds() {
        let mut config = Config::default();
        config.world.seed = Some(7);
        let mut world = World::new(&config);
        world.populate();
        world.spawn_player("Rex".to_string());

        let size = world.world_size();
        for _ in 0..200 {
            world.step(|_| true);
        }
        for snake in world.snakes().iter().filter(|s| s.alive) {
            for seg in &snake.segments {
                assert!(seg.x >= 0.0 && seg.x <= size);
                assert!(seg.y >= 0.0 && seg.y <= size);
            }
        }
        assert!(world.foods().len() >= 800);
        assert_eq!(world.alive_ai(), 15);
    }
}
