//! Server configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// Smallest arena the spawn and AI margins fit in.
const MIN_WORLD_SIZE: f32 = 1000.0;
/// Smallest grid cell; keeps the cell count bounded.
const MIN_GRID_CELL: f32 = 10.0;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub snake: SnakeConfig,
    #[serde(default)]
    pub food: FoodConfig,
    #[serde(default)]
    pub ai: AiConfig,
}

impl Config {
    /// Load configuration from `config.toml` or use defaults.
    ///
    /// The `PORT` environment variable overrides `server.port`.
    pub fn load() -> anyhow::Result<Self> {
        let path = Path::new("config.toml");
        let config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Self::from_toml(&contents)?
        } else {
            info!("No config.toml found, creating default config");
            let default_config = Self::default();
            std::fs::write(path, toml::to_string_pretty(&default_config)?)?;
            default_config
        };
        Ok(config.with_env_overrides())
    }

    /// Parse configuration from TOML text. Missing fields take their defaults
    /// and out-of-range arena values are reset.
    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(contents)?;
        Ok(config.sanitized())
    }

    /// Reset arena values the world cannot be built with.
    pub fn sanitized(mut self) -> Self {
        let world = &mut self.world;
        if !(world.size.is_finite() && world.size >= MIN_WORLD_SIZE) {
            warn!(
                "world.size {} is below {}, using {}",
                world.size,
                MIN_WORLD_SIZE,
                default_world_size()
            );
            world.size = default_world_size();
        }
        if !(world.grid_cell.is_finite() && world.grid_cell >= MIN_GRID_CELL) {
            warn!(
                "world.grid_cell {} is below {}, using {}",
                world.grid_cell,
                MIN_GRID_CELL,
                default_grid_cell()
            );
            world.grid_cell = default_grid_cell();
        }
        if world.grid_cell > world.size {
            warn!("world.grid_cell {} exceeds world.size, clamping", world.grid_cell);
            world.grid_cell = world.size;
        }
        self
    }

    /// Apply environment overrides.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(port) = std::env::var("PORT") {
            match port.parse::<u16>() {
                Ok(port) => self.server.port = port,
                Err(_) => warn!("Ignoring invalid PORT value: {}", port),
            }
        }
        self
    }

    /// Duration of one simulation tick.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.server.tick_rate.max(1) as f64)
    }

    /// Number of ticks between state broadcasts (tick rate / send rate, rounded).
    pub fn send_every(&self) -> u64 {
        let ratio = self.server.tick_rate as f64 / self.server.send_rate.max(1) as f64;
        (ratio.round() as u64).max(1)
    }
}

/// Server networking and scheduling settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Bind address.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Maximum connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
    /// Connections per IP limit.
    #[serde(default = "default_ip_limit")]
    pub ip_limit: usize,
    /// Simulation ticks per second.
    #[serde(default = "default_tick_rate")]
    pub tick_rate: u32,
    /// State broadcasts per second.
    #[serde(default = "default_send_rate")]
    pub send_rate: u32,
    /// Per-connection outbound queue length; messages beyond it are dropped.
    #[serde(default = "default_outbound_queue")]
    pub outbound_queue: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: default_bind(),
            max_connections: default_max_connections(),
            ip_limit: default_ip_limit(),
            tick_rate: default_tick_rate(),
            send_rate: default_send_rate(),
            outbound_queue: default_outbound_queue(),
        }
    }
}

fn default_port() -> u16 {
    3000
}
fn default_bind() -> String {
    "0.0.0.0".to_string()
}
fn default_max_connections() -> usize {
    200
}
fn default_ip_limit() -> usize {
    20
}
fn default_tick_rate() -> u32 {
    30
}
fn default_send_rate() -> u32 {
    15
}
fn default_outbound_queue() -> usize {
    32
}

/// Arena configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorldConfig {
    /// Side length of the square arena.
    #[serde(default = "default_world_size")]
    pub size: f32,
    /// Spatial grid cell size.
    #[serde(default = "default_grid_cell")]
    pub grid_cell: f32,
    /// Half-width of the square view window sent to each client.
    #[serde(default = "default_view_range")]
    pub view_range: f32,
    /// Fixed RNG seed (random when unset).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            size: default_world_size(),
            grid_cell: default_grid_cell(),
            view_range: default_view_range(),
            seed: None,
        }
    }
}

fn default_world_size() -> f32 {
    6000.0
}
fn default_grid_cell() -> f32 {
    200.0
}
fn default_view_range() -> f32 {
    1800.0
}

/// Snake movement and body settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SnakeConfig {
    #[serde(default = "default_initial_length")]
    pub initial_length: usize,
    /// Spacing between segments of a freshly spawned body.
    #[serde(default = "default_segment_gap")]
    pub segment_gap: f32,
    #[serde(default = "default_base_speed")]
    pub base_speed: f32,
    #[serde(default = "default_boost_speed")]
    pub boost_speed: f32,
    /// Fraction of the heading error removed per tick.
    #[serde(default = "default_turn_rate")]
    pub turn_rate: f32,
    #[serde(default = "default_max_name_length")]
    pub max_name_length: usize,
}

impl Default for SnakeConfig {
    fn default() -> Self {
        Self {
            initial_length: default_initial_length(),
            segment_gap: default_segment_gap(),
            base_speed: default_base_speed(),
            boost_speed: default_boost_speed(),
            turn_rate: default_turn_rate(),
            max_name_length: default_max_name_length(),
        }
    }
}

fn default_initial_length() -> usize {
    20
}
fn default_segment_gap() -> f32 {
    4.0
}
fn default_base_speed() -> f32 {
    3.2
}
fn default_boost_speed() -> f32 {
    6.0
}
fn default_turn_rate() -> f32 {
    0.12
}
fn default_max_name_length() -> usize {
    15
}

/// Food configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FoodConfig {
    /// Ambient food population floor.
    #[serde(default = "default_food_count")]
    pub count: usize,
    /// Radius of ambient food.
    #[serde(default = "default_food_radius")]
    pub radius: f32,
}

impl Default for FoodConfig {
    fn default() -> Self {
        Self {
            count: default_food_count(),
            radius: default_food_radius(),
        }
    }
}

fn default_food_count() -> usize {
    800
}
fn default_food_radius() -> f32 {
    5.0
}

/// AI population configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AiConfig {
    /// Number of live AI snakes kept in the arena.
    #[serde(default = "default_ai_count")]
    pub count: usize,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            count: default_ai_count(),
        }
    }
}

fn default_ai_count() -> usize {
    15
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.world.size, 6000.0);
        assert_eq!(config.snake.initial_length, 20);
        assert_eq!(config.food.count, 800);
        assert_eq!(config.ai.count, 15);
        assert_eq!(config.send_every(), 2);
    }

    #[test]
    fn test_partial_toml() {
        let config = Config::from_toml(
            r#"
            [server]
            port = 4000
            tick_rate = 60
            send_rate = 20

            [world]
            seed = 7
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.server.bind, "0.0.0.0");
        assert_eq!(config.world.seed, Some(7));
        assert_eq!(config.world.view_range, 1800.0);
        assert_eq!(config.send_every(), 3);
    }

    #[test]
    fn test_send_every_never_zero() {
        let mut config = Config::default();
        config.server.tick_rate = 10;
        config.server.send_rate = 30;
        assert_eq!(config.send_every(), 1);
    }

    #[test]
    fn test_bad_arena_values_are_reset() {
        let config = Config::from_toml(
            r#"
            [world]
            size = -5.0
            grid_cell = 0.0
            "#,
        )
        .unwrap();
        assert_eq!(config.world.size, 6000.0);
        assert_eq!(config.world.grid_cell, 200.0);

        let config = Config::from_toml("[world]\nsize = 2000.0\ngrid_cell = 5000.0").unwrap();
        assert_eq!(config.world.size, 2000.0);
        assert_eq!(config.world.grid_cell, 2000.0);

        let config = Config::from_toml("[world]\ngrid_cell = 3.0").unwrap();
        assert_eq!(config.world.grid_cell, 200.0);
    }

    #[test]
    fn test_round_trips_through_toml() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        let config = Config::from_toml(&text).unwrap();
        assert_eq!(config.snake.turn_rate, 0.12);
    }
}
