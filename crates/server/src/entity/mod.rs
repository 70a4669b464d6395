//! Game entities.
//!
//! Snakes (player and AI controlled) and the food they collect.

mod food;
mod palette;
mod snake;

pub use food::{Food, FoodOrigin};
pub use palette::{FOOD_COLORS, PALETTES, palette_table};
pub use snake::{AI_PREFIX, PLAYER_PREFIX, Snake, SnakeParams, normalize_angle};
