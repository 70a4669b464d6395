//! AI-controlled snakes.
//!
//! A reactive controller: every tick each AI snake may pick a new heading
//! based on walls, nearby threats and food. No planning or lookahead.

mod controller;
mod names;

pub use controller::{AiBrain, Behavior, Steering, think};
pub use names::random_name;
