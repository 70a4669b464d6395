//! Authoritative snake arena server library.

pub mod ai;
pub mod collision;
pub mod config;
pub mod entity;
pub mod server;
pub mod spatial;
pub mod world;

// Re-export commonly used types
pub use config::Config;
pub use server::{GameState, run, serve};
pub use world::{DeathNotice, TickReport, World};
