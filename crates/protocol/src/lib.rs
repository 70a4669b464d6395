//! Shared protocol crate for native-slither.
//!
//! This crate contains:
//! - Client -> server message parsing (lenient, per-field validation)
//! - Server -> client message definitions and JSON encoding
//! - The protocol error type

mod error;
pub mod packets;

pub use error::ProtocolError;
pub use packets::{ClientMessage, FoodView, Palette, ServerMessage, SnakeView};
