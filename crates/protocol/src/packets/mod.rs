//! Message definitions for the slither protocol.
//!
//! Every frame is a single JSON object. Client messages are tagged by a
//! `type` field (`join`, `input`, `respawn`), server messages by a one-letter
//! `t` field (`w` welcome, `s` state, `d` death).

mod client;
mod server;

pub use client::*;
pub use server::*;
