//! Synchronous match layer over the board engine.
//!
//! The host framework drives a match by dispatching [`Action`]s into a
//! [`GameSession`] and reacting to the [`Event`]s each call returns. All
//! mutation goes through `&mut self`, so a session has a single logical writer.

pub use config::*;
pub use session::*;

mod config;
mod session;
