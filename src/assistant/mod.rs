//! Assistant orchestration
//!
//! The layer that connects a chat surface to the flow engine: session
//! lifecycle, persistence, cancel handling, and the two-phase execution
//! protocol around external actions.

pub mod conductor;

pub use conductor::{Conductor, Turn, TurnStatus};
