//! PayPilot assistant core
//!
//! The conversational heart of the PayPilot payroll suite: a deterministic
//! guided-flow engine that drives multi-step wizards (employee onboarding,
//! payroll runs) with validation, branching, back/skip navigation, and a
//! two-phase protocol around external side-effecting actions. The engine is
//! UI-agnostic and persistence-friendly; chat rendering, storage backends,
//! and the actions themselves are external collaborators.

#![allow(non_snake_case)]

pub mod assistant;
pub mod config;
pub mod executor;
pub mod flow;
pub mod flows;
pub mod session;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{PayPilotError, Result};

// Re-export main components for easy access
pub use assistant::{Conductor, Turn, TurnStatus};
pub use executor::{ActionExecutor, ExecutorError};
pub use flow::{
    advance, go_back, resolve, AdvanceOutcome, BackOutcome, FlowDefinition, FlowRegistry,
    FlowState, QuickReply, ResolvedStep, StepDefinition, StepType, ValidationRule, CANCEL_TOKEN,
    CONTINUE_TOKEN, EXECUTION_RESULT_KEY, SKIP_TOKEN,
};
pub use flows::default_registry;
pub use session::{InMemoryStateStore, SessionManager, StateStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
