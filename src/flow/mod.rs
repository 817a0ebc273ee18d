//! Guided flow engine
//!
//! A deterministic state machine for multi-step, branching, conversational
//! wizards. Flow definitions are an immutable graph of steps; per-session
//! progress lives in a serializable [`FlowState`]; the transition engine
//! advances and reverts that state; the resolver turns the current step
//! into displayable content. The engine never performs I/O: execution-type
//! steps are a signal for the orchestrating caller to run an external
//! action and re-enter with [`CONTINUE_TOKEN`].

pub mod definition;
pub mod engine;
pub mod registry;
pub mod resolver;
pub mod state;
pub mod validator;

/// Reserved input that aborts a flow from any input step, bypassing validation
pub const CANCEL_TOKEN: &str = "__cancel__";

/// Reserved input that skips a skippable step, overriding its routing
pub const SKIP_TOKEN: &str = "__skip__";

/// Fixed continuation input for re-entering the engine after an external action
pub const CONTINUE_TOKEN: &str = "__continue__";

/// Reserved accumulated-data key under which executor results are merged
pub const EXECUTION_RESULT_KEY: &str = "_execution_result";

pub use definition::{
    FlowDefinition, NextStep, QuickReply, Replies, StepData, StepDefinition, StepId, StepType,
    Text, ValidationRule,
};
pub use engine::{advance, go_back, AdvanceOutcome, BackOutcome};
pub use registry::FlowRegistry;
pub use resolver::{resolve, ResolvedStep};
pub use state::FlowState;
pub use validator::validate;
