//! Action executor contract
//!
//! Execution-type steps mark the points where real side effects happen:
//! creating an employee record, running a payroll calculation, calling a
//! remote service. The flow engine never performs these actions itself; the
//! orchestration layer invokes an [`ActionExecutor`] and merges its result
//! into accumulated data before re-entering the engine.

use async_trait::async_trait;
use thiserror::Error;

use crate::flow::FlowState;

/// Errors surfaced by action executors.
///
/// These are external to the engine's taxonomy: the orchestration layer
/// translates a failure into normal flow routing (a retry step, a cancel
/// offer) rather than propagating it.
#[derive(Error, Debug)]
pub enum ExecutorError {
    #[error("Action failed: {0}")]
    Failed(String),

    #[error("Action timed out")]
    Timeout,

    #[error("Action rejected: {0}")]
    Rejected(String),
}

/// External collaborator that performs the side effect behind an execution
/// step. Results must be plain JSON data so they can be merged into the
/// session's accumulated data and persisted with it.
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    async fn execute(&self, state: &FlowState) -> Result<serde_json::Value, ExecutorError>;
}
