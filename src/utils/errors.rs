//! Error handling for PayPilot
//!
//! This module defines the main error types used throughout the application
//! and provides a unified error handling strategy. Expected, user-triggerable
//! conditions (invalid input, nothing to go back to) are surfaced as values
//! by the flow engine; only defects in the static flow graph or the
//! surrounding infrastructure become errors of this type.

use thiserror::Error;

/// Main error type for the PayPilot assistant core
#[derive(Error, Debug)]
pub enum PayPilotError {
    #[error("Duplicate flow id: {flow_id}")]
    DuplicateFlowId { flow_id: String },

    #[error("Flow not found: {flow_id}")]
    FlowNotFound { flow_id: String },

    #[error("Step not found: {step_id} in flow {flow_id}")]
    StepNotFound { flow_id: String, step_id: String },

    #[error("Session not found: {session_id}")]
    SessionNotFound { session_id: String },

    #[error("Session limit reached ({limit} active)")]
    SessionLimitReached { limit: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type alias for PayPilot operations
pub type Result<T> = std::result::Result<T, PayPilotError>;

impl PayPilotError {
    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            PayPilotError::DuplicateFlowId { .. } => false,
            PayPilotError::FlowNotFound { .. } => false,
            PayPilotError::StepNotFound { .. } => false,
            PayPilotError::SessionNotFound { .. } => true,
            PayPilotError::SessionLimitReached { .. } => true,
            PayPilotError::Config(_) => false,
            PayPilotError::Serialization(_) => false,
            PayPilotError::Io(_) => true,
            PayPilotError::Storage(_) => true,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            PayPilotError::DuplicateFlowId { .. } => ErrorSeverity::Critical,
            PayPilotError::FlowNotFound { .. } => ErrorSeverity::Critical,
            PayPilotError::StepNotFound { .. } => ErrorSeverity::Critical,
            PayPilotError::Config(_) => ErrorSeverity::Critical,
            PayPilotError::SessionNotFound { .. } => ErrorSeverity::Warning,
            PayPilotError::SessionLimitReached { .. } => ErrorSeverity::Warning,
            PayPilotError::Storage(_) => ErrorSeverity::Error,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
