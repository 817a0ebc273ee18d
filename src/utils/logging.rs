//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the PayPilot assistant core.

use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;
use crate::utils::errors::Result;

/// Initialize logging based on configuration
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let file_appender = tracing_appender::rolling::daily(&config.file_path, "paypilot.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking))
        .init();

    info!("Logging initialized with level: {}", config.level);
    Ok(())
}

/// Log session lifecycle events with structured data
pub fn log_session_event(session_id: &str, flow_id: &str, event: &str) {
    info!(
        session_id = session_id,
        flow_id = flow_id,
        event = event,
        "Session lifecycle event"
    );
}

/// Log a flow transition
pub fn log_transition(session_id: &str, from_step: &str, to_step: &str) {
    debug!(
        session_id = session_id,
        from_step = from_step,
        to_step = to_step,
        "Flow transition"
    );
}

/// Log a validation rejection
pub fn log_validation_failure(session_id: &str, step_id: &str, message: &str) {
    debug!(
        session_id = session_id,
        step_id = step_id,
        message = message,
        "Input rejected by validation"
    );
}

/// Log action executor results
pub fn log_executor_result(session_id: &str, flow_id: &str, success: bool, details: Option<&str>) {
    if success {
        info!(
            session_id = session_id,
            flow_id = flow_id,
            details = details,
            "Action executor completed"
        );
    } else {
        warn!(
            session_id = session_id,
            flow_id = flow_id,
            details = details,
            "Action executor failed"
        );
    }
}
