//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use super::Settings;
use crate::utils::errors::{PayPilotError, Result};

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_assistant_config(&settings.assistant)?;
    validate_session_config(&settings.session)?;
    validate_logging_config(&settings.logging)?;
    Ok(())
}

/// Validate assistant configuration
fn validate_assistant_config(config: &super::AssistantConfig) -> Result<()> {
    if config.default_flow.is_empty() {
        return Err(PayPilotError::Config(
            "Default flow is required".to_string(),
        ));
    }

    if config.available_flows.is_empty() {
        return Err(PayPilotError::Config(
            "At least one available flow is required".to_string(),
        ));
    }

    if !config.available_flows.contains(&config.default_flow) {
        return Err(PayPilotError::Config(
            "Default flow must be in the available flows list".to_string(),
        ));
    }

    Ok(())
}

/// Validate session configuration
fn validate_session_config(config: &super::SessionConfig) -> Result<()> {
    if config.max_active_sessions == 0 {
        return Err(PayPilotError::Config(
            "Max active sessions must be greater than 0".to_string(),
        ));
    }

    if config.ttl_seconds == 0 {
        return Err(PayPilotError::Config(
            "Session TTL must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(PayPilotError::Config("Log level is required".to_string()));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(PayPilotError::Config(format!(
            "Invalid log level: {}. Valid levels: {:?}",
            config.level, valid_levels
        )));
    }

    Ok(())
}
