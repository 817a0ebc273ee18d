//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub assistant: AssistantConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

/// Assistant behavior configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AssistantConfig {
    /// Flow started when a conversation opens without an explicit choice
    pub default_flow: String,
    /// Flows offered to the user by the console driver
    pub available_flows: Vec<String>,
}

/// Session handling configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Upper bound on concurrently active sessions
    pub max_active_sessions: usize,
    /// Idle lifetime of a persisted session, in seconds
    pub ttl_seconds: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: String,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("PAYPILOT"))
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::PayPilotError> {
        super::validation::validate_settings(self)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            assistant: AssistantConfig {
                default_flow: "employee_onboarding".to_string(),
                available_flows: vec![
                    "employee_onboarding".to_string(),
                    "payroll_run".to_string(),
                ],
            },
            session: SessionConfig {
                max_active_sessions: 1024,
                ttl_seconds: 86_400,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: "./logs".to_string(),
            },
        }
    }
}
