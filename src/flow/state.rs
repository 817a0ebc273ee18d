//! Per-session flow state
//!
//! This module defines [`FlowState`], the unit of persistence for one
//! in-progress guided interaction. The state is plain serializable data
//! (strings, numbers, nested JSON) so an external store can save and reload
//! a session between chat turns or process restarts. It is mutated only by
//! the transition engine and retired by the session lifecycle manager.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::definition::{StepData, StepId};

/// One in-progress instantiation of a flow, uniquely tied to one session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowState {
    /// Session this state belongs to
    pub session_id: Uuid,
    /// Flow this state is an instance of
    pub flow_id: String,
    /// Step the session is currently at
    pub current_step: StepId,
    /// Everything collected across the flow's steps so far
    pub accumulated_data: StepData,
    /// Previously visited step ids, newest last
    pub history: Vec<StepId>,
    /// When this session started
    pub started_at: DateTime<Utc>,
    /// When this state last changed
    pub last_updated_at: DateTime<Utc>,
}

impl FlowState {
    /// Create a fresh state positioned at a flow's initial step
    pub fn new(flow_id: &str, initial_step: &str) -> Self {
        let now = Utc::now();
        Self {
            session_id: Uuid::new_v4(),
            flow_id: flow_id.to_string(),
            current_step: initial_step.to_string(),
            accumulated_data: StepData::new(),
            history: Vec::new(),
            started_at: now,
            last_updated_at: now,
        }
    }

    /// Write a value into accumulated data (overwrite semantics)
    pub fn set_value(&mut self, key: &str, value: serde_json::Value) {
        self.accumulated_data.insert(key.to_string(), value);
        self.last_updated_at = Utc::now();
    }

    /// Get a raw value from accumulated data
    pub fn get_value(&self, key: &str) -> Option<&serde_json::Value> {
        self.accumulated_data.get(key)
    }

    /// Get string data (convenience method)
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get_value(key).and_then(|v| v.as_str())
    }

    /// Get numeric data, coercing strings when they parse (convenience method)
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        match self.get_value(key)? {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Get boolean data (convenience method)
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get_value(key).and_then(|v| v.as_bool())
    }

    pub fn has_value(&self, key: &str) -> bool {
        self.accumulated_data.contains_key(key)
    }

    /// Create a summary of the state for logging
    pub fn summary(&self) -> StateSummary {
        StateSummary {
            session_id: self.session_id,
            flow_id: self.flow_id.clone(),
            current_step: self.current_step.clone(),
            data_keys: self.accumulated_data.keys().cloned().collect(),
            history_depth: self.history.len(),
            last_updated_at: self.last_updated_at,
        }
    }
}

/// State summary for logging and debugging
#[derive(Debug, Clone, Serialize)]
pub struct StateSummary {
    pub session_id: Uuid,
    pub flow_id: String,
    pub current_step: StepId,
    pub data_keys: Vec<String>,
    pub history_depth: usize,
    pub last_updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_empty() {
        let state = FlowState::new("employee_onboarding", "welcome");
        assert_eq!(state.flow_id, "employee_onboarding");
        assert_eq!(state.current_step, "welcome");
        assert!(state.accumulated_data.is_empty());
        assert!(state.history.is_empty());
    }

    #[test]
    fn test_value_accessors() {
        let mut state = FlowState::new("test", "a");
        state.set_value("name", "Grace".into());
        state.set_value("salary", "4500".into());
        state.set_value("remote", true.into());

        assert_eq!(state.get_str("name"), Some("Grace"));
        assert_eq!(state.get_f64("salary"), Some(4500.0));
        assert_eq!(state.get_bool("remote"), Some(true));
        assert_eq!(state.get_str("missing"), None);
    }

    #[test]
    fn test_overwrite_semantics() {
        let mut state = FlowState::new("test", "a");
        state.set_value("name", "Grace".into());
        state.set_value("name", "Ada".into());
        assert_eq!(state.get_str("name"), Some("Ada"));
        assert_eq!(state.accumulated_data.len(), 1);
    }

    #[test]
    fn test_serde_round_trip() {
        let mut state = FlowState::new("payroll_run", "hub");
        state.set_value("period", "2026-07".into());
        state.history.push("hub".to_string());

        let json = serde_json::to_string(&state).unwrap();
        let restored: FlowState = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.session_id, state.session_id);
        assert_eq!(restored.current_step, state.current_step);
        assert_eq!(restored.get_str("period"), Some("2026-07"));
        assert_eq!(restored.history, vec!["hub".to_string()]);
    }
}
