//! Session lifecycle management
//!
//! This module creates, tracks, and retires flow sessions. A session is one
//! in-progress instantiation of a flow, uniquely tied to one conversation.
//! Sessions do not share mutable state with each other; the only shared
//! structure is the read-only flow registry.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use uuid::Uuid;

use crate::flow::{FlowRegistry, FlowState};
use crate::utils::errors::{PayPilotError, Result};
use crate::utils::logging::log_session_event;

/// Creates and retires flow sessions against an immutable registry
#[derive(Debug)]
pub struct SessionManager {
    registry: Arc<FlowRegistry>,
    active: RwLock<HashSet<Uuid>>,
    max_active: Option<usize>,
}

impl SessionManager {
    pub fn new(registry: Arc<FlowRegistry>) -> Self {
        Self {
            registry,
            active: RwLock::new(HashSet::new()),
            max_active: None,
        }
    }

    /// Cap the number of concurrently active sessions
    pub fn with_session_limit(mut self, max_active: usize) -> Self {
        self.max_active = Some(max_active);
        self
    }

    pub fn registry(&self) -> &FlowRegistry {
        &self.registry
    }

    /// Start a new session of the given flow.
    ///
    /// Creates a fresh state at the flow's initial step with empty history
    /// and data, and registers it as active.
    pub fn start_flow(&self, flow_id: &str) -> Result<FlowState> {
        let flow = self.registry.get(flow_id)?;

        let mut active = self.active.write().expect("session set lock poisoned");
        if let Some(limit) = self.max_active {
            if active.len() >= limit {
                return Err(PayPilotError::SessionLimitReached { limit });
            }
        }

        let state = FlowState::new(&flow.id, &flow.initial_step);
        active.insert(state.session_id);
        drop(active);

        log_session_event(&state.session_id.to_string(), flow_id, "started");
        Ok(state)
    }

    /// Retire a session that ran to completion. Idempotent.
    pub fn complete_flow(&self, state: &FlowState) {
        if self.deregister(state.session_id) {
            log_session_event(&state.session_id.to_string(), &state.flow_id, "completed");
        }
    }

    /// Retire a session the user aborted. Idempotent.
    pub fn cancel_flow(&self, state: &FlowState) {
        if self.deregister(state.session_id) {
            log_session_event(&state.session_id.to_string(), &state.flow_id, "cancelled");
        }
    }

    pub fn is_active(&self, session_id: Uuid) -> bool {
        self.active
            .read()
            .expect("session set lock poisoned")
            .contains(&session_id)
    }

    pub fn active_count(&self) -> usize {
        self.active.read().expect("session set lock poisoned").len()
    }

    fn deregister(&self, session_id: Uuid) -> bool {
        self.active
            .write()
            .expect("session set lock poisoned")
            .remove(&session_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::{FlowDefinition, StepDefinition, StepType};

    fn registry_with(flow_ids: &[&str]) -> Arc<FlowRegistry> {
        let mut registry = FlowRegistry::new();
        for id in flow_ids {
            registry
                .register(
                    FlowDefinition::new(id, "start", "end")
                        .with_step(
                            StepDefinition::new("start", StepType::Input, "Start").then("end"),
                        )
                        .with_step(StepDefinition::new("end", StepType::Result, "End")),
                )
                .unwrap();
        }
        Arc::new(registry)
    }

    #[test]
    fn test_start_flow_creates_fresh_state() {
        let manager = SessionManager::new(registry_with(&["employee_onboarding"]));

        let state = manager.start_flow("employee_onboarding").unwrap();
        assert_eq!(state.current_step, "start");
        assert!(state.history.is_empty());
        assert!(state.accumulated_data.is_empty());
        assert!(manager.is_active(state.session_id));
        assert_eq!(manager.active_count(), 1);
    }

    #[test]
    fn test_start_unknown_flow_fails() {
        let manager = SessionManager::new(registry_with(&["employee_onboarding"]));
        assert!(matches!(
            manager.start_flow("ghost").unwrap_err(),
            PayPilotError::FlowNotFound { .. }
        ));
    }

    #[test]
    fn test_complete_and_cancel_are_idempotent() {
        let manager = SessionManager::new(registry_with(&["employee_onboarding"]));
        let state = manager.start_flow("employee_onboarding").unwrap();

        manager.complete_flow(&state);
        assert!(!manager.is_active(state.session_id));
        // Second retirement is a no-op, not an error.
        manager.complete_flow(&state);
        manager.cancel_flow(&state);
        assert_eq!(manager.active_count(), 0);
    }

    #[test]
    fn test_independent_sessions() {
        let manager = SessionManager::new(registry_with(&["employee_onboarding"]));

        let first = manager.start_flow("employee_onboarding").unwrap();
        let second = manager.start_flow("employee_onboarding").unwrap();
        assert_ne!(first.session_id, second.session_id);
        assert_eq!(manager.active_count(), 2);

        manager.cancel_flow(&first);
        assert!(!manager.is_active(first.session_id));
        assert!(manager.is_active(second.session_id));
    }

    #[test]
    fn test_session_limit_enforced() {
        let manager =
            SessionManager::new(registry_with(&["employee_onboarding"])).with_session_limit(1);

        let first = manager.start_flow("employee_onboarding").unwrap();
        assert!(matches!(
            manager.start_flow("employee_onboarding").unwrap_err(),
            PayPilotError::SessionLimitReached { limit: 1 }
        ));

        manager.cancel_flow(&first);
        assert!(manager.start_flow("employee_onboarding").is_ok());
    }
}
