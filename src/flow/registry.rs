//! Flow registry
//!
//! Immutable catalog of flow definitions, built once at startup and shared
//! read-only across all sessions. Registration performs structural
//! validation of the graph so defects surface at boot instead of mid
//! conversation.

use std::collections::HashMap;

use tracing::debug;

use super::definition::{FlowDefinition, NextStep, StepType};
use crate::utils::errors::{PayPilotError, Result};

/// Catalog of registered flow definitions
#[derive(Debug, Default)]
pub struct FlowRegistry {
    flows: HashMap<String, FlowDefinition>,
}

impl FlowRegistry {
    pub fn new() -> Self {
        Self {
            flows: HashMap::new(),
        }
    }

    /// Register a flow definition.
    ///
    /// Fails with `DuplicateFlowId` when the id is already taken, and with a
    /// structural error when the graph references a step that does not
    /// exist. Dynamic routing targets can only be checked at runtime.
    pub fn register(&mut self, flow: FlowDefinition) -> Result<()> {
        if self.flows.contains_key(&flow.id) {
            return Err(PayPilotError::DuplicateFlowId {
                flow_id: flow.id.clone(),
            });
        }

        validate_graph(&flow)?;

        debug!(flow_id = %flow.id, steps = flow.steps.len(), "Registered flow");
        self.flows.insert(flow.id.clone(), flow);
        Ok(())
    }

    /// Get a flow definition by id
    pub fn get(&self, flow_id: &str) -> Result<&FlowDefinition> {
        self.flows
            .get(flow_id)
            .ok_or_else(|| PayPilotError::FlowNotFound {
                flow_id: flow_id.to_string(),
            })
    }

    pub fn contains(&self, flow_id: &str) -> bool {
        self.flows.contains_key(flow_id)
    }

    pub fn flow_ids(&self) -> Vec<&str> {
        self.flows.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }
}

/// Check that every statically-known step reference resolves
fn validate_graph(flow: &FlowDefinition) -> Result<()> {
    let missing = |step_id: &str| PayPilotError::StepNotFound {
        flow_id: flow.id.clone(),
        step_id: step_id.to_string(),
    };

    if !flow.steps.contains_key(&flow.initial_step) {
        return Err(missing(&flow.initial_step));
    }
    if !flow.steps.contains_key(&flow.completed_step) {
        return Err(missing(&flow.completed_step));
    }

    for step in flow.steps.values() {
        if let NextStep::Static(next) = &step.next_step {
            if !flow.steps.contains_key(next) {
                return Err(missing(next));
            }
        }

        if step.can_skip {
            match &step.skip_to_step {
                Some(target) if flow.steps.contains_key(target) => {}
                Some(target) => return Err(missing(target)),
                None => {
                    return Err(PayPilotError::Config(format!(
                        "step {} in flow {} allows skip but has no skip target",
                        step.id, flow.id
                    )))
                }
            }
        }

        if step.step_type == StepType::Execution && !step.validation_rules.is_empty() {
            return Err(PayPilotError::Config(format!(
                "execution step {} in flow {} must not declare validation rules",
                step.id, flow.id
            )));
        }
    }

    Ok(())
}
