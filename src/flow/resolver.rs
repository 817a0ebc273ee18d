//! Step resolution
//!
//! This module turns the current step of a session into displayable content
//! by evaluating dynamic messages and quick replies against accumulated
//! data. Resolution is a pure function of `(flow, state)`: resolving twice
//! without an intervening transition yields identical output.

use serde::Serialize;

use super::definition::{FlowDefinition, QuickReply, StepId, StepType};
use super::state::FlowState;
use crate::utils::errors::{PayPilotError, Result};

/// A step's content, fully evaluated for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedStep {
    pub id: StepId,
    pub step_type: StepType,
    pub message: String,
    pub quick_replies: Vec<QuickReply>,
    pub can_go_back: bool,
    pub can_skip: bool,
    pub skip_to_step: Option<StepId>,
}

/// Resolve the current step of a session for display.
///
/// An unknown `current_step` is a defect in the flow graph and is fatal.
pub fn resolve(flow: &FlowDefinition, state: &FlowState) -> Result<ResolvedStep> {
    let step = flow
        .steps
        .get(&state.current_step)
        .ok_or_else(|| PayPilotError::StepNotFound {
            flow_id: flow.id.clone(),
            step_id: state.current_step.clone(),
        })?;

    Ok(ResolvedStep {
        id: step.id.clone(),
        step_type: step.step_type,
        message: step.message.render(&state.accumulated_data),
        quick_replies: step
            .quick_replies
            .as_ref()
            .map(|replies| replies.render(&state.accumulated_data))
            .unwrap_or_default(),
        can_go_back: step.can_go_back,
        can_skip: step.can_skip,
        skip_to_step: step.skip_to_step.clone(),
    })
}
