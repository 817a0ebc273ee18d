//! Transition engine
//!
//! This module owns the only two operations that mutate a [`FlowState`]:
//! [`advance`] and [`go_back`]. The engine is synchronous and performs no
//! I/O. Execution-type steps are not special-cased here beyond being
//! visible in the resolved output; the orchestrating caller runs the
//! external action and re-enters [`advance`] with [`CONTINUE_TOKEN`].

use chrono::Utc;

use super::definition::{FlowDefinition, StepType};
use super::resolver::{resolve, ResolvedStep};
use super::state::FlowState;
use super::validator::validate;
use super::{CANCEL_TOKEN, SKIP_TOKEN};
use crate::utils::errors::{PayPilotError, Result};
use crate::utils::logging::{log_transition, log_validation_failure};

/// Result of a forward transition attempt
#[derive(Debug, Clone)]
pub struct AdvanceOutcome {
    /// The step to display: the new step on success, the unchanged current
    /// step when validation rejected the input
    pub resolved: ResolvedStep,
    /// First failing rule's message, when the input was rejected
    pub validation_error: Option<String>,
}

impl AdvanceOutcome {
    /// Whether the input was rejected and the state left untouched
    pub fn is_rejected(&self) -> bool {
        self.validation_error.is_some()
    }
}

/// Result of a backward transition attempt
#[derive(Debug, Clone)]
pub enum BackOutcome {
    /// Moved to the previous step
    MovedTo(ResolvedStep),
    /// History is empty; an expected outcome, not a failure
    CannotGoBack,
}

/// Advance the flow one step forward.
///
/// Validation failure leaves the state byte-for-byte unchanged (no data
/// write, no history push) and surfaces the rule's message as a value.
/// A skip input on a skippable step routes to its skip target, overriding
/// whatever `next_step` would compute. Only a defective flow graph (an
/// unknown step id) produces an `Err`.
pub fn advance(
    flow: &FlowDefinition,
    state: &mut FlowState,
    input: Option<&str>,
) -> Result<AdvanceOutcome> {
    let step = flow
        .steps
        .get(&state.current_step)
        .ok_or_else(|| PayPilotError::StepNotFound {
            flow_id: flow.id.clone(),
            step_id: state.current_step.clone(),
        })?;

    let is_cancel = input == Some(CANCEL_TOKEN);
    let skip_taken = input == Some(SKIP_TOKEN) && step.can_skip;

    if !is_cancel && !skip_taken && !step.validation_rules.is_empty() {
        if let Some(message) = validate(input.unwrap_or(""), &step.validation_rules) {
            log_validation_failure(&state.session_id.to_string(), &step.id, &message);
            return Ok(AdvanceOutcome {
                resolved: resolve(flow, state)?,
                validation_error: Some(message),
            });
        }
    }

    if let Some(raw) = input {
        if !is_cancel && !skip_taken && step.step_type != StepType::Greeting {
            let key = step.storage_key().to_string();
            state
                .accumulated_data
                .insert(key, serde_json::Value::String(raw.to_string()));
        }
    }

    state.history.push(state.current_step.clone());

    let next_id = if skip_taken {
        step.skip_to_step.clone().ok_or_else(|| {
            PayPilotError::Config(format!(
                "step {} in flow {} allows skip but has no skip target",
                step.id, flow.id
            ))
        })?
    } else {
        step.next_step
            .resolve(&state.accumulated_data, input.unwrap_or(""))
    };

    log_transition(&state.session_id.to_string(), &state.current_step, &next_id);

    state.current_step = next_id;
    state.last_updated_at = Utc::now();

    Ok(AdvanceOutcome {
        resolved: resolve(flow, state)?,
        validation_error: None,
    })
}

/// Step back to the most recently visited step.
///
/// Pops exactly one history entry. Data written by the undone advance stays
/// in `accumulated_data`; back-navigation moves position, not data. An
/// empty history yields [`BackOutcome::CannotGoBack`], never an error.
pub fn go_back(flow: &FlowDefinition, state: &mut FlowState) -> Result<BackOutcome> {
    match state.history.pop() {
        Some(previous) => {
            log_transition(&state.session_id.to_string(), &state.current_step, &previous);
            state.current_step = previous;
            state.last_updated_at = Utc::now();
            Ok(BackOutcome::MovedTo(resolve(flow, state)?))
        }
        None => Ok(BackOutcome::CannotGoBack),
    }
}
