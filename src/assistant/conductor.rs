//! Conversation conductor
//!
//! The conductor is the orchestration layer between a chat surface and the
//! flow engine. It owns session lifecycle and persistence, intercepts the
//! cancel token, surfaces validation rejections inline, and drives the
//! two-phase execution protocol: when the engine lands on an execution
//! step, the conductor runs the registered [`ActionExecutor`], merges the
//! result into accumulated data, and re-enters the engine with the fixed
//! continuation token. Callers must serialize calls per session; the
//! conductor holds no locks across executor awaits.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::executor::ActionExecutor;
use crate::flow::{
    advance, go_back, resolve, BackOutcome, FlowDefinition, FlowState, ResolvedStep, StepType,
    CANCEL_TOKEN, CONTINUE_TOKEN, EXECUTION_RESULT_KEY,
};
use crate::session::{SessionManager, StateStore};
use crate::utils::errors::{PayPilotError, Result};
use crate::utils::logging::log_executor_result;

// Upper bound on chained execution steps within one turn; a graph that
// chains more than this without user input is considered defective.
const MAX_EXECUTION_CHAIN: usize = 8;

/// Everything produced by one conversational turn
#[derive(Debug, Clone)]
pub struct Turn {
    pub session_id: Uuid,
    /// Steps displayed this turn, in order (execution steps show their
    /// progress message before the step that follows them)
    pub steps: Vec<ResolvedStep>,
    /// Inline notice to show with the last step (validation rejection,
    /// nothing-to-go-back-to)
    pub notice: Option<String>,
    pub status: TurnStatus,
}

/// Session status after a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnStatus {
    Active,
    Completed,
    Cancelled,
}

/// Drives flow sessions end to end
pub struct Conductor {
    sessions: Arc<SessionManager>,
    store: Arc<dyn StateStore>,
    executors: HashMap<String, Arc<dyn ActionExecutor>>,
}

impl Conductor {
    pub fn new(sessions: Arc<SessionManager>, store: Arc<dyn StateStore>) -> Self {
        Self {
            sessions,
            store,
            executors: HashMap::new(),
        }
    }

    /// Register the action executor invoked at a flow's execution steps
    pub fn with_executor(mut self, flow_id: &str, executor: Arc<dyn ActionExecutor>) -> Self {
        self.executors.insert(flow_id.to_string(), executor);
        self
    }

    /// Start a new session of the given flow and present its first step
    pub async fn begin(&self, flow_id: &str) -> Result<Turn> {
        let mut state = self.sessions.start_flow(flow_id)?;
        let flow = self.sessions.registry().get(flow_id)?;

        let mut steps = vec![resolve(flow, &state)?];
        self.run_execution_chain(flow, &mut state, &mut steps)
            .await?;
        self.finish_turn(flow, state, steps, None).await
    }

    /// Feed one user input into a session
    pub async fn handle_input(&self, session_id: Uuid, input: &str) -> Result<Turn> {
        let mut state = self.load_state(session_id).await?;
        let flow = self.sessions.registry().get(&state.flow_id)?;

        if input == CANCEL_TOKEN {
            info!(session_id = %session_id, flow_id = %state.flow_id, "User cancelled flow");
            self.sessions.cancel_flow(&state);
            self.store.delete(session_id).await?;
            return Ok(Turn {
                session_id,
                steps: Vec::new(),
                notice: None,
                status: TurnStatus::Cancelled,
            });
        }

        let outcome = advance(flow, &mut state, Some(input))?;
        if let Some(message) = outcome.validation_error {
            // State is untouched; re-display the step with the message.
            return Ok(Turn {
                session_id,
                steps: vec![outcome.resolved],
                notice: Some(message),
                status: TurnStatus::Active,
            });
        }

        let mut steps = vec![outcome.resolved];
        self.run_execution_chain(flow, &mut state, &mut steps)
            .await?;
        self.finish_turn(flow, state, steps, None).await
    }

    /// Navigate one step back in a session
    pub async fn step_back(&self, session_id: Uuid) -> Result<Turn> {
        let mut state = self.load_state(session_id).await?;
        let flow = self.sessions.registry().get(&state.flow_id)?;

        match go_back(flow, &mut state)? {
            BackOutcome::MovedTo(step) => {
                self.store.save(&state).await?;
                Ok(Turn {
                    session_id,
                    steps: vec![step],
                    notice: None,
                    status: TurnStatus::Active,
                })
            }
            BackOutcome::CannotGoBack => Ok(Turn {
                session_id,
                steps: vec![resolve(flow, &state)?],
                notice: Some("There is nothing to go back to.".to_string()),
                status: TurnStatus::Active,
            }),
        }
    }

    async fn load_state(&self, session_id: Uuid) -> Result<FlowState> {
        self.store
            .load(session_id)
            .await?
            .ok_or_else(|| PayPilotError::SessionNotFound {
                session_id: session_id.to_string(),
            })
    }

    /// Run executors for as long as the session sits on an execution step.
    ///
    /// Executor failures are not propagated: a failure object is merged
    /// under the reserved result key and the flow's own routing decides
    /// where to go (typically a retry step).
    async fn run_execution_chain(
        &self,
        flow: &FlowDefinition,
        state: &mut FlowState,
        steps: &mut Vec<ResolvedStep>,
    ) -> Result<()> {
        let mut hops = 0;
        while steps
            .last()
            .map(|step| step.step_type == StepType::Execution)
            .unwrap_or(false)
        {
            hops += 1;
            if hops > MAX_EXECUTION_CHAIN {
                return Err(PayPilotError::Config(format!(
                    "flow {} chained more than {} execution steps without user input",
                    flow.id, MAX_EXECUTION_CHAIN
                )));
            }

            let executor =
                self.executors
                    .get(&state.flow_id)
                    .ok_or_else(|| {
                        PayPilotError::Config(format!(
                            "no action executor registered for flow {}",
                            state.flow_id
                        ))
                    })?;

            let merged = match executor.execute(state).await {
                Ok(result) => {
                    log_executor_result(
                        &state.session_id.to_string(),
                        &state.flow_id,
                        true,
                        None,
                    );
                    result
                }
                Err(err) => {
                    log_executor_result(
                        &state.session_id.to_string(),
                        &state.flow_id,
                        false,
                        Some(&err.to_string()),
                    );
                    json!({ "ok": false, "error": err.to_string() })
                }
            };
            state.set_value(EXECUTION_RESULT_KEY, merged);

            let outcome = advance(flow, state, Some(CONTINUE_TOKEN))?;
            steps.push(outcome.resolved);
        }
        Ok(())
    }

    async fn finish_turn(
        &self,
        flow: &FlowDefinition,
        state: FlowState,
        steps: Vec<ResolvedStep>,
        notice: Option<String>,
    ) -> Result<Turn> {
        let session_id = state.session_id;

        if state.current_step == flow.completed_step {
            self.sessions.complete_flow(&state);
            self.store.delete(session_id).await?;
            return Ok(Turn {
                session_id,
                steps,
                notice,
                status: TurnStatus::Completed,
            });
        }

        self.store.save(&state).await?;
        Ok(Turn {
            session_id,
            steps,
            notice,
            status: TurnStatus::Active,
        })
    }
}

impl std::fmt::Debug for Conductor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Conductor")
            .field("executors", &self.executors.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Drop for Conductor {
    fn drop(&mut self) {
        if self.sessions.active_count() > 0 {
            warn!(
                active = self.sessions.active_count(),
                "Conductor dropped with active sessions"
            );
        }
    }
}
