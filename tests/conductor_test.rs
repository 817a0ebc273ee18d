//! Conductor integration tests
//!
//! Drives whole sessions through the orchestration layer: persistence
//! between turns, cancel handling, and the two-phase execution protocol
//! with both succeeding and failing action executors.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;
use uuid::Uuid;

use PayPilot::assistant::{Conductor, TurnStatus};
use PayPilot::executor::{ActionExecutor, ExecutorError};
use PayPilot::flow::{FlowState, StepType, CANCEL_TOKEN, EXECUTION_RESULT_KEY, SKIP_TOKEN};
use PayPilot::flows::default_registry;
use PayPilot::session::{InMemoryStateStore, SessionManager, StateStore};
use PayPilot::PayPilotError;

/// Executor that replays a scripted sequence of results, one per call
struct ScriptedExecutor {
    script: Mutex<VecDeque<Result<serde_json::Value, ExecutorError>>>,
}

impl ScriptedExecutor {
    fn new(script: Vec<Result<serde_json::Value, ExecutorError>>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
        }
    }
}

#[async_trait]
impl ActionExecutor for ScriptedExecutor {
    async fn execute(&self, _state: &FlowState) -> Result<serde_json::Value, ExecutorError> {
        self.script
            .lock()
            .expect("script lock poisoned")
            .pop_front()
            .unwrap_or_else(|| Err(ExecutorError::Failed("script exhausted".to_string())))
    }
}

fn build_conductor(
    employee_script: Vec<Result<serde_json::Value, ExecutorError>>,
) -> (Conductor, Arc<SessionManager>, Arc<InMemoryStateStore>) {
    let registry = Arc::new(default_registry().unwrap());
    let sessions = Arc::new(SessionManager::new(registry));
    let store = Arc::new(InMemoryStateStore::new());
    let conductor = Conductor::new(sessions.clone(), store.clone())
        .with_executor("employee_onboarding", Arc::new(ScriptedExecutor::new(employee_script)));
    (conductor, sessions, store)
}

async fn walk_to_preview(conductor: &Conductor) -> Uuid {
    let turn = conductor.begin("employee_onboarding").await.unwrap();
    let session_id = turn.session_id;

    for input in ["go", "Ada Lovelace", "ada@paypilot.example", "4500", "Engineering"] {
        let turn = conductor.handle_input(session_id, input).await.unwrap();
        assert!(turn.notice.is_none(), "unexpected notice: {:?}", turn.notice);
    }
    let turn = conductor.handle_input(session_id, SKIP_TOKEN).await.unwrap();
    assert_eq!(turn.steps.last().unwrap().id, "preview");
    session_id
}

#[tokio::test]
async fn execution_chain_completes_flow_and_retires_session() {
    let (conductor, sessions, store) = build_conductor(vec![Ok(json!({
        "ok": true,
        "employee_id": "EMP-0007",
    }))]);

    let session_id = walk_to_preview(&conductor).await;
    let turn = conductor.handle_input(session_id, "confirm").await.unwrap();

    // One turn covers the execution step's message and the final result.
    let shown: Vec<&str> = turn.steps.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(shown, vec!["create_employee", "created"]);
    assert_eq!(turn.steps[0].step_type, StepType::Execution);
    assert!(turn.steps[1].message.contains("EMP-0007"));
    assert_eq!(turn.status, TurnStatus::Completed);

    // Session is retired and its persisted state deleted.
    assert!(!sessions.is_active(session_id));
    assert!(store.load(session_id).await.unwrap().is_none());
}

#[tokio::test]
async fn failed_execution_routes_to_retry_step_then_succeeds() {
    let (conductor, sessions, store) = build_conductor(vec![
        Err(ExecutorError::Failed("directory unavailable".to_string())),
        Ok(json!({ "ok": true, "employee_id": "EMP-0008" })),
    ]);

    let session_id = walk_to_preview(&conductor).await;

    // First attempt fails: the flow lands on its retry step.
    let turn = conductor.handle_input(session_id, "confirm").await.unwrap();
    assert_eq!(turn.steps.last().unwrap().id, "create_failed");
    assert!(turn.steps.last().unwrap().message.contains("directory unavailable"));
    assert_eq!(turn.status, TurnStatus::Active);
    assert!(sessions.is_active(session_id));

    // The failure object was merged under the reserved result key.
    let persisted = store.load(session_id).await.unwrap().unwrap();
    let merged = persisted.get_value(EXECUTION_RESULT_KEY).unwrap();
    assert_eq!(merged.get("ok"), Some(&json!(false)));

    // Retry succeeds and completes the flow.
    let turn = conductor.handle_input(session_id, "retry").await.unwrap();
    assert_eq!(turn.steps.last().unwrap().id, "created");
    assert_eq!(turn.status, TurnStatus::Completed);
}

#[tokio::test]
async fn validation_rejection_redisplays_step_with_notice() {
    let (conductor, _sessions, store) = build_conductor(vec![]);

    let turn = conductor.begin("employee_onboarding").await.unwrap();
    let session_id = turn.session_id;
    conductor.handle_input(session_id, "go").await.unwrap();

    let turn = conductor.handle_input(session_id, "").await.unwrap();
    assert_eq!(turn.steps.last().unwrap().id, "full_name");
    assert_eq!(turn.notice, Some("Please enter the employee's name.".to_string()));
    assert_eq!(turn.status, TurnStatus::Active);

    // The rejected input left persisted state untouched.
    let persisted = store.load(session_id).await.unwrap().unwrap();
    assert_eq!(persisted.current_step, "full_name");
    assert!(!persisted.has_value("full_name"));
}

#[tokio::test]
async fn cancel_token_retires_session_mid_flow() {
    let (conductor, sessions, store) = build_conductor(vec![]);

    let turn = conductor.begin("employee_onboarding").await.unwrap();
    let session_id = turn.session_id;
    conductor.handle_input(session_id, "go").await.unwrap();
    conductor.handle_input(session_id, "Ada Lovelace").await.unwrap();

    let turn = conductor.handle_input(session_id, CANCEL_TOKEN).await.unwrap();
    assert_eq!(turn.status, TurnStatus::Cancelled);
    assert!(!sessions.is_active(session_id));
    assert!(store.load(session_id).await.unwrap().is_none());

    // Further input on the retired session is an expected failure.
    let err = conductor.handle_input(session_id, "hello").await.unwrap_err();
    assert!(matches!(err, PayPilotError::SessionNotFound { .. }));
}

#[tokio::test]
async fn state_persists_between_turns() {
    let (conductor, _sessions, store) = build_conductor(vec![]);

    let turn = conductor.begin("employee_onboarding").await.unwrap();
    let session_id = turn.session_id;
    conductor.handle_input(session_id, "go").await.unwrap();
    conductor.handle_input(session_id, "Grace Hopper").await.unwrap();

    let persisted = store.load(session_id).await.unwrap().unwrap();
    assert_eq!(persisted.current_step, "email");
    assert_eq!(persisted.get_str("full_name"), Some("Grace Hopper"));
    assert_eq!(persisted.history, vec!["welcome".to_string(), "full_name".to_string()]);
}

#[tokio::test]
async fn step_back_moves_and_empty_history_notices() {
    let (conductor, _sessions, _store) = build_conductor(vec![]);

    let turn = conductor.begin("employee_onboarding").await.unwrap();
    let session_id = turn.session_id;

    // Nothing to go back to on a fresh session.
    let turn = conductor.step_back(session_id).await.unwrap();
    assert_eq!(turn.status, TurnStatus::Active);
    assert!(turn.notice.is_some());
    assert_eq!(turn.steps.last().unwrap().id, "welcome");

    conductor.handle_input(session_id, "go").await.unwrap();
    let turn = conductor.step_back(session_id).await.unwrap();
    assert!(turn.notice.is_none());
    assert_eq!(turn.steps.last().unwrap().id, "welcome");
}

#[tokio::test]
async fn payroll_flow_requires_registered_executor() {
    // No executor registered for payroll_run: reaching its execution step
    // is a wiring defect and surfaces as a configuration error.
    let (conductor, _sessions, _store) = build_conductor(vec![]);

    let turn = conductor.begin("payroll_run").await.unwrap();
    let session_id = turn.session_id;
    conductor.handle_input(session_id, "run").await.unwrap();
    conductor.handle_input(session_id, "2026-07").await.unwrap();
    conductor.handle_input(session_id, "all").await.unwrap();

    let err = conductor.handle_input(session_id, "calculate").await.unwrap_err();
    assert!(matches!(err, PayPilotError::Config(_)));
}

#[tokio::test]
async fn payroll_flow_completes_with_summary() {
    let registry = Arc::new(default_registry().unwrap());
    let sessions = Arc::new(SessionManager::new(registry));
    let store = Arc::new(InMemoryStateStore::new());
    let conductor = Conductor::new(sessions, store.clone()).with_executor(
        "payroll_run",
        Arc::new(ScriptedExecutor::new(vec![Ok(json!({
            "ok": true,
            "employees_paid": 3,
            "total_gross": 13500.0,
            "total_net": 10260.0,
        }))])),
    );

    let turn = conductor.begin("payroll_run").await.unwrap();
    let session_id = turn.session_id;
    conductor.handle_input(session_id, "run").await.unwrap();
    conductor.handle_input(session_id, "2026-07").await.unwrap();
    conductor.handle_input(session_id, "all").await.unwrap();

    let turn = conductor.handle_input(session_id, "calculate").await.unwrap();
    assert_eq!(turn.status, TurnStatus::Completed);
    assert!(turn.steps.last().unwrap().message.contains("3 employees"));
    assert!(store.load(session_id).await.unwrap().is_none());
}
