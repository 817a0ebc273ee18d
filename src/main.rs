//! PayPilot assistant console
//!
//! Interactive driver for the guided flow engine: wires configuration,
//! logging, the shipped flows, and simulated action executors into a
//! stdin/stdout conversation loop. Real deployments replace this binary
//! with their chat transport; the engine underneath is identical.

use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

use PayPilot::{
    config::Settings,
    executor::{ActionExecutor, ExecutorError},
    flow::{FlowState, CANCEL_TOKEN, SKIP_TOKEN},
    flows::default_registry,
    session::{InMemoryStateStore, SessionManager},
    assistant::{Conductor, Turn, TurnStatus},
    utils::logging,
};

/// Simulated employee directory: pretends to create the record
#[derive(Default)]
struct DirectoryExecutor {
    created: AtomicU64,
}

#[async_trait]
impl ActionExecutor for DirectoryExecutor {
    async fn execute(&self, state: &FlowState) -> Result<serde_json::Value, ExecutorError> {
        tokio::time::sleep(Duration::from_millis(400)).await;

        let name = state
            .get_str("full_name")
            .ok_or_else(|| ExecutorError::Rejected("no employee name collected".to_string()))?;

        let sequence = self.created.fetch_add(1, Ordering::Relaxed) + 1;
        Ok(json!({
            "ok": true,
            "employee_id": format!("EMP-{:04}", sequence),
            "name": name,
        }))
    }
}

/// Simulated payroll calculator: derives stable pretend totals from the input
struct PayrollExecutor;

#[async_trait]
impl ActionExecutor for PayrollExecutor {
    async fn execute(&self, state: &FlowState) -> Result<serde_json::Value, ExecutorError> {
        tokio::time::sleep(Duration::from_millis(600)).await;

        let period = state
            .get_str("period")
            .ok_or_else(|| ExecutorError::Rejected("no pay period collected".to_string()))?;
        let dry_run = state.get_str("run_mode") == Some("dry_run");

        let seed: u64 = period.bytes().map(u64::from).sum();
        let employees_paid = 8 + seed % 8;
        let total_gross = employees_paid as f64 * 4_500.0;
        let total_net = total_gross * 0.76;

        Ok(json!({
            "ok": true,
            "employees_paid": employees_paid,
            "total_gross": total_gross,
            "total_net": total_net,
            "dry_run": dry_run,
        }))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration, falling back to defaults when no config file exists
    let settings = match Settings::new() {
        Ok(settings) => settings,
        Err(_) => Settings::default(),
    };
    settings.validate()?;

    logging::init_logging(&settings.logging)?;
    info!("Starting {}...", PayPilot::info());

    let registry = Arc::new(default_registry()?);
    let sessions = Arc::new(
        SessionManager::new(registry).with_session_limit(settings.session.max_active_sessions),
    );
    let store = Arc::new(InMemoryStateStore::new());
    let conductor = Conductor::new(sessions, store)
        .with_executor("employee_onboarding", Arc::new(DirectoryExecutor::default()))
        .with_executor("payroll_run", Arc::new(PayrollExecutor));

    println!("PayPilot assistant console. Commands: /back /skip /cancel /quit");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    'outer: loop {
        println!("\nAvailable flows:");
        for (index, flow_id) in settings.assistant.available_flows.iter().enumerate() {
            println!("  {}. {}", index + 1, flow_id);
        }
        print!("Pick a flow (number, or /quit): ");
        io::stdout().flush()?;

        let choice = match lines.next() {
            Some(line) => line?,
            None => break,
        };
        let choice = choice.trim();
        if choice == "/quit" || choice.is_empty() {
            break;
        }

        let flow_id = match choice.parse::<usize>() {
            Ok(n) if n >= 1 && n <= settings.assistant.available_flows.len() => {
                settings.assistant.available_flows[n - 1].clone()
            }
            _ => settings.assistant.default_flow.clone(),
        };

        let turn = match conductor.begin(&flow_id).await {
            Ok(turn) => turn,
            Err(e) => {
                warn!(error = %e, flow_id = %flow_id, "Failed to start flow");
                continue;
            }
        };
        let session_id = turn.session_id;
        print_turn(&turn);
        if turn.status != TurnStatus::Active {
            continue;
        }

        loop {
            print!("> ");
            io::stdout().flush()?;

            let line = match lines.next() {
                Some(line) => line?,
                None => break 'outer,
            };
            let input = line.trim();

            let turn = match input {
                "/quit" => break 'outer,
                "/back" => conductor.step_back(session_id).await?,
                "/skip" => conductor.handle_input(session_id, SKIP_TOKEN).await?,
                "/cancel" => conductor.handle_input(session_id, CANCEL_TOKEN).await?,
                _ => conductor.handle_input(session_id, input).await?,
            };
            print_turn(&turn);

            match turn.status {
                TurnStatus::Completed => {
                    println!("\n✔ Flow completed.");
                    continue 'outer;
                }
                TurnStatus::Cancelled => {
                    println!("\n✖ Flow cancelled.");
                    continue 'outer;
                }
                TurnStatus::Active => {}
            }
        }
    }

    info!("PayPilot assistant console shut down.");
    Ok(())
}

fn print_turn(turn: &Turn) {
    for step in &turn.steps {
        println!("\n{}", step.message);
        for reply in &step.quick_replies {
            match &reply.icon {
                Some(icon) => println!("  {} [{}] -> {}", icon, reply.label, reply.value),
                None => println!("  [{}] -> {}", reply.label, reply.value),
            }
        }
    }
    if let Some(notice) = &turn.notice {
        println!("  ⚠ {}", notice);
    }
}
