//! Payroll run flow
//!
//! Guided wizard that picks a pay period and scope, confirms, and hands off
//! to the action executor that runs the calculation. A failed calculation
//! routes to a retry step instead of ending the session.

use serde_json::Value;

use crate::flow::{
    FlowDefinition, QuickReply, StepData, StepDefinition, StepType, Text, ValidationRule,
    EXECUTION_RESULT_KEY,
};
use crate::utils::helpers::format_money;

fn calculation_ok(data: &StepData) -> bool {
    data.get(EXECUTION_RESULT_KEY)
        .and_then(|result| result.get("ok"))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

fn hub_replies(data: &StepData) -> Vec<QuickReply> {
    let mut replies = vec![
        QuickReply::with_icon("Run payroll", "run", "💸"),
        QuickReply::with_icon("Dry run (no postings)", "dry_run", "🧪"),
    ];
    // Coming back around after an edit or a failed attempt, offer the
    // period that is already on file.
    if let Some(period) = data.get("period").and_then(Value::as_str) {
        replies.push(QuickReply::new(
            &format!("Run {} again", period),
            "run",
        ));
    }
    replies
}

fn confirm_message(data: &StepData) -> String {
    let mode = match data.get("run_mode").and_then(Value::as_str) {
        Some("dry_run") => "Dry run (no postings)",
        _ => "Full payroll run",
    };
    let period = data.get("period").and_then(Value::as_str).unwrap_or("—");
    let scope = match data.get("scope").and_then(Value::as_str) {
        Some("department") => data
            .get("pick_department")
            .and_then(Value::as_str)
            .map(|d| format!("{} department", d))
            .unwrap_or_else(|| "one department".to_string()),
        _ => "all employees".to_string(),
    };

    format!(
        "Ready to calculate:\n\
         • Mode: {}\n\
         • Period: {}\n\
         • Scope: {}\n\n\
         Shall I run the numbers?",
        mode, period, scope
    )
}

fn summary_message(data: &StepData) -> String {
    let result = data.get(EXECUTION_RESULT_KEY);
    let count = result
        .and_then(|r| r.get("employees_paid"))
        .and_then(Value::as_u64)
        .unwrap_or(0);
    let money = |key: &str| {
        result
            .and_then(|r| r.get(key))
            .and_then(Value::as_f64)
            .map(format_money)
            .unwrap_or_else(|| "—".to_string())
    };

    format!(
        "Payroll calculated for {} employees.\n\
         • Total gross: {}\n\
         • Total net: {}\n\n\
         The detailed statements are ready in the documents section.",
        count,
        money("total_gross"),
        money("total_net"),
    )
}

/// Build the "calculate payroll" flow definition
pub fn payroll_run_flow() -> FlowDefinition {
    FlowDefinition::new("payroll_run", "hub", "summary")
        .with_step(
            StepDefinition::new("hub", StepType::Hub, "What would you like to do?")
                .no_back()
                .with_data_key("run_mode")
                .with_replies_fn(hub_replies)
                .then("period"),
        )
        .with_step(
            StepDefinition::new(
                "period",
                StepType::Input,
                "Which pay period? Please use YYYY-MM.",
            )
            .with_rules(vec![
                ValidationRule::required("Please enter a pay period."),
                ValidationRule::pattern(
                    r"^\d{4}-(0[1-9]|1[0-2])$",
                    "Pay periods look like 2026-07.",
                ),
            ])
            .then("scope"),
        )
        .with_step(
            StepDefinition::new("scope", StepType::Select, "Who should be included?")
                .with_replies(vec![
                    QuickReply::with_icon("All employees", "all", "👥"),
                    QuickReply::with_icon("One department", "department", "🏢"),
                ])
                .then_with(|_data, input| {
                    if input == "department" {
                        "pick_department".to_string()
                    } else {
                        "confirm".to_string()
                    }
                }),
        )
        .with_step(
            StepDefinition::new("pick_department", StepType::Select, "Which department?")
                .with_replies(vec![
                    QuickReply::new("Engineering", "Engineering"),
                    QuickReply::new("Sales", "Sales"),
                    QuickReply::new("Operations", "Operations"),
                    QuickReply::new("People", "People"),
                ])
                .then("confirm"),
        )
        .with_step(
            StepDefinition::new("confirm", StepType::Preview, Text::from_fn(confirm_message))
                .with_replies(vec![
                    QuickReply::with_icon("Calculate", "calculate", "🧮"),
                    QuickReply::with_icon("Change period", "edit", "✏️"),
                ])
                .then_with(|_data, input| {
                    if input == "calculate" {
                        "run_calculation".to_string()
                    } else {
                        "period".to_string()
                    }
                }),
        )
        .with_step(
            StepDefinition::new(
                "run_calculation",
                StepType::Execution,
                "Crunching the numbers…",
            )
            .no_back()
            .then_with(|data, _input| {
                if calculation_ok(data) {
                    "summary".to_string()
                } else {
                    "calc_failed".to_string()
                }
            }),
        )
        .with_step(
            StepDefinition::new(
                "calc_failed",
                StepType::Result,
                Text::from_fn(|data: &StepData| {
                    let error = data
                        .get(EXECUTION_RESULT_KEY)
                        .and_then(|result| result.get("error"))
                        .and_then(Value::as_str)
                        .unwrap_or("an unexpected error");
                    format!("The calculation failed: {}.", error)
                }),
            )
            .with_replies(vec![
                QuickReply::with_icon("Try again", "retry", "🔁"),
                QuickReply::with_icon("Change period", "edit", "✏️"),
            ])
            .then_with(|_data, input| {
                if input == "retry" {
                    "run_calculation".to_string()
                } else {
                    "period".to_string()
                }
            }),
        )
        .with_step(StepDefinition::new(
            "summary",
            StepType::Result,
            Text::from_fn(summary_message),
        ))
}
