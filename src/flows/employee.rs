//! Employee onboarding flow
//!
//! Guided wizard that collects a new employee's details, previews them, and
//! hands off to the action executor that creates the record.

use serde_json::Value;

use crate::flow::{
    FlowDefinition, QuickReply, StepData, StepDefinition, StepType, Text, ValidationRule,
    EXECUTION_RESULT_KEY,
};
use crate::utils::helpers::format_money;

fn execution_ok(data: &StepData) -> bool {
    data.get(EXECUTION_RESULT_KEY)
        .and_then(|result| result.get("ok"))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

fn preview_message(data: &StepData) -> String {
    let field = |key: &str| {
        data.get(key)
            .and_then(Value::as_str)
            .unwrap_or("—")
            .to_string()
    };
    let salary = data
        .get("monthly_salary")
        .and_then(Value::as_str)
        .and_then(|raw| raw.trim().parse::<f64>().ok())
        .map(format_money)
        .unwrap_or_else(|| "—".to_string());

    format!(
        "Here's what I have:\n\
         • Name: {}\n\
         • Email: {}\n\
         • Monthly salary: {}\n\
         • Department: {}\n\
         • Phone: {}\n\n\
         Create this employee?",
        field("full_name"),
        field("email"),
        salary,
        field("department"),
        field("phone"),
    )
}

/// Build the "create employee" flow definition
pub fn employee_onboarding_flow() -> FlowDefinition {
    FlowDefinition::new("employee_onboarding", "welcome", "created")
        .with_step(
            StepDefinition::new(
                "welcome",
                StepType::Greeting,
                "Hi! I'll walk you through adding a new employee. \
                 You can type /back, /skip, or /cancel at any point.",
            )
            .no_back()
            .then("full_name"),
        )
        .with_step(
            StepDefinition::new("full_name", StepType::Input, "What is the employee's full name?")
                .with_rules(vec![
                    ValidationRule::required("Please enter the employee's name."),
                    ValidationRule::min_length(2, "That name looks too short."),
                    ValidationRule::max_length(80, "Please keep the name under 80 characters."),
                    ValidationRule::pattern(
                        r"^[\p{L} .'-]+$",
                        "Names can only contain letters, spaces, and .'-",
                    ),
                ])
                .then("email"),
        )
        .with_step(
            StepDefinition::new("email", StepType::Input, "What is their work email address?")
                .with_rules(vec![
                    ValidationRule::required("Please enter an email address."),
                    ValidationRule::email("That doesn't look like a valid email address."),
                ])
                .then("salary"),
        )
        .with_step(
            StepDefinition::new(
                "salary",
                StepType::Input,
                "What is their gross monthly salary? (numbers only)",
            )
            .with_data_key("monthly_salary")
            .with_rules(vec![
                ValidationRule::required("Please enter a salary."),
                ValidationRule::min(1.0, "The salary must be a positive number."),
                ValidationRule::max(1_000_000.0, "That salary is above the supported maximum."),
            ])
            .then("department"),
        )
        .with_step(
            StepDefinition::new("department", StepType::Select, "Which department do they join?")
                .with_replies(vec![
                    QuickReply::with_icon("Engineering", "Engineering", "🛠"),
                    QuickReply::with_icon("Sales", "Sales", "📈"),
                    QuickReply::with_icon("Operations", "Operations", "🏗"),
                    QuickReply::with_icon("People", "People", "🤝"),
                ])
                .then("phone"),
        )
        .with_step(
            StepDefinition::new(
                "phone",
                StepType::Input,
                "What is their phone number? You can skip this.",
            )
            .with_rules(vec![ValidationRule::pattern(
                r"^\+?[0-9 ()\-]{7,20}$",
                "That doesn't look like a phone number.",
            )])
            .skippable("preview")
            .then("preview"),
        )
        .with_step(
            StepDefinition::new("preview", StepType::Preview, Text::from_fn(preview_message))
                .with_replies(vec![
                    QuickReply::with_icon("Create employee", "confirm", "✅"),
                    QuickReply::with_icon("Edit details", "edit", "✏️"),
                ])
                .then_with(|_data, input| {
                    if input == "confirm" {
                        "create_employee".to_string()
                    } else {
                        "full_name".to_string()
                    }
                }),
        )
        .with_step(
            StepDefinition::new(
                "create_employee",
                StepType::Execution,
                "Creating the employee record…",
            )
            .no_back()
            .then_with(|data, _input| {
                if execution_ok(data) {
                    "created".to_string()
                } else {
                    "create_failed".to_string()
                }
            }),
        )
        .with_step(
            StepDefinition::new(
                "create_failed",
                StepType::Result,
                Text::from_fn(|data: &StepData| {
                    let error = data
                        .get(EXECUTION_RESULT_KEY)
                        .and_then(|result| result.get("error"))
                        .and_then(Value::as_str)
                        .unwrap_or("an unexpected error");
                    format!("I couldn't create the employee: {}.", error)
                }),
            )
            .with_replies(vec![
                QuickReply::with_icon("Try again", "retry", "🔁"),
                QuickReply::with_icon("Start over", "restart", "↩️"),
            ])
            .then_with(|_data, input| {
                if input == "retry" {
                    "create_employee".to_string()
                } else {
                    "full_name".to_string()
                }
            }),
        )
        .with_step(StepDefinition::new(
            "created",
            StepType::Result,
            Text::from_fn(|data: &StepData| {
                let name = data.get("full_name").and_then(Value::as_str).unwrap_or("");
                let employee_id = data
                    .get(EXECUTION_RESULT_KEY)
                    .and_then(|result| result.get("employee_id"))
                    .and_then(Value::as_str)
                    .unwrap_or("?");
                format!("Done! {} was created with id {}.", name, employee_id)
            }),
        ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::{advance, FlowState, SKIP_TOKEN};

    #[test]
    fn test_flow_registers_cleanly() {
        let mut registry = crate::flow::FlowRegistry::new();
        registry.register(employee_onboarding_flow()).unwrap();
    }

    #[test]
    fn test_happy_path_to_preview() {
        let flow = employee_onboarding_flow();
        let mut state = FlowState::new(&flow.id, &flow.initial_step);

        advance(&flow, &mut state, Some("start")).unwrap();
        advance(&flow, &mut state, Some("Ada Lovelace")).unwrap();
        advance(&flow, &mut state, Some("ada@paypilot.example")).unwrap();
        advance(&flow, &mut state, Some("4500")).unwrap();
        advance(&flow, &mut state, Some("Engineering")).unwrap();
        let outcome = advance(&flow, &mut state, Some(SKIP_TOKEN)).unwrap();

        assert_eq!(outcome.resolved.id, "preview");
        assert!(outcome.resolved.message.contains("Ada Lovelace"));
        assert!(outcome.resolved.message.contains("$4,500.00"));
        // Phone was skipped, so the preview shows a placeholder.
        assert!(outcome.resolved.message.contains("Phone: —"));
    }

    #[test]
    fn test_preview_edit_loops_back() {
        let flow = employee_onboarding_flow();
        let mut state = FlowState::new(&flow.id, "preview");

        let outcome = advance(&flow, &mut state, Some("edit")).unwrap();
        assert_eq!(outcome.resolved.id, "full_name");
    }

    #[test]
    fn test_execution_routing_branches_on_result() {
        let flow = employee_onboarding_flow();

        let mut state = FlowState::new(&flow.id, "create_employee");
        state.set_value(
            EXECUTION_RESULT_KEY,
            serde_json::json!({ "ok": true, "employee_id": "EMP-0042" }),
        );
        let outcome = advance(&flow, &mut state, Some(crate::flow::CONTINUE_TOKEN)).unwrap();
        assert_eq!(outcome.resolved.id, "created");
        assert!(outcome.resolved.message.contains("EMP-0042"));

        let mut state = FlowState::new(&flow.id, "create_employee");
        state.set_value(
            EXECUTION_RESULT_KEY,
            serde_json::json!({ "ok": false, "error": "directory unavailable" }),
        );
        let outcome = advance(&flow, &mut state, Some(crate::flow::CONTINUE_TOKEN)).unwrap();
        assert_eq!(outcome.resolved.id, "create_failed");
        assert!(outcome.resolved.message.contains("directory unavailable"));
    }
}
