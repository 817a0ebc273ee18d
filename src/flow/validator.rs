//! Input validation
//!
//! This module evaluates an ordered list of validation rules against raw
//! user input. Rules are applied in declared order and the first failing
//! rule's message wins. Validation failures are ordinary values, never
//! errors; the caller re-displays the current step with the message.

use once_cell::sync::Lazy;
use regex::Regex;

use super::definition::ValidationRule;
use super::CANCEL_TOKEN;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern"));

/// Validate input against an ordered rule list.
///
/// Returns the first failing rule's message, or `None` when every rule
/// passes or the list is empty. The reserved cancel token bypasses
/// validation entirely so a flow can be aborted from any input step.
pub fn validate(input: &str, rules: &[ValidationRule]) -> Option<String> {
    if input == CANCEL_TOKEN {
        return None;
    }

    for rule in rules {
        if !passes(input, rule) {
            return Some(rule.message().to_string());
        }
    }

    None
}

fn passes(input: &str, rule: &ValidationRule) -> bool {
    match rule {
        ValidationRule::Required { .. } => !input.trim().is_empty(),
        ValidationRule::MinLength { min, .. } => input.chars().count() >= *min,
        ValidationRule::MaxLength { max, .. } => input.chars().count() <= *max,
        ValidationRule::Min { min, .. } => match input.trim().parse::<f64>() {
            Ok(value) => value >= *min,
            Err(_) => false,
        },
        ValidationRule::Max { max, .. } => match input.trim().parse::<f64>() {
            Ok(value) => value <= *max,
            Err(_) => false,
        },
        ValidationRule::Pattern { pattern, .. } => pattern.is_match(input),
        ValidationRule::Email { .. } => EMAIL_RE.is_match(input.trim()),
        ValidationRule::Custom { predicate, .. } => predicate(input),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_rule_list_passes() {
        assert_eq!(validate("anything", &[]), None);
    }

    #[test]
    fn test_required_rejects_whitespace() {
        let rules = vec![ValidationRule::required("Please enter a value")];
        assert_eq!(validate("", &rules), Some("Please enter a value".to_string()));
        assert_eq!(validate("   ", &rules), Some("Please enter a value".to_string()));
        assert_eq!(validate("x", &rules), None);
    }

    #[test]
    fn test_rules_apply_in_declared_order() {
        let rules = vec![
            ValidationRule::required("required"),
            ValidationRule::min_length(3, "too short"),
            ValidationRule::max_length(5, "too long"),
        ];
        assert_eq!(validate("", &rules), Some("required".to_string()));
        assert_eq!(validate("ab", &rules), Some("too short".to_string()));
        assert_eq!(validate("abcdef", &rules), Some("too long".to_string()));
        assert_eq!(validate("abcd", &rules), None);
    }

    #[test]
    fn test_numeric_bounds_coerce_input() {
        let rules = vec![
            ValidationRule::min(1.0, "below minimum"),
            ValidationRule::max(1_000_000.0, "above maximum"),
        ];
        assert_eq!(validate("4500", &rules), None);
        assert_eq!(validate("4500.50", &rules), None);
        assert_eq!(validate("0", &rules), Some("below minimum".to_string()));
        assert_eq!(validate("2000000", &rules), Some("above maximum".to_string()));
        assert_eq!(validate("not a number", &rules), Some("below minimum".to_string()));
    }

    #[test]
    fn test_pattern_rule() {
        let rules = vec![ValidationRule::pattern(
            r"^\d{4}-(0[1-9]|1[0-2])$",
            "use YYYY-MM",
        )];
        assert_eq!(validate("2026-07", &rules), None);
        assert_eq!(validate("2026-13", &rules), Some("use YYYY-MM".to_string()));
        assert_eq!(validate("July 2026", &rules), Some("use YYYY-MM".to_string()));
    }

    #[test]
    fn test_email_rule() {
        let rules = vec![ValidationRule::email("invalid email")];
        assert_eq!(validate("ada@example.com", &rules), None);
        assert_eq!(validate("ada@example", &rules), Some("invalid email".to_string()));
        assert_eq!(validate("not-an-email", &rules), Some("invalid email".to_string()));
    }

    #[test]
    fn test_custom_predicate() {
        let rules = vec![ValidationRule::custom(
            |input| input.starts_with("EMP-"),
            "employee ids start with EMP-",
        )];
        assert_eq!(validate("EMP-0042", &rules), None);
        assert_eq!(
            validate("0042", &rules),
            Some("employee ids start with EMP-".to_string())
        );
    }

    #[test]
    fn test_cancel_token_bypasses_all_rules() {
        let rules = vec![
            ValidationRule::required("required"),
            ValidationRule::email("invalid email"),
        ];
        assert_eq!(validate(CANCEL_TOKEN, &rules), None);
    }
}
