use serde::Serialize;

use super::rules::{find_rule, TransitionRule};
use crate::domain::{Parcel, Role, ValidationState};

/// Outcome of evaluating a parcel against a transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// True iff the table has a rule `from -> to` that lists `role`.
pub fn can_transition(from: ValidationState, to: ValidationState, role: Role) -> bool {
    find_rule(from, to).is_some_and(|rule| rule.allows(role))
}

fn missing_transition(from: ValidationState, to: ValidationState) -> String {
    format!("Transition {} -> {} non autorisée", from.label(), to.label())
}

fn run_rules(rule: &TransitionRule, parcel: &Parcel) -> Vec<String> {
    rule.validations.iter().filter_map(|v| v.check(parcel)).collect()
}

/// Checks every business rule attached to `parcel.state -> to` and returns
/// all failures, not just the first.
pub fn validate(parcel: &Parcel, to: ValidationState) -> ValidationReport {
    let from = parcel.validation_state;
    let errors = match find_rule(from, to) {
        Some(rule) => run_rules(rule, parcel),
        None => vec![missing_transition(from, to)],
    };
    ValidationReport::from_errors(errors)
}

/// `validate` plus the role check, reported together.
pub fn check_transition(parcel: &Parcel, to: ValidationState, role: Role) -> ValidationReport {
    let from = parcel.validation_state;
    let Some(rule) = find_rule(from, to) else {
        return ValidationReport::from_errors(vec![missing_transition(from, to)]);
    };

    let mut errors = Vec::new();
    if !rule.allows(role) {
        errors.push(format!(
            "Le rôle {} ne peut pas effectuer la transition {} -> {}",
            role.label(),
            from.label(),
            to.label()
        ));
    }
    errors.extend(run_rules(rule, parcel));

    tracing::debug!(
        parcel = %parcel.reference,
        from = %from,
        to = %to,
        role = %role,
        errors = errors.len(),
        "Transition checked"
    );
    ValidationReport::from_errors(errors)
}
