// Validation workflow: transition table, rule evaluation, parcel lifecycle

pub mod evaluator;
pub mod lifecycle;
pub mod rules;

pub use evaluator::{can_transition, check_transition, validate, ValidationReport};
pub use lifecycle::{LifecycleEvent, ParcelLifecycle, ParcelWorkflow, State, TransitionError, TransitionRecord};
pub use rules::{find_rule, next_states, TransitionRule, ValidationRule, TRANSITIONS};
