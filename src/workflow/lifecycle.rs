use chrono::{DateTime, Utc};
use serde::Serialize;
use statig::blocking::StateMachine;
use statig::prelude::*;
use thiserror::Error;

use super::evaluator::check_transition;
use crate::domain::{Parcel, Role, User, ValidationState};

#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleEvent {
    /// Transition through the table, subject to role and business rules
    Request { to: ValidationState, actor: User },
    /// Admin move to any state, bypassing the table
    AdminOverride { to: ValidationState, actor: User, reason: String },
    /// Moves the machine to the parcel's own state without changing the
    /// parcel. Sent once when a persisted parcel is loaded.
    Resume,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransitionError {
    #[error("Transition refused: {}", .errors.join("; "))]
    Rejected {
        from: ValidationState,
        to: ValidationState,
        errors: Vec<String>,
    },
    #[error("Override refused: {role} is not an administrator")]
    OverrideForbidden { role: Role },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionRecord {
    pub from: ValidationState,
    pub to: ValidationState,
    pub actor: String,
    pub override_reason: Option<String>,
    pub at: DateTime<Utc>,
}

/// Holds a parcel and applies confirmed workflow transitions to it.
#[derive(Debug)]
pub struct ParcelLifecycle {
    parcel: Parcel,
    history: Vec<TransitionRecord>,
    last_error: Option<TransitionError>,
}

impl ParcelLifecycle {
    pub fn new(parcel: Parcel) -> Self {
        Self {
            parcel,
            history: Vec::new(),
            last_error: None,
        }
    }

    pub fn parcel(&self) -> &Parcel {
        &self.parcel
    }

    pub fn into_parcel(self) -> Parcel {
        self.parcel
    }

    pub fn history(&self) -> &[TransitionRecord] {
        &self.history
    }

    pub fn last_error(&self) -> Option<&TransitionError> {
        self.last_error.as_ref()
    }

    fn apply(&mut self, event: &LifecycleEvent) -> Outcome<State> {
        let from = self.parcel.validation_state;
        let result = match event {
            LifecycleEvent::Resume => return Transition(state_for(from)),
            LifecycleEvent::Request { to, actor } => {
                let report = check_transition(&self.parcel, *to, actor.role);
                if report.valid {
                    Ok((*to, actor, None))
                } else {
                    Err(TransitionError::Rejected {
                        from,
                        to: *to,
                        errors: report.errors,
                    })
                }
            }
            LifecycleEvent::AdminOverride { to, actor, reason } => {
                if crate::domain::has_capability(actor, crate::domain::Permission::AdminOverride) {
                    Ok((*to, actor, Some(reason.clone())))
                } else {
                    Err(TransitionError::OverrideForbidden { role: actor.role })
                }
            }
        };

        match result {
            Ok((to, actor, override_reason)) => {
                self.parcel.validation_state = to;
                self.last_error = None;
                tracing::info!(
                    parcel = %self.parcel.reference,
                    from = %from,
                    to = %to,
                    actor = %actor.username,
                    overridden = override_reason.is_some(),
                    "Parcel state changed"
                );
                self.history.push(TransitionRecord {
                    from,
                    to,
                    actor: actor.username.clone(),
                    override_reason,
                    at: Utc::now(),
                });
                Transition(state_for(to))
            }
            Err(err) => {
                tracing::warn!(parcel = %self.parcel.reference, error = %err, "Parcel transition refused");
                self.last_error = Some(err);
                Handled
            }
        }
    }
}

fn state_for(state: ValidationState) -> State {
    match state {
        ValidationState::Draft => State::draft(),
        ValidationState::Validated => State::validated(),
        ValidationState::Published => State::published(),
        ValidationState::Archived => State::archived(),
    }
}

#[state_machine(
    initial = "State::draft()",
    state(derive(Debug, Clone, PartialEq, Eq)),
    visibility = "pub"
)]
impl ParcelLifecycle {
    #[state]
    fn draft(&mut self, event: &LifecycleEvent) -> Outcome<State> {
        self.apply(event)
    }

    #[state]
    fn validated(&mut self, event: &LifecycleEvent) -> Outcome<State> {
        self.apply(event)
    }

    #[state]
    fn published(&mut self, event: &LifecycleEvent) -> Outcome<State> {
        self.apply(event)
    }

    #[state]
    fn archived(&mut self, event: &LifecycleEvent) -> Outcome<State> {
        self.apply(event)
    }
}

/// A parcel together with its running workflow machine.
pub struct ParcelWorkflow {
    machine: StateMachine<ParcelLifecycle>,
}

impl ParcelWorkflow {
    pub fn new(parcel: Parcel) -> Self {
        let mut machine = ParcelLifecycle::new(parcel).state_machine();
        machine.handle(&LifecycleEvent::Resume);
        Self { machine }
    }

    pub fn state(&self) -> &State {
        self.machine.state()
    }

    pub fn lifecycle(&self) -> &ParcelLifecycle {
        self.machine.inner()
    }

    pub fn parcel(&self) -> &Parcel {
        self.lifecycle().parcel()
    }

    pub fn request(&mut self, to: ValidationState, actor: &User) -> Result<ValidationState, TransitionError> {
        self.dispatch(LifecycleEvent::Request {
            to,
            actor: actor.clone(),
        })
    }

    pub fn admin_override(
        &mut self,
        to: ValidationState,
        actor: &User,
        reason: impl Into<String>,
    ) -> Result<ValidationState, TransitionError> {
        self.dispatch(LifecycleEvent::AdminOverride {
            to,
            actor: actor.clone(),
            reason: reason.into(),
        })
    }

    fn dispatch(&mut self, event: LifecycleEvent) -> Result<ValidationState, TransitionError> {
        self.machine.handle(&event);
        let lifecycle = self.machine.inner();
        match lifecycle.last_error() {
            Some(err) => Err(err.clone()),
            None => Ok(lifecycle.parcel().validation_state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Geometry, OwnerShare};
    use rust_decimal_macros::dec;

    fn parcel() -> Parcel {
        let mut parcel = Parcel::draft("TF-9001/R", "R3", dec!(250));
        parcel.owners = vec![OwnerShare::new(1, "Ouazzani", dec!(1))];
        parcel.geometry = Some(Geometry::polygon(vec![[0.0, 0.0], [5.0, 0.0], [5.0, 5.0], [0.0, 0.0]]));
        parcel
    }

    fn admin() -> User {
        User::new(1, "admin", Role::Admin)
    }

    #[test]
    fn full_lifecycle() {
        let tech = User::new(2, "youssef", Role::GisTechnician);
        let agent = User::new(3, "karim", Role::TaxAgent);
        let mut wf = ParcelWorkflow::new(parcel());
        assert_eq!(wf.state(), &State::draft());

        assert_eq!(wf.request(ValidationState::Validated, &tech), Ok(ValidationState::Validated));
        assert_eq!(wf.state(), &State::validated());

        // amount not computed yet
        assert!(wf.request(ValidationState::Published, &agent).is_err());
        assert_eq!(wf.state(), &State::validated());
    }

    #[test]
    fn unauthorized_request_keeps_state() {
        let reader = User::new(4, "salma", Role::Reader);
        let mut wf = ParcelWorkflow::new(parcel());
        let err = wf.request(ValidationState::Validated, &reader).unwrap_err();
        assert!(matches!(err, TransitionError::Rejected { .. }));
        assert_eq!(wf.parcel().validation_state, ValidationState::Draft);
        assert!(wf.lifecycle().history().is_empty());
    }

    #[test]
    fn resumes_at_persisted_state() {
        let mut loaded = parcel();
        loaded.validation_state = ValidationState::Published;
        let mut wf = ParcelWorkflow::new(loaded);
        assert_eq!(wf.state(), &State::published());
        assert!(wf.lifecycle().history().is_empty());

        assert_eq!(wf.request(ValidationState::Archived, &admin()), Ok(ValidationState::Archived));
        assert_eq!(wf.lifecycle().history().len(), 1);
    }

    #[test]
    fn archived_reopens_only_by_override() {
        let mut loaded = parcel();
        loaded.validation_state = ValidationState::Archived;
        let mut wf = ParcelWorkflow::new(loaded);
        let agent = User::new(3, "karim", Role::TaxAgent);

        assert!(wf.request(ValidationState::Draft, &admin()).is_err());
        assert_eq!(
            wf.admin_override(ValidationState::Draft, &agent, "correction"),
            Err(TransitionError::OverrideForbidden { role: Role::TaxAgent })
        );
        assert_eq!(
            wf.admin_override(ValidationState::Draft, &admin(), "correction cadastrale"),
            Ok(ValidationState::Draft)
        );
        assert_eq!(wf.state(), &State::draft());
        let record = &wf.lifecycle().history()[0];
        assert_eq!(record.from, ValidationState::Archived);
        assert_eq!(record.override_reason.as_deref(), Some("correction cadastrale"));
    }
}
