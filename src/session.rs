//! Application state shared by the front ends: who is logged in, how many
//! requests are in flight, and a notification feed.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

use crate::api::{ApiError, UiReaction};
use crate::domain::{has_capability, Permission, User};

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SessionEvent {
    Notification { level: NotificationLevel, message: String },
    UserChanged(Option<User>),
    /// The backend rejected the credentials; the client must log in again
    LoggedOut,
    Unauthorized { message: String },
    FieldErrors {
        message: String,
        fields: BTreeMap<String, Vec<String>>,
    },
}

#[derive(Debug)]
pub struct Session {
    user: RwLock<Option<User>>,
    in_flight: AtomicUsize,
    events: broadcast::Sender<SessionEvent>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            user: RwLock::new(None),
            in_flight: AtomicUsize::new(0),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: SessionEvent) {
        // no subscriber is not an error
        let _ = self.events.send(event);
    }

    pub fn login(&self, user: User) {
        tracing::info!(user = %user.username, role = %user.role, "Session opened");
        self.set_user(Some(user));
    }

    pub fn logout(&self) {
        if self.current_user().is_some() {
            tracing::info!("Session closed");
        }
        self.set_user(None);
    }

    fn set_user(&self, user: Option<User>) {
        match self.user.write() {
            Ok(mut guard) => *guard = user.clone(),
            Err(poisoned) => *poisoned.into_inner() = user.clone(),
        }
        self.publish(SessionEvent::UserChanged(user));
    }

    pub fn current_user(&self) -> Option<User> {
        match self.user.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_user().is_some()
    }

    /// False when nobody is logged in.
    pub fn has_capability(&self, permission: Permission) -> bool {
        self.current_user()
            .is_some_and(|user| has_capability(&user, permission))
    }

    pub fn notify(&self, level: NotificationLevel, message: impl Into<String>) {
        self.publish(SessionEvent::Notification {
            level,
            message: message.into(),
        });
    }

    /// Marks a request as running until the guard is dropped.
    pub fn begin_request(self: &Arc<Self>) -> InFlightGuard {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        InFlightGuard {
            session: Arc::clone(self),
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight() > 0
    }

    /// Publishes the reaction an API failure calls for. A 401 also ends the
    /// session.
    pub fn report_error(&self, error: &ApiError) -> UiReaction {
        let reaction = error.ui_reaction();
        match &reaction {
            UiReaction::ForceLogout => {
                tracing::warn!(endpoint = %error.endpoint, "Authentication rejected, closing session");
                self.logout();
                self.publish(SessionEvent::LoggedOut);
            }
            UiReaction::RedirectUnauthorized { message } => {
                self.publish(SessionEvent::Unauthorized {
                    message: message.clone(),
                });
            }
            UiReaction::ShowFieldErrors { message, fields } => {
                self.publish(SessionEvent::FieldErrors {
                    message: message.clone(),
                    fields: fields.clone(),
                });
            }
            UiReaction::Toast { message } => self.notify(NotificationLevel::Error, message.clone()),
        }
        reaction
    }
}

#[derive(Debug)]
pub struct InFlightGuard {
    session: Arc<Session>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.session.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}
