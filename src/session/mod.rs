//! Process-wide session state with change notification.
//!
//! Initialised once by the app shell; views only read it. Sign-in, refresh and sign-out go
//! through `set_session` and `clear`, which notify every listener in registration order.

use crate::api::auth::Session;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum SessionState {
    /// Stored session not validated yet.
    #[default]
    Loading,
    Anonymous,
    Authenticated(Session),
}

impl SessionState {
    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::Authenticated(s) => Some(s),
            _ => None,
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.session().map(|s| s.user.id.as_str())
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }
}

/// First step for a stored session at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Bootstrap {
    SignedOut,
    /// Expired or about to: exchange this refresh token.
    Refresh(String),
    /// Check the access token with the backend before trusting it.
    Validate(Session),
}

pub(crate) fn bootstrap(stored: Option<Session>, now_secs: i64, leeway_secs: i64) -> Bootstrap {
    match stored {
        None => Bootstrap::SignedOut,
        Some(s) if s.is_expired(now_secs, leeway_secs) => Bootstrap::Refresh(s.refresh_token),
        Some(s) => Bootstrap::Validate(s),
    }
}

/// Reaction to a backend 401 while the app is running.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Recovery {
    Refresh(String),
    /// Another refresh is already in flight; its outcome decides.
    InFlight,
    SignOut,
}

pub(crate) fn recovery(state: &SessionState, refreshing: bool) -> Recovery {
    if refreshing {
        return Recovery::InFlight;
    }
    match state.session() {
        Some(s) if !s.refresh_token.is_empty() => Recovery::Refresh(s.refresh_token.clone()),
        _ => Recovery::SignOut,
    }
}

pub(crate) type ListenerId = u64;

type Listener = Arc<dyn Fn(&SessionState) + Send + Sync>;

#[derive(Default)]
struct Inner {
    state: SessionState,
    initialised: bool,
    next_id: ListenerId,
    listeners: Vec<(ListenerId, Listener)>,
}

#[derive(Clone, Default)]
pub(crate) struct SessionHub {
    inner: Arc<Mutex<Inner>>,
}

impl std::fmt::Debug for SessionHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("SessionHub")
            .field("state", &inner.state)
            .field("listeners", &inner.listeners.len())
            .finish()
    }
}

impl SessionHub {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn state(&self) -> SessionState {
        self.lock().state.clone()
    }

    /// Register `f`; it is called on every later state change.
    pub fn subscribe(&self, f: impl Fn(&SessionState) + Send + Sync + 'static) -> ListenerId {
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.listeners.push((id, Arc::new(f)));
        id
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut inner = self.lock();
        let before = inner.listeners.len();
        inner.listeners.retain(|(lid, _)| *lid != id);
        inner.listeners.len() != before
    }

    /// `true` only for the first caller; later calls are no-ops for the caller to skip.
    pub fn begin_init(&self) -> bool {
        let mut inner = self.lock();
        if inner.initialised {
            return false;
        }
        inner.initialised = true;
        true
    }

    pub fn set_session(&self, session: Session) {
        self.publish(SessionState::Authenticated(session));
    }

    /// Drop the session (sign-out, failed validation, 401).
    pub fn clear(&self) {
        self.publish(SessionState::Anonymous);
    }

    fn publish(&self, next: SessionState) {
        let listeners: Vec<Listener> = {
            let mut inner = self.lock();
            if inner.state == next {
                return;
            }
            inner.state = next.clone();
            inner.listeners.iter().map(|(_, l)| l.clone()).collect()
        };
        // Called outside the lock so listeners may read the hub.
        for l in listeners {
            l(&next);
        }
    }
}
