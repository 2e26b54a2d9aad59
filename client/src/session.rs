//! Session context shared by the HTTP client and every page
//!
//! A single owning store for the visitor's session. Changes are published on
//! a watch channel; pages subscribe instead of polling global state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use shared::{Session, User};
use tokio::sync::watch;

use crate::error::StorageError;
use crate::navigation::{Navigator, Route};
use crate::storage::TokenStore;

/// Authentication state as observed by pages
#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    /// The session is still being established (e.g. profile fetch in flight)
    Resolving,
    Resolved(Session),
}

impl AuthState {
    pub fn session(&self) -> Option<&Session> {
        match self {
            AuthState::Resolving => None,
            AuthState::Resolved(session) => Some(session),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session().map(|s| s.is_authenticated).unwrap_or(false)
    }

    pub fn user(&self) -> Option<&User> {
        self.session().and_then(|s| s.user.as_ref())
    }
}

/// Cloneable handle to the session store
#[derive(Clone)]
pub struct SessionContext {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    state: watch::Sender<AuthState>,
    storage: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
    // set by the first 401 reaction, re-armed by sign_in
    expired: AtomicBool,
}

impl SessionContext {
    /// Create a context whose authentication state is not yet known
    pub fn new(storage: Arc<dyn TokenStore>, navigator: Arc<dyn Navigator>) -> Self {
        let (state, _) = watch::channel(AuthState::Resolving);
        Self {
            inner: Arc::new(SessionInner {
                state,
                storage,
                navigator,
                expired: AtomicBool::new(false),
            }),
        }
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.inner.navigator
    }

    pub fn state(&self) -> AuthState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.inner.state.subscribe()
    }

    /// Persisted bearer token, if any
    pub fn token(&self) -> Result<Option<String>, StorageError> {
        self.inner.storage.load()
    }

    /// Persist a fresh token and publish the authenticated session
    pub fn sign_in(&self, token: &str, user: User) -> Result<(), StorageError> {
        self.inner.storage.save(token)?;
        self.inner.expired.store(false, Ordering::SeqCst);
        tracing::info!(user_id = user.id, role = %user.user_type, "Signed in");
        self.publish(AuthState::Resolved(Session::authenticated(token, user)));
        Ok(())
    }

    /// Publish a session established by other means
    pub fn resolve(&self, session: Session) {
        if session.is_authenticated {
            self.inner.expired.store(false, Ordering::SeqCst);
        }
        self.publish(AuthState::Resolved(session));
    }

    /// React to the server rejecting the session.
    ///
    /// Only the first caller since the last sign-in erases the token,
    /// publishes the anonymous session and redirects to `/login`; it gets
    /// `true`. Every other caller gets `false` and changes nothing.
    pub fn invalidate(&self) -> bool {
        if self
            .inner
            .expired
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!("Session already invalidated");
            return false;
        }

        tracing::warn!("Session rejected by server, signing out");
        if let Err(e) = self.inner.storage.clear() {
            tracing::warn!("Failed to clear persisted token: {}", e);
        }
        self.publish(AuthState::Resolved(Session::anonymous()));
        self.inner.navigator.navigate(Route::Login);
        true
    }

    fn publish(&self, state: AuthState) {
        self.inner.state.send_replace(state);
    }
}
