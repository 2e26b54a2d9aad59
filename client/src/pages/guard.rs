//! Session guard for pages that require a signed-in visitor
//!
//! ```text
//! Unchecked ──unauthenticated──▶ Redirecting (terminal)
//!     │
//!     └─authenticated──▶ Loading ──▶ Ready | Empty | Failed
//! ```

use serde::Serialize;

use crate::error::ApiError;
use crate::session::AuthState;

/// Lifecycle of a guarded page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageState {
    Unchecked,
    Redirecting,
    Loading,
    Ready,
    Empty,
    Failed,
}

/// What the page must do after the guard looked at the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Authentication is not resolved yet
    Wait,
    /// Navigate to the login route
    Redirect,
    /// Issue the page's initial data fetch
    Load,
    /// Nothing to do
    Idle,
}

#[derive(Debug, Clone)]
pub struct SessionGuard {
    state: PageState,
    requires_user: bool,
    loads_in_flight: usize,
}

impl SessionGuard {
    /// Guard that only needs `is_authenticated`
    pub fn new() -> Self {
        Self {
            state: PageState::Unchecked,
            requires_user: false,
            loads_in_flight: 0,
        }
    }

    /// Guard that also waits for the user profile (role-dependent pages)
    pub fn requiring_user() -> Self {
        Self {
            requires_user: true,
            ..Self::new()
        }
    }

    pub fn state(&self) -> PageState {
        self.state
    }

    pub fn is_redirecting(&self) -> bool {
        self.state == PageState::Redirecting
    }

    pub fn loads_in_flight(&self) -> usize {
        self.loads_in_flight
    }

    /// Re-evaluate against the current authentication state.
    ///
    /// Returns `Load` at most once per page instance, and never while a
    /// fetch is outstanding.
    pub fn evaluate(&mut self, auth: &AuthState) -> GuardDecision {
        if self.is_redirecting() {
            return GuardDecision::Idle;
        }

        let Some(session) = auth.session() else {
            return GuardDecision::Wait;
        };

        if !session.is_authenticated {
            self.state = PageState::Redirecting;
            return GuardDecision::Redirect;
        }

        if self.requires_user && session.user.is_none() {
            return GuardDecision::Wait;
        }

        if self.state != PageState::Unchecked || self.loads_in_flight > 0 {
            return GuardDecision::Idle;
        }

        self.state = PageState::Loading;
        self.loads_in_flight += 1;
        GuardDecision::Load
    }

    /// Register a reload; refused once the page is redirecting or before it loaded
    pub fn begin_reload(&mut self) -> bool {
        match self.state {
            PageState::Unchecked | PageState::Redirecting => false,
            _ => {
                self.loads_in_flight += 1;
                true
            }
        }
    }

    /// A fetch succeeded and its snapshot was applied
    pub fn load_succeeded(&mut self, item_count: usize) {
        self.finish_load();
        if self.is_redirecting() {
            return;
        }
        self.state = if item_count == 0 {
            PageState::Empty
        } else {
            PageState::Ready
        };
    }

    /// A fetch succeeded but a newer snapshot had already been applied
    pub fn load_superseded(&mut self) {
        self.finish_load();
    }

    /// A fetch failed. A rejected session ends the page; other failures only
    /// mark a page that never loaded as failed and keep the last snapshot
    /// otherwise.
    pub fn load_failed(&mut self, error: &ApiError) -> GuardDecision {
        self.finish_load();
        if self.is_redirecting() {
            return GuardDecision::Idle;
        }
        if error.is_unauthorized() {
            self.state = PageState::Redirecting;
            return GuardDecision::Redirect;
        }
        if self.state == PageState::Loading {
            self.state = PageState::Failed;
        }
        GuardDecision::Idle
    }

    /// Force the terminal state, e.g. after a mutation was rejected with 401
    pub fn redirect(&mut self) -> bool {
        if self.is_redirecting() {
            return false;
        }
        self.state = PageState::Redirecting;
        true
    }

    /// Local state was replaced without a fetch
    pub fn cleared(&mut self) {
        if !self.is_redirecting() {
            self.state = PageState::Empty;
        }
    }

    fn finish_load(&mut self) {
        self.loads_in_flight = self.loads_in_flight.saturating_sub(1);
    }
}

impl Default for SessionGuard {
    fn default() -> Self {
        Self::new()
    }
}
