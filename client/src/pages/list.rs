//! Guarded list page controller
//!
//! Holds the last fetched snapshot of a list (cart lines, orders) and
//! implements the page protocol shared by every list page: gate on the
//! session, fetch, and after each mutation reload the whole list. The snapshot
//! is never patched locally.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::guard::{GuardDecision, PageState, SessionGuard};
use crate::error::{ApiError, ApiResult, SESSION_EXPIRED_MESSAGE};
use crate::navigation::{Navigator, Route};
use crate::notify::{Notice, Notifier};
use crate::session::{AuthState, SessionContext};

/// Where a list page gets its items from
#[async_trait]
pub trait ListSource: Send + Sync + 'static {
    type Item: Clone + Send + Sync + 'static;

    /// Notice prefix when fetching fails
    const LOAD_FAILED: &'static str;

    /// Whether the page needs the user profile before fetching
    const REQUIRES_USER: bool;

    async fn fetch(&self) -> ApiResult<Vec<Self::Item>>;
}

/// What the view renderer draws
#[derive(Debug, Clone, PartialEq)]
pub struct ListView<T> {
    pub state: PageState,
    pub items: Vec<T>,
}

impl<T> ListView<T> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

enum FetchOutcome {
    Applied,
    Superseded,
    Expired(ApiError),
    Failed(ApiError),
}

struct ListModel<T> {
    guard: SessionGuard,
    items: Vec<T>,
    // fetch tickets: a result is applied only if newer than the last applied one
    issued: u64,
    applied: u64,
}

impl<T> ListModel<T> {
    fn next_ticket(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }
}

pub struct ListPage<S: ListSource> {
    source: S,
    session: SessionContext,
    notifier: Arc<dyn Notifier>,
    model: Mutex<ListModel<S::Item>>,
    view: watch::Sender<ListView<S::Item>>,
    mounted: AtomicBool,
    // set by the first session-expired notice this page posts
    expiry_notified: AtomicBool,
    watcher: Mutex<Option<JoinHandle<()>>>,
}

impl<S: ListSource> ListPage<S> {
    pub fn new(source: S, session: SessionContext, notifier: Arc<dyn Notifier>) -> Self {
        let guard = if S::REQUIRES_USER {
            SessionGuard::requiring_user()
        } else {
            SessionGuard::new()
        };
        let (view, _) = watch::channel(ListView {
            state: guard.state(),
            items: Vec::new(),
        });

        Self {
            source,
            session,
            notifier,
            model: Mutex::new(ListModel {
                guard,
                items: Vec::new(),
                issued: 0,
                applied: 0,
            }),
            view,
            mounted: AtomicBool::new(false),
            expiry_notified: AtomicBool::new(false),
            watcher: Mutex::new(None),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn view(&self) -> ListView<S::Item> {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ListView<S::Item>> {
        self.view.subscribe()
    }

    pub fn state(&self) -> PageState {
        self.model.lock().guard.state()
    }

    /// Items of the last applied snapshot
    pub fn items(&self) -> Vec<S::Item> {
        self.model.lock().items.clone()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    /// Mount the page and run the guard against the current session
    pub async fn mount(&self) {
        self.mounted.store(true, Ordering::SeqCst);
        let auth = self.session.state();
        self.on_auth_change(&auth).await;
    }

    /// Keep re-running the guard whenever the session changes while mounted
    pub fn watch_session(self: &Arc<Self>) {
        let mut changes = self.session.subscribe();
        let page: Weak<Self> = Arc::downgrade(self);

        let handle = tokio::spawn(async move {
            while changes.changed().await.is_ok() {
                let Some(page) = page.upgrade() else { break };
                if !page.is_mounted() {
                    break;
                }
                let auth = changes.borrow_and_update().clone();
                page.on_auth_change(&auth).await;
            }
        });

        if let Some(previous) = self.watcher.lock().replace(handle) {
            previous.abort();
        }
    }

    /// Stop reacting; fetches still in flight are ignored when they resolve
    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::SeqCst);
        if let Some(watcher) = self.watcher.lock().take() {
            watcher.abort();
        }
    }

    pub async fn on_auth_change(&self, auth: &AuthState) {
        if !self.is_mounted() {
            return;
        }

        let (decision, ticket) = {
            let mut model = self.model.lock();
            let decision = model.guard.evaluate(auth);
            let ticket = match decision {
                GuardDecision::Load => Some(model.next_ticket()),
                _ => None,
            };
            (decision, ticket)
        };
        self.publish();

        match (decision, ticket) {
            (GuardDecision::Redirect, _) => {
                tracing::info!("Not signed in, redirecting to login");
                self.navigate_to_login();
            }
            (GuardDecision::Load, Some(ticket)) => {
                self.run_fetch(ticket).await;
            }
            _ => {}
        }
    }

    /// Refetch the whole list. Returns false when the page cannot load.
    pub async fn reload(&self) -> bool {
        if !self.is_mounted() {
            return false;
        }
        let ticket = {
            let mut model = self.model.lock();
            if !model.guard.begin_reload() {
                return false;
            }
            model.next_ticket()
        };
        self.run_fetch(ticket).await
    }

    async fn run_fetch(&self, ticket: u64) -> bool {
        let result = self.source.fetch().await;

        if !self.is_mounted() {
            tracing::debug!(ticket, "Page unmounted, ignoring fetch result");
            return false;
        }

        let outcome = {
            let mut model = self.model.lock();
            match result {
                Ok(items) if ticket > model.applied => {
                    model.applied = ticket;
                    model.guard.load_succeeded(items.len());
                    model.items = items;
                    FetchOutcome::Applied
                }
                Ok(_) => {
                    tracing::debug!(ticket, "Superseded fetch result dropped");
                    model.guard.load_superseded();
                    FetchOutcome::Applied
                }
                Err(e) if e.is_unauthorized() => {
                    model.guard.load_failed(&e);
                    FetchOutcome::Expired(e)
                }
                Err(e) if ticket <= model.applied => {
                    tracing::debug!(ticket, "Fetch failed after a newer snapshot: {}", e);
                    model.guard.load_superseded();
                    FetchOutcome::Superseded
                }
                Err(e) => {
                    model.guard.load_failed(&e);
                    FetchOutcome::Failed(e)
                }
            }
        };
        self.publish();

        match outcome {
            FetchOutcome::Applied => true,
            FetchOutcome::Superseded => false,
            FetchOutcome::Expired(e) => {
                self.notify_session_expired();
                self.end_session(&e);
                false
            }
            FetchOutcome::Failed(e) => {
                tracing::warn!("{}: {}", S::LOAD_FAILED, e);
                self.notify(Notice::error(e.user_message(S::LOAD_FAILED)));
                false
            }
        }
    }

    /// Submit a mutation, reload the list, then report the outcome.
    ///
    /// A rejected session skips the reload and ends the page instead.
    pub(crate) async fn mutate<R, F>(&self, submit: F, success: &str, failure: &str) -> bool
    where
        R: Send,
        F: Future<Output = ApiResult<R>> + Send,
    {
        let result = submit.await;

        if let Err(e) = &result {
            if e.is_unauthorized() {
                self.notify_session_expired();
                self.end_session(e);
                return false;
            }
        }

        self.reload().await;

        match result {
            Ok(_) => {
                tracing::info!("{}", success);
                self.notify(Notice::success(success));
                true
            }
            Err(e) => {
                tracing::warn!("{}: {}", failure, e);
                self.notify(Notice::error(e.user_message(failure)));
                false
            }
        }
    }

    /// Whether user actions may be submitted right now
    pub(crate) fn accepts_actions(&self) -> bool {
        self.is_mounted() && !self.model.lock().guard.is_redirecting()
    }

    /// Drop the snapshot locally; later results of older fetches are ignored
    pub(crate) fn clear(&self) {
        {
            let mut model = self.model.lock();
            model.items.clear();
            model.applied = model.issued;
            model.guard.cleared();
        }
        self.publish();
    }

    pub(crate) fn notify(&self, notice: Notice) {
        self.notifier.notify(notice);
    }

    /// Post the session-expired notice, at most once per page.
    ///
    /// Independent of which task moved the guard to `Redirecting` first: the
    /// session watcher may get there before the rejected call returns.
    pub(crate) fn notify_session_expired(&self) {
        if self
            .expiry_notified
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            self.notify(Notice::error(SESSION_EXPIRED_MESSAGE));
        }
    }

    /// Converge with the interceptor's reaction to a 401: the token is erased
    /// once and the visitor ends up on the login route exactly once.
    pub(crate) fn end_session(&self, error: &ApiError) {
        tracing::debug!("Ending session after {}", error);
        self.model.lock().guard.redirect();
        self.publish();
        if !self.session.invalidate() {
            self.navigate_to_login();
        }
    }

    fn navigate_to_login(&self) {
        let navigator = self.session.navigator();
        if navigator.current() != Route::Login {
            navigator.navigate(Route::Login);
        }
    }

    fn publish(&self) {
        let view = {
            let model = self.model.lock();
            ListView {
                state: model.guard.state(),
                items: model.items.clone(),
            }
        };
        self.view.send_replace(view);
    }
}

impl<S: ListSource> Drop for ListPage<S> {
    fn drop(&mut self) {
        if let Some(watcher) = self.watcher.get_mut().take() {
            watcher.abort();
        }
    }
}
