//! Navigation between storefront routes

use parking_lot::Mutex;
use tokio::sync::watch;

/// Destinations the client navigates to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Animals,
    Orders,
    Cart,
    Other(String),
}

impl Route {
    pub fn path(&self) -> &str {
        match self {
            Route::Login => "/login",
            Route::Animals => "/animals",
            Route::Orders => "/orders",
            Route::Cart => "/cart",
            Route::Other(path) => path,
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// Performs route changes on behalf of pages and the session context
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
    fn current(&self) -> Route;
}

/// Navigator that tracks the current route and its history.
///
/// Navigating to the route already shown is a no-op, so repeated redirects
/// to `/login` collapse into one.
pub struct Router {
    current: watch::Sender<Route>,
    history: Mutex<Vec<Route>>,
}

impl Router {
    pub fn new(initial: Route) -> Self {
        let (current, _) = watch::channel(initial);
        Self {
            current,
            history: Mutex::new(Vec::new()),
        }
    }

    /// Routes navigated to since creation, oldest first
    pub fn history(&self) -> Vec<Route> {
        self.history.lock().clone()
    }

    /// Number of times `route` was navigated to
    pub fn visits(&self, route: &Route) -> usize {
        self.history.lock().iter().filter(|r| *r == route).count()
    }
}

impl Navigator for Router {
    fn navigate(&self, route: Route) {
        let mut history = self.history.lock();
        let changed = self.current.send_if_modified(|current| {
            if *current == route {
                false
            } else {
                *current = route.clone();
                true
            }
        });

        if changed {
            tracing::info!("Navigated to {}", route);
            history.push(route);
        } else {
            tracing::debug!("Already on {}, navigation skipped", route);
        }
    }

    fn current(&self) -> Route {
        self.current.borrow().clone()
    }
}
