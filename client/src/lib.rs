//! Storefront client
//!
//! Authenticated access to the livestock storefront API: a session context
//! owning the bearer token, an HTTP client whose interceptors attach the
//! token and end the session on 401, domain services for the cart and
//! orders, and the page controllers that gate on the session and reload
//! their lists after every mutation.

use std::sync::Arc;

pub mod config;
pub mod error;
pub mod http;
pub mod navigation;
pub mod notify;
pub mod pages;
pub mod services;
pub mod session;
pub mod storage;

pub use config::Config;
pub use error::{ApiError, ApiResult, StorageError};
pub use http::ApiClient;
pub use navigation::{Navigator, Route, Router};
pub use notify::{Notice, NoticeBoard, NoticeLevel, Notifier};
pub use pages::{CartList, CartPage, CheckoutOutcome, OrderList, OrdersPage, PageState};
pub use services::{AuthService, CartService, OrderService};
pub use session::{AuthState, SessionContext};
pub use storage::{FileTokenStore, MemoryTokenStore, TokenStore};

/// Everything a page needs, wired once per application
#[derive(Clone)]
pub struct Storefront {
    pub config: Arc<Config>,
    pub session: SessionContext,
    pub api: ApiClient,
    pub notifier: Arc<dyn Notifier>,
}

impl Storefront {
    pub fn new(
        config: Config,
        storage: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let session = SessionContext::new(storage, navigator);
        let api = ApiClient::new(&config.api, session.clone());
        Self::from_parts(config, session, api, notifier)
    }

    /// Wire a storefront around an existing client (custom transport, extra interceptors)
    pub fn from_parts(
        config: Config,
        session: SessionContext,
        api: ApiClient,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            session,
            api,
            notifier,
        }
    }

    pub fn auth(&self) -> AuthService {
        AuthService::new(self.api.clone())
    }

    pub fn cart_page(&self) -> Arc<CartPage> {
        Arc::new(CartPage::new(
            CartList::new(CartService::new(self.api.clone())),
            self.session.clone(),
            self.notifier.clone(),
        ))
    }

    pub fn orders_page(&self) -> Arc<OrdersPage> {
        Arc::new(OrdersPage::new(
            OrderList::new(OrderService::new(self.api.clone())),
            self.session.clone(),
            self.notifier.clone(),
        ))
    }
}
