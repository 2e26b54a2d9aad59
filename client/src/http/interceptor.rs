//! Request and response interceptors

use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;

use super::transport::{ApiRequest, ApiResponse};
use crate::session::SessionContext;

/// Hook run around every API call
pub trait Interceptor: Send + Sync {
    /// Rewrite an outgoing request
    fn on_request(&self, _request: &mut ApiRequest) {}

    /// Observe a received response before it is classified
    fn on_response(&self, _response: &ApiResponse) {}
}

/// Attaches the persisted bearer token to every outgoing request
pub struct BearerTokenInterceptor {
    session: SessionContext,
}

impl BearerTokenInterceptor {
    pub fn new(session: SessionContext) -> Self {
        Self { session }
    }
}

impl Interceptor for BearerTokenInterceptor {
    fn on_request(&self, request: &mut ApiRequest) {
        let token = match self.session.token() {
            Ok(Some(token)) => token,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!("Could not read persisted token, sending unauthenticated: {}", e);
                return;
            }
        };

        match HeaderValue::from_str(&format!("Bearer {}", token)) {
            Ok(value) => {
                request.headers.insert(AUTHORIZATION, value);
            }
            Err(_) => tracing::warn!("Persisted token is not a valid header value, ignoring it"),
        }
    }
}

/// Ends the session when the server answers 401
pub struct SessionExpiryInterceptor {
    session: SessionContext,
}

impl SessionExpiryInterceptor {
    pub fn new(session: SessionContext) -> Self {
        Self { session }
    }
}

impl Interceptor for SessionExpiryInterceptor {
    fn on_response(&self, response: &ApiResponse) {
        if response.status == StatusCode::UNAUTHORIZED {
            self.session.invalidate();
        }
    }
}
