//! Authentication service
//!
//! Establishes the session the pages are gated on: either by logging in or by
//! restoring a persisted token through the profile endpoint.

use shared::{LoginInput, LoginResponse, ProfileResponse, Session};

use crate::error::{ApiError, ApiResult};
use crate::http::ApiClient;

#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Log in with email and password and sign the session in
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<Session> {
        let input = LoginInput {
            email: email.to_string(),
            password: password.to_string(),
        };

        let response: LoginResponse = self.api.post("/auth/login", &input).await?;
        self.api
            .session()
            .sign_in(&response.access_token, response.user.clone())
            .map_err(|e| ApiError::Unclassified(format!("Failed to persist session: {}", e)))?;

        Ok(Session::authenticated(response.access_token, response.user))
    }

    /// Resolve the session from the persisted token, if there is one.
    ///
    /// Without a token the session resolves anonymous. When the profile cannot
    /// be fetched the session also resolves anonymous and the error is
    /// returned; the token is only erased if the server rejected it.
    pub async fn restore(&self) -> ApiResult<Session> {
        let session = self.api.session();

        let token = match session.token() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!("Could not read persisted token: {}", e);
                None
            }
        };

        let Some(token) = token else {
            tracing::debug!("No persisted token, continuing anonymously");
            session.resolve(Session::anonymous());
            return Ok(Session::anonymous());
        };

        match self.api.get::<ProfileResponse>("/auth/profile").await {
            Ok(profile) => {
                let restored = Session::authenticated(token, profile.user);
                session.resolve(restored.clone());
                tracing::info!("Session restored");
                Ok(restored)
            }
            Err(e) => {
                tracing::warn!("Could not restore session: {}", e);
                session.resolve(Session::anonymous());
                Err(e)
            }
        }
    }
}
