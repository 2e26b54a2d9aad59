//! Storefront API client
//!
//! Every call goes through the same pipeline: default headers, request
//! interceptors, transport, response interceptors, then classification of
//! the status into `Ok` or an [`ApiError`].

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared::ApiMessage;

use super::interceptor::{BearerTokenInterceptor, Interceptor, SessionExpiryInterceptor};
use super::transport::{ApiRequest, ApiResponse, ReqwestTransport, Transport};
use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::session::SessionContext;

/// Storefront API client
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    transport: Arc<dyn Transport>,
    interceptors: Vec<Arc<dyn Interceptor>>,
    session: SessionContext,
}

impl ApiClient {
    /// Create a client for the configured API using reqwest
    pub fn new(config: &ApiConfig, session: SessionContext) -> Self {
        Self::with_transport(&config.base_url, Arc::new(ReqwestTransport::new()), session)
    }

    /// Create a client over a custom transport, with the standard interceptors
    pub fn with_transport(
        base_url: &str,
        transport: Arc<dyn Transport>,
        session: SessionContext,
    ) -> Self {
        let interceptors: Vec<Arc<dyn Interceptor>> = vec![
            Arc::new(BearerTokenInterceptor::new(session.clone())),
            Arc::new(SessionExpiryInterceptor::new(session.clone())),
        ];

        tracing::debug!("API client targeting {}", base_url);

        Self {
            base_url: base_url.to_string(),
            transport,
            interceptors,
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Send a request through the interceptor pipeline
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
        headers: Option<HeaderMap>,
    ) -> ApiResult<ApiResponse> {
        let mut request = ApiRequest::new(method, path);
        request.body = body;
        request
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        request
            .headers
            .insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(extra) = headers {
            request.headers.extend(extra);
        }

        for interceptor in &self.interceptors {
            interceptor.on_request(&mut request);
        }

        let method = request.method.clone();
        tracing::debug!("{} {}", method, path);

        let response = match self.transport.send(&self.base_url, request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("{} {} failed: {}", method, path, e);
                return Err(e);
            }
        };

        for interceptor in &self.interceptors {
            interceptor.on_response(&response);
        }

        if response.status.is_success() {
            Ok(response)
        } else {
            let error = ApiError::from_response(response.status, &response.body);
            tracing::warn!("{} {} returned {}: {}", method, path, response.status, error);
            Err(error)
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.request(Method::GET, path, None, None).await?.json()
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::POST, path, Some(to_json(body)?), None)
            .await?
            .json()
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::PUT, path, Some(to_json(body)?), None)
            .await?
            .json()
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::PATCH, path, Some(to_json(body)?), None)
            .await?
            .json()
    }

    /// DELETE, tolerating an empty response body
    pub async fn delete(&self, path: &str) -> ApiResult<ApiMessage> {
        Ok(self.request(Method::DELETE, path, None, None).await?.message())
    }
}

fn to_json<B: Serialize + ?Sized>(body: &B) -> ApiResult<serde_json::Value> {
    serde_json::to_value(body)
        .map_err(|e| ApiError::Unclassified(format!("Failed to encode request body: {}", e)))
}
