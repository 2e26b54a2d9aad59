//! Outbound HTTP transport

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use shared::ApiMessage;

use crate::error::{ApiError, ApiResult};

/// A request before it is sent; interceptors may rewrite it
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the API base URL, e.g. `/cart/items/3`
    pub path: String,
    pub body: Option<serde_json::Value>,
    pub headers: HeaderMap,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            headers: HeaderMap::new(),
        }
    }
}

/// A fully received response, successful or not
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> ApiResult<T> {
        serde_json::from_slice(&self.body)
            .map_err(|e| ApiError::Unclassified(format!("Failed to parse response: {}", e)))
    }

    /// Decode an optional `{message}` body; empty or non-JSON bodies yield no message
    pub fn message(&self) -> ApiMessage {
        serde_json::from_slice(&self.body).unwrap_or_default()
    }
}

/// Sends a request and returns whatever the server answered.
///
/// Non-2xx statuses are not errors at this layer; only failing to get a
/// response at all is.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, base_url: &str, request: ApiRequest) -> ApiResult<ApiResponse>;
}

/// Transport backed by a shared reqwest client
#[derive(Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, base_url: &str, request: ApiRequest) -> ApiResult<ApiResponse> {
        let url = join_url(base_url, &request.path);

        let mut builder = self
            .client
            .request(request.method, &url)
            .headers(request.headers);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() || e.is_request() {
                ApiError::NetworkUnreachable(format!("Request to {} failed: {}", url, e))
            } else {
                ApiError::Unclassified(format!("Request to {} failed: {}", url, e))
            }
        })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Unclassified(format!("Failed to read response body: {}", e)))?;

        Ok(ApiResponse {
            status,
            body: body.to_vec(),
        })
    }
}

/// Join a base URL and a request path with exactly one slash between them
pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
