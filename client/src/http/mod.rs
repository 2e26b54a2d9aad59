//! HTTP client wrapper around the storefront API

mod client;
mod interceptor;
mod transport;

pub use client::ApiClient;
pub use interceptor::{BearerTokenInterceptor, Interceptor, SessionExpiryInterceptor};
pub use transport::{ApiRequest, ApiResponse, ReqwestTransport, Transport};

pub use reqwest::header::{HeaderMap, HeaderValue};
pub use reqwest::{Method, StatusCode};
