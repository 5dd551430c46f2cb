//! HTTP transport seam
//!
//! [`GridClient`](crate::GridClient) builds an [`HttpRequest`] and hands it to
//! an [`HttpTransport`]. The transport only moves bytes: status handling and
//! JSON decoding happen in the client so every transport behaves the same.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error};

use crate::endpoint::HttpMethod;
use crate::error::{GridError, Result, TransportErrorKind};

pub const AUTH_HEADER: &str = "authId";

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends exactly one request and returns whatever came back
///
/// Implementations return `Err` only when no response was received.
/// Non-2xx responses are `Ok`.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        {
            builder = builder.timeout(timeout);
        }
        #[cfg(target_arch = "wasm32")]
        let _ = timeout;

        let client = builder.build().map_err(|e| {
            GridError::transport(
                TransportErrorKind::Other,
                format!("Failed to create HTTP client: {}", e),
            )
        })?;
        Ok(Self { client })
    }

    /// Wrap an already configured reqwest client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn classify(e: &reqwest::Error) -> TransportErrorKind {
        if e.is_timeout() {
            return TransportErrorKind::Timeout;
        }
        // is_connect not available on WASM
        #[cfg(not(target_arch = "wasm32"))]
        {
            if e.is_connect() {
                return TransportErrorKind::Connect;
            }
        }
        if e.is_builder() || e.is_request() {
            TransportErrorKind::Request
        } else if e.is_body() || e.is_decode() {
            TransportErrorKind::Body
        } else {
            TransportErrorKind::Other
        }
    }

    fn convert_error(e: reqwest::Error, request: &HttpRequest, operation: &str) -> GridError {
        let kind = Self::classify(&e);
        let hint = match kind {
            TransportErrorKind::Timeout => "timeout - request took too long",
            TransportErrorKind::Connect => {
                "connection error - check network connectivity, DNS resolution, and firewall settings"
            }
            TransportErrorKind::Request => {
                "request error - invalid URL format or malformed request parameters"
            }
            TransportErrorKind::Body => "body error - response could not be read",
            TransportErrorKind::Other => "unexpected transport failure",
        };
        GridError::transport(
            kind,
            format!(
                "Failed to {} {} {}: {}. Error: {}",
                operation, request.method, request.url, hint, e
            ),
        )
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            let err = Self::convert_error(e, &request, "send");
            error!("[ReqwestTransport] {}", err);
            err
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            let err = Self::convert_error(e, &request, "read response of");
            error!("[ReqwestTransport] {}", err);
            err
        })?;

        debug!(
            "[ReqwestTransport] {} {} -> {} ({} bytes)",
            request.method,
            request.url,
            status,
            body.len()
        );

        Ok(HttpResponse { status, body })
    }
}
