//! HTTP transport for DefectDojo API v2 requests.

use crate::dojo::models::ApiResponse;
use crate::error::DojoError;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;
use wreq::Client;

const USER_AGENT: &str = concat!("defectdojo-cli/", env!("CARGO_PKG_VERSION"));

/// HTTP method used by the API helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
        }
    }
}

/// One authenticated API request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub api_key: String,
    /// JSON body, sent with `Content-Type: application/json`
    pub body: Option<String>,
}

impl ApiRequest {
    pub fn get(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self { method: Method::Get, url: url.into(), api_key: api_key.into(), body: None }
    }

    pub fn post(url: impl Into<String>, api_key: impl Into<String>, body: String) -> Self {
        Self { method: Method::Post, url: url.into(), api_key: api_key.into(), body: Some(body) }
    }
}

/// Sends API requests - enables mocking for tests.
///
/// Implementations return whatever status the server answered with;
/// only transport-level failures are errors.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    async fn request(&self, request: ApiRequest) -> Result<ApiResponse, DojoError>;
}

#[async_trait]
impl<T: ApiTransport + ?Sized> ApiTransport for &T {
    async fn request(&self, request: ApiRequest) -> Result<ApiResponse, DojoError> {
        (**self).request(request).await
    }
}

/// Transport settings taken from the resolved configuration.
#[derive(Debug, Clone)]
pub struct TransportOptions {
    pub proxy: Option<String>,
    pub timeout: Duration,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self { proxy: None, timeout: Duration::from_secs(30) }
    }
}

/// `wreq`-backed transport.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Builds the HTTP client.
    pub fn new(options: &TransportOptions) -> Result<Self, DojoError> {
        let mut builder = Client::builder()
            .gzip(true)
            .brotli(true)
            .timeout(options.timeout)
            .connect_timeout(Duration::from_secs(10));

        if let Some(proxy_url) = &options.proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = wreq::Proxy::all(proxy_url).map_err(|e| DojoError::InvalidSetting {
                setting: "proxy",
                value: proxy_url.clone(),
                message: e.to_string(),
            })?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().map_err(|source| DojoError::Transport {
            url: "HTTP client setup".to_string(),
            source,
        })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ApiTransport for HttpTransport {
    async fn request(&self, request: ApiRequest) -> Result<ApiResponse, DojoError> {
        debug!("{} {}", request.method, request.url);

        let builder = match request.method {
            Method::Get => self.client.get(request.url.as_str()),
            Method::Post => self.client.post(request.url.as_str()),
        };

        let mut builder = builder
            .header("Authorization", format!("Token {}", request.api_key))
            .header("Accept", "application/json")
            .header("User-Agent", USER_AGENT);

        if let Some(body) = request.body {
            builder = builder.header("Content-Type", "application/json").body(body);
        }

        let transport_err = |source| DojoError::Transport { url: request.url.clone(), source };

        let response = builder.send().await.map_err(transport_err)?;
        let status = response.status().as_u16();
        debug!("Response status: {}", status);

        let body = response.text().await.map_err(transport_err)?;
        Ok(ApiResponse { status, body })
    }
}
