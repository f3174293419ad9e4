//! Transport seam
//!
//! Resilient fetch reaches the network only through [`Transport`], so tests can
//! swap the reqwest-backed implementation for a scripted fake.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Url};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A pending read of a response body
type BodyFuture = Pin<Box<dyn Future<Output = Result<Vec<u8>, TransportError>> + Send>>;

/// Network-level failure: connection, DNS, timeout or body read
#[derive(Debug, Error)]
#[error(transparent)]
pub struct TransportError(BoxError);

impl TransportError {
    pub fn new(error: impl Into<BoxError>) -> Self {
        Self(error.into())
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        Self::new(error)
    }
}

/// An outgoing request
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
}

impl HttpRequest {
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            headers: HeaderMap::new(),
        }
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Status line and headers of a response, with the body still unread
pub struct HttpResponse {
    status: u16,
    headers: HeaderMap,
    body: BodyFuture,
}

impl HttpResponse {
    pub fn new<F>(status: u16, headers: HeaderMap, body: F) -> Self
    where
        F: Future<Output = Result<Vec<u8>, TransportError>> + Send + 'static,
    {
        Self {
            status,
            headers,
            body: Box::pin(body),
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Read the full body, consuming the response
    pub async fn read_body(self) -> Result<Vec<u8>, TransportError> {
        self.body.await
    }
}

impl std::fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Sends one request and returns the response head
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Production transport backed by a reqwest client with a fixed timeout
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Per-request timeout used when none is configured
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Build a transport whose requests (including body reads) time out after `timeout`
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let response = self
            .client
            .request(request.method, request.url)
            .headers(request.headers)
            .send()
            .await?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();

        Ok(HttpResponse::new(status, headers, async move {
            let bytes = response.bytes().await?;
            Ok(bytes.to_vec())
        }))
    }
}
