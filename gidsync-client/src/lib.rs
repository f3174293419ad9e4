//! gidsync HTTP Client
//!
//! A resilient client for the remote resource API that gidsync mirrors.
//!
//! Every GET goes through [`ApiClient::fetch_with_retry`], which retries network
//! failures, rate limiting and server errors with exponential backoff and fails
//! fast on any other status. The resource fetchers decode the `{"data": [...]}`
//! envelope on top of it.
//!
//! # Example
//!
//! ```no_run
//! use gidsync_client::ApiClient;
//! use gidsync_core::domain::resource::ResourceKind;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ApiClient::new("https://api.example.com/1.0", "token", Duration::from_secs(10))?;
//!
//!     let projects = client.fetch_resource(ResourceKind::Projects).await?;
//!     println!("Fetched {} projects", projects.len());
//!     Ok(())
//! }
//! ```

pub mod error;
mod resources;
mod retry;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod transport;

// Re-export commonly used types
pub use error::{AttemptFailure, ClientError, Result};
pub use retry::{BASE_BACKOFF, DEFAULT_MAX_ATTEMPTS};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError};

use std::sync::Arc;
use std::time::Duration;

/// Authenticated client for the remote resource API
///
/// Cheap to clone; clones share the underlying transport.
#[derive(Clone)]
pub struct ApiClient {
    /// Base URL of the API, without a trailing slash
    base_url: String,
    /// Static bearer credential
    token: String,
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    /// Create a client backed by reqwest with the given per-request timeout
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let transport = ReqwestTransport::new(timeout).map_err(|e| {
            ClientError::InvalidRequest(format!("Failed to build HTTP client: {}", e))
        })?;

        Ok(Self::with_transport(base_url, token, Arc::new(transport)))
    }

    /// Create a client over a custom transport
    pub fn with_transport(
        base_url: impl Into<String>,
        token: impl Into<String>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
            transport,
        }
    }

    /// Get the base URL of the API
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedTransport, Step};

    fn client(base_url: &str) -> ApiClient {
        let transport = Arc::new(ScriptedTransport::new(Vec::<Step>::new()));
        ApiClient::with_transport(base_url, "secret", transport)
    }

    #[test]
    fn test_client_creation() {
        let client =
            ApiClient::new("http://localhost:8080", "secret", Duration::from_secs(10)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        assert_eq!(client("http://localhost:8080/").base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_debug_redacts_token() {
        let rendered = format!("{:?}", client("http://localhost:8080"));
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("secret"));
    }
}
