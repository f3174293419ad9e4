//! Fake transports for tests
//!
//! Enabled in this crate's own tests and, through the `testing` feature, in
//! downstream test suites.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::sync::Mutex;

use crate::transport::{HttpRequest, HttpResponse, Transport, TransportError};

/// One scripted reply of a [`ScriptedTransport`]
#[derive(Debug, Clone)]
pub enum Step {
    /// A response with a readable body
    Respond {
        status: u16,
        headers: HeaderMap,
        body: String,
    },
    /// The request never produces a response
    NetworkError(String),
    /// The response head arrives but reading the body fails
    BodyError { status: u16, message: String },
}

impl Step {
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Step::Respond {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<String>) -> Self {
        Step::status(200, body)
    }

    pub fn network_error(message: impl Into<String>) -> Self {
        Step::NetworkError(message.into())
    }

    pub fn body_error(status: u16, message: impl Into<String>) -> Self {
        Step::BodyError {
            status,
            message: message.into(),
        }
    }

    /// Add a response header; no effect on error steps
    ///
    /// # Panics
    /// Panics if `value` is not a valid header value.
    pub fn with_header(mut self, name: &'static str, value: &str) -> Self {
        if let Step::Respond { headers, .. } = &mut self {
            let value =
                HeaderValue::from_str(value).expect("scripted header value must be valid");
            headers.insert(HeaderName::from_static(name), value);
        }
        self
    }
}

#[derive(Debug, Default)]
struct ScriptState {
    next: usize,
    requests: Vec<HttpRequest>,
}

/// Replays a fixed script of replies and records every request
///
/// Once the script is exhausted the final step repeats.
#[derive(Debug)]
pub struct ScriptedTransport {
    steps: Vec<Step>,
    state: Mutex<ScriptState>,
}

impl ScriptedTransport {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
            state: Mutex::new(ScriptState::default()),
        }
    }

    /// Number of requests received so far
    pub fn calls(&self) -> usize {
        self.state.lock().unwrap().requests.len()
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    /// URL paths of the requests received, in order
    pub fn paths(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|request| request.url.path().to_string())
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let step = {
            let mut state = self.state.lock().unwrap();
            state.requests.push(request);
            let index = state.next.min(self.steps.len().saturating_sub(1));
            state.next += 1;
            self.steps.get(index).cloned()
        };

        match step {
            None => Err(TransportError::new("scripted transport has no steps")),
            Some(Step::NetworkError(message)) => Err(TransportError::new(message)),
            Some(Step::BodyError { status, message }) => {
                Ok(HttpResponse::new(status, HeaderMap::new(), async move {
                    Err(TransportError::new(message))
                }))
            }
            Some(Step::Respond {
                status,
                headers,
                body,
            }) => Ok(HttpResponse::new(status, headers, async move {
                Ok(body.into_bytes())
            })),
        }
    }
}

/// A transport whose requests never complete
#[derive(Debug, Default)]
pub struct HangingTransport;

#[async_trait]
impl Transport for HangingTransport {
    async fn send(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
        std::future::pending().await
    }
}
