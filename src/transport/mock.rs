//! Fixture-driven transport for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use reqwest::Url;

use super::{HttpRequest, Method, RawResponse, Transport, TransportError};

#[derive(Debug, Clone)]
enum Reply {
    Respond { status: u16, body: Option<String> },
    Unreachable,
}

/// A request seen by [`MockTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<String>,
    pub read_body: bool,
}

impl RecordedRequest {
    /// The request body parsed as JSON.
    pub fn json(&self) -> Option<serde_json::Value> {
        self.body
            .as_deref()
            .and_then(|body| serde_json::from_str(body).ok())
    }
}

/// Transport answering from fixtures keyed by `(method, path)`.
///
/// `path` is the URL path of the request, e.g. `/v1/sms/domain/d1/secret`.
/// Requests without a fixture get a 404 with an explanatory body. Every
/// request is recorded, in order.
#[derive(Debug, Default)]
pub struct MockTransport {
    fixtures: Mutex<HashMap<(Method, String), Reply>>,
    unreachable: bool,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport for which every request fails before a status arrives.
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    /// Answer `method path` with `status` and `body`.
    pub fn respond(
        self,
        method: Method,
        path: impl Into<String>,
        status: u16,
        body: impl Into<String>,
    ) -> Self {
        self.set(
            method,
            path,
            Reply::Respond {
                status,
                body: Some(body.into()),
            },
        );
        self
    }

    /// Answer `method path` with `status` and `json` as the body.
    pub fn respond_json(
        self,
        method: Method,
        path: impl Into<String>,
        status: u16,
        json: serde_json::Value,
    ) -> Self {
        self.respond(method, path, status, json.to_string())
    }

    /// Answer `method path` with `status` and no body.
    pub fn respond_empty(self, method: Method, path: impl Into<String>, status: u16) -> Self {
        self.set(method, path, Reply::Respond { status, body: None });
        self
    }

    /// Fail `method path` as if the host could not be reached.
    pub fn fail(self, method: Method, path: impl Into<String>) -> Self {
        self.set(method, path, Reply::Unreachable);
        self
    }

    /// Replace the fixture for `method path` on a shared transport.
    pub fn set_json(
        &self,
        method: Method,
        path: impl Into<String>,
        status: u16,
        json: serde_json::Value,
    ) {
        self.set(
            method,
            path,
            Reply::Respond {
                status,
                body: Some(json.to_string()),
            },
        );
    }

    fn set(&self, method: Method, path: impl Into<String>, reply: Reply) {
        self.fixtures
            .lock()
            .expect("mock fixture lock poisoned")
            .insert((method, path.into()), reply);
    }

    /// All requests executed so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .expect("mock request lock poisoned")
            .clone()
    }

    /// The most recent request, if any.
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests
            .lock()
            .expect("mock request lock poisoned")
            .last()
            .cloned()
    }
}

impl Transport for MockTransport {
    fn execute(
        &self,
        request: &HttpRequest,
        read_body: bool,
    ) -> Result<RawResponse, TransportError> {
        let url = Url::parse(&request.url).map_err(|err| TransportError::InvalidUrl {
            url: request.url.clone(),
            reason: err.to_string(),
        })?;
        let path = url.path().to_string();

        self.requests
            .lock()
            .expect("mock request lock poisoned")
            .push(RecordedRequest {
                method: request.method,
                path: path.clone(),
                body: request.body.clone(),
                read_body,
            });

        if self.unreachable {
            return Err(TransportError::Unreachable(request.url.clone()));
        }

        let reply = self
            .fixtures
            .lock()
            .expect("mock fixture lock poisoned")
            .get(&(request.method, path.clone()))
            .cloned();

        match reply {
            Some(Reply::Respond { status, body }) => Ok(RawResponse {
                status,
                body: if read_body { body } else { None },
            }),
            Some(Reply::Unreachable) => Err(TransportError::Unreachable(request.url.clone())),
            None => Ok(RawResponse {
                status: 404,
                body: read_body.then(|| format!("no fixture for {} {path}", request.method)),
            }),
        }
    }
}
