//! Transport abstraction: execute one HTTP request, return the raw outcome.
//!
//! The client never talks to the network directly. It hands a fully built
//! [`HttpRequest`] to a [`Transport`] and classifies whatever comes back.
//! [`HttpTransport`] is the real implementation over HTTPS; [`MockTransport`]
//! answers from fixtures for tests.

mod http;
mod mock;

pub use http::HttpTransport;
pub use mock::{MockTransport, RecordedRequest};

use std::fmt;

/// HTTP methods used by the SMS API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single request, described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    /// JSON text written before the response is read.
    pub body: Option<String>,
}

/// Status code and body text of a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    /// `None` when the body was not requested or could not be read.
    pub body: Option<String>,
}

/// Failure before any status code was received.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid request URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Simulated connection failure raised by test doubles such as
    /// [`MockTransport`]; the real transport reports these through `Http`.
    #[error("Host unreachable: {0}")]
    Unreachable(String),
}

/// Executes one request and reports the raw result.
///
/// Implementations must not retry and must not panic; anything that prevents
/// a status code from being obtained is returned as a [`TransportError`].
pub trait Transport: Send + Sync {
    /// Perform `request`. When `read_body` is true the full response body is
    /// read as text, including on error statuses.
    fn execute(&self, request: &HttpRequest, read_body: bool)
        -> Result<RawResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(
        &self,
        request: &HttpRequest,
        read_body: bool,
    ) -> Result<RawResponse, TransportError> {
        (**self).execute(request, read_body)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn execute(
        &self,
        request: &HttpRequest,
        read_body: bool,
    ) -> Result<RawResponse, TransportError> {
        (**self).execute(request, read_body)
    }
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn execute(
        &self,
        request: &HttpRequest,
        read_body: bool,
    ) -> Result<RawResponse, TransportError> {
        (**self).execute(request, read_body)
    }
}
