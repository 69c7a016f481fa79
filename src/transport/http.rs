//! Blocking HTTPS transport backed by `reqwest`.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::redirect::Policy;
use reqwest::Url;

use super::{HttpRequest, Method, RawResponse, Transport, TransportError};
use crate::tls::{TlsError, TlsMaterial};

const JSON: &str = "application/json";
const USER_AGENT: &str = concat!("sms-client/", env!("CARGO_PKG_VERSION"));

/// HTTPS transport.
///
/// Certificate handling lives entirely in the wrapped [`Client`]; build one
/// with [`HttpTransport::from_tls`] or pass a preconfigured client to
/// [`HttpTransport::with_client`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Transport using the platform's default trust roots.
    pub fn new() -> Result<Self, TransportError> {
        let client = base_builder(None).build()?;
        Ok(Self { client })
    }

    /// Wrap an already configured blocking client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Build a client trusting `tls.ca_certificates` and presenting
    /// `tls.identity` (when set) for mutual TLS.
    pub fn from_tls(tls: &TlsMaterial, timeout: Option<Duration>) -> Result<Self, TlsError> {
        let mut builder = base_builder(timeout);
        for cert in tls.ca_certificates() {
            builder = builder.add_root_certificate(cert.clone());
        }
        if let Some(identity) = tls.identity() {
            builder = builder.identity(identity.clone());
        }
        let client = builder.build().map_err(TlsError::ClientBuild)?;
        Ok(Self { client })
    }
}

fn base_builder(timeout: Option<Duration>) -> reqwest::blocking::ClientBuilder {
    let builder = Client::builder()
        .user_agent(USER_AGENT)
        .use_rustls_tls()
        .redirect(Policy::none());
    match timeout {
        Some(timeout) => builder.timeout(timeout),
        None => builder,
    }
}

fn to_reqwest(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Delete => reqwest::Method::DELETE,
    }
}

impl Transport for HttpTransport {
    fn execute(
        &self,
        request: &HttpRequest,
        read_body: bool,
    ) -> Result<RawResponse, TransportError> {
        let url = Url::parse(&request.url).map_err(|err| TransportError::InvalidUrl {
            url: request.url.clone(),
            reason: err.to_string(),
        })?;

        tracing::debug!(method = %request.method, url = %url, "Sending SMS request");

        let mut builder = self
            .client
            .request(to_reqwest(request.method), url)
            .header(CONTENT_TYPE, JSON)
            .header(ACCEPT, JSON);
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send()?;
        let status = response.status().as_u16();

        let body = if read_body {
            match response.text() {
                Ok(text) => Some(text),
                Err(err) => {
                    tracing::warn!(status, error = %err, "Failed to read SMS response body");
                    None
                }
            }
        } else {
            None
        };

        Ok(RawResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_url_is_reported_without_network() {
        let transport = HttpTransport::new().expect("client builds");
        let err = transport
            .execute(
                &HttpRequest {
                    method: Method::Get,
                    url: "not a url".to_string(),
                    body: None,
                },
                true,
            )
            .unwrap_err();
        assert!(matches!(err, TransportError::InvalidUrl { .. }));
    }

    #[test]
    fn method_mapping() {
        assert_eq!(to_reqwest(Method::Get), reqwest::Method::GET);
        assert_eq!(to_reqwest(Method::Post), reqwest::Method::POST);
        assert_eq!(to_reqwest(Method::Delete), reqwest::Method::DELETE);
    }
}
