//! Client for the Secret Management Service REST API.
//!
//! Each method maps to one endpoint, performs exactly one request through the
//! configured [`Transport`] and returns an [`SmsResponse`]. Nothing is raised
//! to the caller: transport errors, error statuses and unreadable bodies all
//! end up in the response fields.

use serde::Serialize;
use serde_json::{json, Value};

use crate::response::{BodyShape, SmsResponse};
use crate::transport::{HttpRequest, Method, Transport};

/// API version used when none is given.
pub const DEFAULT_VERSION: &str = "v1";

/// Build `https://{host}:{port}/{version}/sms`. A missing or blank version
/// means [`DEFAULT_VERSION`].
pub fn base_url(host: &str, port: u16, version: Option<&str>) -> String {
    let version = version
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_VERSION);
    format!("https://{host}:{port}/{version}/sms")
}

/// SMS API client over an injected transport.
///
/// Domain and secret names are trimmed of surrounding whitespace before use.
#[derive(Debug, Clone)]
pub struct SmsClient<T> {
    base_url: String,
    transport: T,
}

impl<T: Transport> SmsClient<T> {
    /// Client for `https://{host}:{port}/v1/sms`.
    pub fn new(host: &str, port: u16, transport: T) -> Self {
        Self::with_version(host, port, DEFAULT_VERSION, transport)
    }

    /// Client for `https://{host}:{port}/{version}/sms`.
    pub fn with_version(host: &str, port: u16, version: &str, transport: T) -> Self {
        Self {
            base_url: base_url(host, port, Some(version)),
            transport,
        }
    }

    /// Override the API base URL (useful for tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Create a domain. The body is the server's answer (name and id).
    pub fn create_domain(&self, domain: &str) -> SmsResponse {
        let body = json!({ "name": domain.trim() });
        self.call(Method::Post, self.url(&["domain"]), Some(body), BodyShape::AsIs)
    }

    /// Delete a domain and every secret in it.
    pub fn delete_domain(&self, domain: &str) -> SmsResponse {
        self.call(
            Method::Delete,
            self.url(&["domain", domain]),
            None,
            BodyShape::Ignore,
        )
    }

    /// Store `values` as secret `secret` in `domain`.
    ///
    /// `values` must serialize to a JSON object. Anything else fails locally
    /// without contacting the server.
    pub fn store_secret<V: Serialize + ?Sized>(
        &self,
        domain: &str,
        secret: &str,
        values: &V,
    ) -> SmsResponse {
        let values = match serde_json::to_value(values) {
            Ok(Value::Object(values)) => values,
            Ok(other) => {
                tracing::warn!(
                    domain,
                    secret,
                    kind = json_kind(&other),
                    "Secret values must be a JSON object; request not sent"
                );
                return SmsResponse::transport_failure();
            }
            Err(err) => {
                tracing::warn!(
                    domain,
                    secret,
                    error = %err,
                    "Failed to serialize secret values; request not sent"
                );
                return SmsResponse::transport_failure();
            }
        };

        let body = json!({ "name": secret.trim(), "values": values });
        self.call(
            Method::Post,
            self.url(&["domain", domain, "secret"]),
            Some(body),
            BodyShape::Ignore,
        )
    }

    /// List the names of all secrets in `domain` (under `secretnames`).
    pub fn list_secret_names(&self, domain: &str) -> SmsResponse {
        self.call(
            Method::Get,
            self.url(&["domain", domain, "secret"]),
            None,
            BodyShape::AsIs,
        )
    }

    /// Fetch a secret. The body holds only its key/value pairs.
    pub fn get_secret(&self, domain: &str, secret: &str) -> SmsResponse {
        self.call(
            Method::Get,
            self.url(&["domain", domain, "secret", secret]),
            None,
            BodyShape::Field("values"),
        )
    }

    pub fn delete_secret(&self, domain: &str, secret: &str) -> SmsResponse {
        self.call(
            Method::Delete,
            self.url(&["domain", domain, "secret", secret]),
            None,
            BodyShape::Ignore,
        )
    }

    /// Seal status of the service backend (under `sealstatus`).
    pub fn status(&self) -> SmsResponse {
        self.call(Method::Get, self.url(&["status"]), None, BodyShape::AsIs)
    }

    fn url(&self, segments: &[&str]) -> String {
        let mut url = self.base_url.trim_end_matches('/').to_string();
        for segment in segments {
            url.push('/');
            url.push_str(&urlencoding::encode(segment.trim()));
        }
        url
    }

    fn call(
        &self,
        method: Method,
        url: String,
        body: Option<Value>,
        shape: BodyShape,
    ) -> SmsResponse {
        let request = HttpRequest {
            method,
            url,
            body: body.map(|body| body.to_string()),
        };
        // Error bodies are always read so failures carry the server's message.
        let outcome = self.transport.execute(&request, true);
        let response = SmsResponse::from_outcome(outcome, shape);
        tracing::debug!(
            method = %request.method,
            url = %request.url,
            status = response.status_code,
            success = response.success,
            "SMS request completed"
        );
        response
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;

    #[test]
    fn base_url_defaults_to_v1() {
        assert_eq!(
            base_url("aaf-sms.onap", 30243, None),
            "https://aaf-sms.onap:30243/v1/sms"
        );
        assert_eq!(
            base_url("localhost", 10443, Some("v2")),
            "https://localhost:10443/v2/sms"
        );
    }

    #[test]
    fn constructors_build_base_url() {
        let client = SmsClient::new("sms.test", 10443, MockTransport::new());
        assert_eq!(client.base_url(), "https://sms.test:10443/v1/sms");

        let client = SmsClient::with_version("sms.test", 10443, "v2", MockTransport::new());
        assert_eq!(client.base_url(), "https://sms.test:10443/v2/sms");
    }

    #[test]
    fn url_joins_and_encodes_segments() {
        let client = SmsClient::new("h", 1, MockTransport::new());
        assert_eq!(
            client.url(&["domain", "onap.new.test", "secret", "db creds"]),
            "https://h:1/v1/sms/domain/onap.new.test/secret/db%20creds"
        );

        let client = client.with_base_url("http://127.0.0.1:8080/v1/sms/");
        assert_eq!(client.url(&["status"]), "http://127.0.0.1:8080/v1/sms/status");
    }

    #[test]
    fn blank_version_falls_back_to_default() {
        assert_eq!(base_url("h", 1, Some("")), "https://h:1/v1/sms");
        assert_eq!(base_url("h", 1, Some("  ")), "https://h:1/v1/sms");

        let client = SmsClient::with_version("h", 1, "", MockTransport::new());
        assert_eq!(client.base_url(), "https://h:1/v1/sms");
    }

    #[test]
    fn names_are_trimmed_in_paths_and_bodies() {
        let client = SmsClient::new("h", 1, MockTransport::new());

        client.create_domain(" d1 ");
        let request = client.transport().last_request().unwrap();
        assert_eq!(request.json(), Some(json!({"name": "d1"})));

        client.store_secret(" d1 ", "\tdbs\n", &json!({"k": "v"}));
        let request = client.transport().last_request().unwrap();
        assert_eq!(request.path, "/v1/sms/domain/d1/secret");
        assert_eq!(
            request.json(),
            Some(json!({"name": "dbs", "values": {"k": "v"}}))
        );

        client.get_secret(" d1", "dbs ");
        let request = client.transport().last_request().unwrap();
        assert_eq!(request.path, "/v1/sms/domain/d1/secret/dbs");
    }

    #[test]
    fn non_object_values_are_rejected_locally() {
        let client = SmsClient::new("h", 1, MockTransport::new());
        let resp = client.store_secret("d", "s", &vec!["a", "b"]);
        assert!(!resp.success);
        assert_eq!(resp.status_code, -1);
        assert!(client.transport().requests().is_empty());
    }

    #[test]
    fn json_kind_names() {
        assert_eq!(json_kind(&json!(null)), "null");
        assert_eq!(json_kind(&json!([1])), "array");
        assert_eq!(json_kind(&json!({})), "object");
    }
}
