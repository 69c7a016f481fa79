//! Uniform result of a single SMS operation.
//!
//! Every call on [`SmsClient`](crate::SmsClient) returns an [`SmsResponse`],
//! whether the server answered with a 2xx, an error status, or never answered
//! at all. Callers branch on [`SmsResponse::success`] before reading the body
//! or the error message.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::transport::{RawResponse, TransportError};

/// Status code reported when no connection to the server was established.
pub const NO_STATUS: i32 = -1;

/// JSON object payload of a response.
pub type JsonObject = Map<String, Value>;

/// Normalized outcome of a request against the SMS service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SmsResponse {
    /// True iff the status code is in `200..=299`.
    pub success: bool,
    /// HTTP status code, or [`NO_STATUS`] on transport failure.
    pub status_code: i32,
    /// Decoded payload. Only set on success.
    pub body: Option<JsonObject>,
    /// Raw body text of a non-2xx response. Empty otherwise.
    pub error_message: String,
}

impl Default for SmsResponse {
    fn default() -> Self {
        Self {
            success: false,
            status_code: NO_STATUS,
            body: None,
            error_message: String::new(),
        }
    }
}

/// How the payload of a successful response is shaped for the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BodyShape {
    /// Decode the body and return the object unchanged.
    AsIs,
    /// Return only the object stored under the given key.
    Field(&'static str),
    /// Drop whatever the server sent.
    Ignore,
}

/// Returns true for status codes in `200..=299`.
pub fn is_success_status(status_code: i32) -> bool {
    status_code > 0 && status_code / 100 == 2
}

impl SmsResponse {
    /// Response for a call that never reached the server.
    pub fn transport_failure() -> Self {
        Self::default()
    }

    /// Fold the outcome of one transport call into a response.
    pub(crate) fn from_outcome(
        outcome: Result<RawResponse, TransportError>,
        shape: BodyShape,
    ) -> Self {
        match outcome {
            Ok(raw) => Self::from_raw(raw, shape),
            Err(err) => {
                tracing::warn!(error = %err, "SMS request failed before a status was received");
                Self::transport_failure()
            }
        }
    }

    pub(crate) fn from_raw(raw: RawResponse, shape: BodyShape) -> Self {
        let status_code = i32::from(raw.status);
        let success = is_success_status(status_code);
        let text = raw.body.unwrap_or_default();

        if !success {
            return Self {
                success,
                status_code,
                body: None,
                error_message: text,
            };
        }

        let body = match shape {
            BodyShape::Ignore => None,
            BodyShape::AsIs => decode_object(&text),
            BodyShape::Field(key) => decode_object(&text).and_then(|obj| nested_object(obj, key)),
        };

        Self {
            success,
            status_code,
            body,
            error_message: String::new(),
        }
    }

    /// Names listed under `secretnames`, in server order.
    pub fn secret_names(&self) -> Option<Vec<String>> {
        let names = self.body.as_ref()?.get("secretnames")?.as_array()?;
        Some(
            names
                .iter()
                .filter_map(|name| name.as_str().map(str::to_string))
                .collect(),
        )
    }

    /// The `sealstatus` flag returned by the status endpoint.
    pub fn seal_status(&self) -> Option<bool> {
        self.body.as_ref()?.get("sealstatus")?.as_bool()
    }

    /// Server-assigned identity of a created domain (`uuid`, or `id`).
    pub fn domain_id(&self) -> Option<&str> {
        let body = self.body.as_ref()?;
        body.get("uuid")
            .or_else(|| body.get("id"))
            .and_then(Value::as_str)
    }
}

fn nested_object(mut obj: JsonObject, key: &str) -> Option<JsonObject> {
    match obj.remove(key) {
        Some(Value::Object(inner)) => Some(inner),
        _ => None,
    }
}

/// Parse `text` as a JSON object. Empty or non-object input yields `None`.
fn decode_object(text: &str) -> Option<JsonObject> {
    if text.trim().is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(obj)) => Some(obj),
        Ok(_) => {
            tracing::debug!("SMS response body is not a JSON object; leaving payload empty");
            None
        }
        Err(err) => {
            tracing::debug!(error = %err, "Failed to parse SMS response body; leaving payload empty");
            None
        }
    }
}
