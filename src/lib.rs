pub mod client;
pub mod config;
pub mod response;
pub mod tls;
pub mod transport;

pub use client::{SmsClient, DEFAULT_VERSION};
pub use response::{is_success_status, JsonObject, SmsResponse, NO_STATUS};
pub use transport::{HttpTransport, MockTransport, Transport, TransportError};
