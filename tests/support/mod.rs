#![allow(dead_code)]

use anyhow::Result;
use sms_client::transport::MockTransport;
use sms_client::{HttpTransport, SmsClient};

pub const HOST: &str = "sms.test";
pub const PORT: u16 = 10443;

/// Path of an API endpoint under the default base URL.
pub fn api_path(suffix: &str) -> String {
    format!("/v1/sms{suffix}")
}

pub fn mock_client(mock: MockTransport) -> SmsClient<MockTransport> {
    SmsClient::new(HOST, PORT, mock)
}

/// Run `f` with an HTTPS-transport client pointed at `server_uri`.
///
/// The blocking HTTP client must not run on the async test runtime, so the
/// whole call happens on the blocking pool.
pub async fn with_http_client<F, R>(server_uri: String, f: F) -> Result<R>
where
    F: FnOnce(&SmsClient<HttpTransport>) -> R + Send + 'static,
    R: Send + 'static,
{
    let result = tokio::task::spawn_blocking(move || -> Result<R> {
        let client = SmsClient::new(HOST, PORT, HttpTransport::new()?)
            .with_base_url(format!("{server_uri}/v1/sms"));
        Ok(f(&client))
    })
    .await??;
    Ok(result)
}
