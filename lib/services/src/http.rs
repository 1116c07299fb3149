use crate::{Result, ServiceError};
use serde::de::DeserializeOwned;

/// Send a request and decode a JSON body, mapping any failure with `wrap`.
pub(crate) async fn send_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
    wrap: fn(String) -> ServiceError,
) -> Result<T> {
    let response = request
        .send()
        .await
        .map_err(|e| wrap(format!("request failed: {}", e)))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| wrap(format!("failed to read response: {}", e)))?;

    if !status.is_success() {
        return Err(wrap(format!("HTTP {}: {}", status, body)));
    }

    serde_json::from_str(&body).map_err(|e| wrap(format!("malformed response: {}", e)))
}

/// Strip a trailing slash so paths can be appended with `format!`.
pub(crate) fn base_url(url: &str) -> &str {
    url.trim_end_matches('/')
}
