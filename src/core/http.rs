use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING};
use reqwest::Client;

const APP_USER_AGENT: &str = "PMCL/0.1.0";

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    // Keep Content-Length equal to the streamed byte count.
    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("identity"));
    headers
}

/// Shared client for manifests, artifacts and auth calls. No overall timeout:
/// artifact downloads are unbounded.
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(APP_USER_AGENT)
        .default_headers(default_headers())
        .build()
}

/// Short-lived client used only for mirror latency probes.
pub fn build_probe_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(APP_USER_AGENT)
        .default_headers(default_headers())
        .timeout(timeout)
        .connect_timeout(timeout)
        .build()
}
