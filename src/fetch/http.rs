use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;
use tracing::debug;

use super::Fetcher;
use crate::error::TransportError;

/// Blocking HTTP fetcher. One request at a time, no retries.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(TransportError::Client)?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Value, TransportError> {
        let request_err = |source: reqwest::Error| TransportError::Request {
            url: url.to_string(),
            source,
        };

        debug!(url, "GET");
        let response = self.client.get(url).send().map_err(request_err)?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().map_err(request_err)?;
        serde_json::from_str(&body).map_err(|source| TransportError::Decode {
            url: url.to_string(),
            source,
        })
    }
}
