use std::{fmt::Debug, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::{
    constants::USER_AGENT,
    error::{Result, WeatherError},
};

/// A single blocking-per-call HTTP GET returning the response body.
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Process-wide HTTP transport. Build it once at startup and share it by reference.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| WeatherError::transport("<client setup>", e.to_string()))?;

        Ok(Self { http })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, url: &str) -> Result<String> {
        debug!(url, "GET");

        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| WeatherError::transport(url, e.to_string()))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| WeatherError::transport(url, format!("failed to read body: {e}")))?;

        if !status.is_success() {
            return Err(WeatherError::transport(
                url,
                format!("status {}: {}", status, truncate_body(&body)),
            ));
        }

        Ok(body)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let end = (0..=MAX)
            .rev()
            .find(|i| body.is_char_boundary(*i))
            .unwrap_or(0);
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
