//! Outbound HTTP seam for the completion client

use async_trait::async_trait;
use log::{error, trace};
use std::time::Duration;

/// Sends one JSON POST and returns the raw response body.
///
/// Only transport-level failures are errors. The status code is not
/// inspected; an error body comes back as `Ok` like any other.
#[async_trait]
pub trait Transport: Send + Sync
{   async fn post_json(
      &self
    , url: &str
    , bearer_token: &str
    , body: String
    ) -> Result<String, String>;
}

/// `reqwest` backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport
{   http_client: reqwest::Client
}

impl HttpTransport
{   pub fn new(timeout: Duration) -> Result<Self, crate::error::Error>
    {   let http_client = reqwest::Client::builder()
          .timeout(timeout)
          .build()
          .map_err(|e| {
            error!("Failed to build HTTP client: {}", e);
            crate::error::Error::InvalidConfiguration(e.to_string())
          })?;
        Ok(HttpTransport { http_client })
    }

    pub fn from_config(
      config: &crate::config::ClientConfig
    ) -> Result<Self, crate::error::Error>
    {   Self::new(Duration::from_secs(config.timeout_secs))
    }
}

#[async_trait]
impl Transport for HttpTransport
{   async fn post_json(
      &self
    , url: &str
    , bearer_token: &str
    , body: String
    ) -> Result<String, String>
    {   let response = self.http_client
          .post(url)
          .header("Authorization", format!("Bearer {}", bearer_token))
          .header("Content-Type", "application/json")
          .body(body)
          .send()
          .await
          .map_err(|e| e.to_string())?;

        trace!("Completion response status: {}", response.status());

        response.text().await.map_err(|e| e.to_string())
    }
}
