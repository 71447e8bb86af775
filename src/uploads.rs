// uploads.rs
// In-memory forwarding of multipart files to the third-party image host.

use std::env;

use anyhow::{Context, Result};

#[derive(Clone)]
pub struct ImageHost {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl ImageHost {
    pub fn from_env() -> Self {
        ImageHost {
            client: reqwest::Client::new(),
            endpoint: env::var("IMAGE_HOST_ENDPOINT").unwrap_or_default(),
            api_key: env::var("IMAGE_HOST_API_KEY").unwrap_or_default(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.endpoint.is_empty()
    }

    /// Forwards the uploaded bytes and returns the hosted URL.
    pub async fn upload(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)
            .context("invalid content type")?;
        let form = reqwest::multipart::Form::new()
            .text("key", self.api_key.clone())
            .part("image", part);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .context("image host unreachable")?
            .error_for_status()
            .context("image host rejected upload")?;

        let body: serde_json::Value = response.json().await.context("image host response")?;
        body.pointer("/data/url")
            .and_then(|url| url.as_str())
            .map(str::to_string)
            .context("image host response missing url")
    }
}
