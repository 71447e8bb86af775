// mailer.rs
// Outbound email seam. Production posts to an HTTP relay; tests and
// unconfigured deployments get a no-op.

use std::{env, sync::Arc};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

/// Notice broadcasts go out BCC'd in batches of this size.
pub const BCC_BATCH_SIZE: usize = 50;

#[derive(Debug, Clone, Serialize)]
pub struct OutboundEmail {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bcc: Vec<String>,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<()>;

    async fn broadcast(&self, recipients: &[String], subject: &str, body: &str) -> Result<()> {
        for batch in recipients.chunks(BCC_BATCH_SIZE) {
            self.send(&OutboundEmail {
                to: None,
                bcc: batch.to_vec(),
                subject: subject.to_string(),
                body: body.to_string(),
            })
            .await?;
        }
        Ok(())
    }
}

pub struct HttpMailer {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    from: String,
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<()> {
        self.client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "from": self.from,
                "to": email.to,
                "bcc": email.bcc,
                "subject": email.subject,
                "body": email.body,
            }))
            .send()
            .await
            .context("mail relay unreachable")?
            .error_for_status()
            .context("mail relay rejected message")?;
        Ok(())
    }
}

/// Used when no relay is configured; messages are dropped.
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<()> {
        debug!(subject = %email.subject, "mailer not configured, dropping email");
        Ok(())
    }
}

pub fn mailer_from_env() -> Arc<dyn Mailer> {
    match env::var("MAILER_ENDPOINT") {
        Ok(endpoint) if !endpoint.is_empty() => Arc::new(HttpMailer {
            client: reqwest::Client::new(),
            endpoint,
            api_key: env::var("MAILER_API_KEY").unwrap_or_default(),
            from: env::var("MAILER_FROM").unwrap_or_else(|_| "no-reply@localhost".to_string()),
        }),
        _ => Arc::new(NoopMailer),
    }
}

/// Activation email sent synchronously at registration; a relay failure here
/// surfaces to the caller, unlike the notice broadcast.
pub async fn send_activation_email(
    mailer: &dyn Mailer,
    to: &str,
    base_url: &str,
    token: &str,
) -> Result<()> {
    mailer
        .send(&OutboundEmail {
            to: Some(to.to_string()),
            bcc: Vec::new(),
            subject: "Activate your account".to_string(),
            body: format!(
                "Welcome aboard. Set your password within 7 days: {base_url}/activate?token={token}"
            ),
        })
        .await
}
