// Transactional mail over the provider's HTTP API.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

use eliteline_core::notify::{EmailMessage, NotificationSender};

#[derive(Debug, Error)]
pub enum MailError {
    #[error("http error: {0}")]
    Http(String),
    #[error("mail provider rejected the message: status={status} body={body}")]
    Rejected { status: u16, body: String },
}

#[derive(Clone)]
pub struct MailClient {
    http: Client,
    api_url: String,
    api_key: String,
    from: String,
}

impl MailClient {
    pub fn new(
        api_url: String,
        api_key: String,
        from: String,
        timeout: Duration,
    ) -> Result<Self, MailError> {
        let http = Client::builder()
            .use_rustls_tls()
            .timeout(timeout)
            .build()
            .map_err(|e| MailError::Http(e.to_string()))?;
        Ok(Self {
            http,
            api_url,
            api_key,
            from,
        })
    }

    #[instrument(skip(self, message), fields(to = %message.to, subject = %message.subject))]
    pub async fn deliver(&self, message: &EmailMessage) -> Result<(), MailError> {
        let body = payload(message, &self.from);

        let resp = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| MailError::Http(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!("mail accepted by provider");
        Ok(())
    }
}

fn payload(message: &EmailMessage, from: &str) -> serde_json::Value {
    let mut body = serde_json::json!({
        "from": from,
        "to": message.to,
        "subject": message.subject,
    });
    if let Some(html) = &message.html {
        body["html"] = serde_json::Value::String(html.clone());
    }
    if let Some(text) = &message.text {
        body["text"] = serde_json::Value::String(text.clone());
    }
    body
}

#[async_trait]
impl NotificationSender for MailClient {
    async fn send(
        &self,
        message: &EmailMessage,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.deliver(message)
            .await
            .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)
    }
}
