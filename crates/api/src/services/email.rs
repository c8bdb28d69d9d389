//! Outbound email delivery.
//!
//! Supported providers:
//! - `console`: logs emails (development)
//! - `sendgrid`: SendGrid v3 mail API

use async_trait::async_trait;
use domain::services::notification::{MailMessage, MailResult, MemberMailer};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::EmailConfig;

const SENDGRID_SEND_URL: &str = "https://api.sendgrid.com/v3/mail/send";

/// Errors that can occur during email operations.
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Email service not configured")]
    NotConfigured,

    #[error("Email service disabled")]
    Disabled,

    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    #[error("Failed to send email: {0}")]
    SendFailed(String),

    #[error("Provider error: {0}")]
    ProviderError(String),
}

/// Email service for transactional member emails.
#[derive(Clone)]
pub struct EmailService {
    config: Arc<EmailConfig>,
    client: reqwest::Client,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self {
            config: Arc::new(config),
            client,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Sends one message through the configured provider.
    pub async fn send_message(&self, message: &MailMessage) -> Result<(), EmailError> {
        if !self.config.enabled {
            debug!(
                to = %message.to_email,
                subject = %message.subject,
                "Email service disabled, skipping send"
            );
            return Err(EmailError::Disabled);
        }

        if !looks_like_address(&message.to_email) {
            return Err(EmailError::InvalidAddress(message.to_email.clone()));
        }

        match self.config.provider.as_str() {
            "console" => {
                self.send_console(message);
                Ok(())
            }
            "sendgrid" => self.send_sendgrid(message).await,
            provider => {
                error!(provider = %provider, "Unknown email provider");
                Err(EmailError::NotConfigured)
            }
        }
    }

    fn send_console(&self, message: &MailMessage) {
        info!(
            to = %message.to_email,
            to_name = %message.to_name,
            subject = %message.subject,
            from = %self.config.sender_email,
            "Email (console provider)"
        );
        debug!(body = %message.body, "Email body");
    }

    async fn send_sendgrid(&self, message: &MailMessage) -> Result<(), EmailError> {
        if self.config.sendgrid_api_key.is_empty() {
            return Err(EmailError::NotConfigured);
        }

        let body = sendgrid_payload(&self.config, message);

        let response = self
            .client
            .post(SENDGRID_SEND_URL)
            .bearer_auth(&self.config.sendgrid_api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| EmailError::SendFailed(format!("SendGrid request failed: {}", e)))?;

        if response.status().is_success() {
            info!(
                to = %message.to_email,
                subject = %message.subject,
                "Email sent via SendGrid"
            );
            Ok(())
        } else {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, error = %error_body, "SendGrid API error");
            Err(EmailError::ProviderError(format!(
                "SendGrid returned {}: {}",
                status, error_body
            )))
        }
    }
}

#[async_trait]
impl MemberMailer for EmailService {
    async fn send(&self, message: MailMessage) -> MailResult {
        match self.send_message(&message).await {
            Ok(()) => MailResult::Sent,
            Err(EmailError::Disabled) => MailResult::Skipped,
            Err(e) => MailResult::Failed(e.to_string()),
        }
    }
}

fn sendgrid_payload(config: &EmailConfig, message: &MailMessage) -> serde_json::Value {
    let mut to = serde_json::json!({ "email": message.to_email });
    if !message.to_name.trim().is_empty() {
        to["name"] = serde_json::json!(message.to_name);
    }

    serde_json::json!({
        "personalizations": [{ "to": [to] }],
        "from": {
            "email": config.sender_email,
            "name": config.sender_name
        },
        "subject": message.subject,
        "content": [{
            "type": "text/plain",
            "value": message.body
        }]
    })
}

fn looks_like_address(address: &str) -> bool {
    match address.trim().split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.'),
        None => false,
    }
}
