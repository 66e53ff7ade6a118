//! Outbound email.
//!
//! Providers:
//! - `console`: logs the message (development)
//! - `sendgrid`: SendGrid v3 mail API
//!
//! [`EmailAlertNotifier`] plugs the service into the alert dispatcher.

use async_trait::async_trait;
use domain::models::AlertNotification;
use domain::services::{AlertNotifier, NotificationResult};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::EmailConfig;

const SENDGRID_URL: &str = "https://api.sendgrid.com/v3/mail/send";

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Email service not configured")]
    NotConfigured,

    #[error("Failed to send email: {0}")]
    SendFailed(String),

    #[error("Provider error: {0}")]
    ProviderError(String),
}

#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub to_name: Option<String>,
    pub subject: String,
    pub body_text: String,
}

#[derive(Clone)]
pub struct EmailService {
    config: Arc<EmailConfig>,
    http: reqwest::Client,
}

impl EmailService {
    pub fn new(config: EmailConfig, http: reqwest::Client) -> Self {
        Self {
            config: Arc::new(config),
            http,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Sends a message through the configured provider. A disabled service
    /// drops the message and reports success.
    pub async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        if !self.config.enabled {
            debug!(to = %message.to, subject = %message.subject, "Email disabled, skipping send");
            return Ok(());
        }

        match self.config.provider.as_str() {
            "console" => {
                self.send_console(&message);
                Ok(())
            }
            "sendgrid" => self.send_sendgrid(&message).await,
            provider => {
                error!(provider = %provider, "Unknown email provider");
                Err(EmailError::NotConfigured)
            }
        }
    }

    fn send_console(&self, message: &EmailMessage) {
        info!(
            to = %message.to,
            to_name = ?message.to_name,
            subject = %message.subject,
            from = %self.config.sender_email,
            "Email (console provider)"
        );
        debug!(body_text = %message.body_text, "Email body");
    }

    async fn send_sendgrid(&self, message: &EmailMessage) -> Result<(), EmailError> {
        if self.config.sendgrid_api_key.is_empty() {
            return Err(EmailError::NotConfigured);
        }

        let mut recipient = serde_json::json!({ "email": message.to });
        if let Some(name) = &message.to_name {
            recipient["name"] = serde_json::json!(name);
        }

        let body = serde_json::json!({
            "personalizations": [{ "to": [recipient] }],
            "from": {
                "email": self.config.sender_email,
                "name": self.config.sender_name
            },
            "subject": message.subject,
            "content": [{ "type": "text/plain", "value": message.body_text }]
        });

        let response = self
            .http
            .post(SENDGRID_URL)
            .bearer_auth(&self.config.sendgrid_api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| EmailError::SendFailed(format!("SendGrid request failed: {}", e)))?;

        if response.status().is_success() {
            info!(to = %message.to, subject = %message.subject, "Email sent via SendGrid");
            Ok(())
        } else {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            error!(status = %status, body = %text, "SendGrid rejected email");
            Err(EmailError::ProviderError(format!(
                "SendGrid returned {}: {}",
                status, text
            )))
        }
    }

    /// Welcome message for a new newsletter subscriber.
    pub fn newsletter_welcome(&self, email: &str, unsubscribe_token: &str) -> EmailMessage {
        let unsubscribe_url = format!(
            "{}/newsletter/unsubscribe?email={}&token={}",
            self.config.base_url.trim_end_matches('/'),
            email,
            unsubscribe_token
        );
        EmailMessage {
            to: email.to_string(),
            to_name: None,
            subject: "Welcome to the air quality newsletter".to_string(),
            body_text: format!(
                "You are now subscribed to air quality news and updates.\n\n\
                 To stop receiving these emails, open:\n{}\n",
                unsubscribe_url
            ),
        }
    }
}

/// Builds the alert email for one recipient.
pub fn aqi_alert_message(alert: &AlertNotification, base_url: &str) -> EmailMessage {
    let mut lines = vec![
        format!("Hi {},", alert.username),
        String::new(),
        format!(
            "The air quality index in {} has reached {}, at or above your alert threshold of {}.",
            alert.district, alert.aqi, alert.threshold
        ),
    ];
    if let Some(pm25) = alert.pm25 {
        lines.push(format!("PM2.5: {:.1} µg/m³", pm25));
    }
    if let Some(temperature) = alert.temperature {
        lines.push(format!("Temperature: {:.1} °C", temperature));
    }
    lines.push(String::new());
    lines.push("Consider limiting time outdoors and wearing a mask.".to_string());
    lines.push(format!(
        "Manage alert settings at {}/settings",
        base_url.trim_end_matches('/')
    ));

    EmailMessage {
        to: alert.email.clone(),
        to_name: Some(alert.username.clone()),
        subject: format!("Air quality alert: AQI {} in {}", alert.aqi, alert.district),
        body_text: lines.join("\n"),
    }
}

/// Delivers AQI alerts by email.
#[derive(Clone)]
pub struct EmailAlertNotifier {
    email: EmailService,
    base_url: String,
}

impl EmailAlertNotifier {
    pub fn new(email: EmailService, base_url: impl Into<String>) -> Self {
        Self {
            email,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl AlertNotifier for EmailAlertNotifier {
    async fn send_aqi_alert(&self, alert: &AlertNotification) -> NotificationResult {
        if !self.email.is_enabled() {
            return NotificationResult::Skipped;
        }
        match self
            .email
            .send(aqi_alert_message(alert, &self.base_url))
            .await
        {
            Ok(()) => NotificationResult::Sent,
            Err(e) => NotificationResult::Failed(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(enabled: bool, provider: &str) -> EmailConfig {
        EmailConfig {
            enabled,
            provider: provider.to_string(),
            sendgrid_api_key: String::new(),
            sender_email: "alerts@example.com".to_string(),
            sender_name: "Air Quality".to_string(),
            base_url: "https://aq.example.com/".to_string(),
        }
    }

    fn alert() -> AlertNotification {
        AlertNotification {
            email: "lan@example.com".to_string(),
            username: "lan".to_string(),
            district: "Hoàn Kiếm".to_string(),
            aqi: 172,
            threshold: 150,
            pm25: Some(88.4),
            temperature: None,
        }
    }

    #[test]
    fn test_alert_message_content() {
        let message = aqi_alert_message(&alert(), "https://aq.example.com/");
        assert_eq!(message.to, "lan@example.com");
        assert_eq!(message.subject, "Air quality alert: AQI 172 in Hoàn Kiếm");
        assert!(message.body_text.contains("threshold of 150"));
        assert!(message.body_text.contains("PM2.5: 88.4"));
        assert!(!message.body_text.contains("Temperature"));
        assert!(message.body_text.contains("https://aq.example.com/settings"));
    }

    #[tokio::test]
    async fn test_disabled_notifier_skips() {
        let service = EmailService::new(config(false, "console"), reqwest::Client::new());
        let notifier = EmailAlertNotifier::new(service, "https://aq.example.com");
        assert_eq!(
            notifier.send_aqi_alert(&alert()).await,
            NotificationResult::Skipped
        );
    }

    #[tokio::test]
    async fn test_console_provider_sends() {
        let service = EmailService::new(config(true, "console"), reqwest::Client::new());
        let notifier = EmailAlertNotifier::new(service, "https://aq.example.com");
        assert_eq!(
            notifier.send_aqi_alert(&alert()).await,
            NotificationResult::Sent
        );
    }

    #[tokio::test]
    async fn test_sendgrid_without_key_fails() {
        let service = EmailService::new(config(true, "sendgrid"), reqwest::Client::new());
        let notifier = EmailAlertNotifier::new(service, "https://aq.example.com");
        assert!(matches!(
            notifier.send_aqi_alert(&alert()).await,
            NotificationResult::Failed(_)
        ));
    }

    #[test]
    fn test_newsletter_welcome_link() {
        let service = EmailService::new(config(true, "console"), reqwest::Client::new());
        let message = service.newsletter_welcome("a@example.com", "abc123");
        assert!(message
            .body_text
            .contains("https://aq.example.com/newsletter/unsubscribe?email=a@example.com&token=abc123"));
    }
}
