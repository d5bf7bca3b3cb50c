//! Outbound mail. Delivery is best-effort: callers hand a message to
//! [`dispatch`] and never see its outcome.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::config::MailConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mail {
    pub to_address: String,
    pub to_name: String,
    pub subject: String,
    pub body: String,
}

#[async_trait::async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: &Mail) -> Result<()>;
}

/// Transactional-mail HTTP API (Brevo-compatible payload).
pub struct HttpMailer {
    client: Client,
    config: MailConfig,
}

#[derive(Serialize)]
struct Party<'a> {
    name: &'a str,
    email: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SendRequest<'a> {
    sender: Party<'a>,
    to: [Party<'a>; 1],
    subject: &'a str,
    text_content: &'a str,
}

impl HttpMailer {
    #[must_use]
    pub fn new(config: MailConfig) -> Self {
        Self {
            client: Client::builder()
                .user_agent("memberdesk/1.0")
                .timeout(Duration::from_secs(config.timeout_seconds))
                .build()
                .unwrap_or_else(|_| Client::new()),
            config,
        }
    }
}

#[async_trait::async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, mail: &Mail) -> Result<()> {
        let request = SendRequest {
            sender: Party {
                name: &self.config.sender_name,
                email: &self.config.sender_address,
            },
            to: [Party {
                name: &mail.to_name,
                email: &mail.to_address,
            }],
            subject: &mail.subject,
            text_content: &mail.body,
        };

        self.client
            .post(&self.config.api_url)
            .header("api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to reach mail API")?
            .error_for_status()
            .context("Mail API rejected message")?;

        Ok(())
    }
}

/// Used when mail is disabled: the message only reaches the log.
pub struct LogMailer;

#[async_trait::async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: &Mail) -> Result<()> {
        tracing::info!(to = %mail.to_address, subject = %mail.subject, "Mail delivery disabled, message logged only");
        Ok(())
    }
}

#[must_use]
pub fn from_config(config: &MailConfig) -> Arc<dyn Mailer> {
    if config.enabled {
        Arc::new(HttpMailer::new(config.clone()))
    } else {
        Arc::new(LogMailer)
    }
}

/// Send in the background. Failures are logged and counted, never returned.
pub fn dispatch(mailer: Arc<dyn Mailer>, mail: Mail) {
    tokio::spawn(async move {
        if let Err(e) = mailer.send(&mail).await {
            metrics::counter!("mail_dispatch_failures_total").increment(1);
            tracing::warn!(to = %mail.to_address, subject = %mail.subject, error = %e, "Mail dispatch failed");
        }
    });
}

#[must_use]
pub fn approval_mail(organisation: &str, to_address: &str, name: &str, membership_id: &str) -> Mail {
    Mail {
        to_address: to_address.to_string(),
        to_name: name.to_string(),
        subject: format!("{organisation} membership approved"),
        body: format!(
            "Dear {name},\n\nYour {organisation} membership has been approved.\n\
             Your membership ID is {membership_id}. Use it as your username from now on.\n\n\
             Regards,\n{organisation}"
        ),
    }
}

#[must_use]
pub fn reset_mail(organisation: &str, to_address: &str, name: &str, link: &str, ttl_minutes: u64) -> Mail {
    Mail {
        to_address: to_address.to_string(),
        to_name: name.to_string(),
        subject: format!("{organisation} password reset"),
        body: format!(
            "Dear {name},\n\nA password reset was requested for your account.\n\
             Open the link below within {ttl_minutes} minutes to choose a new password:\n\n{link}\n\n\
             If you did not ask for this, ignore this message.\n\n{organisation}"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approval_mail_mentions_identifier() {
        let mail = approval_mail("KWS", "a@example.org", "Anu Nair", "KWSKW05000");
        assert_eq!(mail.subject, "KWS membership approved");
        assert!(mail.body.contains("KWSKW05000"));
        assert!(mail.body.starts_with("Dear Anu Nair"));
    }

    #[test]
    fn test_send_request_payload_shape() {
        let request = SendRequest {
            sender: Party {
                name: "KWS Admin",
                email: "admin@example.org",
            },
            to: [Party {
                name: "Anu",
                email: "a@example.org",
            }],
            subject: "Hi",
            text_content: "Body",
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["sender"]["email"], "admin@example.org");
        assert_eq!(json["to"][0]["name"], "Anu");
        assert_eq!(json["textContent"], "Body");
    }

    #[tokio::test]
    async fn test_log_mailer_accepts_everything() {
        let mail = reset_mail("KWS", "a@example.org", "Anu", "https://x/reset?token=t", 60);
        assert!(LogMailer.send(&mail).await.is_ok());
    }
}
