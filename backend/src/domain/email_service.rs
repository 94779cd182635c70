//! # Email Reminders
//!
//! Outbound reminder mail. `SmtpMailer` sends through an SMTP relay with
//! lettre; `DisabledMailer` is used when mail is switched off in the
//! configuration. `ReminderNotifier` validates the request, composes the
//! message and reports delivery problems as data instead of failing.

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{Message, SmtpTransport, Transport};
use serde::{Deserialize, Serialize};
use shared::{SendReminderRequest, SendReminderResponse};
use tracing::{info, warn};

use crate::domain::error::{BillError, BillResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub enabled: bool,
    pub smtp_server: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_server: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            username: String::new(),
            password: String::new(),
            from_email: String::new(),
        }
    }
}

/// A composed message, kept around by test doubles
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMail {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait MailService: Send + Sync {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<()>;
}

pub struct SmtpMailer {
    transport: SmtpTransport,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &EmailConfig) -> Result<Self> {
        info!(
            "📧 Initializing email service for SMTP server: {}:{}",
            config.smtp_server, config.smtp_port
        );

        let from = config
            .from_email
            .parse::<Mailbox>()
            .context("Failed to parse from email")?;

        let tls_params = TlsParameters::new(config.smtp_server.clone())
            .context("Failed to create TLS parameters")?;

        let transport = SmtpTransport::relay(&config.smtp_server)
            .context("Failed to create SMTP relay")?
            .port(config.smtp_port)
            .tls(Tls::Required(tls_params))
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl MailService for SmtpMailer {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<()> {
        let email = Message::builder()
            .from(self.from.clone())
            .to(recipient
                .parse::<Mailbox>()
                .context("Failed to parse recipient email")?)
            .subject(subject)
            .body(body.to_string())
            .context("Failed to build email")?;

        let transport = self.transport.clone();
        tokio::task::spawn_blocking(move || transport.send(&email))
            .await
            .context("Email task panicked")?
            .context("Failed to send email")?;

        info!("📧 Reminder email sent");
        Ok(())
    }
}

/// Stands in for SMTP when mail is disabled
#[derive(Debug, Clone, Default)]
pub struct DisabledMailer;

#[async_trait]
impl MailService for DisabledMailer {
    async fn send(&self, _recipient: &str, _subject: &str, _body: &str) -> Result<()> {
        Err(anyhow!("email delivery is disabled"))
    }
}

/// Subject and body for a due-date reminder
pub fn compose_reminder(bill_name: &str, due_date: &str, amount: Option<f64>) -> (String, String) {
    let subject = format!("Reminder: {} is due soon!", bill_name);
    let mut body = format!(
        "Your bill '{}' is due on {}. Please make the payment on time.",
        bill_name, due_date
    );
    if let Some(amount) = amount {
        body.push_str(&format!("\n\nAmount due: ${:.2}", amount));
    }
    (subject, body)
}

fn required(field: Option<String>, name: &str) -> BillResult<String> {
    field
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| BillError::validation(format!("{} is required", name)))
}

#[derive(Clone)]
pub struct ReminderNotifier {
    mailer: Arc<dyn MailService>,
}

impl ReminderNotifier {
    pub fn new(mailer: Arc<dyn MailService>) -> Self {
        Self { mailer }
    }

    /// Send a reminder. Missing fields are a validation error; delivery
    /// failures come back as `sent: false`.
    pub async fn send_reminder(&self, request: SendReminderRequest) -> BillResult<SendReminderResponse> {
        let recipient = required(request.email, "email")?;
        let bill_name = required(request.bill_name, "bill_name")?;
        let due_date = required(request.due_date, "due_date")?;

        let (subject, body) = compose_reminder(&bill_name, &due_date, request.amount);

        match self.mailer.send(&recipient, &subject, &body).await {
            Ok(()) => Ok(SendReminderResponse {
                sent: true,
                message: "Reminder email sent successfully!".to_string(),
                error: None,
            }),
            Err(e) => {
                warn!("Reminder email for '{}' was not sent: {:#}", bill_name, e);
                Ok(SendReminderResponse {
                    sent: false,
                    message: "Reminder email could not be sent".to_string(),
                    error: Some(e.to_string()),
                })
            }
        }
    }
}
