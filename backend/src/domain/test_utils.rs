//! Test fixtures shared by the domain and REST tests

use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use async_trait::async_trait;
use shared::{Bill, BillCategory, BillId};

use crate::domain::completion::CompletionService;
use crate::domain::email_service::{MailService, OutgoingMail};

pub fn sample_bill(
    id: i64,
    name: &str,
    amount: f64,
    category: Option<BillCategory>,
    due_date: Option<&str>,
) -> Bill {
    Bill {
        id: BillId::Numeric(id),
        bill_name: name.to_string(),
        amount,
        due_date: due_date.map(str::to_string),
        category,
        paid: false,
        status: None,
        recurring: false,
        notes: None,
        payments: Vec::new(),
        billing_cycle: None,
    }
}

/// Completion service with a scripted reply that records every prompt it receives
#[derive(Clone)]
pub struct StubCompletion {
    reply: Option<String>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl StubCompletion {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionService for StubCompletion {
    async fn complete(&self, prompt: &str) -> anyhow::Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply
            .clone()
            .ok_or_else(|| anyhow!("completion service unavailable"))
    }
}

/// Mail service that keeps sent messages in memory
#[derive(Clone, Default)]
pub struct RecordingMailer {
    sent: Arc<Mutex<Vec<OutgoingMail>>>,
    fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self {
            sent: Arc::default(),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailService for RecordingMailer {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        if self.fail {
            return Err(anyhow!("SMTP relay refused the connection"));
        }
        self.sent.lock().unwrap().push(OutgoingMail {
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}
