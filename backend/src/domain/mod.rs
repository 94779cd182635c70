//! # Domain Layer
//!
//! Business logic for the bill tracker, independent of HTTP and of the
//! storage backend in use.
//!
//! ## Services
//!
//! - **BillService**: create, read, update and delete bills, upcoming
//!   reminders and AI categorization
//! - **InsightService**: spending breakdowns, averages and the bill chat
//! - **ReminderNotifier**: reminder e-mails
//!
//! ## Building blocks
//!
//! - **due_date / canonicalizer**: turn loose client input into canonical bills
//! - **analytics**: per-category totals and percentages
//! - **classifier / assistant / prompts**: prompt construction and reply
//!   handling around the `CompletionService` seam

pub mod analytics;
pub mod assistant;
pub mod bill_service;
pub mod canonicalizer;
pub mod classifier;
pub mod completion;
pub mod due_date;
pub mod email_service;
pub mod error;
pub mod insight_service;
pub mod models;
pub mod prompts;
pub mod reminders;

#[cfg(test)]
pub mod test_utils;

pub use assistant::BillAssistant;
pub use bill_service::BillService;
pub use classifier::BillClassifier;
pub use completion::{CompletionService, DisabledCompletion};
pub use email_service::{DisabledMailer, EmailConfig, MailService, ReminderNotifier, SmtpMailer};
pub use error::{BillError, BillResult};
pub use insight_service::InsightService;
pub use prompts::PromptConfig;
