//! # Bill Assistant
//!
//! Free-text flows over the completion service: savings suggestions for the
//! insights page and the restricted chat behind `/ai-query`. Completion
//! failures never escape; callers always get text back.

use std::sync::Arc;

use shared::{AiQueryResponse, Bill, BillSummary};
use tracing::{info, warn};

use crate::domain::analytics::{frequent_services, CategoryBreakdown};
use crate::domain::completion::CompletionService;
use crate::domain::prompts::PromptConfig;

pub const NO_SUGGESTIONS: &str = "No suggestions available.";
pub const CHAT_FALLBACK: &str = "I'm sorry, I couldn't generate a response.";

fn summarize_bills(summaries: &[BillSummary]) -> String {
    if summaries.is_empty() {
        return "(no bills recorded)".to_string();
    }
    summaries
        .iter()
        .map(|bill| {
            format!(
                "- {}: {:.2} due {}",
                bill.name,
                bill.amount,
                bill.due_date.as_deref().unwrap_or("(no due date)")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn summarize_categories(breakdown: &CategoryBreakdown) -> String {
    let percentages = breakdown.category_percentages();
    breakdown
        .groups()
        .iter()
        .map(|group| {
            format!(
                "- {}: {:.2} ({:.1}%)",
                group.category,
                group.total,
                percentages.get(&group.category).copied().unwrap_or(0.0)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Clone)]
pub struct BillAssistant {
    completion: Arc<dyn CompletionService>,
    prompts: Arc<PromptConfig>,
}

impl BillAssistant {
    pub fn new(completion: Arc<dyn CompletionService>, prompts: Arc<PromptConfig>) -> Self {
        Self { completion, prompts }
    }

    pub async fn savings_suggestions(&self, bills: &[Bill], breakdown: &CategoryBreakdown) -> String {
        let summaries: Vec<BillSummary> = bills.iter().map(BillSummary::from).collect();
        let prompt = self.prompts.savings_prompt(
            breakdown.total_spent(),
            &summarize_bills(&summaries),
            &summarize_categories(breakdown),
            &frequent_services(bills),
        );

        match self.completion.complete(&prompt).await {
            Ok(text) if text.trim().is_empty() => NO_SUGGESTIONS.to_string(),
            Ok(text) => text,
            Err(e) => {
                warn!("Savings suggestions failed: {}", e);
                format!("Suggestions are unavailable right now: {}", e)
            }
        }
    }

    fn chat_prompt(&self, query: &str, conversation: Option<&str>, summaries: &[BillSummary]) -> String {
        let mut prompt = self.prompts.system_instruction.clone();

        if let Some(history) = conversation.map(str::trim).filter(|h| !h.is_empty()) {
            prompt.push_str("\n\nPrevious conversation:\n");
            prompt.push_str(history);
        }

        prompt.push_str("\n\nUser query: ");
        prompt.push_str(query);
        prompt.push_str("\n\nHere are the current bills:\n");
        prompt.push_str(&summarize_bills(summaries));

        if self.prompts.wants_offerings(query) {
            prompt.push_str("\n\nAvailable service offerings:\n");
            prompt.push_str(&self.prompts.catalogue_text());
        }

        prompt.push_str("\n\nPlease provide a relevant response.");
        prompt
    }

    /// Answer a chat query, refusing off-topic questions without calling the model
    pub async fn answer(&self, query: &str, conversation: Option<&str>, bills: &[Bill]) -> AiQueryResponse {
        let summaries: Vec<BillSummary> = bills.iter().map(BillSummary::from).collect();

        if !self.prompts.matches_topic(query) {
            info!("Refusing off-topic query");
            return AiQueryResponse {
                response: self.prompts.refusal(query),
                bills: summaries,
                restricted: true,
            };
        }

        let prompt = self.chat_prompt(query, conversation, &summaries);
        let response = match self.completion.complete(&prompt).await {
            Ok(text) if text.trim().is_empty() => CHAT_FALLBACK.to_string(),
            Ok(text) => text,
            Err(e) => {
                warn!("Chat completion failed: {}", e);
                format!("{} ({})", CHAT_FALLBACK, e)
            }
        };

        AiQueryResponse {
            response,
            bills: summaries,
            restricted: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_utils::{sample_bill, StubCompletion};
    use shared::BillCategory;

    fn assistant(stub: &StubCompletion) -> BillAssistant {
        BillAssistant::new(Arc::new(stub.clone()), Arc::new(PromptConfig::default()))
    }

    fn bills() -> Vec<Bill> {
        vec![
            sample_bill(1, "Electric", 120.0, Some(BillCategory::Utilities), Some("2025-07-01")),
            sample_bill(2, "Netflix", 15.99, Some(BillCategory::Subscriptions), None),
        ]
    }

    #[tokio::test]
    async fn test_off_topic_query_is_refused_without_calling_model() {
        let stub = StubCompletion::replying("should not be used");
        let response = assistant(&stub)
            .answer("What is the capital of France?", None, &bills())
            .await;

        assert!(response.restricted);
        assert!(response.response.contains("capital france"));
        assert_eq!(response.bills.len(), 2);
        assert!(stub.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_on_topic_query_builds_full_prompt() {
        let stub = StubCompletion::replying("Your electric bill is the largest.");
        let response = assistant(&stub)
            .answer(
                "Which bill costs the most?",
                Some("User: hi\nAssistant: hello"),
                &bills(),
            )
            .await;

        assert!(!response.restricted);
        assert_eq!(response.response, "Your electric bill is the largest.");
        assert_eq!(response.bills[0].name, "Electric");

        let prompt = &stub.prompts()[0];
        assert!(prompt.starts_with(&PromptConfig::default().system_instruction));
        assert!(prompt.contains("Previous conversation:\nUser: hi"));
        assert!(prompt.contains("User query: Which bill costs the most?"));
        assert!(prompt.contains("- Electric: 120.00 due 2025-07-01"));
        assert!(!prompt.contains("Available service offerings"));
    }

    #[tokio::test]
    async fn test_offering_query_includes_catalogue() {
        let stub = StubCompletion::replying("Try FiberNet.");
        assistant(&stub)
            .answer("Is there a cheaper internet provider?", None, &bills())
            .await;

        let prompt = &stub.prompts()[0];
        assert!(prompt.contains("Available service offerings"));
        assert!(prompt.contains("FiberNet"));
    }

    #[tokio::test]
    async fn test_model_failure_still_returns_structured_response() {
        let stub = StubCompletion::failing();
        let response = assistant(&stub)
            .answer("When is my water bill due?", None, &bills())
            .await;

        assert!(!response.restricted);
        assert!(response.response.starts_with(CHAT_FALLBACK));
        assert_eq!(response.bills.len(), 2);
    }

    #[tokio::test]
    async fn test_savings_suggestions_fallbacks() {
        let data = bills();
        let breakdown = CategoryBreakdown::from_bills(&data);

        let empty = StubCompletion::replying("   ");
        assert_eq!(assistant(&empty).savings_suggestions(&data, &breakdown).await, NO_SUGGESTIONS);

        let failing = StubCompletion::failing();
        let text = assistant(&failing).savings_suggestions(&data, &breakdown).await;
        assert!(text.starts_with("Suggestions are unavailable right now"));

        let ok = StubCompletion::replying("Switch to an ad-supported plan.");
        let text = assistant(&ok).savings_suggestions(&data, &breakdown).await;
        assert_eq!(text, "Switch to an ad-supported plan.");
        let prompt = &ok.prompts()[0];
        assert!(prompt.contains("135.99"));
        assert!(prompt.contains("Electric, Netflix"));
    }
}
