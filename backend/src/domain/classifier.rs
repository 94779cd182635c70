//! Bill categorization through the completion service.

use std::sync::Arc;

use shared::BillCategory;
use tracing::{info, warn};

use crate::domain::completion::CompletionService;
use crate::domain::prompts::PromptConfig;

/// Map a raw model reply onto a category; anything but an exact label is `Other`
pub fn parse_category_reply(reply: &str) -> BillCategory {
    BillCategory::from_label(reply.trim()).unwrap_or(BillCategory::Other)
}

#[derive(Clone)]
pub struct BillClassifier {
    completion: Arc<dyn CompletionService>,
    prompts: Arc<PromptConfig>,
}

impl BillClassifier {
    pub fn new(completion: Arc<dyn CompletionService>, prompts: Arc<PromptConfig>) -> Self {
        Self { completion, prompts }
    }

    /// Categorize a bill by name. Never fails: any problem gives `Other`.
    pub async fn categorize(&self, bill_name: &str) -> BillCategory {
        let prompt = self.prompts.categorization_prompt(bill_name);

        match self.completion.complete(&prompt).await {
            Ok(reply) => {
                let category = parse_category_reply(&reply);
                if category == BillCategory::Other && reply.trim() != BillCategory::Other.as_str() {
                    warn!("Unexpected category reply for '{}': {:?}", bill_name, reply);
                }
                info!("Classified '{}' as {}", bill_name, category);
                category
            }
            Err(e) => {
                warn!("Categorization failed for '{}': {}", bill_name, e);
                BillCategory::Other
            }
        }
    }
}
