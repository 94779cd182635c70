//! # Prompt Configuration
//!
//! Templates, keyword lists and the sample service catalogue used by the
//! classification and chat flows. Everything is plain data with built-in
//! defaults so it can be overridden from the `prompts` section of the YAML
//! configuration and tested on its own.
//!
//! Keyword matching is case-insensitive. Single-word keywords must match a
//! whole query token; multi-word keywords match as a substring of the
//! lowercased query.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use shared::BillCategory;

pub const PROMPT_CONFIG_VERSION: u32 = 1;

const BILL_NAME_PLACEHOLDER: &str = "{bill_name}";
const TOPIC_PLACEHOLDER: &str = "{topic}";
const UNKNOWN_TOPIC: &str = "that topic";

static DEFAULT_TOPIC_KEYWORDS: &[&str] = &[
    "bill", "bills", "utility", "utilities", "electric", "electricity", "power", "gas",
    "water", "internet", "wifi", "broadband", "phone", "mobile", "cable", "tv",
    "subscription", "subscriptions", "streaming", "rent", "insurance", "payment",
    "payments", "pay", "due", "overdue", "spend", "spending", "spent", "budget", "save",
    "saving", "savings", "cost", "costs", "expense", "expenses", "plan", "plans",
    "provider", "providers", "cheaper", "reminder", "reminders", "monthly",
    "netflix", "spotify", "gym", "transportation", "food",
];

static DEFAULT_OFFERING_KEYWORDS: &[&str] = &[
    "utility", "utilities", "electric", "electricity", "power", "gas", "water", "internet",
    "wifi", "broadband", "phone", "mobile", "cable", "tv", "subscription", "subscriptions",
    "streaming", "netflix", "spotify", "cell phone", "power bill",
];

static DEFAULT_STOP_WORDS: Lazy<Vec<String>> = Lazy::new(|| {
    [
        "a", "an", "the", "is", "are", "was", "were", "be", "what", "whats", "who", "how",
        "why", "when", "where", "which", "can", "could", "would", "should", "will", "do",
        "does", "did", "you", "your", "me", "my", "i", "we", "our", "us", "it", "its",
        "to", "of", "in", "on", "for", "about", "with", "and", "or", "tell", "please",
        "give", "know", "think", "some", "any", "this", "that", "there", "at", "by",
    ]
    .iter()
    .map(|w| w.to_string())
    .collect()
});

fn category_list() -> String {
    BillCategory::ALL
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn default_categorization_template() -> String {
    format!(
        "Classify the following bill into exactly one of these categories: {}.\n\
         Bill name: {}\n\
         Reply with the category name only.",
        category_list(),
        BILL_NAME_PLACEHOLDER
    )
}

fn default_savings_template() -> String {
    "I spend {total_spent} in total on these bills:\n{bills}\n\n\
     Spending by category:\n{categories}\n\n\
     Services costing more than 10: {frequent_services}.\n\
     Suggest cheaper or free alternatives and practical ways to save money."
        .to_string()
}

fn default_system_instruction() -> String {
    "You are a helpful assistant for a personal bill tracker. Only answer \
     questions about the user's bills, utilities, subscriptions and household \
     spending. Be concise and refer to the user's actual bills where relevant."
        .to_string()
}

fn default_refusal_template() -> String {
    "I can only help with questions about your bills, utilities and subscriptions, \
     so I can't help with {topic}."
        .to_string()
}

/// A sample plan offered to users asking about cheaper providers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceOffering {
    pub provider: String,
    pub category: BillCategory,
    pub plan: String,
    pub monthly_price: f64,
}

impl ServiceOffering {
    fn new(provider: &str, category: BillCategory, plan: &str, monthly_price: f64) -> Self {
        Self {
            provider: provider.to_string(),
            category,
            plan: plan.to_string(),
            monthly_price,
        }
    }
}

fn default_service_catalogue() -> Vec<ServiceOffering> {
    vec![
        ServiceOffering::new("BrightGrid Energy", BillCategory::Utilities, "Fixed Saver 12", 89.0),
        ServiceOffering::new("ClearFlow Water", BillCategory::Utilities, "Household Basic", 32.5),
        ServiceOffering::new("FiberNet", BillCategory::Utilities, "Fiber 300", 45.0),
        ServiceOffering::new("SkyMobile", BillCategory::Utilities, "Unlimited Lite", 25.0),
        ServiceOffering::new("StreamBox", BillCategory::Subscriptions, "Ad-supported", 6.99),
        ServiceOffering::new("TuneWave", BillCategory::Entertainment, "Student", 5.99),
        ServiceOffering::new("SafeHome Mutual", BillCategory::Insurance, "Renters Essential", 14.0),
        ServiceOffering::new("CityRide", BillCategory::Transportation, "Monthly Pass", 55.0),
    ]
}

fn default_topic_keywords() -> Vec<String> {
    DEFAULT_TOPIC_KEYWORDS.iter().map(|w| w.to_string()).collect()
}

fn default_offering_keywords() -> Vec<String> {
    DEFAULT_OFFERING_KEYWORDS.iter().map(|w| w.to_string()).collect()
}

fn default_stop_words() -> Vec<String> {
    DEFAULT_STOP_WORDS.clone()
}

fn default_version() -> u32 {
    PROMPT_CONFIG_VERSION
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    /// Must contain `{bill_name}`
    #[serde(default = "default_categorization_template")]
    pub categorization_template: String,
    /// Placeholders: `{total_spent}`, `{bills}`, `{categories}`, `{frequent_services}`
    #[serde(default = "default_savings_template")]
    pub savings_template: String,
    #[serde(default = "default_system_instruction")]
    pub system_instruction: String,
    /// Must contain `{topic}`
    #[serde(default = "default_refusal_template")]
    pub refusal_template: String,
    #[serde(default = "default_topic_keywords")]
    pub topic_keywords: Vec<String>,
    #[serde(default = "default_offering_keywords")]
    pub offering_keywords: Vec<String>,
    #[serde(default = "default_stop_words")]
    pub stop_words: Vec<String>,
    #[serde(default = "default_service_catalogue")]
    pub service_catalogue: Vec<ServiceOffering>,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            categorization_template: default_categorization_template(),
            savings_template: default_savings_template(),
            system_instruction: default_system_instruction(),
            refusal_template: default_refusal_template(),
            topic_keywords: default_topic_keywords(),
            offering_keywords: default_offering_keywords(),
            stop_words: default_stop_words(),
            service_catalogue: default_service_catalogue(),
        }
    }
}

/// Lowercased alphanumeric tokens of a query
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .map(|t| t.trim_matches('\'').to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

fn matches_any(query: &str, keywords: &[String]) -> bool {
    let lowered = query.to_lowercase();
    let tokens: HashSet<String> = tokenize(query).into_iter().collect();

    keywords.iter().any(|keyword| {
        let keyword = keyword.trim().to_lowercase();
        if keyword.is_empty() {
            false
        } else if keyword.contains(char::is_whitespace) {
            lowered.contains(&keyword)
        } else {
            tokens.contains(&keyword)
        }
    })
}

impl PromptConfig {
    pub fn categorization_prompt(&self, bill_name: &str) -> String {
        self.categorization_template
            .replace(BILL_NAME_PLACEHOLDER, bill_name)
    }

    pub fn savings_prompt(
        &self,
        total_spent: f64,
        bills: &str,
        categories: &str,
        frequent_services: &[String],
    ) -> String {
        let frequent = if frequent_services.is_empty() {
            "none".to_string()
        } else {
            frequent_services.join(", ")
        };
        self.savings_template
            .replace("{total_spent}", &format!("{:.2}", total_spent))
            .replace("{bills}", bills)
            .replace("{categories}", categories)
            .replace("{frequent_services}", &frequent)
    }

    /// Whether the query is about bills, utilities or spending
    pub fn matches_topic(&self, query: &str) -> bool {
        matches_any(query, &self.topic_keywords)
    }

    /// Whether the query concerns utilities or subscriptions
    pub fn wants_offerings(&self, query: &str) -> bool {
        matches_any(query, &self.offering_keywords)
    }

    /// The query with stop words removed, used to name a refused topic
    pub fn detect_topic(&self, query: &str) -> String {
        let stop_words: HashSet<String> =
            self.stop_words.iter().map(|w| w.to_lowercase()).collect();
        let remaining: Vec<String> = tokenize(query)
            .into_iter()
            .filter(|t| !stop_words.contains(t))
            .collect();

        if remaining.is_empty() {
            UNKNOWN_TOPIC.to_string()
        } else {
            remaining.join(" ")
        }
    }

    pub fn refusal(&self, query: &str) -> String {
        self.refusal_template
            .replace(TOPIC_PLACEHOLDER, &self.detect_topic(query))
    }

    pub fn catalogue_text(&self) -> String {
        self.service_catalogue
            .iter()
            .map(|offer| {
                format!(
                    "- {} ({}): {} at {:.2}/month",
                    offer.provider, offer.category, offer.plan, offer.monthly_price
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorization_prompt_lists_every_category() {
        let prompts = PromptConfig::default();
        let prompt = prompts.categorization_prompt("Comcast Internet");

        assert!(prompt.contains("Comcast Internet"));
        for category in BillCategory::ALL {
            assert!(prompt.contains(category.as_str()));
        }
        assert!(!prompt.contains(BILL_NAME_PLACEHOLDER));
    }

    #[test]
    fn test_topic_matching() {
        let prompts = PromptConfig::default();

        assert!(prompts.matches_topic("How can I lower my electricity bill?"));
        assert!(prompts.matches_topic("What's due this week"));
        assert!(!prompts.matches_topic("What is the capital of France?"));
        // Tokens, not substrings: "gas" must not match inside "Las Vegas"
        assert!(!prompts.matches_topic("Best hotels in Las Vegas"));
    }

    #[test]
    fn test_offering_matching_uses_utility_and_subscription_terms() {
        let prompts = PromptConfig::default();

        assert!(prompts.wants_offerings("What internet or streaming plans do I have?"));
        assert!(prompts.wants_offerings("How much is my electric bill"));
        assert!(prompts.wants_offerings("List my subscriptions"));
        assert!(!prompts.wants_offerings("When is rent due?"));
        assert!(!prompts.wants_offerings("Is there a cheaper deal?"));
    }

    #[test]
    fn test_offering_matching_handles_phrases() {
        let prompts = PromptConfig {
            offering_keywords: vec!["power bill".to_string()],
            ..PromptConfig::default()
        };

        assert!(prompts.wants_offerings("Why is my power bill so high?"));
        assert!(!prompts.wants_offerings("Pay the bill with more power"));
    }

    #[test]
    fn test_detect_topic_strips_stop_words() {
        let prompts = PromptConfig::default();

        assert_eq!(prompts.detect_topic("What is the capital of France?"), "capital france");
        assert_eq!(prompts.detect_topic("what is it?"), UNKNOWN_TOPIC);

        let refusal = prompts.refusal("Tell me about football");
        assert!(refusal.contains("football"));
        assert!(!refusal.contains(TOPIC_PLACEHOLDER));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let prompts: PromptConfig =
            serde_yaml::from_str("version: 2\ntopic_keywords: [lawn]\n").unwrap();

        assert_eq!(prompts.version, 2);
        assert!(prompts.matches_topic("lawn care"));
        assert!(!prompts.matches_topic("electric bill"));
        assert_eq!(prompts.service_catalogue, default_service_catalogue());
    }

    #[test]
    fn test_catalogue_text() {
        let prompts = PromptConfig::default();
        let text = prompts.catalogue_text();

        assert_eq!(text.lines().count(), prompts.service_catalogue.len());
        assert!(text.contains("FiberNet (Utilities): Fiber 300 at 45.00/month"));
    }
}
