//! Spending insights, comparisons and the bill chat.
use std::sync::Arc;

use shared::{
    AiQueryRequest, AiQueryResponse, AverageSpendingResponse, CategoryComparisonResponse,
    InsightsResponse,
};
use tracing::info;

use crate::domain::analytics::{frequent_services, CategoryBreakdown};
use crate::domain::assistant::BillAssistant;
use crate::domain::error::{BillError, BillResult};
use crate::storage::traits::BillStorage;

#[derive(Clone)]
pub struct InsightService {
    storage: Arc<dyn BillStorage>,
    assistant: BillAssistant,
}

impl InsightService {
    pub fn new(storage: Arc<dyn BillStorage>, assistant: BillAssistant) -> Self {
        Self { storage, assistant }
    }

    pub async fn insights(&self) -> BillResult<InsightsResponse> {
        let bills = self.storage.all().await?;
        let breakdown = CategoryBreakdown::from_bills(&bills);
        let suggestions = self.assistant.savings_suggestions(&bills, &breakdown).await;

        Ok(InsightsResponse {
            total_spent: breakdown.total_spent(),
            category_totals: breakdown.category_totals(),
            category_percentages: breakdown.percentages_all_categories(),
            highest_category: breakdown.highest_category_summary(),
            frequent_services: frequent_services(&bills),
            suggestions,
        })
    }

    pub async fn average_spending(&self) -> BillResult<AverageSpendingResponse> {
        let bills = self.storage.all().await?;
        let breakdown = CategoryBreakdown::from_bills(&bills);

        Ok(AverageSpendingResponse {
            bill_count: breakdown.bill_count(),
            total_spent: breakdown.total_spent(),
            average_per_bill: breakdown.average_per_bill(),
            category_averages: breakdown.category_averages_all(),
            category_percentages: breakdown.percentages_all_categories(),
        })
    }

    pub async fn category_comparison(&self) -> BillResult<CategoryComparisonResponse> {
        let bills = self.storage.all().await?;
        let breakdown = CategoryBreakdown::from_bills(&bills);

        Ok(CategoryComparisonResponse {
            total_spent: breakdown.total_spent(),
            categories: breakdown.comparison_entries(),
            highest_category: breakdown.highest_category_summary(),
        })
    }

    pub async fn ai_query(&self, request: AiQueryRequest) -> BillResult<AiQueryResponse> {
        let query = request
            .query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| BillError::validation("query is required"))?;

        info!("Answering bill query");
        let bills = self.storage.all().await?;
        Ok(self
            .assistant
            .answer(query, request.conversation.as_deref(), &bills)
            .await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::prompts::PromptConfig;
    use crate::domain::test_utils::{sample_bill, StubCompletion};
    use crate::storage::test_utils::TestEnvironment;
    use shared::BillCategory;

    async fn service_with_bills(stub: &StubCompletion) -> (InsightService, TestEnvironment) {
        let env = TestEnvironment::new().unwrap();
        let storage = Arc::new(env.json_repository());
        storage.insert(&sample_bill(1, "Rent", 1000.0, Some(BillCategory::Rent), None)).await.unwrap();
        storage.insert(&sample_bill(2, "Groceries", 200.0, Some(BillCategory::Food), None)).await.unwrap();
        storage.insert(&sample_bill(3, "Cloud", 2.0, None, None)).await.unwrap();

        let assistant = BillAssistant::new(Arc::new(stub.clone()), Arc::new(PromptConfig::default()));
        (InsightService::new(storage, assistant), env)
    }

    #[tokio::test]
    async fn test_insights() {
        let stub = StubCompletion::replying("Cook at home more often.");
        let (service, _env) = service_with_bills(&stub).await;

        let insights = service.insights().await.unwrap();

        assert_eq!(insights.total_spent, 1202.0);
        assert_eq!(insights.category_totals.len(), 3);
        assert_eq!(insights.category_percentages.len(), 8);
        assert_eq!(insights.highest_category.category, "Rent");
        assert_eq!(insights.frequent_services, vec!["Rent".to_string(), "Groceries".to_string()]);
        assert_eq!(insights.suggestions, "Cook at home more often.");
    }

    #[tokio::test]
    async fn test_insights_survive_completion_failure() {
        let stub = StubCompletion::failing();
        let (service, _env) = service_with_bills(&stub).await;

        let insights = service.insights().await.unwrap();
        assert_eq!(insights.highest_category.amount, 1000.0);
        assert!(!insights.suggestions.is_empty());
    }

    #[tokio::test]
    async fn test_average_spending_and_comparison() {
        let stub = StubCompletion::replying("unused");
        let (service, _env) = service_with_bills(&stub).await;

        let averages = service.average_spending().await.unwrap();
        assert_eq!(averages.bill_count, 3);
        assert!((averages.average_per_bill - 1202.0 / 3.0).abs() < 1e-9);
        assert_eq!(averages.category_averages[&BillCategory::Other], 2.0);

        let comparison = service.category_comparison().await.unwrap();
        assert_eq!(comparison.categories.len(), 8);
        assert_eq!(comparison.highest_category.category, "Rent");
        assert!(stub.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_ai_query_requires_query() {
        let stub = StubCompletion::replying("Rent is your biggest bill.");
        let (service, _env) = service_with_bills(&stub).await;

        let missing = service.ai_query(AiQueryRequest::default()).await;
        assert!(matches!(missing, Err(BillError::Validation(_))));

        let response = service
            .ai_query(AiQueryRequest {
                query: Some("What is my biggest bill?".to_string()),
                conversation: None,
            })
            .await
            .unwrap();
        assert_eq!(response.response, "Rent is your biggest bill.");
        assert_eq!(response.bills.len(), 3);
    }
}
