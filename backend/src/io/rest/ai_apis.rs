//! # REST API for AI Features
//!
//! Chat, single-bill classification and bulk categorization.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use shared::{AiQueryRequest, ClassifyBillRequest};
use tracing::info;

use super::error::json_body;
use crate::AppState;

/// Answer a question about the stored bills
pub async fn ai_query(
    State(state): State<AppState>,
    payload: Result<Json<AiQueryRequest>, JsonRejection>,
) -> impl IntoResponse {
    info!("POST /ai-query");

    let request = match json_body(payload) {
        Ok(request) => request,
        Err(e) => return e.into_response(),
    };

    match state.insight_service.ai_query(request).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn classify_bill(
    State(state): State<AppState>,
    payload: Result<Json<ClassifyBillRequest>, JsonRejection>,
) -> impl IntoResponse {
    info!("POST /classify-bill");

    let request = match json_body(payload) {
        Ok(request) => request,
        Err(e) => return e.into_response(),
    };

    match state.bill_service.classify_bill(request).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Categorize every bill that has no category yet
pub async fn categorize_all_bills(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /admin/categorize-all-bills");

    match state.bill_service.categorize_all().await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => e.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_utils::sample_bill;
    use crate::io::rest::test_support::TestApp;
    use crate::storage::BillStorage;
    use shared::{AiQueryResponse, BillCategory, CategorizeAllResponse, ClassifyBillResponse};

    async fn json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_ai_query_handler_restricts_topics() {
        let app = TestApp::new("should not be called");
        let request = AiQueryRequest {
            query: Some("Who won the world cup?".to_string()),
            conversation: None,
        };

        let response = ai_query(State(app.state.clone()), Ok(Json(request))).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let body: AiQueryResponse = json(response).await;
        assert!(body.restricted);
        assert!(app.stub.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_ai_query_handler_requires_query() {
        let app = TestApp::new("Other");
        let response = ai_query(State(app.state.clone()), Ok(Json(AiQueryRequest::default()))).await;
        assert_eq!(response.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_classify_bill_handler() {
        let app = TestApp::new("Insurance");
        let request = ClassifyBillRequest {
            bill_name: Some("State Farm".to_string()),
        };

        let response = classify_bill(State(app.state.clone()), Ok(Json(request))).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let body: ClassifyBillResponse = json(response).await;
        assert_eq!(body.category, BillCategory::Insurance);
    }

    #[tokio::test]
    async fn test_categorize_all_bills_handler() {
        let app = TestApp::new("Utilities");
        app.storage.insert(&sample_bill(1, "Electric", 90.0, None, None)).await.unwrap();

        let response = categorize_all_bills(State(app.state.clone())).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let body: CategorizeAllResponse = json(response).await;
        assert_eq!(body.updated_count, 1);
    }
}
