//! # REST API for Reminders

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use shared::SendReminderRequest;
use tracing::info;

use super::error::json_body;
use crate::AppState;

/// Bills due today or later
pub async fn get_reminders(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /reminders");

    match state.bill_service.upcoming_reminders().await {
        Ok(bills) => (StatusCode::OK, Json(bills)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// E-mail a reminder for one bill
pub async fn send_reminder(
    State(state): State<AppState>,
    payload: Result<Json<SendReminderRequest>, JsonRejection>,
) -> impl IntoResponse {
    info!("POST /send-reminder");

    let request = match json_body(payload) {
        Ok(request) => request,
        Err(e) => return e.into_response(),
    };

    match state.reminder_notifier.send_reminder(request).await {
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

    #[tokio::test]
    async fn test_get_reminders_handler() {
        let app = TestApp::new("Other");
        app.storage.insert(&sample_bill(1, "Old", 10.0, None, Some("2001-01-01"))).await.unwrap();
        app.storage.insert(&sample_bill(2, "New", 10.0, None, Some("2999-01-01"))).await.unwrap();

        let response = get_reminders(State(app.state.clone())).await.into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let bills: Vec<shared::Bill> = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(bills.len(), 1);
        assert_eq!(bills[0].bill_name, "New");
    }

    #[tokio::test]
    async fn test_send_reminder_handler() {
        let app = TestApp::new("Other");
        let request = SendReminderRequest {
            email: Some("someone@example.com".to_string()),
            bill_name: Some("Water".to_string()),
            due_date: Some("2030-01-01".to_string()),
            amount: None,
        };

        let response = send_reminder(State(app.state.clone()), Ok(Json(request))).await;

        assert_eq!(response.into_response().status(), StatusCode::OK);
        assert_eq!(app.mailer.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_send_reminder_missing_email() {
        let app = TestApp::new("Other");

        let response = send_reminder(State(app.state.clone()), Ok(Json(SendReminderRequest::default()))).await;

        assert_eq!(response.into_response().status(), StatusCode::BAD_REQUEST);
        assert!(app.mailer.sent().is_empty());
    }
}
