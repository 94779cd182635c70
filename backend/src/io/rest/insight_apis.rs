//! # REST API for Spending Insights

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::info;

use crate::AppState;

/// Category breakdown, frequent services and savings suggestions
pub async fn get_insights(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /insights");

    match state.insight_service.insights().await {
        Ok(insights) => (StatusCode::OK, Json(insights)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn get_average_spending(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /average-spending");

    match state.insight_service.average_spending().await {
        Ok(averages) => (StatusCode::OK, Json(averages)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn get_category_comparison(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /category-comparison");

    match state.insight_service.category_comparison().await {
        Ok(comparison) => (StatusCode::OK, Json(comparison)).into_response(),
        Err(e) => e.into_response(),
    }
}
