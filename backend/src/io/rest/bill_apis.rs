//! # REST API for Bills
//!
//! Create, read, update and delete endpoints.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use shared::{BillResponse, CreateBillRequest, DeleteByNameRequest, MessageResponse, UpdateBillRequest};
use tracing::info;

use super::error::json_body;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct DeleteBillQuery {
    pub id: Option<String>,
}

/// Create a new bill
pub async fn create_bill(
    State(state): State<AppState>,
    payload: Result<Json<CreateBillRequest>, JsonRejection>,
) -> impl IntoResponse {
    info!("POST /bills");

    let request = match json_body(payload) {
        Ok(request) => request,
        Err(e) => return e.into_response(),
    };

    match state.bill_service.create_bill(request).await {
        Ok(bill) => (
            StatusCode::CREATED,
            Json(BillResponse {
                message: "Bill added successfully!".to_string(),
                bill,
            }),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// List all bills in storage order
pub async fn list_bills(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /bills");

    match state.bill_service.list_bills().await {
        Ok(bills) => (StatusCode::OK, Json(bills)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn get_bill(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    info!("GET /bills/{}", id);

    match state.bill_service.get_bill(&id).await {
        Ok(bill) => (StatusCode::OK, Json(bill)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Partially update a bill
pub async fn update_bill(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateBillRequest>, JsonRejection>,
) -> impl IntoResponse {
    info!("PUT /bills/{}", id);

    let request = match json_body(payload) {
        Ok(request) => request,
        Err(e) => return e.into_response(),
    };

    match state.bill_service.update_bill(&id, request).await {
        Ok(bill) => (
            StatusCode::OK,
            Json(BillResponse {
                message: "Bill updated successfully!".to_string(),
                bill,
            }),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete one bill, addressed by the `id` query parameter
pub async fn delete_bill(
    State(state): State<AppState>,
    Query(query): Query<DeleteBillQuery>,
) -> impl IntoResponse {
    info!("DELETE /bills - query: {:?}", query);

    match state.bill_service.delete_bill(query.id.as_deref()).await {
        Ok(()) => (
            StatusCode::OK,
            Json(MessageResponse {
                message: "Bill deleted".to_string(),
            }),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete every bill with the given name
pub async fn delete_bills_by_name(
    State(state): State<AppState>,
    payload: Result<Json<DeleteByNameRequest>, JsonRejection>,
) -> impl IntoResponse {
    info!("DELETE /bills/by-name");

    let request = match json_body(payload) {
        Ok(request) => request,
        Err(e) => return e.into_response(),
    };

    match state
        .bill_service
        .delete_bills_by_name(request.bill_name.as_deref())
        .await
    {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => e.into_response(),
    }
}
