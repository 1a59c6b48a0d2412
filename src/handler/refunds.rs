// handler/refunds.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::refunddb::RefundExt,
    dtos::{
        common::{ApiResponse, PaginatedResponse},
        refunddtos::*,
    },
    error::HttpError,
    middleware::{require_role, JWTAuthMiddleware},
    models::usermodel::UserRole,
    AppState,
};

pub fn refunds_handler() -> Router {
    Router::new()
        .route("/", get(list_refunds))
        .route("/process", post(process_refund))
        .route("/:refund_id", get(get_refund))
        .route("/:refund_id/reopen", post(reopen_refund))
}

pub async fn list_refunds(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Query(query): Query<RefundListQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    require_role(&auth, UserRole::Admin)?;

    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).clamp(1, 100);

    let refunds = app_state
        .db_client
        .list_refunds(page, limit, query.status)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let total = app_state
        .db_client
        .count_refunds(query.status)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(PaginatedResponse::new(refunds, total, page, limit)))
}

pub async fn get_refund(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Path(refund_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let refund = app_state
        .db_client
        .get_refund_by_id(refund_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found(format!("Refund {} not found", refund_id)))?;

    let authorized =
        auth.user.role == UserRole::Admin || refund.customer_id == auth.user.id;
    if !authorized {
        return Err(HttpError::unauthorized(
            "You are not allowed to view this refund",
        ));
    }

    Ok(Json(ApiResponse::success(
        "Refund retrieved successfully",
        refund,
    )))
}

pub async fn process_refund(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Json(body): Json<ProcessRefundDto>,
) -> Result<impl IntoResponse, HttpError> {
    require_role(&auth, UserRole::Admin)?;

    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    // A failed payout comes back as a `failed` refund in the success body,
    // not as an HTTP error; the admin reopens and retries.
    let refund = app_state
        .settlement_service
        .process_refund(&auth.user, body)
        .await?;

    Ok(Json(ApiResponse::success(
        "Refund processed successfully",
        refund,
    )))
}

pub async fn reopen_refund(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Path(refund_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    require_role(&auth, UserRole::Admin)?;

    let refund = app_state
        .settlement_service
        .reopen_refund(&auth.user, refund_id)
        .await?;

    Ok(Json(ApiResponse::success(
        "Refund reopened successfully",
        refund,
    )))
}
