// handler/orders.rs
use std::sync::Arc;

use axum::{
    extract::Path,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::{
    db::{orderdb::OrderExt, refunddb::RefundExt},
    dtos::{common::ApiResponse, orderdtos::*},
    error::HttpError,
    middleware::{require_role, JWTAuthMiddleware},
    models::usermodel::UserRole,
    AppState,
};

pub fn orders_handler() -> Router {
    Router::new()
        .route("/:order_id", get(get_order))
        .route("/:order_id/return", post(mark_order_returned))
}

pub async fn get_order(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let order = app_state
        .db_client
        .get_order_by_id(order_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found(format!("Order {} not found", order_id)))?;

    let items = app_state
        .db_client
        .get_order_items(order_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let authorized = auth.user.role == UserRole::Admin
        || order.customer_id == auth.user.id
        || items.iter().any(|item| item.provider_id == auth.user.id);
    if !authorized {
        return Err(HttpError::unauthorized(
            "You are not allowed to view this order",
        ));
    }

    let refund = app_state
        .db_client
        .get_refund_by_order(order_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let detail = OrderDetailDto {
        order,
        items,
        refund,
    };

    Ok(Json(ApiResponse::success(
        "Order retrieved successfully",
        detail,
    )))
}

pub async fn mark_order_returned(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    require_role(&auth, UserRole::Admin)?;

    let (order, refund) = app_state
        .settlement_service
        .handle_order_returned(&auth.user, order_id)
        .await?;

    Ok(Json(ApiResponse::success(
        "Order marked returned, deposit refund opened",
        OrderReturnedDto { order, refund },
    )))
}
