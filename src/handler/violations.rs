// handler/violations.rs
use std::sync::Arc;

use axum::{
    extract::Path,
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::{common::ApiResponse, violationdtos::*},
    error::HttpError,
    middleware::{require_role, JWTAuthMiddleware},
    models::usermodel::UserRole,
    AppState,
};

pub fn violations_handler() -> Router {
    Router::new()
        .route("/", post(file_violation))
        .route("/:violation_id", get(get_violation))
        .route("/:violation_id/respond", post(respond_to_violation))
        .route("/:violation_id/revise", post(revise_claim))
        .route("/:violation_id/counter", post(counter_rejection))
        .route("/:violation_id/escalate", post(escalate_violation))
        .route("/:violation_id/resolution", post(open_resolution))
}

pub fn resolutions_handler() -> Router {
    Router::new().route("/:resolution_id/decide", put(decide_resolution))
}

pub async fn file_violation(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Json(body): Json<FileViolationDto>,
) -> Result<impl IntoResponse, HttpError> {
    require_role(&auth, UserRole::Provider)?;

    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let violation = app_state
        .violation_service
        .file_violation(&auth.user, body)
        .await?;

    Ok(Json(ApiResponse::success(
        "Violation filed successfully",
        violation,
    )))
}

pub async fn get_violation(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Path(violation_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let detail = app_state
        .violation_service
        .get_violation_detail(&auth.user, violation_id)
        .await?;

    Ok(Json(ApiResponse::success(
        "Violation retrieved successfully",
        detail,
    )))
}

pub async fn respond_to_violation(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Path(violation_id): Path<Uuid>,
    Json(body): Json<CustomerResponseDto>,
) -> Result<impl IntoResponse, HttpError> {
    require_role(&auth, UserRole::Customer)?;

    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let violation = app_state
        .violation_service
        .respond_as_customer(&auth.user, violation_id, body)
        .await?;

    Ok(Json(ApiResponse::success(
        "Response recorded successfully",
        violation,
    )))
}

pub async fn revise_claim(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Path(violation_id): Path<Uuid>,
    Json(body): Json<ReviseClaimDto>,
) -> Result<impl IntoResponse, HttpError> {
    require_role(&auth, UserRole::Provider)?;

    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let violation = app_state
        .violation_service
        .revise_claim(&auth.user, violation_id, body)
        .await?;

    Ok(Json(ApiResponse::success(
        "Claim revised successfully",
        violation,
    )))
}

pub async fn counter_rejection(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Path(violation_id): Path<Uuid>,
    Json(body): Json<RejectionResponseDto>,
) -> Result<impl IntoResponse, HttpError> {
    require_role(&auth, UserRole::Provider)?;

    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let violation = app_state
        .violation_service
        .respond_to_rejection(&auth.user, violation_id, body)
        .await?;

    Ok(Json(ApiResponse::success(
        "Counter-response recorded successfully",
        violation,
    )))
}

pub async fn escalate_violation(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Path(violation_id): Path<Uuid>,
    Json(body): Json<EscalateDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let violation = app_state
        .violation_service
        .escalate(&auth.user, violation_id, body)
        .await?;

    Ok(Json(ApiResponse::success(
        "Violation escalated successfully",
        violation,
    )))
}

pub async fn open_resolution(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Path(violation_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    require_role(&auth, UserRole::Admin)?;

    let resolution = app_state
        .resolution_service
        .open_resolution(&auth.user, violation_id)
        .await?;

    Ok(Json(ApiResponse::success(
        "Resolution opened successfully",
        resolution,
    )))
}

pub async fn decide_resolution(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Path(resolution_id): Path<Uuid>,
    Json(body): Json<DecideResolutionDto>,
) -> Result<impl IntoResponse, HttpError> {
    require_role(&auth, UserRole::Admin)?;

    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let resolution = app_state
        .resolution_service
        .decide(&auth.user, resolution_id, body)
        .await?;

    Ok(Json(ApiResponse::success(
        "Resolution decided successfully",
        resolution,
    )))
}
