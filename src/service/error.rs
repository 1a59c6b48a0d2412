use axum::http::StatusCode;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    error::HttpError,
    models::{refundmodel::RefundStatus, violationmodel::ViolationStatus},
    service::payout_provider::PayoutError,
};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Order {0} not found")]
    OrderNotFound(Uuid),

    #[error("Order item {0} not found")]
    OrderItemNotFound(Uuid),

    #[error("Violation {0} not found")]
    ViolationNotFound(Uuid),

    #[error("Resolution {0} not found")]
    ResolutionNotFound(Uuid),

    #[error("Refund {0} not found")]
    RefundNotFound(Uuid),

    #[error("Bank account {0} not found or not verified")]
    BankAccountNotFound(Uuid),

    #[error("User {0} is not authorized to perform this action on violation {1}")]
    UnauthorizedViolationAccess(Uuid, Uuid),

    #[error("User {0} is not authorized to perform this action on order {1}")]
    UnauthorizedOrderAccess(Uuid, Uuid),

    #[error("User {0} is not authorized to perform this action on refund {1}")]
    UnauthorizedRefundAccess(Uuid, Uuid),

    #[error("Violation {0} is not in status {1:?}")]
    InvalidViolationStatus(Uuid, ViolationStatus),

    #[error("Refund {0} is not in status {1:?}")]
    InvalidRefundStatus(Uuid, RefundStatus),

    #[error("Invalid state transition: {0}")]
    InvalidTransition(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Payout rail error: {0}")]
    PayoutRail(#[from] PayoutError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<ServiceError> for HttpError {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::OrderNotFound(_)
            | ServiceError::OrderItemNotFound(_)
            | ServiceError::ViolationNotFound(_)
            | ServiceError::ResolutionNotFound(_)
            | ServiceError::RefundNotFound(_)
            | ServiceError::BankAccountNotFound(_) => HttpError::not_found(error.to_string()),

            ServiceError::InvalidViolationStatus(_, _)
            | ServiceError::InvalidRefundStatus(_, _)
            | ServiceError::InvalidTransition(_)
            | ServiceError::Validation(_) => HttpError::bad_request(error.to_string()),

            ServiceError::UnauthorizedViolationAccess(_, _)
            | ServiceError::UnauthorizedOrderAccess(_, _)
            | ServiceError::UnauthorizedRefundAccess(_, _) => {
                HttpError::unauthorized(error.to_string())
            }

            ServiceError::Conflict(_) => HttpError::conflict(error.to_string()),

            _ => HttpError::server_error(error.to_string()),
        }
    }
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::OrderNotFound(_)
            | ServiceError::OrderItemNotFound(_)
            | ServiceError::ViolationNotFound(_)
            | ServiceError::ResolutionNotFound(_)
            | ServiceError::RefundNotFound(_)
            | ServiceError::BankAccountNotFound(_) => StatusCode::NOT_FOUND,

            ServiceError::InvalidViolationStatus(_, _)
            | ServiceError::InvalidRefundStatus(_, _)
            | ServiceError::InvalidTransition(_)
            | ServiceError::Validation(_) => StatusCode::BAD_REQUEST,

            ServiceError::UnauthorizedViolationAccess(_, _)
            | ServiceError::UnauthorizedOrderAccess(_, _)
            | ServiceError::UnauthorizedRefundAccess(_, _) => StatusCode::UNAUTHORIZED,

            ServiceError::Conflict(_) => StatusCode::CONFLICT,

            ServiceError::PayoutRail(_) => StatusCode::BAD_GATEWAY,

            ServiceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
