use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::refundmodel::RefundStatus;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ProcessRefundDto {
    pub refund_id: Uuid,

    pub approve: bool,

    pub bank_account_id: Option<Uuid>,

    // Admin-entered counterpart reference for reconciliation, if any
    #[validate(length(max = 100, message = "Transaction reference must be at most 100 characters"))]
    pub external_transaction_ref: Option<String>,

    #[validate(length(max = 2000, message = "Notes must be at most 2000 characters"))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RefundListQueryDto {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<RefundStatus>,
}
