// models/refundmodel.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "refund_status", rename_all = "snake_case")]
pub enum RefundStatus {
    Initiated,
    Completed,
    Failed,
}

impl RefundStatus {
    pub fn to_str(&self) -> &str {
        match self {
            RefundStatus::Initiated => "initiated",
            RefundStatus::Completed => "completed",
            RefundStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct DepositRefund {
    pub id: Uuid,
    pub order_id: Uuid,
    pub customer_id: Uuid,
    pub original_deposit_amount: i64, // in kobo
    pub total_penalty_amount: i64,    // in kobo, re-derived from violations
    pub refund_amount: i64,           // in kobo, max(0, deposit - penalties)
    pub status: RefundStatus,
    pub bank_account_id: Option<Uuid>,
    pub processed_by: Option<Uuid>,
    pub notes: Option<String>,
    pub external_transaction_ref: Option<String>,
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct BankAccount {
    pub id: Uuid,
    pub user_id: Uuid,
    pub account_name: String,
    pub account_number: String,
    pub bank_code: String,
    pub bank_name: String,
    pub is_verified: Option<bool>,
    pub is_primary: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}
