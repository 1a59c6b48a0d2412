// models/violationmodel.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "violation_kind", rename_all = "snake_case")]
pub enum ViolationKind {
    Damaged,
    LateReturn,
    NotReturned,
}

impl ViolationKind {
    pub fn to_str(&self) -> &str {
        match self {
            ViolationKind::Damaged => "damaged",
            ViolationKind::LateReturn => "late_return",
            ViolationKind::NotReturned => "not_returned",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "violation_status", rename_all = "snake_case")]
pub enum ViolationStatus {
    Pending,
    CustomerAccepted,
    CustomerRejected,
    Escalated,
    Resolved,
}

impl ViolationStatus {
    pub fn to_str(&self) -> &str {
        match self {
            ViolationStatus::Pending => "pending",
            ViolationStatus::CustomerAccepted => "customer_accepted",
            ViolationStatus::CustomerRejected => "customer_rejected",
            ViolationStatus::Escalated => "escalated",
            ViolationStatus::Resolved => "resolved",
        }
    }

    /// Terminal statuses are retained for audit and count toward settlement.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ViolationStatus::CustomerAccepted | ViolationStatus::Resolved
        )
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "evidence_uploader", rename_all = "snake_case")]
pub enum EvidenceUploader {
    Provider,
    Customer,
}

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct Violation {
    pub id: Uuid,
    pub order_item_id: Uuid,
    pub provider_id: Uuid,
    pub customer_id: Uuid,
    pub kind: ViolationKind,
    pub description: String,
    pub damage_percentage: Option<i32>,
    pub penalty_percentage: i32,
    // Authoritative stored value; overwritten by provider revision or by the
    // admin resolution, never silently recomputed at read time.
    pub penalty_amount: i64, // in kobo
    pub status: ViolationStatus,
    pub customer_notes: Option<String>,
    pub provider_response: Option<String>,
    pub customer_responded_at: Option<DateTime<Utc>>,
    pub provider_responded_at: Option<DateTime<Utc>>,
    pub provider_escalation_reason: Option<String>,
    pub customer_escalation_reason: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct Evidence {
    pub id: Uuid,
    pub violation_id: Uuid,
    pub media_url: String,
    pub uploaded_by: EvidenceUploader,
    pub media_kind: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "resolution_kind", rename_all = "snake_case")]
pub enum ResolutionKind {
    UpholdClaim,
    RejectClaim,
    Compromise,
}

impl ResolutionKind {
    pub fn to_str(&self) -> &str {
        match self {
            ResolutionKind::UpholdClaim => "uphold_claim",
            ResolutionKind::RejectClaim => "reject_claim",
            ResolutionKind::Compromise => "compromise",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "resolution_status", rename_all = "snake_case")]
pub enum ResolutionStatus {
    Pending,
    UnderReview,
    Completed,
}

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct Resolution {
    pub id: Uuid,
    pub violation_id: Uuid,
    pub customer_fine_amount: i64,          // in kobo
    pub provider_compensation_amount: i64,  // in kobo
    pub kind: Option<ResolutionKind>,
    pub reason: Option<String>,
    pub status: ResolutionStatus,
    pub admin_id: Option<Uuid>,
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}
