// service/audit_service.rs
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::db::DBClient,
    models::{refundmodel::DepositRefund, violationmodel::*},
    service::error::ServiceError,
};

#[derive(Debug, Clone)]
pub struct AuditService {
    db_client: Arc<DBClient>,
}

impl AuditService {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        Self { db_client }
    }

    pub async fn log_violation_filed(
        &self,
        provider_id: Uuid,
        violation: &Violation,
    ) -> Result<(), ServiceError> {
        self.log_audit_event(
            provider_id,
            "violation_filed",
            Some(violation.id),
            None,
            Some(serde_json::json!({
                "order_item_id": violation.order_item_id,
                "kind": violation.kind.to_str(),
                "penalty_percentage": violation.penalty_percentage,
                "penalty_amount": violation.penalty_amount,
            })),
            "Provider filed a violation claim",
        )
        .await
    }

    pub async fn log_customer_response(
        &self,
        customer_id: Uuid,
        violation: &Violation,
        accepted: bool,
    ) -> Result<(), ServiceError> {
        self.log_audit_event(
            customer_id,
            "customer_response",
            Some(violation.id),
            None,
            Some(serde_json::json!({
                "accepted": accepted,
                "status": violation.status.to_str(),
            })),
            "Customer responded to a violation claim",
        )
        .await
    }

    pub async fn log_claim_revised(
        &self,
        provider_id: Uuid,
        violation: &Violation,
    ) -> Result<(), ServiceError> {
        self.log_audit_event(
            provider_id,
            "claim_revised",
            Some(violation.id),
            None,
            Some(serde_json::json!({
                "penalty_percentage": violation.penalty_percentage,
                "penalty_amount": violation.penalty_amount,
            })),
            "Provider revised a rejected claim",
        )
        .await
    }

    pub async fn log_rejection_countered(
        &self,
        provider_id: Uuid,
        violation: &Violation,
    ) -> Result<(), ServiceError> {
        self.log_audit_event(
            provider_id,
            "rejection_countered",
            Some(violation.id),
            None,
            None,
            "Provider responded to the customer's rejection",
        )
        .await
    }

    pub async fn log_escalation(
        &self,
        actor_id: Uuid,
        violation: &Violation,
        transitioned: bool,
    ) -> Result<(), ServiceError> {
        self.log_audit_event(
            actor_id,
            "violation_escalated",
            Some(violation.id),
            None,
            Some(serde_json::json!({ "transitioned": transitioned })),
            "Violation escalated for arbitration",
        )
        .await
    }

    pub async fn log_resolution_opened(
        &self,
        admin_id: Uuid,
        resolution: &Resolution,
    ) -> Result<(), ServiceError> {
        self.log_audit_event(
            admin_id,
            "resolution_opened",
            Some(resolution.violation_id),
            None,
            Some(serde_json::json!({ "resolution_id": resolution.id })),
            "Admin opened arbitration for an escalated violation",
        )
        .await
    }

    pub async fn log_resolution_decided(
        &self,
        admin_id: Uuid,
        resolution: &Resolution,
    ) -> Result<(), ServiceError> {
        self.log_audit_event(
            admin_id,
            "resolution_decided",
            Some(resolution.violation_id),
            None,
            Some(serde_json::json!({
                "resolution_id": resolution.id,
                "kind": resolution.kind.map(|k| k.to_str().to_string()),
                "customer_fine_amount": resolution.customer_fine_amount,
                "provider_compensation_amount": resolution.provider_compensation_amount,
            })),
            "Admin issued a binding resolution",
        )
        .await
    }

    pub async fn log_order_returned(
        &self,
        admin_id: Uuid,
        refund: &DepositRefund,
    ) -> Result<(), ServiceError> {
        self.log_audit_event(
            admin_id,
            "order_returned",
            None,
            Some(refund.id),
            Some(serde_json::json!({
                "order_id": refund.order_id,
                "original_deposit_amount": refund.original_deposit_amount,
            })),
            "Order marked returned, deposit refund opened",
        )
        .await
    }

    pub async fn log_refund_processed(
        &self,
        admin_id: Uuid,
        refund: &DepositRefund,
    ) -> Result<(), ServiceError> {
        self.log_audit_event(
            admin_id,
            "refund_processed",
            None,
            Some(refund.id),
            Some(serde_json::json!({
                "status": refund.status.to_str(),
                "refund_amount": refund.refund_amount,
                "external_transaction_ref": refund.external_transaction_ref,
            })),
            "Deposit refund processed",
        )
        .await
    }

    pub async fn log_refund_reopened(
        &self,
        admin_id: Uuid,
        refund: &DepositRefund,
    ) -> Result<(), ServiceError> {
        self.log_audit_event(
            admin_id,
            "refund_reopened",
            None,
            Some(refund.id),
            None,
            "Deposit refund reopened for reprocessing",
        )
        .await
    }

    async fn log_audit_event(
        &self,
        user_id: Uuid,
        event_type: &str,
        violation_id: Option<Uuid>,
        refund_id: Option<Uuid>,
        metadata: Option<serde_json::Value>,
        description: &str,
    ) -> Result<(), ServiceError> {
        sqlx::query(
            r#"
            INSERT INTO audit_logs
            (user_id, event_type, violation_id, refund_id, metadata, description, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW())
            "#,
        )
        .bind(user_id)
        .bind(event_type)
        .bind(violation_id)
        .bind(refund_id)
        .bind(metadata)
        .bind(description)
        .execute(&self.db_client.pool)
        .await?;

        Ok(())
    }
}
