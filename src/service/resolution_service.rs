// service/resolution_service.rs
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::{db::DBClient, orderdb::OrderExt, violationdb::ViolationExt},
    dtos::violationdtos::DecideResolutionDto,
    models::{
        usermodel::User,
        violationmodel::{Resolution, ResolutionKind, ResolutionStatus, ViolationStatus},
    },
    service::{
        audit_service::AuditService, error::ServiceError, settlement_service::SettlementService,
    },
    utils::currency::naira_to_kobo,
};

/// Whether a resolution in this state can still be decided. Completed
/// resolutions are immutable.
pub fn decision_allowed(status: ResolutionStatus) -> bool {
    !matches!(status, ResolutionStatus::Completed)
}

/// Monetary bounds of a resolution decision, all amounts in kobo.
/// Rejecting the claim zeroes both sides; upholding it fines exactly the
/// claimed penalty; a compromise fines anywhere up to it. Compensation to
/// the provider is free-standing but never negative.
pub fn validate_decision(
    kind: ResolutionKind,
    customer_fine: i64,
    provider_compensation: i64,
    claimed_penalty: i64,
) -> Result<(), ServiceError> {
    if customer_fine < 0 || provider_compensation < 0 {
        return Err(ServiceError::Validation(
            "Resolution amounts must not be negative".to_string(),
        ));
    }

    match kind {
        ResolutionKind::RejectClaim => {
            if customer_fine != 0 || provider_compensation != 0 {
                return Err(ServiceError::Validation(
                    "Rejecting a claim requires both amounts to be zero".to_string(),
                ));
            }
        }
        ResolutionKind::UpholdClaim => {
            if customer_fine != claimed_penalty {
                return Err(ServiceError::Validation(format!(
                    "Upholding a claim requires the fine to equal the claimed penalty ({})",
                    claimed_penalty
                )));
            }
        }
        ResolutionKind::Compromise => {
            if customer_fine > claimed_penalty {
                return Err(ServiceError::Validation(format!(
                    "A compromise fine cannot exceed the claimed penalty ({})",
                    claimed_penalty
                )));
            }
        }
    }

    Ok(())
}

pub struct ResolutionService {
    db_client: Arc<DBClient>,
    settlement: Arc<SettlementService>,
    audit_service: Arc<AuditService>,
}

impl ResolutionService {
    pub fn new(
        db_client: Arc<DBClient>,
        settlement: Arc<SettlementService>,
        audit_service: Arc<AuditService>,
    ) -> Self {
        Self {
            db_client,
            settlement,
            audit_service,
        }
    }

    /// Admin takes an escalated violation into arbitration.
    pub async fn open_resolution(
        &self,
        admin: &User,
        violation_id: Uuid,
    ) -> Result<Resolution, ServiceError> {
        let mut tx = self.db_client.pool.begin().await?;

        let violation = self
            .db_client
            .get_violation_for_update(&mut tx, violation_id)
            .await?
            .ok_or(ServiceError::ViolationNotFound(violation_id))?;

        if violation.status != ViolationStatus::Escalated {
            return Err(ServiceError::InvalidViolationStatus(
                violation_id,
                violation.status,
            ));
        }

        if let Some(existing) = self
            .db_client
            .get_resolution_by_violation_tx(&mut tx, violation_id)
            .await?
        {
            return Err(ServiceError::Conflict(format!(
                "Violation {} already has resolution {}",
                violation_id, existing.id
            )));
        }

        let resolution = self.db_client.create_resolution(&mut tx, violation_id).await?;

        tx.commit().await?;

        self.audit_service
            .log_resolution_opened(admin.id, &resolution)
            .await?;

        tracing::info!(resolution_id = %resolution.id, violation_id = %violation_id, "arbitration opened");

        Ok(resolution)
    }

    /// Issues the binding decision. The resolution completes, the violation
    /// resolves with the fine as its final penalty, and the order's refund is
    /// re-aggregated, all in one transaction.
    pub async fn decide(
        &self,
        admin: &User,
        resolution_id: Uuid,
        dto: DecideResolutionDto,
    ) -> Result<Resolution, ServiceError> {
        let mut tx = self.db_client.pool.begin().await?;

        let resolution = self
            .db_client
            .get_resolution_for_update(&mut tx, resolution_id)
            .await?
            .ok_or(ServiceError::ResolutionNotFound(resolution_id))?;

        if !decision_allowed(resolution.status) {
            return Err(ServiceError::Conflict(format!(
                "Resolution {} has already been decided",
                resolution_id
            )));
        }

        let violation = self
            .db_client
            .get_violation_for_update(&mut tx, resolution.violation_id)
            .await?
            .ok_or(ServiceError::ViolationNotFound(resolution.violation_id))?;

        if violation.status != ViolationStatus::Escalated {
            return Err(ServiceError::InvalidViolationStatus(
                violation.id,
                violation.status,
            ));
        }

        let customer_fine = naira_to_kobo(dto.customer_fine);
        let provider_compensation = naira_to_kobo(dto.provider_compensation);

        validate_decision(
            dto.kind,
            customer_fine,
            provider_compensation,
            violation.penalty_amount,
        )?;

        let completed = self
            .db_client
            .complete_resolution(
                &mut tx,
                resolution_id,
                dto.kind,
                customer_fine,
                provider_compensation,
                dto.reason,
                admin.id,
            )
            .await?;

        self.db_client
            .mark_violation_resolved(&mut tx, violation.id, customer_fine)
            .await?;

        let item = self
            .db_client
            .get_order_item_by_id(violation.order_item_id)
            .await?
            .ok_or(ServiceError::OrderItemNotFound(violation.order_item_id))?;

        self.settlement
            .recalculate_in_tx(&mut tx, item.order_id)
            .await?;

        tx.commit().await?;

        self.audit_service
            .log_resolution_decided(admin.id, &completed)
            .await?;

        tracing::info!(
            resolution_id = %resolution_id,
            violation_id = %violation.id,
            kind = dto.kind.to_str(),
            "resolution decided"
        );

        Ok(completed)
    }

    pub async fn get_resolution(
        &self,
        resolution_id: Uuid,
    ) -> Result<Resolution, ServiceError> {
        self.db_client
            .get_resolution_by_id(resolution_id)
            .await?
            .ok_or(ServiceError::ResolutionNotFound(resolution_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decide_blocked_once_completed() {
        assert!(decision_allowed(ResolutionStatus::Pending));
        assert!(decision_allowed(ResolutionStatus::UnderReview));
        assert!(!decision_allowed(ResolutionStatus::Completed));
    }

    #[test]
    fn test_reject_requires_zero_amounts() {
        assert!(validate_decision(ResolutionKind::RejectClaim, 0, 0, 300_000).is_ok());
        assert!(validate_decision(ResolutionKind::RejectClaim, 1, 0, 300_000).is_err());
        assert!(validate_decision(ResolutionKind::RejectClaim, 0, 1, 300_000).is_err());
    }

    #[test]
    fn test_uphold_fine_must_equal_penalty() {
        assert!(validate_decision(ResolutionKind::UpholdClaim, 300_000, 0, 300_000).is_ok());
        assert!(validate_decision(ResolutionKind::UpholdClaim, 299_999, 0, 300_000).is_err());
        assert!(validate_decision(ResolutionKind::UpholdClaim, 300_001, 0, 300_000).is_err());
    }

    #[test]
    fn test_compromise_fine_bounded_by_penalty() {
        assert!(validate_decision(ResolutionKind::Compromise, 0, 0, 300_000).is_ok());
        assert!(validate_decision(ResolutionKind::Compromise, 150_000, 0, 300_000).is_ok());
        assert!(validate_decision(ResolutionKind::Compromise, 300_000, 0, 300_000).is_ok());
        assert!(validate_decision(ResolutionKind::Compromise, 300_001, 0, 300_000).is_err());
    }

    #[test]
    fn test_compensation_is_independent_but_non_negative() {
        assert!(validate_decision(ResolutionKind::Compromise, 100_000, 500_000, 300_000).is_ok());
        assert!(validate_decision(ResolutionKind::Compromise, 100_000, -1, 300_000).is_err());
        assert!(validate_decision(ResolutionKind::UpholdClaim, 300_000, -1, 300_000).is_err());
    }

    #[test]
    fn test_negative_fine_rejected_for_all_kinds() {
        for kind in [
            ResolutionKind::UpholdClaim,
            ResolutionKind::RejectClaim,
            ResolutionKind::Compromise,
        ] {
            assert!(validate_decision(kind, -1, 0, 300_000).is_err());
        }
    }
}
