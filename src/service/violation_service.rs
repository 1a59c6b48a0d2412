// service/violation_service.rs
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::{
        db::DBClient,
        orderdb::OrderExt,
        violationdb::{NewEvidence, ViolationExt},
    },
    dtos::violationdtos::*,
    models::{
        ordermodel::OrderStatus,
        usermodel::{User, UserRole},
        violationmodel::*,
    },
    service::{audit_service::AuditService, error::ServiceError, settlement_service::SettlementService},
    utils::currency::penalty_amount_kobo,
};

/// Allowed forward moves of the claim state machine. Everything not listed
/// here is rejected.
pub fn is_valid_transition(from: ViolationStatus, to: ViolationStatus) -> bool {
    use ViolationStatus::*;
    matches!(
        (from, to),
        (Pending, CustomerAccepted)
            | (Pending, CustomerRejected)
            | (CustomerRejected, Pending)
            | (CustomerRejected, Escalated)
            | (Escalated, Resolved)
    )
}

/// What an escalation request does in each state: `Some(true)` transitions
/// to escalated, `Some(false)` records the caller's reason only (the claim
/// is already escalated; the first escalation won the transition), `None`
/// is rejected.
pub fn escalation_effect(status: ViolationStatus) -> Option<bool> {
    match status {
        ViolationStatus::Escalated => Some(false),
        from if is_valid_transition(from, ViolationStatus::Escalated) => Some(true),
        _ => None,
    }
}

/// Filing-time consistency between the claim kind and the damage figure:
/// only damage claims carry a damage percentage.
pub fn validate_filing(
    kind: ViolationKind,
    damage_percentage: Option<i32>,
) -> Result<(), ServiceError> {
    match (kind, damage_percentage) {
        (ViolationKind::Damaged, None) => Err(ServiceError::Validation(
            "A damage claim requires a damage percentage".to_string(),
        )),
        (ViolationKind::LateReturn | ViolationKind::NotReturned, Some(_)) => {
            Err(ServiceError::Validation(
                "Damage percentage only applies to damage claims".to_string(),
            ))
        }
        _ => Ok(()),
    }
}

pub struct ViolationService {
    db_client: Arc<DBClient>,
    settlement: Arc<SettlementService>,
    audit_service: Arc<AuditService>,
}

impl ViolationService {
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

    pub async fn file_violation(
        &self,
        provider: &User,
        dto: FileViolationDto,
    ) -> Result<Violation, ServiceError> {
        validate_filing(dto.kind, dto.damage_percentage)?;

        let item = self
            .db_client
            .get_order_item_by_id(dto.order_item_id)
            .await?
            .ok_or(ServiceError::OrderItemNotFound(dto.order_item_id))?;

        if item.provider_id != provider.id {
            return Err(ServiceError::UnauthorizedOrderAccess(
                provider.id,
                item.order_id,
            ));
        }

        let order = self
            .db_client
            .get_order_by_id(item.order_id)
            .await?
            .ok_or(ServiceError::OrderNotFound(item.order_id))?;

        // Claims are only raised against returned rentals
        if order.status != OrderStatus::Returned {
            return Err(ServiceError::InvalidTransition(format!(
                "Violations can only be filed once order {} is returned (currently {:?})",
                order.id, order.status
            )));
        }

        // One live claim per item; the provider must see the first one
        // through (or revise it) before opening another.
        if let Some(existing) = self
            .db_client
            .get_outstanding_violation_for_item(item.id)
            .await?
        {
            return Err(ServiceError::Conflict(format!(
                "Order item {} already has an open violation ({})",
                item.id, existing.id
            )));
        }

        let penalty_amount =
            penalty_amount_kobo(item.deposit_per_unit, item.quantity, dto.penalty_percentage);

        let evidence = dto
            .evidence
            .into_iter()
            .map(|e| NewEvidence {
                media_url: e.media_url,
                uploaded_by: EvidenceUploader::Provider,
                media_kind: e.media_kind,
            })
            .collect();

        let violation = self
            .db_client
            .create_violation(
                item.id,
                provider.id,
                order.customer_id,
                dto.kind,
                dto.description,
                dto.damage_percentage,
                dto.penalty_percentage,
                penalty_amount,
                evidence,
            )
            .await?;

        self.audit_service
            .log_violation_filed(provider.id, &violation)
            .await?;

        tracing::info!(violation_id = %violation.id, order_item_id = %item.id, "violation filed");

        Ok(violation)
    }

    /// Customer accepts or rejects a pending claim. Acceptance is terminal
    /// and immediately feeds the order's refund, inside the same transaction.
    pub async fn respond_as_customer(
        &self,
        customer: &User,
        violation_id: Uuid,
        dto: CustomerResponseDto,
    ) -> Result<Violation, ServiceError> {
        let mut tx = self.db_client.pool.begin().await?;

        let violation = self
            .db_client
            .get_violation_for_update(&mut tx, violation_id)
            .await?
            .ok_or(ServiceError::ViolationNotFound(violation_id))?;

        if violation.customer_id != customer.id {
            return Err(ServiceError::UnauthorizedViolationAccess(
                customer.id,
                violation_id,
            ));
        }

        let target = if dto.accept {
            ViolationStatus::CustomerAccepted
        } else {
            // A rejection must say why; the notes carry the dispute forward
            if dto.notes.as_deref().map_or(true, |n| n.trim().is_empty()) {
                return Err(ServiceError::Validation(
                    "Rejecting a violation requires explanatory notes".to_string(),
                ));
            }
            ViolationStatus::CustomerRejected
        };

        if !is_valid_transition(violation.status, target) {
            return Err(ServiceError::InvalidViolationStatus(
                violation_id,
                violation.status,
            ));
        }

        if !dto.evidence.is_empty() {
            let evidence = dto
                .evidence
                .into_iter()
                .map(|e| NewEvidence {
                    media_url: e.media_url,
                    uploaded_by: EvidenceUploader::Customer,
                    media_kind: e.media_kind,
                })
                .collect();
            self.db_client
                .add_evidence(&mut tx, violation_id, evidence)
                .await?;
        }

        let updated = self
            .db_client
            .record_customer_response(&mut tx, violation_id, target, dto.notes)
            .await?;

        if dto.accept {
            let item = self
                .db_client
                .get_order_item_by_id(updated.order_item_id)
                .await?
                .ok_or(ServiceError::OrderItemNotFound(updated.order_item_id))?;
            self.settlement
                .recalculate_in_tx(&mut tx, item.order_id)
                .await?;
        }

        tx.commit().await?;

        self.audit_service
            .log_customer_response(customer.id, &updated, dto.accept)
            .await?;

        Ok(updated)
    }

    /// Provider re-files a rejected claim with a softened penalty. The claim
    /// goes back to the customer as pending; their prior response is cleared.
    pub async fn revise_claim(
        &self,
        provider: &User,
        violation_id: Uuid,
        dto: ReviseClaimDto,
    ) -> Result<Violation, ServiceError> {
        let mut tx = self.db_client.pool.begin().await?;

        let violation = self
            .db_client
            .get_violation_for_update(&mut tx, violation_id)
            .await?
            .ok_or(ServiceError::ViolationNotFound(violation_id))?;

        if violation.provider_id != provider.id {
            return Err(ServiceError::UnauthorizedViolationAccess(
                provider.id,
                violation_id,
            ));
        }

        if !is_valid_transition(violation.status, ViolationStatus::Pending) {
            return Err(ServiceError::InvalidViolationStatus(
                violation_id,
                violation.status,
            ));
        }

        let item = self
            .db_client
            .get_order_item_by_id(violation.order_item_id)
            .await?
            .ok_or(ServiceError::OrderItemNotFound(violation.order_item_id))?;

        let penalty_amount =
            penalty_amount_kobo(item.deposit_per_unit, item.quantity, dto.penalty_percentage);

        let updated = self
            .db_client
            .revise_violation(
                &mut tx,
                violation_id,
                dto.penalty_percentage,
                penalty_amount,
                dto.description,
            )
            .await?;

        tx.commit().await?;

        self.audit_service
            .log_claim_revised(provider.id, &updated)
            .await?;

        Ok(updated)
    }

    /// Provider answers the customer's rejection on the record without
    /// changing the claim's status. Usually a precursor to escalation.
    pub async fn respond_to_rejection(
        &self,
        provider: &User,
        violation_id: Uuid,
        dto: RejectionResponseDto,
    ) -> Result<Violation, ServiceError> {
        let mut tx = self.db_client.pool.begin().await?;

        let violation = self
            .db_client
            .get_violation_for_update(&mut tx, violation_id)
            .await?
            .ok_or(ServiceError::ViolationNotFound(violation_id))?;

        if violation.provider_id != provider.id {
            return Err(ServiceError::UnauthorizedViolationAccess(
                provider.id,
                violation_id,
            ));
        }

        if violation.status != ViolationStatus::CustomerRejected {
            return Err(ServiceError::InvalidViolationStatus(
                violation_id,
                violation.status,
            ));
        }

        let updated = self
            .db_client
            .record_provider_counter(&mut tx, violation_id, dto.response)
            .await?;

        tx.commit().await?;

        self.audit_service
            .log_rejection_countered(provider.id, &updated)
            .await?;

        Ok(updated)
    }

    /// Either party escalates the claim for arbitration. Escalating an
    /// already-escalated claim records the second party's reason and
    /// succeeds without a state change.
    pub async fn escalate(
        &self,
        actor: &User,
        violation_id: Uuid,
        dto: EscalateDto,
    ) -> Result<Violation, ServiceError> {
        let mut tx = self.db_client.pool.begin().await?;

        let violation = self
            .db_client
            .get_violation_for_update(&mut tx, violation_id)
            .await?
            .ok_or(ServiceError::ViolationNotFound(violation_id))?;

        let role = match actor.role {
            UserRole::Provider if violation.provider_id == actor.id => UserRole::Provider,
            UserRole::Customer if violation.customer_id == actor.id => UserRole::Customer,
            _ => {
                return Err(ServiceError::UnauthorizedViolationAccess(
                    actor.id,
                    violation_id,
                ));
            }
        };

        let transition = escalation_effect(violation.status).ok_or(
            ServiceError::InvalidViolationStatus(violation_id, violation.status),
        )?;

        let updated = self
            .db_client
            .record_escalation(&mut tx, violation_id, role, dto.reason, transition)
            .await?;

        tx.commit().await?;

        self.audit_service
            .log_escalation(actor.id, &updated, transition)
            .await?;

        Ok(updated)
    }

    pub async fn get_violation_detail(
        &self,
        user: &User,
        violation_id: Uuid,
    ) -> Result<ViolationDetailDto, ServiceError> {
        let violation = self
            .db_client
            .get_violation_by_id(violation_id)
            .await?
            .ok_or(ServiceError::ViolationNotFound(violation_id))?;

        let authorized = matches!(user.role, UserRole::Admin)
            || violation.provider_id == user.id
            || violation.customer_id == user.id;
        if !authorized {
            return Err(ServiceError::UnauthorizedViolationAccess(
                user.id,
                violation_id,
            ));
        }

        let evidence = self
            .db_client
            .get_evidence_for_violation(violation_id)
            .await?;
        let resolution = self.db_client.get_resolution_by_violation(violation_id).await?;

        Ok(ViolationDetailDto {
            violation,
            evidence,
            resolution,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATUSES: [ViolationStatus; 5] = [
        ViolationStatus::Pending,
        ViolationStatus::CustomerAccepted,
        ViolationStatus::CustomerRejected,
        ViolationStatus::Escalated,
        ViolationStatus::Resolved,
    ];

    #[test]
    fn test_pending_transitions() {
        assert!(is_valid_transition(
            ViolationStatus::Pending,
            ViolationStatus::CustomerAccepted
        ));
        assert!(is_valid_transition(
            ViolationStatus::Pending,
            ViolationStatus::CustomerRejected
        ));
        assert!(!is_valid_transition(
            ViolationStatus::Pending,
            ViolationStatus::Escalated
        ));
        assert!(!is_valid_transition(
            ViolationStatus::Pending,
            ViolationStatus::Resolved
        ));
    }

    #[test]
    fn test_rejected_transitions() {
        assert!(is_valid_transition(
            ViolationStatus::CustomerRejected,
            ViolationStatus::Pending
        ));
        assert!(is_valid_transition(
            ViolationStatus::CustomerRejected,
            ViolationStatus::Escalated
        ));
        assert!(!is_valid_transition(
            ViolationStatus::CustomerRejected,
            ViolationStatus::CustomerAccepted
        ));
    }

    #[test]
    fn test_terminal_statuses_have_no_exits() {
        for from in [ViolationStatus::CustomerAccepted, ViolationStatus::Resolved] {
            for to in ALL_STATUSES {
                assert!(
                    !is_valid_transition(from, to),
                    "{:?} -> {:?} should be rejected",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn test_escalated_only_resolves() {
        for to in ALL_STATUSES {
            let expected = to == ViolationStatus::Resolved;
            assert_eq!(is_valid_transition(ViolationStatus::Escalated, to), expected);
        }
    }

    #[test]
    fn test_no_self_transitions() {
        for status in ALL_STATUSES {
            assert!(!is_valid_transition(status, status));
        }
    }

    #[test]
    fn test_escalation_transitions_from_rejection() {
        assert_eq!(
            escalation_effect(ViolationStatus::CustomerRejected),
            Some(true)
        );
    }

    #[test]
    fn test_second_escalation_records_without_transition() {
        // The other party escalating an already-escalated claim is a no-op
        // success that still stores their reason
        assert_eq!(escalation_effect(ViolationStatus::Escalated), Some(false));
    }

    #[test]
    fn test_escalation_rejected_elsewhere() {
        for status in [
            ViolationStatus::Pending,
            ViolationStatus::CustomerAccepted,
            ViolationStatus::Resolved,
        ] {
            assert_eq!(escalation_effect(status), None, "{:?}", status);
        }
    }

    #[test]
    fn test_validate_filing_damage_requires_percentage() {
        assert!(validate_filing(ViolationKind::Damaged, Some(40)).is_ok());
        assert!(validate_filing(ViolationKind::Damaged, None).is_err());
    }

    #[test]
    fn test_validate_filing_percentage_only_for_damage() {
        assert!(validate_filing(ViolationKind::LateReturn, None).is_ok());
        assert!(validate_filing(ViolationKind::NotReturned, None).is_ok());
        assert!(validate_filing(ViolationKind::LateReturn, Some(10)).is_err());
        assert!(validate_filing(ViolationKind::NotReturned, Some(10)).is_err());
    }
}
