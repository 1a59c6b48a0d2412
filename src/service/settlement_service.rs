// service/settlement_service.rs
use std::sync::Arc;

use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    db::{db::DBClient, orderdb::OrderExt, refunddb::RefundExt, violationdb::ViolationExt},
    dtos::refunddtos::ProcessRefundDto,
    models::{
        ordermodel::{Order, OrderStatus},
        refundmodel::{DepositRefund, RefundStatus},
        usermodel::User,
        violationmodel::{Violation, ViolationStatus},
    },
    service::{
        audit_service::AuditService,
        error::ServiceError,
        payout_provider::{generate_payout_reference, PayoutRail},
    },
};

/// Refundable remainder of a deposit after penalties, floored at zero.
pub fn compute_refund(original_deposit: i64, total_penalty: i64) -> i64 {
    (original_deposit - total_penalty).max(0)
}

/// Sum of penalties that count toward settlement: violations the customer
/// accepted plus those closed by a completed resolution. Always re-derived
/// from the source rows, never accumulated, so repeated settlement runs
/// cannot double-count.
pub fn total_counted_penalty(violations: &[Violation]) -> i64 {
    violations
        .iter()
        .filter(|v| {
            matches!(
                v.status,
                ViolationStatus::CustomerAccepted | ViolationStatus::Resolved
            )
        })
        .map(|v| v.penalty_amount)
        .sum()
}

pub struct SettlementService {
    db_client: Arc<DBClient>,
    payout_rail: Arc<dyn PayoutRail>,
    audit_service: Arc<AuditService>,
}

impl SettlementService {
    pub fn new(
        db_client: Arc<DBClient>,
        payout_rail: Arc<dyn PayoutRail>,
        audit_service: Arc<AuditService>,
    ) -> Self {
        Self {
            db_client,
            payout_rail,
            audit_service,
        }
    }

    /// Marks the order returned and opens its deposit refund. Idempotent:
    /// re-running on an already-returned order just ensures the refund row
    /// exists.
    pub async fn handle_order_returned(
        &self,
        admin: &User,
        order_id: Uuid,
    ) -> Result<(Order, DepositRefund), ServiceError> {
        let mut tx = self.db_client.pool.begin().await?;

        let order = self
            .db_client
            .get_order_for_update(&mut tx, order_id)
            .await?
            .ok_or(ServiceError::OrderNotFound(order_id))?;

        let order = match order.status {
            OrderStatus::Returned => order,
            OrderStatus::Active | OrderStatus::Pending => {
                self.db_client.mark_order_returned(&mut tx, order_id).await?
            }
            other => {
                return Err(ServiceError::InvalidTransition(format!(
                    "Order {} cannot be returned from status {:?}",
                    order_id, other
                )));
            }
        };

        let violations = self
            .db_client
            .get_violations_for_order(&mut tx, order_id)
            .await?;
        let total_penalty = total_counted_penalty(&violations);
        let refund_amount = compute_refund(order.deposit_amount, total_penalty);

        let refund = self
            .db_client
            .create_refund(
                &mut tx,
                order_id,
                order.customer_id,
                order.deposit_amount,
                total_penalty,
                refund_amount,
            )
            .await?;

        tx.commit().await?;

        self.audit_service.log_order_returned(admin.id, &refund).await?;

        tracing::info!(order_id = %order_id, refund_id = %refund.id, "order returned, refund opened");

        Ok((order, refund))
    }

    /// Re-derives the order's penalty total and refundable amount from the
    /// source violations. Safe to call repeatedly; a refund that already left
    /// `initiated` is not rewritten.
    pub async fn recalculate_refund(
        &self,
        order_id: Uuid,
    ) -> Result<Option<DepositRefund>, ServiceError> {
        let mut tx = self.db_client.pool.begin().await?;
        let refund = self.recalculate_in_tx(&mut tx, order_id).await?;
        tx.commit().await?;
        Ok(refund)
    }

    pub async fn recalculate_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order_id: Uuid,
    ) -> Result<Option<DepositRefund>, ServiceError> {
        let Some(refund) = self
            .db_client
            .get_refund_by_order_for_update(tx, order_id)
            .await?
        else {
            // No refund yet means the order has not been returned; nothing to settle
            return Ok(None);
        };

        let violations = self.db_client.get_violations_for_order(tx, order_id).await?;
        let total_penalty = total_counted_penalty(&violations);
        let refund_amount = compute_refund(refund.original_deposit_amount, total_penalty);

        let updated = self
            .db_client
            .update_refund_aggregates(tx, order_id, total_penalty, refund_amount)
            .await?;

        Ok(updated.or(Some(refund)))
    }

    pub async fn process_refund(
        &self,
        admin: &User,
        dto: ProcessRefundDto,
    ) -> Result<DepositRefund, ServiceError> {
        let mut tx = self.db_client.pool.begin().await?;

        let refund = self
            .db_client
            .get_refund_for_update(&mut tx, dto.refund_id)
            .await?
            .ok_or(ServiceError::RefundNotFound(dto.refund_id))?;

        if refund.status != RefundStatus::Initiated {
            return Err(ServiceError::InvalidRefundStatus(refund.id, refund.status));
        }

        if !dto.approve {
            let notes = dto
                .notes
                .unwrap_or_else(|| "Refund rejected by admin".to_string());
            let failed = self
                .db_client
                .mark_refund_failed(&mut tx, refund.id, admin.id, dto.bank_account_id, notes)
                .await?;
            tx.commit().await?;

            self.audit_service.log_refund_processed(admin.id, &failed).await?;

            return Ok(failed);
        }

        let bank_account_id = dto.bank_account_id.ok_or_else(|| {
            ServiceError::Validation("A bank account is required to approve a refund".to_string())
        })?;

        let account = self
            .db_client
            .get_verified_bank_account(bank_account_id, refund.customer_id)
            .await?
            .ok_or(ServiceError::BankAccountNotFound(bank_account_id))?;

        let reference = generate_payout_reference(refund.id);
        let narration = format!("Deposit refund for order {}", refund.order_id);

        // The row lock stays held across the rail call so no second attempt
        // can run concurrently; the rail client's request timeout bounds how
        // long this transaction can be pinned.
        let processed = match self
            .payout_rail
            .initiate_transfer(&account, refund.refund_amount, &reference, &narration)
            .await
        {
            Ok(receipt) => {
                let notes = match (dto.notes, dto.external_transaction_ref) {
                    (Some(notes), Some(admin_ref)) => {
                        Some(format!("{} (admin ref: {})", notes, admin_ref))
                    }
                    (Some(notes), None) => Some(notes),
                    (None, Some(admin_ref)) => Some(format!("admin ref: {}", admin_ref)),
                    (None, None) => None,
                };

                self.db_client
                    .mark_refund_completed(
                        &mut tx,
                        refund.id,
                        admin.id,
                        bank_account_id,
                        receipt.external_ref,
                        notes,
                    )
                    .await?
            }
            Err(err) => {
                // Soft failure: recorded against the refund and surfaced in the
                // response body; the admin can reopen and retry.
                tracing::warn!(refund_id = %refund.id, error = %err, "payout rail call failed");
                let notes = format!("Payout failed ({}): {}", reference, err);
                self.db_client
                    .mark_refund_failed(&mut tx, refund.id, admin.id, Some(bank_account_id), notes)
                    .await?
            }
        };

        tx.commit().await?;

        self.audit_service.log_refund_processed(admin.id, &processed).await?;

        Ok(processed)
    }

    pub async fn reopen_refund(
        &self,
        admin: &User,
        refund_id: Uuid,
    ) -> Result<DepositRefund, ServiceError> {
        let mut tx = self.db_client.pool.begin().await?;

        let refund = self
            .db_client
            .get_refund_for_update(&mut tx, refund_id)
            .await?
            .ok_or(ServiceError::RefundNotFound(refund_id))?;

        if !matches!(refund.status, RefundStatus::Failed | RefundStatus::Completed) {
            return Err(ServiceError::InvalidRefundStatus(refund.id, refund.status));
        }

        let reopened = self
            .db_client
            .reopen_refund(&mut tx, refund_id, admin.id)
            .await?;

        tx.commit().await?;

        self.audit_service.log_refund_reopened(admin.id, &reopened).await?;

        Ok(reopened)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::violationmodel::ViolationKind;

    fn violation_with(status: ViolationStatus, penalty_amount: i64) -> Violation {
        Violation {
            id: Uuid::new_v4(),
            order_item_id: Uuid::new_v4(),
            provider_id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            kind: ViolationKind::Damaged,
            description: "scratched casing".to_string(),
            damage_percentage: Some(25),
            penalty_percentage: 30,
            penalty_amount,
            status,
            customer_notes: None,
            provider_response: None,
            customer_responded_at: None,
            provider_responded_at: None,
            provider_escalation_reason: None,
            customer_escalation_reason: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_compute_refund_basic() {
        assert_eq!(compute_refund(1_000_000, 300_000), 700_000);
        assert_eq!(compute_refund(1_000_000, 0), 1_000_000);
    }

    #[test]
    fn test_compute_refund_floors_at_zero() {
        assert_eq!(compute_refund(100_000, 250_000), 0);
        assert_eq!(compute_refund(0, 1), 0);
    }

    #[test]
    fn test_total_counted_penalty_filters_statuses() {
        let violations = vec![
            violation_with(ViolationStatus::CustomerAccepted, 300_000),
            violation_with(ViolationStatus::Resolved, 150_000),
            violation_with(ViolationStatus::Pending, 999_999),
            violation_with(ViolationStatus::CustomerRejected, 999_999),
            violation_with(ViolationStatus::Escalated, 999_999),
        ];
        assert_eq!(total_counted_penalty(&violations), 450_000);
    }

    #[test]
    fn test_settlement_scenario_customer_accepts() {
        // deposit 1,000,000; 30% penalty on a 1-unit item of 1,000,000 deposit
        let violations = vec![violation_with(ViolationStatus::CustomerAccepted, 300_000)];
        let total = total_counted_penalty(&violations);
        assert_eq!(total, 300_000);
        assert_eq!(compute_refund(1_000_000, total), 700_000);
    }

    #[test]
    fn test_settlement_scenario_compromise_override() {
        // Admin compromise overwrote the penalty to 150,000
        let violations = vec![violation_with(ViolationStatus::Resolved, 150_000)];
        let total = total_counted_penalty(&violations);
        assert_eq!(compute_refund(1_000_000, total), 850_000);
    }

    #[test]
    fn test_recalculation_is_idempotent() {
        let violations = vec![
            violation_with(ViolationStatus::CustomerAccepted, 200_000),
            violation_with(ViolationStatus::Resolved, 100_000),
        ];
        let first = compute_refund(1_000_000, total_counted_penalty(&violations));
        let second = compute_refund(1_000_000, total_counted_penalty(&violations));
        assert_eq!(first, second);
        assert_eq!(first, 700_000);
    }
}
