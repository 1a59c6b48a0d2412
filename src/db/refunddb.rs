// db/refunddb.rs
use async_trait::async_trait;
use sqlx::{Error, Postgres, Transaction};
use uuid::Uuid;

use super::db::DBClient;
use crate::models::refundmodel::{BankAccount, DepositRefund, RefundStatus};

#[async_trait]
pub trait RefundExt {
    async fn create_refund(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order_id: Uuid,
        customer_id: Uuid,
        original_deposit_amount: i64,
        total_penalty_amount: i64,
        refund_amount: i64,
    ) -> Result<DepositRefund, Error>;

    async fn get_refund_by_id(&self, refund_id: Uuid) -> Result<Option<DepositRefund>, Error>;

    async fn get_refund_by_order(&self, order_id: Uuid) -> Result<Option<DepositRefund>, Error>;

    async fn get_refund_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        refund_id: Uuid,
    ) -> Result<Option<DepositRefund>, Error>;

    async fn get_refund_by_order_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order_id: Uuid,
    ) -> Result<Option<DepositRefund>, Error>;

    async fn list_refunds(
        &self,
        page: u32,
        limit: u32,
        status: Option<RefundStatus>,
    ) -> Result<Vec<DepositRefund>, Error>;

    async fn count_refunds(&self, status: Option<RefundStatus>) -> Result<i64, Error>;

    async fn update_refund_aggregates(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order_id: Uuid,
        total_penalty_amount: i64,
        refund_amount: i64,
    ) -> Result<Option<DepositRefund>, Error>;

    #[allow(clippy::too_many_arguments)]
    async fn mark_refund_completed(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        refund_id: Uuid,
        admin_id: Uuid,
        bank_account_id: Uuid,
        external_transaction_ref: String,
        notes: Option<String>,
    ) -> Result<DepositRefund, Error>;

    async fn mark_refund_failed(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        refund_id: Uuid,
        admin_id: Uuid,
        bank_account_id: Option<Uuid>,
        notes: String,
    ) -> Result<DepositRefund, Error>;

    async fn reopen_refund(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        refund_id: Uuid,
        admin_id: Uuid,
    ) -> Result<DepositRefund, Error>;

    async fn get_verified_bank_account(
        &self,
        account_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<BankAccount>, Error>;
}

#[async_trait]
impl RefundExt for DBClient {
    async fn create_refund(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order_id: Uuid,
        customer_id: Uuid,
        original_deposit_amount: i64,
        total_penalty_amount: i64,
        refund_amount: i64,
    ) -> Result<DepositRefund, Error> {
        // One refund per order; a second call returns the existing row
        let inserted = sqlx::query_as::<_, DepositRefund>(
            r#"
            INSERT INTO deposit_refunds
            (order_id, customer_id, original_deposit_amount, total_penalty_amount, refund_amount)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (order_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(order_id)
        .bind(customer_id)
        .bind(original_deposit_amount)
        .bind(total_penalty_amount)
        .bind(refund_amount)
        .fetch_optional(&mut **tx)
        .await?;

        if let Some(refund) = inserted {
            return Ok(refund);
        }

        sqlx::query_as::<_, DepositRefund>("SELECT * FROM deposit_refunds WHERE order_id = $1")
            .bind(order_id)
            .fetch_one(&mut **tx)
            .await
    }

    async fn get_refund_by_id(&self, refund_id: Uuid) -> Result<Option<DepositRefund>, Error> {
        sqlx::query_as::<_, DepositRefund>("SELECT * FROM deposit_refunds WHERE id = $1")
            .bind(refund_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_refund_by_order(&self, order_id: Uuid) -> Result<Option<DepositRefund>, Error> {
        sqlx::query_as::<_, DepositRefund>("SELECT * FROM deposit_refunds WHERE order_id = $1")
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_refund_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        refund_id: Uuid,
    ) -> Result<Option<DepositRefund>, Error> {
        sqlx::query_as::<_, DepositRefund>(
            "SELECT * FROM deposit_refunds WHERE id = $1 FOR UPDATE",
        )
        .bind(refund_id)
        .fetch_optional(&mut **tx)
        .await
    }

    async fn get_refund_by_order_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order_id: Uuid,
    ) -> Result<Option<DepositRefund>, Error> {
        sqlx::query_as::<_, DepositRefund>(
            "SELECT * FROM deposit_refunds WHERE order_id = $1 FOR UPDATE",
        )
        .bind(order_id)
        .fetch_optional(&mut **tx)
        .await
    }

    async fn list_refunds(
        &self,
        page: u32,
        limit: u32,
        status: Option<RefundStatus>,
    ) -> Result<Vec<DepositRefund>, Error> {
        let offset = (page.saturating_sub(1)) as i64 * limit as i64;

        if let Some(status) = status {
            sqlx::query_as::<_, DepositRefund>(
                r#"
                SELECT * FROM deposit_refunds
                WHERE status = $1
                ORDER BY created_at DESC LIMIT $2 OFFSET $3
                "#,
            )
            .bind(status)
            .bind(limit as i64)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
        } else {
            sqlx::query_as::<_, DepositRefund>(
                "SELECT * FROM deposit_refunds ORDER BY created_at DESC LIMIT $1 OFFSET $2",
            )
            .bind(limit as i64)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
        }
    }

    async fn count_refunds(&self, status: Option<RefundStatus>) -> Result<i64, Error> {
        if let Some(status) = status {
            sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM deposit_refunds WHERE status = $1",
            )
            .bind(status)
            .fetch_one(&self.pool)
            .await
        } else {
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM deposit_refunds")
                .fetch_one(&self.pool)
                .await
        }
    }

    async fn update_refund_aggregates(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order_id: Uuid,
        total_penalty_amount: i64,
        refund_amount: i64,
    ) -> Result<Option<DepositRefund>, Error> {
        // Aggregates only move while the refund has not been paid out
        sqlx::query_as::<_, DepositRefund>(
            r#"
            UPDATE deposit_refunds
            SET total_penalty_amount = $2, refund_amount = $3, updated_at = NOW()
            WHERE order_id = $1 AND status = 'initiated'
            RETURNING *
            "#,
        )
        .bind(order_id)
        .bind(total_penalty_amount)
        .bind(refund_amount)
        .fetch_optional(&mut **tx)
        .await
    }

    async fn mark_refund_completed(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        refund_id: Uuid,
        admin_id: Uuid,
        bank_account_id: Uuid,
        external_transaction_ref: String,
        notes: Option<String>,
    ) -> Result<DepositRefund, Error> {
        sqlx::query_as::<_, DepositRefund>(
            r#"
            UPDATE deposit_refunds
            SET status = 'completed', processed_by = $2, bank_account_id = $3,
                external_transaction_ref = $4, notes = COALESCE($5, notes),
                processed_at = NOW(), updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(refund_id)
        .bind(admin_id)
        .bind(bank_account_id)
        .bind(external_transaction_ref)
        .bind(notes)
        .fetch_one(&mut **tx)
        .await
    }

    async fn mark_refund_failed(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        refund_id: Uuid,
        admin_id: Uuid,
        bank_account_id: Option<Uuid>,
        notes: String,
    ) -> Result<DepositRefund, Error> {
        sqlx::query_as::<_, DepositRefund>(
            r#"
            UPDATE deposit_refunds
            SET status = 'failed', processed_by = $2,
                bank_account_id = COALESCE($3, bank_account_id), notes = $4,
                processed_at = NOW(), updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(refund_id)
        .bind(admin_id)
        .bind(bank_account_id)
        .bind(notes)
        .fetch_one(&mut **tx)
        .await
    }

    async fn reopen_refund(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        refund_id: Uuid,
        admin_id: Uuid,
    ) -> Result<DepositRefund, Error> {
        // The sole backward transition; amounts are left untouched
        sqlx::query_as::<_, DepositRefund>(
            r#"
            UPDATE deposit_refunds
            SET status = 'initiated', processed_by = $2,
                external_transaction_ref = NULL, processed_at = NULL, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(refund_id)
        .bind(admin_id)
        .fetch_one(&mut **tx)
        .await
    }

    async fn get_verified_bank_account(
        &self,
        account_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<BankAccount>, Error> {
        sqlx::query_as::<_, BankAccount>(
            "SELECT * FROM bank_accounts WHERE id = $1 AND user_id = $2 AND is_verified = true",
        )
        .bind(account_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }
}
