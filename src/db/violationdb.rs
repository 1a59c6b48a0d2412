// db/violationdb.rs
use async_trait::async_trait;
use sqlx::{Error, Postgres, Transaction};
use uuid::Uuid;

use super::db::DBClient;
use crate::models::usermodel::UserRole;
use crate::models::violationmodel::*;

pub struct NewEvidence {
    pub media_url: String,
    pub uploaded_by: EvidenceUploader,
    pub media_kind: Option<String>,
}

#[async_trait]
pub trait ViolationExt {
    #[allow(clippy::too_many_arguments)]
    async fn create_violation(
        &self,
        order_item_id: Uuid,
        provider_id: Uuid,
        customer_id: Uuid,
        kind: ViolationKind,
        description: String,
        damage_percentage: Option<i32>,
        penalty_percentage: i32,
        penalty_amount: i64,
        evidence: Vec<NewEvidence>,
    ) -> Result<Violation, Error>;

    async fn add_evidence(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        violation_id: Uuid,
        evidence: Vec<NewEvidence>,
    ) -> Result<(), Error>;

    async fn get_violation_by_id(&self, violation_id: Uuid) -> Result<Option<Violation>, Error>;

    async fn get_violation_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        violation_id: Uuid,
    ) -> Result<Option<Violation>, Error>;

    async fn get_outstanding_violation_for_item(
        &self,
        order_item_id: Uuid,
    ) -> Result<Option<Violation>, Error>;

    async fn get_violations_for_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order_id: Uuid,
    ) -> Result<Vec<Violation>, Error>;

    async fn record_customer_response(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        violation_id: Uuid,
        status: ViolationStatus,
        notes: Option<String>,
    ) -> Result<Violation, Error>;

    async fn revise_violation(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        violation_id: Uuid,
        penalty_percentage: i32,
        penalty_amount: i64,
        description: Option<String>,
    ) -> Result<Violation, Error>;

    async fn record_provider_counter(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        violation_id: Uuid,
        response: String,
    ) -> Result<Violation, Error>;

    async fn record_escalation(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        violation_id: Uuid,
        by_role: UserRole,
        reason: String,
        transition: bool,
    ) -> Result<Violation, Error>;

    async fn mark_violation_resolved(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        violation_id: Uuid,
        final_penalty_amount: i64,
    ) -> Result<Violation, Error>;

    async fn get_evidence_for_violation(&self, violation_id: Uuid)
        -> Result<Vec<Evidence>, Error>;

    async fn create_resolution(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        violation_id: Uuid,
    ) -> Result<Resolution, Error>;

    async fn get_resolution_by_id(&self, resolution_id: Uuid)
        -> Result<Option<Resolution>, Error>;

    async fn get_resolution_by_violation(
        &self,
        violation_id: Uuid,
    ) -> Result<Option<Resolution>, Error>;

    async fn get_resolution_by_violation_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        violation_id: Uuid,
    ) -> Result<Option<Resolution>, Error>;

    async fn get_resolution_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        resolution_id: Uuid,
    ) -> Result<Option<Resolution>, Error>;

    #[allow(clippy::too_many_arguments)]
    async fn complete_resolution(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        resolution_id: Uuid,
        kind: ResolutionKind,
        customer_fine_amount: i64,
        provider_compensation_amount: i64,
        reason: String,
        admin_id: Uuid,
    ) -> Result<Resolution, Error>;
}

#[async_trait]
impl ViolationExt for DBClient {
    async fn create_violation(
        &self,
        order_item_id: Uuid,
        provider_id: Uuid,
        customer_id: Uuid,
        kind: ViolationKind,
        description: String,
        damage_percentage: Option<i32>,
        penalty_percentage: i32,
        penalty_amount: i64,
        evidence: Vec<NewEvidence>,
    ) -> Result<Violation, Error> {
        let mut tx = self.pool.begin().await?;

        let violation = sqlx::query_as::<_, Violation>(
            r#"
            INSERT INTO violations
            (order_item_id, provider_id, customer_id, kind, description,
             damage_percentage, penalty_percentage, penalty_amount)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(order_item_id)
        .bind(provider_id)
        .bind(customer_id)
        .bind(kind)
        .bind(description)
        .bind(damage_percentage)
        .bind(penalty_percentage)
        .bind(penalty_amount)
        .fetch_one(&mut *tx)
        .await?;

        self.add_evidence(&mut tx, violation.id, evidence).await?;

        tx.commit().await?;

        Ok(violation)
    }

    async fn add_evidence(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        violation_id: Uuid,
        evidence: Vec<NewEvidence>,
    ) -> Result<(), Error> {
        for item in evidence {
            sqlx::query(
                r#"
                INSERT INTO evidence (violation_id, media_url, uploaded_by, media_kind)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(violation_id)
            .bind(item.media_url)
            .bind(item.uploaded_by)
            .bind(item.media_kind)
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }

    async fn get_violation_by_id(&self, violation_id: Uuid) -> Result<Option<Violation>, Error> {
        sqlx::query_as::<_, Violation>("SELECT * FROM violations WHERE id = $1")
            .bind(violation_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_violation_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        violation_id: Uuid,
    ) -> Result<Option<Violation>, Error> {
        sqlx::query_as::<_, Violation>("SELECT * FROM violations WHERE id = $1 FOR UPDATE")
            .bind(violation_id)
            .fetch_optional(&mut **tx)
            .await
    }

    async fn get_outstanding_violation_for_item(
        &self,
        order_item_id: Uuid,
    ) -> Result<Option<Violation>, Error> {
        sqlx::query_as::<_, Violation>(
            r#"
            SELECT * FROM violations
            WHERE order_item_id = $1
              AND status NOT IN ('customer_accepted', 'resolved')
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(order_item_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_violations_for_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order_id: Uuid,
    ) -> Result<Vec<Violation>, Error> {
        sqlx::query_as::<_, Violation>(
            r#"
            SELECT v.* FROM violations v
            JOIN order_items oi ON v.order_item_id = oi.id
            WHERE oi.order_id = $1
            ORDER BY v.created_at ASC
            "#,
        )
        .bind(order_id)
        .fetch_all(&mut **tx)
        .await
    }

    async fn record_customer_response(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        violation_id: Uuid,
        status: ViolationStatus,
        notes: Option<String>,
    ) -> Result<Violation, Error> {
        sqlx::query_as::<_, Violation>(
            r#"
            UPDATE violations
            SET status = $2, customer_notes = $3,
                customer_responded_at = NOW(), updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(violation_id)
        .bind(status)
        .bind(notes)
        .fetch_one(&mut **tx)
        .await
    }

    async fn revise_violation(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        violation_id: Uuid,
        penalty_percentage: i32,
        penalty_amount: i64,
        description: Option<String>,
    ) -> Result<Violation, Error> {
        // Re-filing supersedes the customer's prior response
        sqlx::query_as::<_, Violation>(
            r#"
            UPDATE violations
            SET status = 'pending',
                penalty_percentage = $2,
                penalty_amount = $3,
                description = COALESCE($4, description),
                customer_notes = NULL,
                customer_responded_at = NULL,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(violation_id)
        .bind(penalty_percentage)
        .bind(penalty_amount)
        .bind(description)
        .fetch_one(&mut **tx)
        .await
    }

    async fn record_provider_counter(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        violation_id: Uuid,
        response: String,
    ) -> Result<Violation, Error> {
        sqlx::query_as::<_, Violation>(
            r#"
            UPDATE violations
            SET provider_response = $2, provider_responded_at = NOW(), updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(violation_id)
        .bind(response)
        .fetch_one(&mut **tx)
        .await
    }

    async fn record_escalation(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        violation_id: Uuid,
        by_role: UserRole,
        reason: String,
        transition: bool,
    ) -> Result<Violation, Error> {
        let sql = match (by_role, transition) {
            (UserRole::Provider, true) => {
                r#"
                UPDATE violations
                SET provider_escalation_reason = $2, status = 'escalated', updated_at = NOW()
                WHERE id = $1
                RETURNING *
                "#
            }
            (UserRole::Provider, false) => {
                r#"
                UPDATE violations
                SET provider_escalation_reason = $2, updated_at = NOW()
                WHERE id = $1
                RETURNING *
                "#
            }
            (_, true) => {
                r#"
                UPDATE violations
                SET customer_escalation_reason = $2, status = 'escalated', updated_at = NOW()
                WHERE id = $1
                RETURNING *
                "#
            }
            (_, false) => {
                r#"
                UPDATE violations
                SET customer_escalation_reason = $2, updated_at = NOW()
                WHERE id = $1
                RETURNING *
                "#
            }
        };

        sqlx::query_as::<_, Violation>(sql)
            .bind(violation_id)
            .bind(reason)
            .fetch_one(&mut **tx)
            .await
    }

    async fn mark_violation_resolved(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        violation_id: Uuid,
        final_penalty_amount: i64,
    ) -> Result<Violation, Error> {
        sqlx::query_as::<_, Violation>(
            r#"
            UPDATE violations
            SET status = 'resolved', penalty_amount = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(violation_id)
        .bind(final_penalty_amount)
        .fetch_one(&mut **tx)
        .await
    }

    async fn get_evidence_for_violation(
        &self,
        violation_id: Uuid,
    ) -> Result<Vec<Evidence>, Error> {
        sqlx::query_as::<_, Evidence>(
            "SELECT * FROM evidence WHERE violation_id = $1 ORDER BY created_at ASC",
        )
        .bind(violation_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn create_resolution(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        violation_id: Uuid,
    ) -> Result<Resolution, Error> {
        sqlx::query_as::<_, Resolution>(
            "INSERT INTO resolutions (violation_id) VALUES ($1) RETURNING *",
        )
        .bind(violation_id)
        .fetch_one(&mut **tx)
        .await
    }

    async fn get_resolution_by_id(
        &self,
        resolution_id: Uuid,
    ) -> Result<Option<Resolution>, Error> {
        sqlx::query_as::<_, Resolution>("SELECT * FROM resolutions WHERE id = $1")
            .bind(resolution_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_resolution_by_violation(
        &self,
        violation_id: Uuid,
    ) -> Result<Option<Resolution>, Error> {
        sqlx::query_as::<_, Resolution>("SELECT * FROM resolutions WHERE violation_id = $1")
            .bind(violation_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_resolution_by_violation_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        violation_id: Uuid,
    ) -> Result<Option<Resolution>, Error> {
        sqlx::query_as::<_, Resolution>("SELECT * FROM resolutions WHERE violation_id = $1")
            .bind(violation_id)
            .fetch_optional(&mut **tx)
            .await
    }

    async fn get_resolution_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        resolution_id: Uuid,
    ) -> Result<Option<Resolution>, Error> {
        sqlx::query_as::<_, Resolution>("SELECT * FROM resolutions WHERE id = $1 FOR UPDATE")
            .bind(resolution_id)
            .fetch_optional(&mut **tx)
            .await
    }

    async fn complete_resolution(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        resolution_id: Uuid,
        kind: ResolutionKind,
        customer_fine_amount: i64,
        provider_compensation_amount: i64,
        reason: String,
        admin_id: Uuid,
    ) -> Result<Resolution, Error> {
        sqlx::query_as::<_, Resolution>(
            r#"
            UPDATE resolutions
            SET status = 'completed', kind = $2,
                customer_fine_amount = $3, provider_compensation_amount = $4,
                reason = $5, admin_id = $6,
                processed_at = NOW(), updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(resolution_id)
        .bind(kind)
        .bind(customer_fine_amount)
        .bind(provider_compensation_amount)
        .bind(reason)
        .bind(admin_id)
        .fetch_one(&mut **tx)
        .await
    }
}
