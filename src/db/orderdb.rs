// db/orderdb.rs
use async_trait::async_trait;
use sqlx::{Error, Postgres, Transaction};
use uuid::Uuid;

use super::db::DBClient;
use crate::models::ordermodel::{Order, OrderItem, OrderStatus};

#[async_trait]
pub trait OrderExt {
    async fn get_order_by_id(&self, order_id: Uuid) -> Result<Option<Order>, Error>;

    async fn get_order_item_by_id(&self, order_item_id: Uuid)
        -> Result<Option<OrderItem>, Error>;

    async fn get_order_items(&self, order_id: Uuid) -> Result<Vec<OrderItem>, Error>;

    async fn get_order_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order_id: Uuid,
    ) -> Result<Option<Order>, Error>;

    async fn mark_order_returned(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order_id: Uuid,
    ) -> Result<Order, Error>;
}

#[async_trait]
impl OrderExt for DBClient {
    async fn get_order_by_id(&self, order_id: Uuid) -> Result<Option<Order>, Error> {
        sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_order_item_by_id(
        &self,
        order_item_id: Uuid,
    ) -> Result<Option<OrderItem>, Error> {
        sqlx::query_as::<_, OrderItem>("SELECT * FROM order_items WHERE id = $1")
            .bind(order_item_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_order_items(&self, order_id: Uuid) -> Result<Vec<OrderItem>, Error> {
        sqlx::query_as::<_, OrderItem>(
            "SELECT * FROM order_items WHERE order_id = $1 ORDER BY created_at ASC",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_order_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order_id: Uuid,
    ) -> Result<Option<Order>, Error> {
        sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1 FOR UPDATE")
            .bind(order_id)
            .fetch_optional(&mut **tx)
            .await
    }

    async fn mark_order_returned(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order_id: Uuid,
    ) -> Result<Order, Error> {
        sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders
            SET status = $2, returned_at = NOW(), updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(order_id)
        .bind(OrderStatus::Returned)
        .fetch_one(&mut **tx)
        .await
    }
}
