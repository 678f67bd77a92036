//! Postgres-backed implementation of the dispatcher's persistence seam.

use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use shipbridge_core::order::{CityResolution, Order, ShippingProvider};
use shipbridge_core::store::BookingStore;

use crate::{counters, orders, DbError};

/// [`BookingStore`] backed by the Postgres pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl BookingStore for PgStore {
    type Error = DbError;

    async fn load_order(&self, order_id: Uuid) -> Result<Option<Order>, DbError> {
        orders::get_order(&self.pool, order_id).await
    }

    async fn next_short_order_id(&self) -> Result<i64, DbError> {
        counters::next_short_order_counter(&self.pool).await
    }

    async fn set_short_order_id(&self, order_id: Uuid, short_id: i64) -> Result<(), DbError> {
        orders::set_short_order_id(&self.pool, order_id, short_id).await
    }

    async fn product_weights(&self, product_ids: &[Uuid]) -> Result<HashMap<Uuid, f64>, DbError> {
        orders::product_weights(&self.pool, product_ids).await
    }

    async fn save_city_resolution(
        &self,
        order_id: Uuid,
        resolution: &CityResolution,
    ) -> Result<(), DbError> {
        orders::update_city_resolution(&self.pool, order_id, resolution).await
    }

    async fn save_shipping_provider(
        &self,
        order_id: Uuid,
        provider: &ShippingProvider,
    ) -> Result<(), DbError> {
        orders::update_shipping_provider(&self.pool, order_id, provider).await
    }
}
