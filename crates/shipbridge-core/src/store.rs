//! Persistence seam between the booking dispatcher and storage.
//!
//! The dispatcher only ever touches orders through this trait, which keeps the
//! per-order booking loop testable against an in-memory store and keeps the
//! Postgres wiring in `shipbridge-db`.

use std::collections::HashMap;

use uuid::Uuid;

use crate::order::{CityResolution, Order, ShippingProvider};

/// Storage operations the booking dispatcher needs.
///
/// `next_short_order_id` must be atomic against concurrent batch runs: two
/// simultaneous callers must never observe the same value.
#[allow(async_fn_in_trait)]
pub trait BookingStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Loads a single order, or `None` if it does not exist.
    async fn load_order(&self, order_id: Uuid) -> Result<Option<Order>, Self::Error>;

    /// Atomically increments the shared short-id counter and returns the new
    /// counter value (before the display offset is applied).
    async fn next_short_order_id(&self) -> Result<i64, Self::Error>;

    /// Persists a freshly assigned short id onto the order.
    async fn set_short_order_id(&self, order_id: Uuid, short_id: i64) -> Result<(), Self::Error>;

    /// Returns current product weights (in the configured unit) for the given
    /// product ids. Products without weight data are simply absent.
    async fn product_weights(
        &self,
        product_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, f64>, Self::Error>;

    /// Persists a city-resolution record onto the order.
    async fn save_city_resolution(
        &self,
        order_id: Uuid,
        resolution: &CityResolution,
    ) -> Result<(), Self::Error>;

    /// Persists the shipping-provider record written by a successful booking.
    async fn save_shipping_provider(
        &self,
        order_id: Uuid,
        provider: &ShippingProvider,
    ) -> Result<(), Self::Error>;
}
