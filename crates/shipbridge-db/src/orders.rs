//! Database operations for the `orders` and `products` tables.

use std::collections::HashMap;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use shipbridge_core::order::{
    CartItem, CityResolution, Order, ShippingAddress, ShippingProvider,
};

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `orders` table. Cart and the provider-extra records are
/// stored as JSONB and decoded when converting into the domain [`Order`].
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderRow {
    pub id: Uuid,
    pub short_id: Option<i64>,
    pub consignee_name: String,
    pub consignee_phone: String,
    pub address_line1: String,
    pub city: String,
    pub cart: serde_json::Value,
    pub total_price: Decimal,
    pub city_resolution: Option<serde_json::Value>,
    pub shipping_provider: Option<serde_json::Value>,
}

impl OrderRow {
    /// Decodes the JSONB columns and builds the domain order.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::MalformedJson`] if a stored JSONB value does not
    /// match the expected shape.
    pub fn into_order(self) -> Result<Order, DbError> {
        let cart: Vec<CartItem> =
            serde_json::from_value(self.cart).map_err(|e| DbError::MalformedJson {
                context: format!("orders.cart (id={})", self.id),
                source: e,
            })?;
        let city_resolution: Option<CityResolution> = self
            .city_resolution
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| DbError::MalformedJson {
                context: format!("orders.city_resolution (id={})", self.id),
                source: e,
            })?;
        let shipping_provider: Option<ShippingProvider> = self
            .shipping_provider
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| DbError::MalformedJson {
                context: format!("orders.shipping_provider (id={})", self.id),
                source: e,
            })?;

        Ok(Order {
            id: self.id,
            short_id: self.short_id,
            consignee_name: self.consignee_name,
            consignee_phone: self.consignee_phone,
            shipping_address: ShippingAddress {
                line1: self.address_line1,
                city: self.city,
            },
            cart,
            total_price: self.total_price,
            city_resolution,
            shipping_provider,
        })
    }
}

const ORDER_COLUMNS: &str = "id, short_id, consignee_name, consignee_phone, address_line1, \
                             city, cart, total_price, city_resolution, shipping_provider";

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns a single order by id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails, or [`DbError::MalformedJson`]
/// if a stored JSONB column cannot be decoded.
pub async fn get_order(pool: &PgPool, order_id: Uuid) -> Result<Option<Order>, DbError> {
    let row = sqlx::query_as::<_, OrderRow>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
    ))
    .bind(order_id)
    .fetch_optional(pool)
    .await?;

    row.map(OrderRow::into_order).transpose()
}

/// Persists a freshly assigned short id onto an order.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the order does not exist, or
/// [`DbError::Sqlx`] if the query fails (including a unique-constraint
/// violation on `short_id`).
pub async fn set_short_order_id(
    pool: &PgPool,
    order_id: Uuid,
    short_id: i64,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE orders \
         SET short_id = $1, updated_at = NOW() \
         WHERE id = $2",
    )
    .bind(short_id)
    .bind(order_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// Overwrites the order's city-resolution record.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the order does not exist, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn update_city_resolution(
    pool: &PgPool,
    order_id: Uuid,
    resolution: &CityResolution,
) -> Result<(), DbError> {
    let value = serde_json::to_value(resolution).map_err(|e| DbError::MalformedJson {
        context: format!("orders.city_resolution (id={order_id})"),
        source: e,
    })?;
    let result = sqlx::query(
        "UPDATE orders \
         SET city_resolution = $1, updated_at = NOW() \
         WHERE id = $2",
    )
    .bind(value)
    .bind(order_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// Overwrites the order's shipping-provider record.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the order does not exist, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn update_shipping_provider(
    pool: &PgPool,
    order_id: Uuid,
    provider: &ShippingProvider,
) -> Result<(), DbError> {
    let value = serde_json::to_value(provider).map_err(|e| DbError::MalformedJson {
        context: format!("orders.shipping_provider (id={order_id})"),
        source: e,
    })?;
    let result = sqlx::query(
        "UPDATE orders \
         SET shipping_provider = $1, updated_at = NOW() \
         WHERE id = $2",
    )
    .bind(value)
    .bind(order_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// Returns current product weights (in the configured storage unit) for the
/// given product ids. Products without a stored weight are omitted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn product_weights(
    pool: &PgPool,
    product_ids: &[Uuid],
) -> Result<HashMap<Uuid, f64>, DbError> {
    if product_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = sqlx::query_as::<_, (Uuid, Option<Decimal>)>(
        "SELECT id, weight FROM products WHERE id = ANY($1)",
    )
    .bind(product_ids)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(id, weight)| weight.and_then(|w| w.to_f64()).map(|w| (id, w)))
        .collect())
}
