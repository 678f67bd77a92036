//! Shared atomic counters.
//!
//! The short-order-id counter must never hand the same value to two
//! concurrent callers, so the increment is a single upsert statement rather
//! than a read-modify-write.

use sqlx::PgPool;

use crate::DbError;

const SHORT_ORDER_ID_COUNTER: &str = "order_short_id";

/// Atomically increments the short-order-id counter and returns the new
/// counter value. The display offset (`1000 +`) is applied by the caller.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn next_short_order_counter(pool: &PgPool) -> Result<i64, DbError> {
    let value = sqlx::query_scalar::<_, i64>(
        "INSERT INTO counters (name, value) VALUES ($1, 1) \
         ON CONFLICT (name) DO UPDATE SET value = counters.value + 1 \
         RETURNING value",
    )
    .bind(SHORT_ORDER_ID_COUNTER)
    .fetch_one(pool)
    .await?;

    Ok(value)
}
