//! Domain types shared across the booking pipeline.
//!
//! An [`Order`] is the unit of work for the dispatcher. The two provider-extra
//! records it carries, [`CityResolution`] and [`ShippingProvider`], are
//! persisted as JSONB on the order row and drive the idempotency and
//! resolution-reuse guarantees.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Provider tag written into [`ShippingProvider::provider`].
pub const PROVIDER_LCS: &str = "lcs";

/// An order as loaded from storage, with only the fields the booking
/// pipeline needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    /// Short human-readable reference for courier paperwork. Assigned by the
    /// dispatcher on first push; `None` until then.
    pub short_id: Option<i64>,
    pub consignee_name: String,
    pub consignee_phone: String,
    pub shipping_address: ShippingAddress,
    pub cart: Vec<CartItem>,
    pub total_price: Decimal,
    pub city_resolution: Option<CityResolution>,
    pub shipping_provider: Option<ShippingProvider>,
}

impl Order {
    /// Returns `true` when a prior booking exists that blocks re-booking
    /// without an explicit override.
    #[must_use]
    pub fn has_booking(&self) -> bool {
        self.shipping_provider
            .as_ref()
            .is_some_and(ShippingProvider::blocks_rebooking)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub line1: String,
    pub city: String,
}

/// A line item from the order's cart summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: Option<Uuid>,
    pub title: String,
    pub quantity: u32,
    pub price: Decimal,
    /// Selected variant values (e.g. `["Black", "XL"]`), in selection order.
    #[serde(default)]
    pub variant_values: Vec<String>,
}

/// How a destination city was mapped to a courier city id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionMethod {
    Exact,
    Alias,
    Fuzzy,
    Manual,
}

impl std::fmt::Display for ResolutionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::Alias => write!(f, "alias"),
            Self::Fuzzy => write!(f, "fuzzy"),
            Self::Manual => write!(f, "manual"),
        }
    }
}

/// A persisted city-resolution record attached to an order.
///
/// Once written with [`ResolutionMethod::Manual`] it is never overwritten by
/// automated resolution; the dispatcher reuses any stored record on re-runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityResolution {
    /// The free-text city string the resolution was computed from.
    pub city_input: String,
    pub city_id: i64,
    pub city_name: Option<String>,
    pub method: ResolutionMethod,
    pub confidence: f64,
    pub resolved_at: DateTime<Utc>,
}

impl CityResolution {
    /// Builds a manual (operator-supplied) resolution. Manual resolutions
    /// always carry confidence 1.0.
    #[must_use]
    pub fn manual(city_input: String, city_id: i64, city_name: Option<String>) -> Self {
        Self {
            city_input,
            city_id,
            city_name,
            method: ResolutionMethod::Manual,
            confidence: 1.0,
            resolved_at: Utc::now(),
        }
    }
}

/// The shipping-provider record written by a successful booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingProvider {
    pub provider: String,
    pub pushed: bool,
    pub tracking_number: Option<String>,
    pub consignment_no: Option<String>,
    pub label_url: Option<String>,
    /// Full provider response, kept verbatim for diagnosis.
    #[serde(default)]
    pub extra: serde_json::Value,
    pub pushed_at: Option<DateTime<Utc>>,
}

impl ShippingProvider {
    /// Whether this record blocks another booking attempt. A record counts as
    /// a booking when it is marked pushed or already carries a tracking or
    /// consignment number.
    #[must_use]
    pub fn blocks_rebooking(&self) -> bool {
        self.pushed || self.tracking_number.is_some() || self.consignment_no.is_some()
    }

    /// The best available tracking identifier for display.
    #[must_use]
    pub fn tracking_ref(&self) -> Option<&str> {
        self.tracking_number
            .as_deref()
            .or(self.consignment_no.as_deref())
    }
}
