//! Sequential batch booking against the courier.
//!
//! One order at a time: idempotency guard, short-id assignment, weight
//! computation, validation, city resolution, then the transport attempt plan.
//! A failing order is recorded in its result entry and never aborts the rest
//! of the batch.

use std::str::FromStr;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shipbridge_core::{
    AppConfig, BookingStore, CityResolution, Order, ShippingProvider, PROVIDER_LCS,
};
use shipbridge_lcs::{attempt_plan, BookingFields, FieldDialect, LcsClient};

use crate::directory::CityDirectory;
use crate::error::BookingError;
use crate::mapper::{build_booking_fields, MapperConfig};
use crate::resolver::CityResolver;

/// Offset applied to the shared counter when assigning short order ids, so
/// courier references never collide with small internal numbers.
const SHORT_ID_OFFSET: i64 = 1000;

/// Suggestions attached to an ambiguous-city failure.
const SUGGESTION_LIMIT: usize = 5;

/// Unit product weights are stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightUnit {
    Grams,
    Kilograms,
}

impl WeightUnit {
    fn grams_per_unit(self) -> f64 {
        match self {
            Self::Grams => 1.0,
            Self::Kilograms => 1000.0,
        }
    }
}

impl FromStr for WeightUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "g" => Ok(Self::Grams),
            "kg" => Ok(Self::Kilograms),
            other => Err(format!("unknown weight unit '{other}'")),
        }
    }
}

/// Behavior knobs for the dispatcher, separate from payload shaping.
#[derive(Debug, Clone)]
pub struct DispatcherSettings {
    pub dialect: FieldDialect,
    pub force_multipart: bool,
    /// Global idempotency override from config; per-batch [`PushOptions`]
    /// can also set it.
    pub force_rebook: bool,
    pub weight_unit: WeightUnit,
}

/// Per-batch options.
#[derive(Debug, Clone, Copy, Default)]
pub struct PushOptions {
    pub force_rebook: bool,
}

/// What happened to one order in a batch.
#[derive(Debug)]
pub enum BookingOutcome {
    /// Booked in this run; carries the persisted provider record.
    Booked(ShippingProvider),
    /// A prior booking blocked this push; carries the existing record.
    AlreadyBooked(ShippingProvider),
    Failed(BookingError),
}

/// One result entry per input order id, in input order.
#[derive(Debug)]
pub struct OrderPushResult {
    pub order_id: Uuid,
    pub outcome: BookingOutcome,
}

/// Books orders with the courier, one batch at a time.
pub struct Dispatcher {
    client: LcsClient,
    directory: CityDirectory,
    resolver: CityResolver,
    mapper: MapperConfig,
    settings: DispatcherSettings,
}

impl Dispatcher {
    #[must_use]
    pub fn new(
        client: LcsClient,
        directory: CityDirectory,
        resolver: CityResolver,
        mapper: MapperConfig,
        settings: DispatcherSettings,
    ) -> Self {
        Self {
            client,
            directory,
            resolver,
            mapper,
            settings,
        }
    }

    /// Wires a full dispatcher from the app config.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Transport`] if the API client cannot be
    /// constructed, or [`BookingError::Validation`] for an invalid dialect or
    /// weight unit (already rejected at config load, kept as a guard).
    pub fn from_app_config(config: &AppConfig) -> Result<Self, BookingError> {
        let client = LcsClient::new(
            &config.lcs_base_url,
            &config.lcs_api_key,
            &config.lcs_api_password,
            config.lcs_request_timeout_secs,
            config.allow_live_booking,
        )?;
        let directory = CityDirectory::from_app_config(config)?;
        let resolver = CityResolver::from_app_config(config);
        let mapper = MapperConfig::from_app_config(config);

        let dialect =
            FieldDialect::from_str(&config.field_dialect).map_err(|reason| {
                BookingError::Validation {
                    field: "field_dialect",
                    reason,
                }
            })?;
        let weight_unit =
            WeightUnit::from_str(&config.weight_unit).map_err(|reason| BookingError::Validation {
                field: "weight_unit",
                reason,
            })?;

        Ok(Self::new(
            client,
            directory,
            resolver,
            mapper,
            DispatcherSettings {
                dialect,
                force_multipart: config.force_multipart,
                force_rebook: config.force_rebook,
                weight_unit,
            },
        ))
    }

    /// Books a batch of orders sequentially.
    ///
    /// Returns one entry per input id, in input order. Per-order failures are
    /// recorded in their entry; only batch-level preconditions fail the whole
    /// call.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::EmptyBatch`] when `order_ids` is empty.
    pub async fn push_batch<S: BookingStore>(
        &self,
        store: &S,
        order_ids: &[Uuid],
        options: PushOptions,
    ) -> Result<Vec<OrderPushResult>, BookingError> {
        if order_ids.is_empty() {
            return Err(BookingError::EmptyBatch);
        }

        info!(count = order_ids.len(), "starting booking batch");
        let mut results = Vec::with_capacity(order_ids.len());
        for &order_id in order_ids {
            let outcome = match self.push_order(store, order_id, options).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(%order_id, error = %e, "order booking failed");
                    BookingOutcome::Failed(e)
                }
            };
            results.push(OrderPushResult { order_id, outcome });
        }
        Ok(results)
    }

    async fn push_order<S: BookingStore>(
        &self,
        store: &S,
        order_id: Uuid,
        options: PushOptions,
    ) -> Result<BookingOutcome, BookingError> {
        let mut order = store
            .load_order(order_id)
            .await
            .map_err(BookingError::store)?
            .ok_or(BookingError::OrderNotFound(order_id))?;

        let force_rebook = options.force_rebook || self.settings.force_rebook;
        if !force_rebook {
            if let Some(provider) = order.shipping_provider.as_ref() {
                if provider.blocks_rebooking() {
                    info!(%order_id, tracking = ?provider.tracking_ref(), "already booked, skipping");
                    return Ok(BookingOutcome::AlreadyBooked(provider.clone()));
                }
            }
        }

        if order.short_id.is_none() {
            let counter = store
                .next_short_order_id()
                .await
                .map_err(BookingError::store)?;
            let short_id = SHORT_ID_OFFSET + counter;
            store
                .set_short_order_id(order_id, short_id)
                .await
                .map_err(BookingError::store)?;
            order.short_id = Some(short_id);
            debug!(%order_id, short_id, "assigned short order id");
        }

        validate_consignee(&order)?;

        let city_id = self.resolve_city(store, &order).await?;
        let weight_override = self.cart_weight_grams(store, &order).await?;
        let fields = build_booking_fields(&order, city_id, weight_override, &self.mapper);

        let provider = self.book_with_fallback(&fields, order_id).await?;
        store
            .save_shipping_provider(order_id, &provider)
            .await
            .map_err(BookingError::store)?;

        info!(%order_id, tracking = ?provider.tracking_ref(), "order booked");
        Ok(BookingOutcome::Booked(provider))
    }

    /// Returns the destination city id, reusing any stored resolution and
    /// otherwise resolving and persisting a new one.
    async fn resolve_city<S: BookingStore>(
        &self,
        store: &S,
        order: &Order,
    ) -> Result<i64, BookingError> {
        if let Some(resolution) = order.city_resolution.as_ref() {
            debug!(
                order_id = %order.id,
                city_id = resolution.city_id,
                method = %resolution.method,
                "reusing stored city resolution"
            );
            return Ok(resolution.city_id);
        }

        let input = order.shipping_address.city.clone();
        let cities = self.directory.get_cities(false).await;
        let accepted = self
            .resolver
            .resolve(&input, &cities)
            .filter(|m| self.resolver.auto_accepts(m));

        let Some(candidate) = accepted else {
            let suggestions = self.resolver.suggest(&input, &cities, SUGGESTION_LIMIT);
            return Err(BookingError::AmbiguousCity { input, suggestions });
        };

        let resolution = CityResolution {
            city_input: input,
            city_id: candidate.city_id,
            city_name: candidate.city_name,
            method: candidate.method,
            confidence: candidate.confidence,
            resolved_at: Utc::now(),
        };
        store
            .save_city_resolution(order.id, &resolution)
            .await
            .map_err(BookingError::store)?;
        Ok(resolution.city_id)
    }

    /// Sums product weights across the cart and converts to grams. Returns
    /// `None` when no cart item has weight data.
    async fn cart_weight_grams<S: BookingStore>(
        &self,
        store: &S,
        order: &Order,
    ) -> Result<Option<i64>, BookingError> {
        let product_ids: Vec<Uuid> = order.cart.iter().filter_map(|item| item.product_id).collect();
        if product_ids.is_empty() {
            return Ok(None);
        }

        let weights = store
            .product_weights(&product_ids)
            .await
            .map_err(BookingError::store)?;

        let total: f64 = order
            .cart
            .iter()
            .filter_map(|item| {
                let weight = item.product_id.and_then(|id| weights.get(&id))?;
                Some(weight * f64::from(item.quantity))
            })
            .sum();

        if total <= 0.0 {
            return Ok(None);
        }
        #[allow(clippy::cast_possible_truncation)]
        let grams = (total * self.settings.weight_unit.grams_per_unit()).round() as i64;
        Ok(Some(grams))
    }

    /// Walks the transport attempt plan and returns the provider record from
    /// the first accepted response. Transport errors count as failed attempts
    /// so the fallback still runs.
    async fn book_with_fallback(
        &self,
        fields: &BookingFields,
        order_id: Uuid,
    ) -> Result<ShippingProvider, BookingError> {
        let plan = attempt_plan(self.settings.force_multipart, self.settings.dialect);
        let mut last_error = None;

        for (transport, dialect) in plan {
            match self.client.book_packet(fields, transport, dialect).await {
                Ok(resp) if resp.is_success() => {
                    return Ok(ShippingProvider {
                        provider: PROVIDER_LCS.to_string(),
                        pushed: true,
                        tracking_number: resp.tracking_number.clone(),
                        consignment_no: resp.consignment_no.clone(),
                        label_url: resp.slip_link.clone(),
                        extra: resp.raw,
                        pushed_at: Some(Utc::now()),
                    });
                }
                Ok(resp) => {
                    debug!(%order_id, %transport, error = %resp.error_message(), "booking attempt rejected");
                    last_error = Some(BookingError::ProviderRejection(resp.error_message()));
                }
                Err(e) => {
                    debug!(%order_id, %transport, error = %e, "booking attempt failed");
                    last_error = Some(BookingError::Transport(e));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            BookingError::ProviderRejection("no booking attempt was made".to_string())
        }))
    }
}

/// Only presence is checked here; the courier validates the shape of what it
/// is given and rejects the booking itself otherwise.
fn validate_consignee(order: &Order) -> Result<(), BookingError> {
    if order.consignee_phone.trim().is_empty() {
        return Err(BookingError::Validation {
            field: "consignee_phone",
            reason: "must not be empty".to_string(),
        });
    }

    if order.shipping_address.line1.trim().is_empty() {
        return Err(BookingError::Validation {
            field: "address",
            reason: "must not be empty".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shipbridge_core::ShippingAddress;

    fn order(phone: &str, line1: &str) -> Order {
        Order {
            id: Uuid::new_v4(),
            short_id: None,
            consignee_name: "Ayesha Khan".to_string(),
            consignee_phone: phone.to_string(),
            shipping_address: ShippingAddress {
                line1: line1.to_string(),
                city: "Lahore".to_string(),
            },
            cart: Vec::new(),
            total_price: Decimal::ZERO,
            city_resolution: None,
            shipping_provider: None,
        }
    }

    #[test]
    fn blank_phone_is_rejected() {
        let err = validate_consignee(&order("   ", "Street 4")).unwrap_err();
        assert!(matches!(
            err,
            BookingError::Validation {
                field: "consignee_phone",
                ..
            }
        ));
    }

    #[test]
    fn present_phone_passes_regardless_of_shape() {
        // Legacy records carry short or oddly formatted numbers; presence is
        // the only local requirement.
        assert!(validate_consignee(&order("12", "Street 4")).is_ok());
        assert!(validate_consignee(&order("0300-1234567", "Street 4")).is_ok());
    }

    #[test]
    fn blank_address_is_rejected() {
        let err = validate_consignee(&order("03001234567", "   ")).unwrap_err();
        assert!(matches!(
            err,
            BookingError::Validation { field: "address", .. }
        ));
    }

    #[test]
    fn weight_unit_parses_from_config_string() {
        assert_eq!("g".parse::<WeightUnit>(), Ok(WeightUnit::Grams));
        assert_eq!("kg".parse::<WeightUnit>(), Ok(WeightUnit::Kilograms));
        assert!("lb".parse::<WeightUnit>().is_err());
    }
}
