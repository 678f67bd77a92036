use thiserror::Error;
use uuid::Uuid;

use crate::resolver::CitySuggestion;

/// Errors produced while booking a single order or a batch.
#[derive(Debug, Error)]
pub enum BookingError {
    /// The order id does not exist in storage.
    #[error("order {0} not found")]
    OrderNotFound(Uuid),

    /// A consignee field failed validation before any network call.
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// The destination city could not be resolved automatically. Carries the
    /// closest directory matches for operator review.
    #[error("could not resolve city '{input}' automatically ({} suggestions)", suggestions.len())]
    AmbiguousCity {
        input: String,
        suggestions: Vec<CitySuggestion>,
    },

    /// The courier accepted the request but rejected the booking. The message
    /// is the provider's error text, verbatim.
    #[error("provider rejected booking: {0}")]
    ProviderRejection(String),

    /// Transport-level failure talking to the courier API.
    #[error(transparent)]
    Transport(#[from] shipbridge_lcs::LcsError),

    /// Storage failure from the backing [`BookingStore`].
    ///
    /// [`BookingStore`]: shipbridge_core::BookingStore
    #[error("storage error: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// `push_batch` was called with no order ids.
    #[error("no order ids supplied")]
    EmptyBatch,
}

impl BookingError {
    /// Wraps a store error, erasing the concrete store type.
    pub fn store<E: std::error::Error + Send + Sync + 'static>(err: E) -> Self {
        Self::Store(Box::new(err))
    }
}
