//! HTTP client for the LCS courier API.
//!
//! The LCS API is loosely specified and inconsistently cased across tenant
//! configurations, so this crate deals in explicit fallbacks rather than a
//! single happy path: booking payloads can be rendered in two field-naming
//! dialects ([`dialect`]) and sent over two transport encodings
//! ([`transport`]), and tracking lookups enumerate every known
//! path/credential/method combination until one answers.

pub mod client;
pub mod dialect;
pub mod error;
pub mod transport;
pub mod types;

pub use client::LcsClient;
pub use dialect::{render_fields, BookingFields, FieldDialect};
pub use error::LcsError;
pub use transport::{attempt_plan, Transport};
pub use types::{BookingResponse, CityRecord, TrackingEvent, TrackingResult};
