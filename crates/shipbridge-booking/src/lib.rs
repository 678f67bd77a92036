//! Courier booking pipeline: city directory and resolution, payload mapping,
//! and the batch dispatcher that drives bookings against the LCS API.

pub mod directory;
pub mod dispatcher;
pub mod error;
pub mod mapper;
pub mod resolver;

pub use directory::CityDirectory;
pub use dispatcher::{
    BookingOutcome, Dispatcher, DispatcherSettings, OrderPushResult, PushOptions, WeightUnit,
};
pub use error::BookingError;
pub use mapper::{build_booking_fields, sanitize_description, MapperConfig};
pub use resolver::{normalize_city, CityMatch, CityResolver, CitySuggestion};
