pub mod app_config;
pub mod config;
pub mod order;
pub mod store;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env, ConfigError};
pub use order::{
    CartItem, CityResolution, Order, ResolutionMethod, ShippingAddress, ShippingProvider,
    PROVIDER_LCS,
};
pub use store::BookingStore;
