use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub log_level: String,

    // Courier credentials and endpoint.
    pub lcs_base_url: String,
    pub lcs_api_key: String,
    pub lcs_api_password: String,
    pub lcs_request_timeout_secs: u64,
    /// Must be set explicitly before bookings against the live LCS host are
    /// allowed through.
    pub allow_live_booking: bool,

    // Booking behavior.
    pub force_prepaid: bool,
    pub force_multipart: bool,
    pub force_rebook: bool,
    /// Primary field-naming dialect: `"snake"` or `"camel"`.
    pub field_dialect: String,

    // City resolution.
    pub city_auto_map: bool,
    pub city_min_confidence: f64,
    /// Operator alias map: free-text city name -> courier city id.
    pub city_aliases: HashMap<String, i64>,
    /// Raw JSON city list overriding the remote directory, if set.
    pub city_list_json: Option<String>,
    pub city_file: PathBuf,
    pub city_ttl_secs: u64,

    // Payload shaping.
    pub default_weight_grams: i64,
    /// Unit product weights are stored in: `"g"` or `"kg"`.
    pub weight_unit: String,
    pub max_description_len: usize,
    pub include_variants: bool,
    pub default_description: Option<String>,

    // Database pool.
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("database_url", &"[redacted]")
            .field("log_level", &self.log_level)
            .field("lcs_base_url", &self.lcs_base_url)
            .field("lcs_api_key", &"[redacted]")
            .field("lcs_api_password", &"[redacted]")
            .field("lcs_request_timeout_secs", &self.lcs_request_timeout_secs)
            .field("allow_live_booking", &self.allow_live_booking)
            .field("force_prepaid", &self.force_prepaid)
            .field("force_multipart", &self.force_multipart)
            .field("force_rebook", &self.force_rebook)
            .field("field_dialect", &self.field_dialect)
            .field("city_auto_map", &self.city_auto_map)
            .field("city_min_confidence", &self.city_min_confidence)
            .field("city_aliases", &self.city_aliases)
            .field("city_list_json", &self.city_list_json.as_ref().map(|_| "[set]"))
            .field("city_file", &self.city_file)
            .field("city_ttl_secs", &self.city_ttl_secs)
            .field("default_weight_grams", &self.default_weight_grams)
            .field("weight_unit", &self.weight_unit)
            .field("max_description_len", &self.max_description_len)
            .field("include_variants", &self.include_variants)
            .field("default_description", &self.default_description)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .finish()
    }
}
