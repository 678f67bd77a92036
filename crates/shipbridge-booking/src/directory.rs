//! Cached directory of courier-recognized cities.
//!
//! The list changes rarely but the endpoint serving it is flaky, so the
//! directory keeps a TTL cache and walks a fallback chain on refresh: the
//! remote endpoint, then an env-supplied JSON override, then a bundled file.
//! Callers never see a fetch error; when every source fails the stale cache
//! is served and a warning is logged.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use shipbridge_core::AppConfig;
use shipbridge_lcs::types::parse_city_list;
use shipbridge_lcs::{CityRecord, LcsClient, LcsError};

struct CacheState {
    cities: Vec<CityRecord>,
    fetched_at: Option<Instant>,
}

/// TTL-cached city directory with a remote/env/file fallback chain.
pub struct CityDirectory {
    client: Option<LcsClient>,
    env_list_json: Option<String>,
    file_path: PathBuf,
    ttl: Duration,
    cache: RwLock<CacheState>,
}

impl CityDirectory {
    #[must_use]
    pub fn new(
        client: Option<LcsClient>,
        env_list_json: Option<String>,
        file_path: PathBuf,
        ttl_secs: u64,
    ) -> Self {
        Self {
            client,
            env_list_json,
            file_path,
            ttl: Duration::from_secs(ttl_secs),
            cache: RwLock::new(CacheState {
                cities: Vec::new(),
                fetched_at: None,
            }),
        }
    }

    /// Builds a directory with its own API client from the app config.
    ///
    /// # Errors
    ///
    /// Returns [`LcsError`] if the API client cannot be constructed.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, LcsError> {
        let client = LcsClient::new(
            &config.lcs_base_url,
            &config.lcs_api_key,
            &config.lcs_api_password,
            config.lcs_request_timeout_secs,
            config.allow_live_booking,
        )?;
        Ok(Self::new(
            Some(client),
            config.city_list_json.clone(),
            config.city_file.clone(),
            config.city_ttl_secs,
        ))
    }

    /// Builds a directory pre-seeded with a fixed city list that never
    /// expires. For tests and offline tooling.
    #[must_use]
    pub fn with_cities(cities: Vec<CityRecord>) -> Self {
        Self {
            client: None,
            env_list_json: None,
            file_path: PathBuf::new(),
            ttl: Duration::MAX,
            cache: RwLock::new(CacheState {
                cities,
                fetched_at: Some(Instant::now()),
            }),
        }
    }

    /// Returns the current city list, refreshing it when the cache is cold,
    /// expired, or `force` is set.
    ///
    /// Refreshes are not mutually exclusive; concurrent callers may fetch in
    /// parallel and the last write wins, which is harmless for a read-mostly
    /// list.
    pub async fn get_cities(&self, force: bool) -> Vec<CityRecord> {
        if !force {
            let cache = self.cache.read().await;
            let fresh = cache
                .fetched_at
                .is_some_and(|at| at.elapsed() < self.ttl);
            if fresh {
                return cache.cities.clone();
            }
        }

        match self.fetch_from_sources().await {
            Some(cities) => {
                let mut cache = self.cache.write().await;
                cache.cities = cities.clone();
                cache.fetched_at = Some(Instant::now());
                cities
            }
            None => {
                let cache = self.cache.read().await;
                warn!(
                    stale_count = cache.cities.len(),
                    "all city sources failed, serving stale cache"
                );
                cache.cities.clone()
            }
        }
    }

    /// Walks the source chain and returns the first non-empty list.
    async fn fetch_from_sources(&self) -> Option<Vec<CityRecord>> {
        if let Some(client) = &self.client {
            match client.fetch_cities().await {
                Ok(cities) if !cities.is_empty() => return Some(cities),
                Ok(_) => debug!("remote city list was empty"),
                Err(e) => warn!(error = %e, "remote city fetch failed"),
            }
        }

        if let Some(json) = &self.env_list_json {
            match parse_json_list(json) {
                Some(cities) => {
                    info!(count = cities.len(), "loaded city list from env override");
                    return Some(cities);
                }
                None => warn!("env city list override did not parse to a non-empty list"),
            }
        }

        match std::fs::read_to_string(&self.file_path) {
            Ok(contents) => match parse_json_list(&contents) {
                Some(cities) => {
                    info!(
                        count = cities.len(),
                        path = %self.file_path.display(),
                        "loaded city list from file"
                    );
                    Some(cities)
                }
                None => {
                    warn!(path = %self.file_path.display(), "city file did not parse to a non-empty list");
                    None
                }
            },
            Err(e) => {
                warn!(path = %self.file_path.display(), error = %e, "city file unreadable");
                None
            }
        }
    }
}

fn parse_json_list(json: &str) -> Option<Vec<CityRecord>> {
    let value: serde_json::Value = serde_json::from_str(json).ok()?;
    let cities = parse_city_list(&value);
    if cities.is_empty() {
        None
    } else {
        Some(cities)
    }
}
