//! HTTP client for the LCS merchant API.
//!
//! Wraps `reqwest` with LCS-specific credential handling and the fallback
//! machinery the API requires in practice: bookings are sent per
//! [`Transport`]/[`FieldDialect`] attempt, and tracking lookups enumerate
//! every known path/credential/method combination until one answers.

use std::time::Duration;

use reqwest::{Client, Url};
use tracing::{debug, info, warn};

use crate::dialect::{render_fields, BookingFields, FieldDialect};
use crate::error::LcsError;
use crate::transport::Transport;
use crate::types::{
    is_truthy_status, normalize_tracking_events, parse_city_list, BookingResponse, CityRecord,
    TrackingResult,
};

/// Production LCS host. Bookings against this host are real shipments, so
/// they are blocked unless live booking is explicitly allowed.
const LIVE_HOST: &str = "merchantapi.leopardscourier.com";

const BOOK_PATH: &str = "bookPacket/format/json";
const CITIES_PATH: &str = "getAllCities/format/json";

/// Tracking endpoints, in probe order. Older tenant deployments only answer
/// on the second path.
const TRACK_PATHS: &[&str] = &["trackBookedPacket/format/json", "getTrackingDetail/format/json"];

/// Parameter names under which tracking endpoints have been observed to read
/// the consignment number. Every attempt sends the value under all of them.
const TRACK_PARAM_NAMES: &[&str] = &["track_numbers", "track_number", "tracknumber", "cn"];

/// Credential subsets tried during tracking fallback. Some deployments reject
/// requests carrying the password, others require it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CredentialMode {
    Full,
    KeyOnly,
    None,
}

impl std::fmt::Display for CredentialMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::KeyOnly => write!(f, "key-only"),
            Self::None => write!(f, "none"),
        }
    }
}

const CREDENTIAL_MODES: &[CredentialMode] =
    &[CredentialMode::Full, CredentialMode::KeyOnly, CredentialMode::None];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HttpMethod {
    Post,
    Get,
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Post => write!(f, "POST"),
            Self::Get => write!(f, "GET"),
        }
    }
}

const HTTP_METHODS: &[HttpMethod] = &[HttpMethod::Post, HttpMethod::Get];

/// Client for the LCS merchant API.
///
/// Credentials travel in the request body (or query string for GET fallback
/// attempts), never in headers. Use [`LcsClient::new`] for production or
/// point `base_url` at a mock server in tests.
#[derive(Debug)]
pub struct LcsClient {
    client: Client,
    base_url: Url,
    api_key: String,
    api_password: String,
    allow_live_booking: bool,
}

impl LcsClient {
    /// Creates a new client.
    ///
    /// # Errors
    ///
    /// Returns [`LcsError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed, or [`LcsError::InvalidBaseUrl`] if `base_url` does not
    /// parse.
    pub fn new(
        base_url: &str,
        api_key: &str,
        api_password: &str,
        timeout_secs: u64,
        allow_live_booking: bool,
    ) -> Result<Self, LcsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("shipbridge/0.1 (courier-integration)")
            .build()?;

        // Normalise: ensure the base URL ends with exactly one slash so that
        // Url::join appends the endpoint path instead of replacing the last
        // path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| LcsError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            api_key: api_key.to_owned(),
            api_password: api_password.to_owned(),
            allow_live_booking,
        })
    }

    /// Sends one booking attempt in the given transport and dialect.
    ///
    /// This is a single wire call; walking the attempt plan and deciding when
    /// to fall back belongs to the dispatcher.
    ///
    /// # Errors
    ///
    /// - [`LcsError::LiveBookingBlocked`] if the client points at the
    ///   production host and live booking was not allowed.
    /// - [`LcsError::Http`] on network failure or non-2xx HTTP status.
    /// - [`LcsError::Deserialize`] if the response body is not JSON.
    pub async fn book_packet(
        &self,
        fields: &BookingFields,
        transport: Transport,
        dialect: FieldDialect,
    ) -> Result<BookingResponse, LcsError> {
        self.guard_live_host()?;

        let url = self.endpoint(BOOK_PATH);
        let mut pairs = render_fields(fields, dialect);
        pairs.push(("api_key".to_string(), self.api_key.clone()));
        pairs.push(("api_password".to_string(), self.api_password.clone()));

        debug!(%transport, %dialect, order_ref = %fields.order_ref, "sending booking attempt");

        let request = self.client.post(url.clone());
        let response = match transport {
            Transport::UrlEncoded => request.form(&pairs).send().await?,
            Transport::Multipart => {
                let mut form = reqwest::multipart::Form::new();
                for (name, value) in pairs {
                    form = form.text(name, value);
                }
                request.multipart(form).send().await?
            }
        };

        let response = response.error_for_status()?;
        let body = response.text().await?;
        let body = serde_json::from_str(&body).map_err(|e| LcsError::Deserialize {
            context: format!("bookPacket({transport}/{dialect})"),
            source: e,
        })?;

        Ok(BookingResponse::from_json(body))
    }

    /// Fetches the courier's full city list.
    ///
    /// # Errors
    ///
    /// - [`LcsError::Http`] on network failure or non-2xx HTTP status.
    /// - [`LcsError::Deserialize`] if the response body is not JSON.
    pub async fn fetch_cities(&self) -> Result<Vec<CityRecord>, LcsError> {
        let url = self.endpoint(CITIES_PATH);
        let creds = [
            ("api_key", self.api_key.as_str()),
            ("api_password", self.api_password.as_str()),
        ];

        let response = self.client.post(url).form(&creds).send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;
        let body: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| LcsError::Deserialize {
                context: "getAllCities".to_string(),
                source: e,
            })?;

        let cities = parse_city_list(&body);
        info!(count = cities.len(), "fetched city list");
        Ok(cities)
    }

    /// Looks up tracking events for a consignment number.
    ///
    /// The tracking surface is the least consistent part of the API, so this
    /// probes every path, credential subset, and HTTP method in a fixed order
    /// and returns the first response with a truthy status. Attempts that
    /// fail at the network level are recorded and skipped, not fatal.
    ///
    /// # Errors
    ///
    /// Returns [`LcsError::TrackingExhausted`] with the full attempt log when
    /// no combination produces a successful response.
    pub async fn track(&self, cn: &str) -> Result<TrackingResult, LcsError> {
        let mut attempts = Vec::new();

        for path in TRACK_PATHS {
            for mode in CREDENTIAL_MODES {
                for method in HTTP_METHODS {
                    let label = format!("{method} {path} creds={mode}");
                    match self.track_attempt(path, *mode, *method, cn).await {
                        Ok(body) if is_truthy_status(&body) => {
                            info!(%cn, attempt = %label, "tracking lookup succeeded");
                            let events = normalize_tracking_events(&body);
                            return Ok(TrackingResult {
                                consignment_no: cn.to_string(),
                                events,
                                raw: body,
                            });
                        }
                        Ok(_) => {
                            debug!(%cn, attempt = %label, "tracking attempt returned non-success status");
                            attempts.push(format!("{label}: non-success status"));
                        }
                        Err(e) => {
                            debug!(%cn, attempt = %label, error = %e, "tracking attempt failed");
                            attempts.push(format!("{label}: {e}"));
                        }
                    }
                }
            }
        }

        warn!(%cn, attempts = attempts.len(), "tracking lookup exhausted");
        Err(LcsError::TrackingExhausted {
            cn: cn.to_string(),
            attempts,
        })
    }

    async fn track_attempt(
        &self,
        path: &str,
        mode: CredentialMode,
        method: HttpMethod,
        cn: &str,
    ) -> Result<serde_json::Value, LcsError> {
        let mut params: Vec<(&str, &str)> = TRACK_PARAM_NAMES.iter().map(|name| (*name, cn)).collect();
        match mode {
            CredentialMode::Full => {
                params.push(("api_key", self.api_key.as_str()));
                params.push(("api_password", self.api_password.as_str()));
            }
            CredentialMode::KeyOnly => {
                params.push(("api_key", self.api_key.as_str()));
            }
            CredentialMode::None => {}
        }

        let url = self.endpoint(path);
        let response = match method {
            HttpMethod::Post => self.client.post(url).form(&params).send().await?,
            HttpMethod::Get => self.client.get(url).query(&params).send().await?,
        };

        let response = response.error_for_status()?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| LcsError::Deserialize {
            context: format!("track({path})"),
            source: e,
        })
    }

    /// Refuses to book against the production host unless explicitly allowed.
    fn guard_live_host(&self) -> Result<(), LcsError> {
        if self.allow_live_booking {
            return Ok(());
        }
        if self.base_url.host_str() == Some(LIVE_HOST) {
            return Err(LcsError::LiveBookingBlocked {
                host: LIVE_HOST.to_string(),
            });
        }
        Ok(())
    }

    fn endpoint(&self, path: &str) -> Url {
        // The base URL always ends in a slash and the paths are relative, so
        // join cannot fail here. Fall back to the base itself if it somehow
        // does rather than panicking inside a request.
        self.base_url.join(path).unwrap_or_else(|_| self.base_url.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> LcsClient {
        LcsClient::new(base_url, "key", "secret", 30, false)
            .expect("client construction should not fail")
    }

    #[test]
    fn endpoint_appends_path_to_base() {
        let client = test_client("http://127.0.0.1:9999/api/v1");
        let url = client.endpoint(BOOK_PATH);
        assert_eq!(url.as_str(), "http://127.0.0.1:9999/api/v1/bookPacket/format/json");
    }

    #[test]
    fn trailing_slash_is_collapsed() {
        let client = test_client("http://127.0.0.1:9999/api/v1///");
        let url = client.endpoint(CITIES_PATH);
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:9999/api/v1/getAllCities/format/json"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = LcsClient::new("not a url", "key", "secret", 30, false).unwrap_err();
        assert!(matches!(err, LcsError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn live_host_is_blocked_by_default() {
        let client = test_client("https://merchantapi.leopardscourier.com/api");
        let err = client.guard_live_host().unwrap_err();
        assert!(matches!(err, LcsError::LiveBookingBlocked { .. }));
    }

    #[test]
    fn live_host_allowed_when_flag_set() {
        let client = LcsClient::new(
            "https://merchantapi.leopardscourier.com/api",
            "key",
            "secret",
            30,
            true,
        )
        .expect("client construction should not fail");
        assert!(client.guard_live_host().is_ok());
    }

    #[test]
    fn staging_host_is_never_blocked() {
        let client = test_client("http://127.0.0.1:9999");
        assert!(client.guard_live_host().is_ok());
    }
}
