use thiserror::Error;

/// Errors returned by the LCS API client.
#[derive(Debug, Error)]
pub enum LcsError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The configured base URL could not be parsed.
    #[error("invalid LCS base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// Booking against the live LCS host was attempted without the explicit
    /// allow flag.
    #[error("booking against live host '{host}' blocked; set SHIPBRIDGE_ALLOW_LIVE_BOOKING to enable")]
    LiveBookingBlocked { host: String },

    /// The response body could not be parsed as JSON.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Every tracking path/credential/method combination was tried and none
    /// returned a successful response. The attempt log carries one line per
    /// combination, with credentials redacted.
    #[error("tracking lookup exhausted {} attempts for {cn}", attempts.len())]
    TrackingExhausted { cn: String, attempts: Vec<String> },
}
