//! Response shapes for the LCS API.
//!
//! The API's JSON naming varies per tenant (`CityName` vs `city_name` vs
//! `name`, `track_number` vs `trackingNumber`), so responses are parsed from
//! `serde_json::Value` checking every known variant instead of relying on a
//! single derived shape.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Numeric status the booking endpoint uses to signal acceptance.
pub const STATUS_SUCCESS: i64 = 1;

// ---------------------------------------------------------------------------
// Booking
// ---------------------------------------------------------------------------

/// Parsed response from the book-packet endpoint.
#[derive(Debug, Clone)]
pub struct BookingResponse {
    pub status: i64,
    pub tracking_number: Option<String>,
    pub consignment_no: Option<String>,
    pub slip_link: Option<String>,
    pub error: Option<String>,
    /// Full response body, kept verbatim.
    pub raw: Value,
}

impl BookingResponse {
    /// Builds a response from the raw JSON body, tolerating every known key
    /// variant.
    #[must_use]
    pub fn from_json(body: Value) -> Self {
        let status = body.get("status").map_or(0, status_as_i64);
        let tracking_number = first_string(&body, &["track_number", "trackingNumber", "tracking_number"]);
        let consignment_no =
            first_string(&body, &["cn", "consignment_no", "consignmentNo"]).or_else(|| tracking_number.clone());
        let slip_link = first_string(&body, &["slip_link", "slipLink", "label_url"]);
        let error = first_string(&body, &["error", "message", "error_msg"]);

        Self {
            status,
            tracking_number,
            consignment_no,
            slip_link,
            error,
            raw: body,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }

    /// The provider's error text, verbatim, with a fallback for responses
    /// that fail without saying why.
    #[must_use]
    pub fn error_message(&self) -> String {
        self.error
            .clone()
            .unwrap_or_else(|| format!("provider returned status {}", self.status))
    }
}

// ---------------------------------------------------------------------------
// City list
// ---------------------------------------------------------------------------

/// A courier-recognized city.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityRecord {
    pub id: i64,
    pub name: String,
    /// The provider's original entry, kept opaque.
    pub raw: Value,
}

/// Parses the city-list response body. Accepts either a bare array or an
/// object wrapping the array under `cities` / `city_list` / `data`.
/// Entries whose id or name cannot be interpreted are skipped.
#[must_use]
pub fn parse_city_list(body: &Value) -> Vec<CityRecord> {
    let entries = match body {
        Value::Array(entries) => entries.as_slice(),
        Value::Object(map) => ["cities", "city_list", "data"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_array))
            .map_or(&[][..], Vec::as_slice),
        _ => &[],
    };

    entries.iter().filter_map(parse_city_entry).collect()
}

fn parse_city_entry(entry: &Value) -> Option<CityRecord> {
    let name = first_string(entry, &["CityName", "city_name", "name"])?;
    let id = ["CityID", "city_id", "id", "CityId"]
        .iter()
        .find_map(|key| entry.get(*key))
        .and_then(value_as_i64)?;

    Some(CityRecord {
        id,
        name,
        raw: entry.clone(),
    })
}

// ---------------------------------------------------------------------------
// Tracking
// ---------------------------------------------------------------------------

/// One normalized tracking event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingEvent {
    pub date: Option<String>,
    pub status: Option<String>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub remarks: Option<String>,
}

/// Normalized tracking lookup result.
#[derive(Debug, Clone)]
pub struct TrackingResult {
    pub consignment_no: String,
    pub events: Vec<TrackingEvent>,
    /// Full response body from the combination that answered.
    pub raw: Value,
}

/// Keys under which tenants have been observed to nest the tracking-detail
/// array.
const TRACKING_DETAIL_KEYS: &[&str] = &[
    "packet_list",
    "Tracking Detail",
    "TrackingDetail",
    "tracking_detail",
    "tracking_details",
    "data",
];

/// Returns `true` when the body's success indicator is truthy.
#[must_use]
pub fn is_truthy_status(body: &Value) -> bool {
    match body.get("status") {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_i64().unwrap_or(0) != 0 || n.as_f64().unwrap_or(0.0) != 0.0,
        Some(Value::String(s)) => !matches!(s.trim(), "" | "0" | "false"),
        _ => false,
    }
}

/// Extracts and normalizes tracking events from a response body, checking
/// every known nesting key. Detail rows themselves also vary in casing.
#[must_use]
pub fn normalize_tracking_events(body: &Value) -> Vec<TrackingEvent> {
    let details = TRACKING_DETAIL_KEYS
        .iter()
        .find_map(|key| locate_detail_array(body, key));

    let Some(details) = details else {
        return Vec::new();
    };

    details
        .iter()
        .map(|row| TrackingEvent {
            date: first_string(row, &["Activity Date", "activity_date", "date", "Date"]),
            status: first_string(row, &["Status", "status", "activity", "Activity"]),
            origin: first_string(row, &["Origin", "origin", "from", "From"]),
            destination: first_string(row, &["Destination", "destination", "to", "To"]),
            remarks: first_string(row, &["Remarks", "remarks", "Reason", "reason"]),
        })
        .collect()
}

fn locate_detail_array<'a>(body: &'a Value, key: &str) -> Option<&'a Vec<Value>> {
    let value = body.get(key)?;
    if let Some(array) = value.as_array() {
        return Some(array);
    }
    // Some tenants wrap the per-packet detail one level deeper:
    // {"packet_list": [{"Tracking Detail": [...]}]}
    value
        .as_object()
        .and_then(|map| TRACKING_DETAIL_KEYS.iter().find_map(|k| map.get(*k)))
        .and_then(Value::as_array)
}

// ---------------------------------------------------------------------------
// Value helpers
// ---------------------------------------------------------------------------

fn first_string(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        value.get(*key).and_then(|v| match v {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    })
}

fn status_as_i64(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n.as_i64().unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        Value::Bool(true) => 1,
        _ => 0,
    }
}

fn value_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // -----------------------------------------------------------------------
    // BookingResponse
    // -----------------------------------------------------------------------

    #[test]
    fn booking_response_reads_snake_track_number() {
        let resp = BookingResponse::from_json(json!({
            "status": 1,
            "track_number": "LE123",
            "slip_link": "https://example.com/slip/LE123"
        }));
        assert!(resp.is_success());
        assert_eq!(resp.tracking_number.as_deref(), Some("LE123"));
        assert_eq!(resp.consignment_no.as_deref(), Some("LE123"));
        assert_eq!(
            resp.slip_link.as_deref(),
            Some("https://example.com/slip/LE123")
        );
    }

    #[test]
    fn booking_response_reads_camel_tracking_number() {
        let resp = BookingResponse::from_json(json!({
            "status": "1",
            "trackingNumber": "LE456"
        }));
        assert!(resp.is_success());
        assert_eq!(resp.tracking_number.as_deref(), Some("LE456"));
    }

    #[test]
    fn booking_response_numeric_track_number_is_stringified() {
        let resp = BookingResponse::from_json(json!({"status": 1, "track_number": 998877}));
        assert_eq!(resp.tracking_number.as_deref(), Some("998877"));
    }

    #[test]
    fn booking_response_failure_carries_error_verbatim() {
        let resp = BookingResponse::from_json(json!({
            "status": 0,
            "error": "Destination city not serviceable"
        }));
        assert!(!resp.is_success());
        assert_eq!(resp.error_message(), "Destination city not serviceable");
    }

    #[test]
    fn booking_response_failure_without_message_gets_fallback() {
        let resp = BookingResponse::from_json(json!({"status": 0}));
        assert_eq!(resp.error_message(), "provider returned status 0");
    }

    #[test]
    fn booking_response_missing_status_is_failure() {
        let resp = BookingResponse::from_json(json!({"track_number": "LE1"}));
        assert!(!resp.is_success());
    }

    // -----------------------------------------------------------------------
    // City list
    // -----------------------------------------------------------------------

    #[test]
    fn parses_bare_array_with_pascal_keys() {
        let body = json!([
            {"CityName": "Karachi", "CityID": 101},
            {"CityName": "Lahore", "CityID": 202}
        ]);
        let cities = parse_city_list(&body);
        assert_eq!(cities.len(), 2);
        assert_eq!(cities[0].name, "Karachi");
        assert_eq!(cities[0].id, 101);
    }

    #[test]
    fn parses_wrapped_array_with_snake_keys() {
        let body = json!({"cities": [{"city_name": "Multan", "city_id": "303"}]});
        let cities = parse_city_list(&body);
        assert_eq!(cities.len(), 1);
        assert_eq!(cities[0].name, "Multan");
        assert_eq!(cities[0].id, 303, "string ids are parsed");
    }

    #[test]
    fn parses_plain_name_and_id_keys() {
        let body = json!({"data": [{"name": "Quetta", "id": 404}]});
        let cities = parse_city_list(&body);
        assert_eq!(cities.len(), 1);
        assert_eq!(cities[0].name, "Quetta");
        assert_eq!(cities[0].id, 404);
    }

    #[test]
    fn skips_entries_without_resolvable_id() {
        let body = json!([
            {"CityName": "Karachi", "CityID": 101},
            {"CityName": "Nowhere"},
            {"CityID": 999}
        ]);
        let cities = parse_city_list(&body);
        assert_eq!(cities.len(), 1);
        assert_eq!(cities[0].name, "Karachi");
    }

    #[test]
    fn non_list_body_yields_empty() {
        assert!(parse_city_list(&json!("unexpected")).is_empty());
        assert!(parse_city_list(&json!({"message": "no cities"})).is_empty());
    }

    // -----------------------------------------------------------------------
    // Tracking
    // -----------------------------------------------------------------------

    #[test]
    fn truthy_status_variants() {
        assert!(is_truthy_status(&json!({"status": 1})));
        assert!(is_truthy_status(&json!({"status": "1"})));
        assert!(is_truthy_status(&json!({"status": true})));
        assert!(is_truthy_status(&json!({"status": "ok"})));
        assert!(!is_truthy_status(&json!({"status": 0})));
        assert!(!is_truthy_status(&json!({"status": "0"})));
        assert!(!is_truthy_status(&json!({"status": "false"})));
        assert!(!is_truthy_status(&json!({"status": ""})));
        assert!(!is_truthy_status(&json!({"other": 1})));
    }

    #[test]
    fn normalizes_spaced_key_tracking_detail() {
        let body = json!({
            "status": 1,
            "Tracking Detail": [
                {
                    "Activity Date": "2025-06-01",
                    "Status": "Departed",
                    "Origin": "Karachi",
                    "Destination": "Lahore",
                    "Remarks": "In transit"
                }
            ]
        });
        let events = normalize_tracking_events(&body);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].date.as_deref(), Some("2025-06-01"));
        assert_eq!(events[0].status.as_deref(), Some("Departed"));
        assert_eq!(events[0].origin.as_deref(), Some("Karachi"));
        assert_eq!(events[0].destination.as_deref(), Some("Lahore"));
        assert_eq!(events[0].remarks.as_deref(), Some("In transit"));
    }

    #[test]
    fn normalizes_snake_key_tracking_detail() {
        let body = json!({
            "status": 1,
            "tracking_details": [
                {"date": "2025-06-02", "status": "Delivered"}
            ]
        });
        let events = normalize_tracking_events(&body);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].status.as_deref(), Some("Delivered"));
        assert!(events[0].origin.is_none());
    }

    #[test]
    fn normalizes_nested_packet_list_detail() {
        let body = json!({
            "status": 1,
            "packet_list": {
                "TrackingDetail": [
                    {"Status": "Booked", "Date": "2025-06-01"}
                ]
            }
        });
        let events = normalize_tracking_events(&body);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].status.as_deref(), Some("Booked"));
        assert_eq!(events[0].date.as_deref(), Some("2025-06-01"));
    }

    #[test]
    fn missing_detail_array_yields_no_events() {
        let events = normalize_tracking_events(&json!({"status": 1}));
        assert!(events.is_empty());
    }
}
