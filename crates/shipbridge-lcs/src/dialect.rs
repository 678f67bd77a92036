//! Field-naming dialects for the LCS booking payload.
//!
//! Different LCS tenant configurations validate against different casings of
//! the same logical fields. Rather than mutating a payload map inline, the
//! logical payload is a typed [`BookingFields`] and each dialect is a named
//! renderer producing the flat field mapping the wire format wants.

use std::str::FromStr;

use rust_decimal::Decimal;

/// The logical booking payload, independent of wire naming and encoding.
///
/// Built once per order by the payload mapper; rendered per attempt by
/// [`render_fields`]. Never persisted.
#[derive(Debug, Clone)]
pub struct BookingFields {
    pub consignee_name: String,
    pub consignee_phone: String,
    pub consignee_address: String,
    pub destination_city_id: i64,
    pub pieces: u32,
    pub weight_grams: i64,
    pub cod_amount: Decimal,
    /// Short order id when assigned, otherwise the database identifier.
    pub order_ref: String,
    pub product_description: String,
    pub special_instructions: Option<String>,
}

/// Primary field-naming convention for the booking request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDialect {
    /// snake_case names, with CamelCase duplicates appended for tenants whose
    /// validators read the other casing.
    Snake,
    /// CamelCase names only.
    Camel,
}

impl FromStr for FieldDialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "snake" => Ok(Self::Snake),
            "camel" => Ok(Self::Camel),
            other => Err(format!("unknown field dialect '{other}'")),
        }
    }
}

impl std::fmt::Display for FieldDialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Snake => write!(f, "snake"),
            Self::Camel => write!(f, "camel"),
        }
    }
}

/// Logical field names paired with their snake_case and CamelCase wire names.
const FIELD_NAMES: &[(&str, &str)] = &[
    ("consignee_name", "ConsigneeName"),
    ("consignee_phone", "ConsigneePhone"),
    ("consignee_address", "ConsigneeAddress"),
    ("destination_city", "DestinationCity"),
    ("pieces", "Pieces"),
    ("weight", "Weight"),
    ("cod_amount", "CodAmount"),
    ("order_ref", "OrderRef"),
    ("product_description", "ProductDescription"),
    ("special_instructions", "SpecialInstructions"),
];

/// Renders the strict field set for one booking attempt.
///
/// Only fields with defined, non-empty values are emitted. In the snake
/// dialect every field is emitted twice, snake_case first and then the
/// CamelCase duplicate, so that tenants validating either casing accept the
/// payload. The camel dialect emits CamelCase names only.
#[must_use]
pub fn render_fields(fields: &BookingFields, dialect: FieldDialect) -> Vec<(String, String)> {
    let values: [Option<String>; 10] = [
        non_empty(&fields.consignee_name),
        non_empty(&fields.consignee_phone),
        non_empty(&fields.consignee_address),
        Some(fields.destination_city_id.to_string()),
        Some(fields.pieces.to_string()),
        Some(fields.weight_grams.to_string()),
        Some(fields.cod_amount.to_string()),
        non_empty(&fields.order_ref),
        non_empty(&fields.product_description),
        fields
            .special_instructions
            .as_deref()
            .and_then(non_empty_str),
    ];

    let mut pairs = Vec::new();
    for ((snake, camel), value) in FIELD_NAMES.iter().zip(values) {
        let Some(value) = value else { continue };
        match dialect {
            FieldDialect::Snake => {
                pairs.push(((*snake).to_string(), value.clone()));
                pairs.push(((*camel).to_string(), value));
            }
            FieldDialect::Camel => {
                pairs.push(((*camel).to_string(), value));
            }
        }
    }
    pairs
}

fn non_empty(s: &str) -> Option<String> {
    non_empty_str(s)
}

fn non_empty_str(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_fields() -> BookingFields {
        BookingFields {
            consignee_name: "Ayesha Khan".to_string(),
            consignee_phone: "03001234567".to_string(),
            consignee_address: "House 12, Street 4".to_string(),
            destination_city_id: 101,
            pieces: 2,
            weight_grams: 400,
            cod_amount: Decimal::new(3000, 0),
            order_ref: "1042".to_string(),
            product_description: "Wireless Mouse".to_string(),
            special_instructions: None,
        }
    }

    fn lookup<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
        pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn snake_dialect_emits_both_casings() {
        let pairs = render_fields(&sample_fields(), FieldDialect::Snake);
        assert_eq!(lookup(&pairs, "consignee_name"), Some("Ayesha Khan"));
        assert_eq!(lookup(&pairs, "ConsigneeName"), Some("Ayesha Khan"));
        assert_eq!(lookup(&pairs, "weight"), Some("400"));
        assert_eq!(lookup(&pairs, "Weight"), Some("400"));
    }

    #[test]
    fn camel_dialect_emits_camel_only() {
        let pairs = render_fields(&sample_fields(), FieldDialect::Camel);
        assert_eq!(lookup(&pairs, "ConsigneeName"), Some("Ayesha Khan"));
        assert_eq!(lookup(&pairs, "consignee_name"), None);
    }

    #[test]
    fn empty_optional_fields_are_skipped() {
        let mut fields = sample_fields();
        fields.special_instructions = Some("   ".to_string());
        let pairs = render_fields(&fields, FieldDialect::Snake);
        assert_eq!(lookup(&pairs, "special_instructions"), None);
        assert_eq!(lookup(&pairs, "SpecialInstructions"), None);
    }

    #[test]
    fn special_instructions_rendered_when_set() {
        let mut fields = sample_fields();
        fields.special_instructions = Some("Call before delivery".to_string());
        let pairs = render_fields(&fields, FieldDialect::Camel);
        assert_eq!(
            lookup(&pairs, "SpecialInstructions"),
            Some("Call before delivery")
        );
    }

    #[test]
    fn dialect_parses_from_config_string() {
        assert_eq!("snake".parse::<FieldDialect>(), Ok(FieldDialect::Snake));
        assert_eq!("camel".parse::<FieldDialect>(), Ok(FieldDialect::Camel));
        assert!("pascal".parse::<FieldDialect>().is_err());
    }

    #[test]
    fn values_are_trimmed() {
        let mut fields = sample_fields();
        fields.consignee_name = "  Ayesha Khan  ".to_string();
        let pairs = render_fields(&fields, FieldDialect::Camel);
        assert_eq!(lookup(&pairs, "ConsigneeName"), Some("Ayesha Khan"));
    }
}
