//! Builds the logical booking payload from an order.
//!
//! Pure functions only; everything that needs storage or the network stays in
//! the dispatcher. The description pipeline exists because courier-side
//! validators reject storefront titles full of promo markup, so titles are
//! sanitized into plain label text before they go on an airway bill.

use regex::Regex;
use rust_decimal::Decimal;

use shipbridge_core::{AppConfig, Order};
use shipbridge_lcs::BookingFields;

/// Description fallback when the cart yields no usable title and no default
/// is configured.
const FALLBACK_DESCRIPTION: &str = "Item";

/// At most this many cart titles are joined into the description candidate.
const MAX_TITLES: usize = 3;

/// At most this many variant values are appended as a snippet.
const MAX_VARIANT_VALUES: usize = 2;

/// Promo words stripped from descriptions, matched whole-word and
/// case-insensitively.
const BUZZWORDS: &[&str] = &[
    "sale", "hot", "new", "offer", "deal", "discount", "free", "limited", "trending", "best",
];

/// Payload-shaping knobs, extracted from [`AppConfig`] so the mapper stays
/// usable without a full config in tests.
#[derive(Debug, Clone)]
pub struct MapperConfig {
    pub force_prepaid: bool,
    pub default_weight_grams: i64,
    pub max_description_len: usize,
    pub include_variants: bool,
    pub default_description: Option<String>,
}

impl MapperConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            force_prepaid: config.force_prepaid,
            default_weight_grams: config.default_weight_grams,
            max_description_len: config.max_description_len,
            include_variants: config.include_variants,
            default_description: config.default_description.clone(),
        }
    }
}

/// Maps an order to the logical booking payload.
///
/// `weight_override_grams` is the computed cart weight when product weight
/// data exists; non-positive or absent overrides fall back to the configured
/// default.
#[must_use]
pub fn build_booking_fields(
    order: &Order,
    destination_city_id: i64,
    weight_override_grams: Option<i64>,
    config: &MapperConfig,
) -> BookingFields {
    let pieces = order
        .cart
        .iter()
        .map(|item| item.quantity)
        .sum::<u32>()
        .max(1);

    let cod_amount = if config.force_prepaid {
        Decimal::ZERO
    } else {
        order.total_price
    };

    let weight_grams = weight_override_grams
        .filter(|w| *w > 0)
        .unwrap_or(config.default_weight_grams);

    let order_ref = order
        .short_id
        .map_or_else(|| order.id.to_string(), |id| id.to_string());

    let consignee_address = if order.shipping_address.city.trim().is_empty() {
        order.shipping_address.line1.trim().to_string()
    } else {
        format!(
            "{}, {}",
            order.shipping_address.line1.trim(),
            order.shipping_address.city.trim()
        )
    };

    BookingFields {
        consignee_name: order.consignee_name.trim().to_string(),
        consignee_phone: order.consignee_phone.trim().to_string(),
        consignee_address,
        destination_city_id,
        pieces,
        weight_grams,
        cod_amount,
        order_ref,
        product_description: product_description(order, config),
        special_instructions: None,
    }
}

/// Builds the courier-facing product description for an order.
///
/// Candidate text is the first item's title; when that is empty, up to three
/// non-empty cart titles comma-joined; then the configured default; then a
/// fixed fallback. The candidate is sanitized, optionally suffixed with a
/// variant snippet, title-cased, and truncated.
#[must_use]
pub fn product_description(order: &Order, config: &MapperConfig) -> String {
    let first_title = order
        .cart
        .first()
        .map(|item| item.title.trim())
        .filter(|t| !t.is_empty());

    let candidate = if let Some(title) = first_title {
        title.to_string()
    } else {
        let titles: Vec<&str> = order
            .cart
            .iter()
            .map(|item| item.title.trim())
            .filter(|t| !t.is_empty())
            .take(MAX_TITLES)
            .collect();
        if titles.is_empty() {
            config
                .default_description
                .clone()
                .unwrap_or_else(|| FALLBACK_DESCRIPTION.to_string())
        } else {
            titles.join(", ")
        }
    };

    let mut description = sanitize_description(&candidate);
    if description.is_empty() {
        description = config
            .default_description
            .clone()
            .unwrap_or_else(|| FALLBACK_DESCRIPTION.to_string());
    }

    if config.include_variants {
        if let Some(snippet) = variant_snippet(order) {
            description = format!("{description} \u{b7} {snippet}");
        }
    }

    truncate_chars(&title_case(&description), config.max_description_len)
}

/// Reduces a storefront title to plain label text.
///
/// Bracketed segments go first, then everything outside a small safe charset,
/// then promo buzzwords and SKU-looking tokens, then punctuation and
/// whitespace runs are collapsed. Running the sanitizer on its own output is
/// a no-op.
#[must_use]
pub fn sanitize_description(raw: &str) -> String {
    let brackets = Regex::new(r"[\[({][^\])}]*[\])}]").expect("valid regex");
    let charset = Regex::new(r"[^A-Za-z0-9 &+,.\-]").expect("valid regex");
    let punct_runs = Regex::new(r"[,.\-]{2,}").expect("valid regex");

    let text = brackets.replace_all(raw, " ");
    let text = charset.replace_all(&text, " ");

    let kept: Vec<&str> = text
        .split_whitespace()
        .filter(|token| !is_buzzword(token) && !looks_like_sku(token))
        .collect();
    let text = kept.join(" ");

    let text = punct_runs.replace_all(&text, ",");
    text.trim_matches(|c: char| c.is_whitespace() || matches!(c, ',' | '.' | '-'))
        .to_string()
}

fn is_buzzword(token: &str) -> bool {
    let word = token.trim_matches(|c: char| !c.is_alphanumeric());
    BUZZWORDS.iter().any(|b| word.eq_ignore_ascii_case(b))
}

/// A token reads as a SKU when it is long enough and mixes letters with
/// digits, e.g. `WM-9042B`.
fn looks_like_sku(token: &str) -> bool {
    let word = token.trim_matches(|c: char| !c.is_alphanumeric());
    word.len() >= 5
        && word.chars().any(|c| c.is_ascii_alphabetic())
        && word.chars().any(|c| c.is_ascii_digit())
}

fn variant_snippet(order: &Order) -> Option<String> {
    let values: Vec<&str> = order
        .cart
        .first()?
        .variant_values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .take(MAX_VARIANT_VALUES)
        .collect();

    if values.is_empty() {
        None
    } else {
        Some(values.join("/"))
    }
}

fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn truncate_chars(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    text.chars().take(max_len).collect::<String>().trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shipbridge_core::{CartItem, ShippingAddress};
    use uuid::Uuid;

    fn item(title: &str, quantity: u32, price: i64) -> CartItem {
        CartItem {
            product_id: Some(Uuid::new_v4()),
            title: title.to_string(),
            quantity,
            price: Decimal::new(price, 0),
            variant_values: Vec::new(),
        }
    }

    fn order(cart: Vec<CartItem>, total: i64) -> Order {
        Order {
            id: Uuid::new_v4(),
            short_id: Some(1042),
            consignee_name: "Ayesha Khan".to_string(),
            consignee_phone: "03001234567".to_string(),
            shipping_address: ShippingAddress {
                line1: "House 12, Street 4".to_string(),
                city: "Lahore".to_string(),
            },
            cart,
            total_price: Decimal::new(total, 0),
            city_resolution: None,
            shipping_provider: None,
        }
    }

    fn config() -> MapperConfig {
        MapperConfig {
            force_prepaid: false,
            default_weight_grams: 1000,
            max_description_len: 100,
            include_variants: false,
            default_description: None,
        }
    }

    #[test]
    fn promo_title_reduces_to_plain_description() {
        let o = order(vec![item("Wireless Mouse [Sale!]", 1, 2999)], 2999);
        let fields = build_booking_fields(&o, 202, Some(400), &config());
        assert_eq!(fields.product_description, "Wireless Mouse");
        assert_eq!(fields.weight_grams, 400);
        assert_eq!(fields.pieces, 1);
        assert_eq!(fields.cod_amount, Decimal::new(2999, 0));
        assert_eq!(fields.order_ref, "1042");
        assert_eq!(fields.consignee_address, "House 12, Street 4, Lahore");
    }

    #[test]
    fn sanitizer_is_idempotent() {
        let samples = [
            "Wireless Mouse [Sale!] {HOT} WM-9042B ~~ NEW ~~",
            "USB-C Cable (2m) ... best DEAL!!",
            "Plain Cotton Shirt",
        ];
        for raw in samples {
            let once = sanitize_description(raw);
            let twice = sanitize_description(&once);
            assert_eq!(once, twice, "sanitize not idempotent for {raw:?}");
        }
    }

    #[test]
    fn sku_tokens_and_buzzwords_are_stripped() {
        assert_eq!(
            sanitize_description("Gaming Keyboard KB-5521X hot sale"),
            "Gaming Keyboard"
        );
    }

    #[test]
    fn short_mixed_tokens_survive() {
        // "4K" and "M2" are product language, not SKUs.
        assert_eq!(sanitize_description("4K Monitor M2"), "4K Monitor M2");
    }

    #[test]
    fn first_title_used_alone_for_multi_item_cart() {
        let o = order(
            vec![
                item("Mouse", 1, 10),
                item("Keyboard", 1, 20),
                item("Headset", 1, 30),
            ],
            60,
        );
        let desc = product_description(&o, &config());
        assert_eq!(desc, "Mouse");
    }

    #[test]
    fn titles_joined_up_to_three_when_first_is_blank() {
        let o = order(
            vec![
                item("   ", 1, 10),
                item("Keyboard", 1, 20),
                item("Headset", 1, 30),
                item("Webcam", 1, 40),
                item("Hub", 1, 50),
            ],
            150,
        );
        let desc = product_description(&o, &config());
        assert_eq!(desc, "Keyboard, Headset, Webcam");
    }

    #[test]
    fn empty_cart_uses_default_then_fallback() {
        let o = order(Vec::new(), 0);
        assert_eq!(product_description(&o, &config()), "Item");

        let cfg = MapperConfig {
            default_description: Some("General Merchandise".to_string()),
            ..config()
        };
        assert_eq!(product_description(&o, &cfg), "General Merchandise");
    }

    #[test]
    fn variant_snippet_limited_to_two_values() {
        let mut o = order(vec![item("Shirt", 1, 500)], 500);
        o.cart[0].variant_values =
            vec!["Black".to_string(), "XL".to_string(), "Cotton".to_string()];
        let cfg = MapperConfig {
            include_variants: true,
            ..config()
        };
        assert_eq!(product_description(&o, &cfg), "Shirt \u{b7} Black/xl");
    }

    #[test]
    fn description_truncated_to_max_chars() {
        let o = order(vec![item(&"Very Long Product Name ".repeat(10), 1, 10)], 10);
        let cfg = MapperConfig {
            max_description_len: 20,
            ..config()
        };
        let desc = product_description(&o, &cfg);
        assert!(desc.chars().count() <= 20, "got {desc:?}");
    }

    #[test]
    fn pieces_sum_quantities_with_floor_of_one() {
        let o = order(vec![item("Mouse", 2, 10), item("Pad", 3, 5)], 45);
        let fields = build_booking_fields(&o, 1, None, &config());
        assert_eq!(fields.pieces, 5);

        let empty = order(Vec::new(), 0);
        let fields = build_booking_fields(&empty, 1, None, &config());
        assert_eq!(fields.pieces, 1);
    }

    #[test]
    fn force_prepaid_zeroes_cod() {
        let o = order(vec![item("Mouse", 1, 2999)], 2999);
        let cfg = MapperConfig {
            force_prepaid: true,
            ..config()
        };
        let fields = build_booking_fields(&o, 1, None, &cfg);
        assert_eq!(fields.cod_amount, Decimal::ZERO);
    }

    #[test]
    fn non_positive_weight_override_falls_back() {
        let o = order(vec![item("Mouse", 1, 10)], 10);
        assert_eq!(
            build_booking_fields(&o, 1, Some(0), &config()).weight_grams,
            1000
        );
        assert_eq!(
            build_booking_fields(&o, 1, None, &config()).weight_grams,
            1000
        );
    }

    #[test]
    fn uuid_used_as_order_ref_without_short_id() {
        let mut o = order(vec![item("Mouse", 1, 10)], 10);
        o.short_id = None;
        let fields = build_booking_fields(&o, 1, None, &config());
        assert_eq!(fields.order_ref, o.id.to_string());
    }
}
