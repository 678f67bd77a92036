//! Offline unit tests for shipbridge-db pool configuration and row types.
//! These tests do not require a live database connection.

use rust_decimal::Decimal;
use shipbridge_db::{OrderRow, PoolConfig};
use uuid::Uuid;

#[test]
fn pool_config_defaults_are_sane() {
    let config = PoolConfig::default();
    assert_eq!(config.max_connections, 10);
    assert_eq!(config.min_connections, 1);
    assert_eq!(config.acquire_timeout_secs, 10);
}

fn sample_row(
    cart: serde_json::Value,
    city_resolution: Option<serde_json::Value>,
    shipping_provider: Option<serde_json::Value>,
) -> OrderRow {
    OrderRow {
        id: Uuid::new_v4(),
        short_id: Some(1042),
        consignee_name: "Ayesha Khan".to_string(),
        consignee_phone: "03001234567".to_string(),
        address_line1: "House 12, Street 4".to_string(),
        city: "Karachi".to_string(),
        cart,
        total_price: Decimal::new(299_900, 2),
        city_resolution,
        shipping_provider,
    }
}

#[test]
fn order_row_decodes_cart_and_extras() {
    let cart = serde_json::json!([
        {"product_id": null, "title": "Wireless Mouse", "quantity": 2, "price": "1500.00"}
    ]);
    let resolution = serde_json::json!({
        "city_input": "karachi",
        "city_id": 101,
        "city_name": "Karachi",
        "method": "exact",
        "confidence": 1.0,
        "resolved_at": "2025-06-01T10:00:00Z"
    });
    let provider = serde_json::json!({
        "provider": "lcs",
        "pushed": true,
        "tracking_number": "LE99887766",
        "consignment_no": "LE99887766",
        "label_url": null,
        "extra": {"status": 1},
        "pushed_at": "2025-06-01T10:00:05Z"
    });

    let order = sample_row(cart, Some(resolution), Some(provider))
        .into_order()
        .expect("row should decode");

    assert_eq!(order.cart.len(), 1);
    assert_eq!(order.cart[0].title, "Wireless Mouse");
    assert_eq!(order.cart[0].quantity, 2);
    assert!(order.has_booking());
    let res = order.city_resolution.expect("resolution present");
    assert_eq!(res.city_id, 101);
}

#[test]
fn order_row_with_null_extras_decodes() {
    let order = sample_row(serde_json::json!([]), None, None)
        .into_order()
        .expect("row should decode");
    assert!(order.cart.is_empty());
    assert!(order.city_resolution.is_none());
    assert!(order.shipping_provider.is_none());
    assert!(!order.has_booking());
}

#[test]
fn order_row_with_malformed_cart_errors() {
    let result = sample_row(serde_json::json!({"not": "an array"}), None, None).into_order();
    assert!(result.is_err(), "malformed cart JSON must not decode");
}
