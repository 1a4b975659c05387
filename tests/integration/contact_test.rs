//! Contact form and order notification integration tests

mod common;

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use planmart_common::Config;
use planmart_email::mock::MockEmailService;

use common::TestApp;

fn contact_message() -> Value {
    json!({
        "name": "Ana Rojas",
        "email": "ana@example.com",
        "phone": "+57 300 123 4567",
        "message": "Do you ship <plans> to Bogotá?"
    })
}

fn address(city: &str) -> Value {
    json!({
        "first_name": "Ana",
        "last_name": "Rojas",
        "email": "ana@example.com",
        "phone": "(604) 555-0101",
        "street": "Calle 10 # 5-20",
        "city": city,
        "country": "Colombia"
    })
}

fn order() -> Value {
    json!({
        "id": 2001,
        "items": [
            { "name": "CNC Router Table", "unit_price": "24.99", "quantity": 1, "category": "CNC Plans" },
            { "name": "Spindle Motor", "unit_price": "189.00", "quantity": 2, "category": "Hardware" }
        ],
        "billing": address("Medellín"),
        "shipping": { "same_as_billing": true },
        "payment_method": "transfer",
        "notes": "Leave at the gate",
        "subtotal": "402.99",
        "shipping_cost": "0",
        "total": "402.99",
        "placed_at": "2025-03-14T10:30:00Z"
    })
}

mod test_contact {
    use super::*;

    #[tokio::test]
    async fn test_contact_message_reaches_inbox() {
        let app = TestApp::new();

        let response = app
            .json(Method::POST, "/api/contact", contact_message())
            .await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(
            response.json(),
            json!({ "message": "Message sent", "status": "success" })
        );

        let email = app
            .email
            .latest_of_type("contact_message")
            .expect("contact notice captured");
        assert_eq!(email.message.subject, "New contact message from Ana Rojas");
        let html = email.message.body_html.clone().unwrap_or_default();
        assert!(html.contains("&lt;plans&gt;"));
        assert!(!html.contains("<plans>"));
    }

    #[tokio::test]
    async fn test_invalid_phone_is_rejected() {
        let app = TestApp::new();
        let mut message = contact_message();
        message["phone"] = json!("call me maybe");

        let response = app.json(Method::POST, "/api/contact", message).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(app.email.email_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_email_is_rejected() {
        let app = TestApp::new();
        let mut message = contact_message();
        message["email"] = json!("ana-at-example");

        let response = app.json(Method::POST, "/api/contact", message).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delivery_failure_is_internal_error() {
        let app = TestApp::with_email(Config::default(), MockEmailService::new_failing());

        let response = app
            .json(Method::POST, "/api/contact", contact_message())
            .await;
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.error_code(), "INTERNAL_ERROR");
    }
}

mod test_orders {
    use super::*;

    #[tokio::test]
    async fn test_order_notification() {
        let app = TestApp::new();

        let response = app.json(Method::POST, "/api/orders", order()).await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.text());
        assert_eq!(
            response.json(),
            json!({ "message": "Order received", "orderId": 2001 })
        );

        let email = app
            .email
            .latest_of_type("order_notification")
            .expect("order notice captured");
        assert_eq!(email.message.subject, "New order #2001 - Ana Rojas");
        assert!(email
            .message
            .body_text
            .contains("Spindle Motor x2 @ $189.00 = $378.00 (physical)"));
        assert!(email.message.body_text.contains("Shipping: Subject to carrier"));
    }

    #[tokio::test]
    async fn test_separate_shipping_address() {
        let app = TestApp::new();
        let mut order = order();
        order["shipping"] = json!({ "same_as_billing": false, "address": address("Cali") });

        let response = app.json(Method::POST, "/api/orders", order).await;
        assert_eq!(response.status, StatusCode::OK);

        let email = app.email.latest_of_type("order_notification").unwrap();
        assert!(email.message.body_text.contains("Ship to:\nAna Rojas"));
        assert!(email.message.body_text.contains("Calle 10 # 5-20, Cali\n"));
    }

    #[tokio::test]
    async fn test_missing_shipping_address_is_rejected() {
        let app = TestApp::new();
        let mut order = order();
        order["shipping"] = json!({ "same_as_billing": false });

        let response = app.json(Method::POST, "/api/orders", order).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(app.email.email_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_order_is_rejected() {
        let app = TestApp::new();
        let mut order = order();
        order["items"] = json!([]);

        let response = app.json(Method::POST, "/api/orders", order).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
    }
}
