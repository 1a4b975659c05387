//! Products and categories API integration tests

mod common;

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

use common::TestApp;

async fn create_category(app: &TestApp, name: &str) -> Value {
    let response = app
        .json(Method::POST, "/categories", json!({ "name": name }))
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.text());
    response.json()
}

async fn create_product(app: &TestApp, body: Value) -> Value {
    let response = app.json(Method::POST, "/products", body).await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.text());
    response.json()
}

mod test_categories {
    use super::*;

    #[tokio::test]
    async fn test_create_and_list_categories() {
        let app = TestApp::new();
        create_category(&app, "Spindles").await;
        create_category(&app, "  Bits ").await;

        let response = app.get("/categories").await;
        assert_eq!(response.status, StatusCode::OK);
        let names: Vec<String> = response
            .json()
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["Bits", "Spindles"]);
    }

    #[tokio::test]
    async fn test_duplicate_category_is_conflict() {
        let app = TestApp::new();
        create_category(&app, "Spindles").await;

        let response = app
            .json(Method::POST, "/categories", json!({ "name": "SPINDLES" }))
            .await;
        assert_eq!(response.status, StatusCode::CONFLICT);
        assert_eq!(response.error_code(), "CONFLICT");
    }

    #[tokio::test]
    async fn test_blank_category_name_is_rejected() {
        let app = TestApp::new();

        let response = app
            .json(Method::POST, "/categories", json!({ "name": "" }))
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_rename_category() {
        let app = TestApp::new();
        let category = create_category(&app, "Spindels").await;
        let id = category["id"].as_str().unwrap();

        let response = app
            .json(
                Method::PATCH,
                &format!("/categories/{}", id),
                json!({ "name": "Spindles" }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.json()["name"], "Spindles");

        let missing = app
            .json(
                Method::PATCH,
                &format!("/categories/{}", Uuid::new_v4()),
                json!({ "name": "Other" }),
            )
            .await;
        assert_eq!(missing.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_category_keeps_products() {
        let app = TestApp::new();
        let category = create_category(&app, "Spindles").await;
        let category_id = category["id"].as_str().unwrap();
        let product = create_product(
            &app,
            json!({ "name": "2.2kW Spindle", "price": "189.00", "category_id": category_id }),
        )
        .await;

        let response = app.delete(&format!("/categories/{}", category_id)).await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.json()["message"], "Category deleted");

        let reloaded = app
            .get(&format!("/products/{}", product["id"].as_str().unwrap()))
            .await
            .json();
        assert_eq!(reloaded["category_id"], Value::Null);

        let again = app.delete(&format!("/categories/{}", category_id)).await;
        assert_eq!(again.status, StatusCode::NOT_FOUND);
    }
}

mod test_products {
    use super::*;

    #[tokio::test]
    async fn test_product_lifecycle() {
        let app = TestApp::new();
        let created = create_product(
            &app,
            json!({
                "name": "Dust Shoe",
                "description": "Keeps chips out of the way",
                "price": "35.50",
                "features": ["Magnetic", "Brush skirt"],
                "quantity": 4
            }),
        )
        .await;
        let id = created["id"].as_str().unwrap();
        assert_eq!(created["features"], json!(["Magnetic", "Brush skirt"]));
        assert_eq!(created["quantity"], 4);

        let updated = app
            .json(
                Method::PATCH,
                &format!("/products/{}", id),
                json!({ "price": "30.00", "quantity": 3 }),
            )
            .await;
        assert_eq!(updated.status, StatusCode::OK);
        let updated = updated.json();
        assert_eq!(updated["price"], "30.00");
        assert_eq!(updated["quantity"], 3);
        assert_eq!(updated["name"], "Dust Shoe");

        let deleted = app.delete(&format!("/products/{}", id)).await;
        assert_eq!(deleted.status, StatusCode::OK);
        assert_eq!(deleted.json()["message"], "Product deleted");
        assert_eq!(
            app.get(&format!("/products/{}", id)).await.status,
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn test_invalid_products_are_rejected() {
        let app = TestApp::new();

        let unknown_category = app
            .json(
                Method::POST,
                "/products",
                json!({ "name": "Clamp", "price": "9.99", "category_id": Uuid::new_v4() }),
            )
            .await;
        assert_eq!(unknown_category.status, StatusCode::BAD_REQUEST);

        let negative_stock = app
            .json(
                Method::POST,
                "/products",
                json!({ "name": "Clamp", "price": "9.99", "quantity": -1 }),
            )
            .await;
        assert_eq!(negative_stock.status, StatusCode::BAD_REQUEST);

        let malformed = app.get("/products/12").await;
        assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_filters_and_search() {
        let app = TestApp::new();
        let spindles = create_category(&app, "Spindles").await;
        let spindles_id = spindles["id"].as_str().unwrap();

        create_product(
            &app,
            json!({ "name": "2.2kW Spindle", "price": "189.00", "category_id": spindles_id }),
        )
        .await;
        create_product(&app, json!({ "name": "Dust Shoe", "price": "35.50" })).await;
        create_product(&app, json!({ "name": "End Mill Set", "price": "22.00" })).await;

        let all = app.get("/products?limit=2").await.json();
        assert_eq!(all["total"], 3);
        assert_eq!(all["totalPages"], 2);
        assert_eq!(all["items"].as_array().unwrap().len(), 2);

        let by_category = app
            .get(&format!("/products?categoryId={}", spindles_id))
            .await
            .json();
        assert_eq!(by_category["total"], 1);
        assert_eq!(by_category["items"][0]["name"], "2.2kW Spindle");

        let by_price = app.get("/products?min_price=20&max_price=40").await.json();
        assert_eq!(by_price["total"], 2);

        let found = app.get("/products/search?q=SPINDLE").await.json();
        assert_eq!(found["total"], 1);

        assert_eq!(
            app.get("/products?category_id=nope").await.status,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            app.get("/products/search").await.status,
            StatusCode::BAD_REQUEST
        );
    }
}
