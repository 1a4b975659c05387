//! Plan management and catalog browsing

use std::collections::HashSet;

use axum::http::{Method, StatusCode};
use serde_json::Value;
use uuid::Uuid;

use planmart_pdf::fixtures::sample_pdf;

use crate::common::{PlanUpload, TestApp};

fn ids(page: &Value) -> Vec<String> {
    page["items"]
        .as_array()
        .expect("items array")
        .iter()
        .map(|item| item["id"].as_str().unwrap().to_string())
        .collect()
}

mod test_create_plan {
    use super::*;

    #[tokio::test]
    async fn test_create_plan_counts_pages_from_document() {
        let app = TestApp::new();

        let plan = app
            .create_plan(PlanUpload::plan("Router Table", sample_pdf(7)))
            .await;

        assert_eq!(plan["title"], "Router Table");
        assert_eq!(plan["total_pages"], 7);
        assert_eq!(plan["difficulty"], "intermediate");
        assert_eq!(plan["version"], "1.0");
        assert_eq!(plan["has_document"], true);
        assert_eq!(plan["preview_pages"], serde_json::json!([]));
        let id = plan["id"].as_str().unwrap();
        assert_eq!(plan["preview_url"], format!("/plans/preview/{}", id));
    }

    #[tokio::test]
    async fn test_create_plan_requires_document() {
        let app = TestApp::new();
        let mut form = PlanUpload::plan("No Document", Vec::new());
        form.document = None;

        let response = app.multipart(Method::POST, "/plans", form).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.error_code(), "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_create_plan_rejects_missing_title() {
        let app = TestApp::new();
        let mut form = PlanUpload::plan("Untitled", sample_pdf(2));
        form.fields.retain(|(name, _)| name != "title");

        let response = app.multipart(Method::POST, "/plans", form).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_plan_rejects_wrong_content_type() {
        let app = TestApp::new();
        let form =
            PlanUpload::plan("Image Upload", Vec::new()).document(b"GIF89a".to_vec(), "image/gif");

        let response = app.multipart(Method::POST, "/plans", form).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_plan_rejects_corrupt_document() {
        let app = TestApp::new();
        let form = PlanUpload::plan("Broken", b"%PDF-1.7 this is not a document".to_vec());

        let response = app.multipart(Method::POST, "/plans", form).await;
        assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response.error_code(), "CORRUPT_DOCUMENT");
    }

    #[tokio::test]
    async fn test_create_plan_rejects_preview_page_out_of_range() {
        let app = TestApp::new();
        let form = PlanUpload::plan("Short Plan", sample_pdf(3)).field("preview", "1,5");

        let response = app.multipart(Method::POST, "/plans", form).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.error_code(), "INVALID_PAGE_RANGE");
    }

    #[tokio::test]
    async fn test_create_plan_rejects_negative_price() {
        let app = TestApp::new();
        let form = PlanUpload::plan("Free Money", sample_pdf(1)).field("price", "-5");

        let response = app.multipart(Method::POST, "/plans", form).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_plan_rejects_sub_cent_price() {
        let app = TestApp::new();
        let form = PlanUpload::plan("Odd Price", sample_pdf(1)).field("price", "24.999");

        let response = app.multipart(Method::POST, "/plans", form).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
    }
}

mod test_manage_plan {
    use super::*;

    #[tokio::test]
    async fn test_get_plan() {
        let app = TestApp::new();
        let created = app
            .create_plan(PlanUpload::plan("Workbench", sample_pdf(2)))
            .await;
        let id = created["id"].as_str().unwrap();

        let response = app.get(&format!("/plans/{}", id)).await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.json(), created);
    }

    #[tokio::test]
    async fn test_get_unknown_plan_is_not_found() {
        let app = TestApp::new();

        let response = app.get(&format!("/plans/{}", Uuid::new_v4())).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.error_code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_malformed_identifier_is_bad_request() {
        let app = TestApp::new();

        let response = app.get("/plans/not-a-uuid").await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_metadata_only() {
        let app = TestApp::new();
        let created = app
            .create_plan(PlanUpload::plan("Workbench", sample_pdf(4)))
            .await;
        let id = created["id"].as_str().unwrap();

        let changes = PlanUpload::default()
            .field("price", "30.00")
            .field("preview", "2,4");
        let response = app
            .multipart(Method::PATCH, &format!("/plans/{}", id), changes)
            .await;
        assert_eq!(response.status, StatusCode::OK);

        let updated = response.json();
        assert_eq!(updated["title"], "Workbench");
        assert_eq!(updated["price"], "30.00");
        assert_eq!(updated["preview_pages"], serde_json::json!([2, 4]));
        assert_eq!(updated["total_pages"], 4);
    }

    #[tokio::test]
    async fn test_update_replaces_document_and_page_count() {
        let app = TestApp::new();
        let created = app
            .create_plan(PlanUpload::plan("Workbench", sample_pdf(4)))
            .await;
        let id = created["id"].as_str().unwrap();

        let changes = PlanUpload::default().pdf(sample_pdf(9));
        let response = app
            .multipart(Method::PATCH, &format!("/plans/{}", id), changes)
            .await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.json()["total_pages"], 9);
    }

    #[tokio::test]
    async fn test_update_rejects_preview_beyond_new_document() {
        let app = TestApp::new();
        let created = app
            .create_plan(PlanUpload::plan("Workbench", sample_pdf(6)).field("preview", "5,6"))
            .await;
        let id = created["id"].as_str().unwrap();

        let changes = PlanUpload::default().pdf(sample_pdf(2));
        let response = app
            .multipart(Method::PATCH, &format!("/plans/{}", id), changes)
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.error_code(), "INVALID_PAGE_RANGE");

        let unchanged = app.get(&format!("/plans/{}", id)).await.json();
        assert_eq!(unchanged["total_pages"], 6);
    }

    #[tokio::test]
    async fn test_delete_plan() {
        let app = TestApp::new();
        let created = app
            .create_plan(PlanUpload::plan("Workbench", sample_pdf(2)))
            .await;
        let id = created["id"].as_str().unwrap();

        let response = app.delete(&format!("/plans/{}", id)).await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.json()["message"], "Plan deleted");

        assert_eq!(
            app.get(&format!("/plans/{}", id)).await.status,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            app.delete(&format!("/plans/{}", id)).await.status,
            StatusCode::NOT_FOUND
        );
    }
}

mod test_browse_catalog {
    use super::*;

    #[tokio::test]
    async fn test_pages_partition_the_catalog() {
        let app = TestApp::new();
        for i in 0..5 {
            app.create_plan(PlanUpload::plan(&format!("Plan {}", i), sample_pdf(1)))
                .await;
        }

        let mut seen = Vec::new();
        for page in 1..=3 {
            let response = app.get(&format!("/plans?page={}&limit=2", page)).await;
            assert_eq!(response.status, StatusCode::OK);
            let body = response.json();
            assert_eq!(body["total"], 5);
            assert_eq!(body["totalPages"], 3);
            assert_eq!(body["currentPage"], page);
            seen.extend(ids(&body));
        }

        assert_eq!(seen.len(), 5);
        assert_eq!(seen.iter().collect::<HashSet<_>>().len(), 5);

        let beyond = app.get("/plans?page=4&limit=2").await.json();
        assert!(ids(&beyond).is_empty());
        assert_eq!(beyond["currentPage"], 4);
    }

    #[tokio::test]
    async fn test_invalid_paging_is_bad_request() {
        let app = TestApp::new();
        for uri in ["/plans?page=0", "/plans?limit=0", "/plans?limit=101", "/plans?page=abc"] {
            assert_eq!(app.get(uri).await.status, StatusCode::BAD_REQUEST, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_list_filters() {
        let app = TestApp::new();
        app.create_plan(
            PlanUpload::plan("Shaker Chair", sample_pdf(1))
                .field("difficulty", "advanced")
                .field("price", "40"),
        )
        .await;
        app.create_plan(
            PlanUpload::plan("Sign Blank", sample_pdf(1))
                .field("category", "Signs")
                .field("machine_type", "Laser")
                .field("difficulty", "basic")
                .field("price", "5"),
        )
        .await;

        let by_category = app.get("/plans?category=furn").await.json();
        assert_eq!(by_category["total"], 1);
        assert_eq!(by_category["items"][0]["title"], "Shaker Chair");

        let by_machine = app.get("/plans?machineType=LASER").await.json();
        assert_eq!(by_machine["total"], 1);
        assert_eq!(by_machine["items"][0]["title"], "Sign Blank");

        let by_difficulty = app.get("/plans?difficulty=advanced").await.json();
        assert_eq!(by_difficulty["total"], 1);

        let by_price = app.get("/plans?min_price=10&maxPrice=50").await.json();
        assert_eq!(by_price["total"], 1);
        assert_eq!(by_price["items"][0]["title"], "Shaker Chair");

        assert_eq!(
            app.get("/plans?difficulty=expert").await.status,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            app.get("/plans?minPrice=50&maxPrice=10").await.status,
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive() {
        let app = TestApp::new();
        app.create_plan(PlanUpload::plan("Router Table", sample_pdf(1)))
            .await;
        app.create_plan(PlanUpload::plan("Dust Collector", sample_pdf(1)))
            .await;

        for term in ["router", "ROUTER", "Router%20Table"] {
            let response = app.get(&format!("/plans/search?q={}", term)).await;
            assert_eq!(response.status, StatusCode::OK);
            let body = response.json();
            assert_eq!(body["total"], 1, "{term}");
            assert_eq!(body["items"][0]["title"], "Router Table");
        }

        let none = app.get("/plans/search?q=lathe").await.json();
        assert_eq!(none["total"], 0);
    }

    #[tokio::test]
    async fn test_search_requires_term() {
        let app = TestApp::new();
        assert_eq!(
            app.get("/plans/search").await.status,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            app.get("/plans/search?q=%20%20").await.status,
            StatusCode::BAD_REQUEST
        );
    }
}
