//! Previews, purchases and entitlement-gated downloads

use axum::http::{Method, StatusCode};
use serde_json::json;
use uuid::Uuid;

use planmart_common::{Config, EntitlementMode};
use planmart_pdf::fixtures::{page_labels, sample_pdf};

use crate::common::{PlanUpload, TestApp};

async fn plan_id(app: &TestApp, form: PlanUpload) -> String {
    let plan = app.create_plan(form).await;
    plan["id"].as_str().unwrap().to_string()
}

fn listed_pages(header: Option<&str>) -> Vec<i32> {
    header
        .expect("preview pages header")
        .split(',')
        .map(|page| page.parse().unwrap())
        .collect()
}

mod test_preview {
    use super::*;

    #[tokio::test]
    async fn test_random_preview_holds_half_the_pages() {
        let app = TestApp::new();
        let id = plan_id(&app, PlanUpload::plan("Router Table", sample_pdf(4))).await;

        let response = app.get(&format!("/plans/preview/{}", id)).await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.header("content-type"), Some("application/pdf"));
        assert_eq!(
            response.header("content-disposition"),
            Some("inline; filename=\"Router_Table_preview.pdf\"")
        );
        assert_eq!(response.header("cache-control"), Some("public, max-age=3600"));
        assert_eq!(
            response.header("content-length"),
            Some(response.body.len().to_string().as_str())
        );

        let pages = listed_pages(response.header("x-preview-pages"));
        assert_eq!(pages.len(), 2);
        assert!(pages.windows(2).all(|w| w[0] < w[1]));
        assert!(pages.iter().all(|p| (1..=4).contains(p)));

        let expected: Vec<String> = pages.iter().map(|p| format!("Page {}", p)).collect();
        assert_eq!(page_labels(&response.body), expected);
    }

    #[tokio::test]
    async fn test_single_page_plan_previews_its_only_page() {
        let app = TestApp::new();
        let id = plan_id(&app, PlanUpload::plan("Coaster", sample_pdf(1))).await;

        let response = app.get(&format!("/plans/preview/{}", id)).await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.header("x-preview-pages"), Some("1"));
        assert_eq!(page_labels(&response.body), vec!["Page 1"]);
    }

    #[tokio::test]
    async fn test_curated_preview_keeps_author_order() {
        let app = TestApp::new();
        let id = plan_id(
            &app,
            PlanUpload::plan("Router Table", sample_pdf(5)).field("preview", "4,1"),
        )
        .await;

        for _ in 0..3 {
            let response = app.get(&format!("/plans/preview/{}", id)).await;
            assert_eq!(response.status, StatusCode::OK);
            assert_eq!(response.header("x-preview-pages"), Some("4,1"));
            assert_eq!(page_labels(&response.body), vec!["Page 4", "Page 1"]);
        }
    }

    #[tokio::test]
    async fn test_preview_of_unknown_plan() {
        let app = TestApp::new();

        let response = app.get(&format!("/plans/preview/{}", Uuid::new_v4())).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);

        let response = app.get("/plans/preview/12345").await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_preview_cache_lifetime_is_configurable() {
        let app = TestApp::with_config(Config {
            preview_cache_seconds: 60,
            ..Config::default()
        });
        let id = plan_id(&app, PlanUpload::plan("Router Table", sample_pdf(2))).await;

        let response = app.get(&format!("/plans/preview/{}", id)).await;
        assert_eq!(response.header("cache-control"), Some("public, max-age=60"));
    }
}

mod test_download {
    use super::*;

    #[tokio::test]
    async fn test_download_requires_user_id() {
        let app = TestApp::new();
        let id = plan_id(&app, PlanUpload::plan("Router Table", sample_pdf(3))).await;

        for uri in [
            format!("/plans/download/{}", id),
            format!("/plans/download/{}?userId=", id),
        ] {
            let response = app.get(&uri).await;
            assert_eq!(response.status, StatusCode::BAD_REQUEST, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_purchase_unlocks_identical_document() {
        let app = TestApp::new();
        let document = sample_pdf(3);
        let id = plan_id(&app, PlanUpload::plan("Router Table", document.clone())).await;
        let download = format!("/plans/download/{}?userId=maker-7", id);

        let before = app.get(&download).await;
        assert_eq!(before.status, StatusCode::UNAUTHORIZED);
        assert_eq!(before.error_code(), "UNAUTHORIZED");

        let purchase = app
            .json(
                Method::POST,
                &format!("/plans/purchase/{}", id),
                json!({ "userId": "maker-7", "paymentMethod": "transfer" }),
            )
            .await;
        assert_eq!(purchase.status, StatusCode::OK);
        let receipt = purchase.json();
        assert_eq!(receipt["message"], "Purchase recorded");
        assert_eq!(receipt["planId"], id.as_str());
        assert_eq!(receipt["title"], "Router Table");
        assert_eq!(receipt["userId"], "maker-7");
        assert_eq!(receipt["downloadUrl"], download.as_str());

        let after = app.get(&download).await;
        assert_eq!(after.status, StatusCode::OK);
        assert_eq!(after.body.as_ref(), document.as_slice());
        assert_eq!(
            after.header("content-disposition"),
            Some("attachment; filename=\"Router_Table.pdf\"")
        );
        assert_eq!(after.header("cache-control"), Some("private, no-store"));
        assert_eq!(
            after.header("content-length"),
            Some(document.len().to_string().as_str())
        );
    }

    #[tokio::test]
    async fn test_entitlement_is_per_user() {
        let app = TestApp::new();
        let id = plan_id(&app, PlanUpload::plan("Router Table", sample_pdf(2))).await;

        app.json(
            Method::POST,
            &format!("/plans/purchase/{}", id),
            json!({ "userId": "buyer" }),
        )
        .await;

        let other = app
            .get(&format!("/plans/download/{}?userId=someone-else", id))
            .await;
        assert_eq!(other.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_repeat_purchase_is_accepted() {
        let app = TestApp::new();
        let id = plan_id(&app, PlanUpload::plan("Router Table", sample_pdf(2))).await;
        let uri = format!("/plans/purchase/{}", id);

        for _ in 0..2 {
            let response = app
                .json(Method::POST, &uri, json!({ "userId": "buyer" }))
                .await;
            assert_eq!(response.status, StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn test_download_unknown_plan() {
        let uri = format!("/plans/download/{}?userId=maker", Uuid::new_v4());

        let ledger = TestApp::new();
        assert_eq!(ledger.get(&uri).await.status, StatusCode::UNAUTHORIZED);

        let open = TestApp::with_config(Config {
            entitlement_mode: EntitlementMode::Open,
            ..Config::default()
        });
        assert_eq!(open.get(&uri).await.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_open_mode_skips_the_ledger() {
        let app = TestApp::with_config(Config {
            entitlement_mode: EntitlementMode::Open,
            ..Config::default()
        });
        let document = sample_pdf(2);
        let id = plan_id(&app, PlanUpload::plan("Router Table", document.clone())).await;

        let response = app
            .get(&format!("/plans/download/{}?userId=anyone", id))
            .await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body.as_ref(), document.as_slice());

        let anonymous = app.get(&format!("/plans/download/{}", id)).await;
        assert_eq!(anonymous.status, StatusCode::BAD_REQUEST);
    }
}

mod test_purchase {
    use super::*;

    #[tokio::test]
    async fn test_purchase_requires_user_id() {
        let app = TestApp::new();
        let id = plan_id(&app, PlanUpload::plan("Router Table", sample_pdf(2))).await;

        let response = app
            .json(Method::POST, &format!("/plans/purchase/{}", id), json!({}))
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_purchase_unknown_plan() {
        let app = TestApp::new();

        let response = app
            .json(
                Method::POST,
                &format!("/plans/purchase/{}", Uuid::new_v4()),
                json!({ "userId": "buyer" }),
            )
            .await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_purchase_rejects_malformed_body() {
        let app = TestApp::new();
        let id = plan_id(&app, PlanUpload::plan("Router Table", sample_pdf(2))).await;

        let response = app
            .json(
                Method::POST,
                &format!("/plans/purchase/{}", id),
                json!({ "userId": 42 }),
            )
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new();

    let response = app.get("/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.text(), "OK");
}
