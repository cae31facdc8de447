//! API integration tests: full router over a real sqlite snapshot store.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use pricing_studio::advisor::Advisor;
use pricing_studio::config::AdvisorConfig;
use pricing_studio::handlers::AppState;
use pricing_studio::server::create_router;
use pricing_studio::store::Store;
use pricing_studio::workspace::Workspace;

async fn test_app() -> Router {
    let store = Store::open_in_memory().await.unwrap();
    app_over(store).await
}

async fn app_over(store: Store) -> Router {
    let workspace = Arc::new(Workspace::load(store).await);
    let advisor = Arc::new(Advisor::new(AdvisorConfig::default()));
    create_router(AppState { workspace, advisor })
}

fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app().await;
    let response = app.oneshot(request("GET", "/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_create_and_list_materials() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/materials",
            Some(json!({
                "name": "Wool",
                "sku": "W-01",
                "total_cost": 300.0,
                "qty": 2.0,
                "unit": "skein"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let created = json_body(response).await;
    assert_eq!(created["name"], "Wool");
    assert_eq!(created["unit_price"], 150.0);

    let response = app
        .oneshot(request("GET", "/api/materials", None))
        .await
        .unwrap();
    let listed = json_body(response).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_duplicate_material_name_conflicts() {
    let app = test_app().await;
    let wool = json!({ "name": "Wool", "total_cost": 1.0, "qty": 1.0, "unit": "g" });
    let wool_lower = json!({ "name": "wool", "total_cost": 2.0, "qty": 1.0, "unit": "g" });

    let response = app
        .clone()
        .oneshot(request("POST", "/api/materials", Some(wool)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(request("POST", "/api/materials", Some(wool_lower)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = json_body(response).await;
    assert_eq!(body["error"]["type"], "duplicate_material");
}

#[tokio::test]
async fn test_empty_material_name_is_rejected() {
    let app = test_app().await;
    let response = app
        .oneshot(request(
            "POST",
            "/api/materials",
            Some(json!({ "name": "  ", "total_cost": 1.0, "qty": 1.0, "unit": "g" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_worked_example_through_the_api() {
    let app = test_app().await;

    // Catalog: wool at 300 for 2 units -> unit price 150
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/materials",
            Some(json!({ "name": "Wool", "total_cost": 300.0, "qty": 2.0, "unit": "skein" })),
        ))
        .await
        .unwrap();
    let material_id = json_body(response).await["id"].as_str().unwrap().to_string();

    // One material row at qty 0.5
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/product",
            Some(json!({ "op": "add_material_row", "purpose": "materials" })),
        ))
        .await
        .unwrap();
    let view = json_body(response).await;
    let row_id = view["product"]["material_rows"][0]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let updates = vec![
        json!({
            "op": "update_material_row",
            "purpose": "materials",
            "id": row_id,
            "material_id": material_id,
            "qty": 0.5
        }),
        json!({ "op": "set_hourly_rate", "rate": 40.0 }),
        json!({ "op": "add_labor_row" }),
        json!({ "op": "set_mode", "mode": "margin" }),
        json!({ "op": "set_target_margin", "margin": 60.0 }),
        json!({ "op": "set_discount", "discount": 10.0 }),
    ];
    let mut last_view = Value::Null;
    for update in updates {
        let response = app
            .clone()
            .oneshot(request("POST", "/api/product", Some(update)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        last_view = json_body(response).await;
    }

    // Fill in the labor row: 0.5 hours
    let labor_id = last_view["product"]["labor_rows"][0]["id"]
        .as_str()
        .unwrap()
        .to_string();
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/product",
            Some(json!({ "op": "update_labor_row", "id": labor_id, "task": "sewing", "hours": 0.5 })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(request("GET", "/api/pricing", None))
        .await
        .unwrap();
    let pricing = json_body(response).await;
    assert_eq!(pricing["material_cost"], 75.0);
    assert_eq!(pricing["labor_cost"], 20.0);
    assert_eq!(pricing["base_cost"], 95.0);
    assert_eq!(pricing["final_price"], 237.5);
    assert_eq!(pricing["margin"], 60.0);
    assert_eq!(pricing["discounted_price"], 213.75);
    assert_eq!(pricing["profit"], 118.75);
}

#[tokio::test]
async fn test_deleting_material_cascades_into_pricing() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/materials",
            Some(json!({ "name": "Box", "total_cost": 10.0, "qty": 10.0, "unit": "pcs" })),
        ))
        .await
        .unwrap();
    let material_id = json_body(response).await["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/product",
            Some(json!({ "op": "add_material_row", "purpose": "packaging" })),
        ))
        .await
        .unwrap();
    let view = json_body(response).await;
    let row_id = view["product"]["packaging_rows"][0]["id"]
        .as_str()
        .unwrap()
        .to_string();

    app.clone()
        .oneshot(request(
            "POST",
            "/api/product",
            Some(json!({
                "op": "update_material_row",
                "purpose": "packaging",
                "id": row_id,
                "material_id": material_id,
                "qty": 1.0
            })),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(request(
            "DELETE",
            &format!("/api/materials/{}", material_id),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(request("GET", "/api/product", None))
        .await
        .unwrap();
    let view = json_body(response).await;
    assert_eq!(view["product"]["packaging_rows"].as_array().unwrap().len(), 0);
    assert_eq!(view["pricing"]["packaging_cost"], 0.0);

    let response = app
        .oneshot(request(
            "DELETE",
            &format!("/api/materials/{}", material_id),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_price_mode_loss_renders_not_fails() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/materials",
            Some(json!({ "name": "Steel", "total_cost": 100.0, "qty": 1.0, "unit": "kg" })),
        ))
        .await
        .unwrap();
    let material_id = json_body(response).await["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/product",
            Some(json!({ "op": "add_material_row", "purpose": "materials" })),
        ))
        .await
        .unwrap();
    let view = json_body(response).await;
    let row_id = view["product"]["material_rows"][0]["id"]
        .as_str()
        .unwrap()
        .to_string();

    for update in [
        json!({
            "op": "update_material_row",
            "purpose": "materials",
            "id": row_id,
            "material_id": material_id,
            "qty": 1.0
        }),
        json!({ "op": "set_mode", "mode": "price" }),
        json!({ "op": "set_target_price", "price": 80.0 }),
    ] {
        app.clone()
            .oneshot(request("POST", "/api/product", Some(update)))
            .await
            .unwrap();
    }

    let response = app
        .oneshot(request("GET", "/api/pricing", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let pricing = json_body(response).await;
    assert_eq!(pricing["final_price"], 80.0);
    assert_eq!(pricing["margin"], -25.0);
    assert_eq!(pricing["profit"], -20.0);
}

#[tokio::test]
async fn test_snapshots_survive_restart_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("snapshots.db");
    let db_path = db_path.to_str().unwrap();

    {
        let store = Store::open(db_path).await.unwrap();
        let app = app_over(store).await;
        let response = app
            .oneshot(request(
                "POST",
                "/api/materials",
                Some(json!({ "name": "Wool", "total_cost": 300.0, "qty": 2.0, "unit": "skein" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    // A fresh app over the same file sees the persisted catalog
    let store = Store::open(db_path).await.unwrap();
    let app = app_over(store).await;
    let response = app
        .oneshot(request("GET", "/api/materials", None))
        .await
        .unwrap();
    let materials = json_body(response).await;
    assert_eq!(materials.as_array().unwrap().len(), 1);
    assert_eq!(materials[0]["unit_price"], 150.0);
}

#[tokio::test]
async fn test_updating_unknown_row_is_not_found() {
    let app = test_app().await;
    let response = app
        .oneshot(request(
            "POST",
            "/api/product",
            Some(json!({
                "op": "update_labor_row",
                "id": "00000000-0000-0000-0000-000000000000",
                "task": "cutting",
                "hours": 1.0
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = json_body(response).await;
    assert_eq!(body["error"]["type"], "row_not_found");
}
