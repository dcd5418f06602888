mod common;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use common::{TestApp, bearer};
use food_ordering::domain::entities::OrderStatus;
use serde_json::{Value, json};
use std::sync::atomic::Ordering;

const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0, 0, 0, 0];

fn restaurant_form() -> MultipartForm {
    MultipartForm::new()
        .add_text("restaurantName", "Trattoria")
        .add_text("city", "Santiago")
        .add_text("country", "Chile")
        .add_text("deliveryPrice", "2500")
        .add_text("estimatedDeliveryTime", "30")
        .add_text("cuisines[0]", "Italian")
        .add_text("cuisines[1]", "Pizza")
        .add_text("menuItems[0][name]", "Margherita")
        .add_text("menuItems[0][price]", "9000")
        .add_text("menuItems[1][name]", "Tiramisu")
        .add_text("menuItems[1][price]", "4500")
}

fn with_image(form: MultipartForm) -> MultipartForm {
    form.add_part(
        "imageFile",
        Part::bytes(PNG.to_vec())
            .file_name("front.png")
            .mime_type("image/png"),
    )
}

fn error_fields(body: &Value) -> Vec<String> {
    body["error"]["details"]["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap().to_string())
        .collect()
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_restaurant() {
    let app = TestApp::new();
    let owner = app.seed_user("auth0|owner");

    let response = app
        .server
        .post("/api/my/restaurant")
        .add_header("Authorization", bearer("auth0|owner"))
        .multipart(with_image(restaurant_form()))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body = response.json::<Value>();
    assert_eq!(body["user"], owner.id.to_string());
    assert_eq!(body["restaurantName"], "Trattoria");
    assert_eq!(body["deliveryPrice"], 2500);
    assert_eq!(body["estimatedDeliveryTime"], 30);
    assert_eq!(body["cuisines"], json!(["Italian", "Pizza"]));
    assert_eq!(body["menuItems"][0]["name"], "Margherita");
    assert_eq!(body["menuItems"][1]["price"], 4500);
    assert!(body["menuItems"][0]["_id"].is_string());
    assert_eq!(
        body["imageUrl"],
        "https://res.cloudinary.com/demo/image/upload/1.png"
    );

    let uploads = app.assets.uploads.lock().unwrap();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].content_type, "image/png");
    assert_eq!(uploads[0].bytes, PNG);
}

#[tokio::test]
async fn test_second_restaurant_is_conflict() {
    let app = TestApp::new();
    let owner = app.seed_user("auth0|owner");
    app.seed_restaurant(owner.id, "First", "Santiago", &["Sushi"], 1000, &[("Roll", 5000)]);

    let response = app
        .server
        .post("/api/my/restaurant")
        .add_header("Authorization", bearer("auth0|owner"))
        .multipart(with_image(restaurant_form()))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(app.restaurants.rows.lock().unwrap().len(), 1);
    assert!(app.assets.uploads.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_create_without_image_is_bad_request() {
    let app = TestApp::new();
    app.seed_user("auth0|owner");

    let response = app
        .server
        .post("/api/my/restaurant")
        .add_header("Authorization", bearer("auth0|owner"))
        .multipart(restaurant_form())
        .await;

    response.assert_status_bad_request();
    assert_eq!(error_fields(&response.json::<Value>()), vec!["imageFile"]);
    assert!(app.restaurants.rows.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_non_image_file_is_bad_request() {
    let app = TestApp::new();
    app.seed_user("auth0|owner");

    let form = restaurant_form().add_part(
        "imageFile",
        Part::bytes(b"%PDF-1.7".to_vec())
            .file_name("menu.pdf")
            .mime_type("application/pdf"),
    );

    let response = app
        .server
        .post("/api/my/restaurant")
        .add_header("Authorization", bearer("auth0|owner"))
        .multipart(form)
        .await;

    response.assert_status_bad_request();
    assert!(app.assets.uploads.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_validation_errors_are_aggregated() {
    let app = TestApp::new();
    app.seed_user("auth0|owner");

    let form = MultipartForm::new()
        .add_text("restaurantName", "Trattoria")
        .add_text("city", "Santiago")
        .add_text("country", "Chile")
        .add_text("deliveryPrice", "-5")
        .add_text("estimatedDeliveryTime", "half an hour")
        .add_text("menuItems[0][name]", "Margherita")
        .add_text("menuItems[0][price]", "9000")
        .add_text("menuItems[1][price]", "cheap");

    let response = app
        .server
        .post("/api/my/restaurant")
        .add_header("Authorization", bearer("auth0|owner"))
        .multipart(with_image(form))
        .await;

    response.assert_status_bad_request();
    let fields = error_fields(&response.json::<Value>());
    assert_eq!(
        fields,
        vec![
            "cuisines",
            "deliveryPrice",
            "estimatedDeliveryTime",
            "menuItems[1].name",
            "menuItems[1].price",
        ]
    );
    assert!(app.assets.uploads.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_failure_is_internal_error() {
    let app = TestApp::new();
    app.seed_user("auth0|owner");
    app.assets.failing.store(true, Ordering::SeqCst);

    let response = app
        .server
        .post("/api/my/restaurant")
        .add_header("Authorization", bearer("auth0|owner"))
        .multipart(with_image(restaurant_form()))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert!(app.restaurants.rows.lock().unwrap().is_empty());
}

// ─── Get / Update ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_my_restaurant_not_found() {
    let app = TestApp::new();
    app.seed_user("auth0|owner");

    app.server
        .get("/api/my/restaurant")
        .add_header("Authorization", bearer("auth0|owner"))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_update_keeps_known_menu_ids_and_image() {
    let app = TestApp::new();
    let owner = app.seed_user("auth0|owner");
    let restaurant = app.seed_restaurant(
        owner.id,
        "Old name",
        "Santiago",
        &["Italian"],
        1000,
        &[("Margherita", 8000)],
    );
    let kept_id = restaurant.menu_items[0].id;

    let form = MultipartForm::new()
        .add_text("restaurantName", "New name")
        .add_text("city", "Valparaiso")
        .add_text("country", "Chile")
        .add_text("deliveryPrice", "1500")
        .add_text("estimatedDeliveryTime", "40")
        .add_text("cuisines[0]", "Italian")
        .add_text("menuItems[0][_id]", kept_id.to_string())
        .add_text("menuItems[0][name]", "Margherita")
        .add_text("menuItems[0][price]", "8500")
        .add_text("menuItems[1][name]", "Calzone")
        .add_text("menuItems[1][price]", "9500");

    let response = app
        .server
        .put("/api/my/restaurant")
        .add_header("Authorization", bearer("auth0|owner"))
        .multipart(form)
        .await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["_id"], restaurant.id.to_string());
    assert_eq!(body["restaurantName"], "New name");
    assert_eq!(body["city"], "Valparaiso");
    assert_eq!(body["menuItems"][0]["_id"], kept_id.to_string());
    assert_eq!(body["menuItems"][0]["price"], 8500);
    assert_ne!(body["menuItems"][1]["_id"], kept_id.to_string());
    assert_eq!(body["imageUrl"], restaurant.image_url);
    assert!(app.assets.uploads.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_update_without_restaurant_is_not_found() {
    let app = TestApp::new();
    app.seed_user("auth0|owner");

    app.server
        .put("/api/my/restaurant")
        .add_header("Authorization", bearer("auth0|owner"))
        .multipart(restaurant_form())
        .await
        .assert_status_not_found();
}

// ─── Orders ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_orders_expands_references() {
    let app = TestApp::new();
    let owner = app.seed_user("auth0|owner");
    let customer = app.seed_user("auth0|customer");
    let restaurant =
        app.seed_restaurant(owner.id, "Trattoria", "Santiago", &["Italian"], 1000, &[("Pizza", 9000)]);
    let order = app.seed_order(&restaurant, &customer, OrderStatus::Paid);

    let response = app
        .server
        .get("/api/my/restaurant/order")
        .add_header("Authorization", bearer("auth0|owner"))
        .await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["_id"], order.id.to_string());
    assert_eq!(body[0]["restaurant"]["restaurantName"], "Trattoria");
    assert_eq!(body[0]["user"]["auth0Id"], "auth0|customer");
    assert_eq!(body[0]["status"], "paid");
}

#[tokio::test]
async fn test_list_orders_without_restaurant_is_not_found() {
    let app = TestApp::new();
    app.seed_user("auth0|owner");

    app.server
        .get("/api/my/restaurant/order")
        .add_header("Authorization", bearer("auth0|owner"))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_owner_advances_order_status() {
    let app = TestApp::new();
    let owner = app.seed_user("auth0|owner");
    let customer = app.seed_user("auth0|customer");
    let restaurant =
        app.seed_restaurant(owner.id, "Trattoria", "Santiago", &["Italian"], 1000, &[("Pizza", 9000)]);
    let order = app.seed_order(&restaurant, &customer, OrderStatus::Paid);

    let response = app
        .server
        .patch(&format!("/api/my/restaurant/order/{}/status", order.id))
        .add_header("Authorization", bearer("auth0|owner"))
        .json(&json!({"status": "inProgress"}))
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "inProgress");
    assert_eq!(
        app.orders.get(order.id).unwrap().status,
        OrderStatus::InProgress
    );
}

#[tokio::test]
async fn test_non_owner_cannot_change_status() {
    let app = TestApp::new();
    let owner = app.seed_user("auth0|owner");
    let customer = app.seed_user("auth0|customer");
    app.seed_user("auth0|rival");
    let restaurant =
        app.seed_restaurant(owner.id, "Trattoria", "Santiago", &["Italian"], 1000, &[("Pizza", 9000)]);
    let order = app.seed_order(&restaurant, &customer, OrderStatus::Paid);

    for caller in ["auth0|rival", "auth0|customer"] {
        app.server
            .patch(&format!("/api/my/restaurant/order/{}/status", order.id))
            .add_header("Authorization", bearer(caller))
            .json(&json!({"status": "delivered"}))
            .await
            .assert_status_unauthorized();
    }

    assert_eq!(app.orders.get(order.id).unwrap().status, OrderStatus::Paid);
}

#[tokio::test]
async fn test_status_rules() {
    let app = TestApp::new();
    let owner = app.seed_user("auth0|owner");
    let customer = app.seed_user("auth0|customer");
    let restaurant =
        app.seed_restaurant(owner.id, "Trattoria", "Santiago", &["Italian"], 1000, &[("Pizza", 9000)]);
    let order = app.seed_order(&restaurant, &customer, OrderStatus::OutForDelivery);
    let path = format!("/api/my/restaurant/order/{}/status", order.id);

    for status in ["cancelled", "paid", "placed", "inProgress"] {
        app.server
            .patch(&path)
            .add_header("Authorization", bearer("auth0|owner"))
            .json(&json!({ "status": status }))
            .await
            .assert_status_bad_request();
    }
    assert_eq!(
        app.orders.get(order.id).unwrap().status,
        OrderStatus::OutForDelivery
    );

    app.server
        .patch(&path)
        .add_header("Authorization", bearer("auth0|owner"))
        .json(&json!({"status": "outForDelivery"}))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_status_for_unknown_or_malformed_order_is_not_found() {
    let app = TestApp::new();
    app.seed_user("auth0|owner");

    for id in [uuid::Uuid::new_v4().to_string(), "not-an-id".to_string()] {
        app.server
            .patch(&format!("/api/my/restaurant/order/{id}/status"))
            .add_header("Authorization", bearer("auth0|owner"))
            .json(&json!({"status": "delivered"}))
            .await
            .assert_status_not_found();
    }
}
