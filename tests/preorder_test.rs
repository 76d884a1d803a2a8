mod common;

use axum::http::{Method, StatusCode};
use common::{read_json, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;
use tienda_api::auth::Role;
use uuid::Uuid;

#[tokio::test]
async fn guest_pre_order_builds_contact_link_and_decrements_stock() {
    let app = TestApp::new().await;
    let product = app.seed_product("Aguardiente", dec!(50000), 10).await;

    let body = json!({
        "items": [{ "product_id": product.id, "quantity": 2 }],
        "guest_name": "Juan",
        "guest_phone": "3001234567",
        "guest_city": "Valledupar"
    });

    let response = app
        .request(Method::POST, "/api/v1/preorders", Some(body), None)
        .await;
    let (status, json) = read_json(response).await;

    assert_eq!(status, StatusCode::CREATED);
    let data = &json["data"];
    assert_eq!(data["total"], "100000");
    assert_eq!(data["status"], "sent");
    assert!(data["customer_id"].is_null());
    assert_eq!(data["guest_phone"], "3001234567");

    let link = data["whatsapp_link"].as_str().unwrap();
    assert!(link.starts_with("https://wa.me/573001112233?text="));
    assert!(link.contains("100000"));

    assert_eq!(app.product_stock(product.id).await, 8);
}

#[tokio::test]
async fn guest_pre_order_requires_contact_phone() {
    let app = TestApp::new().await;
    let product = app.seed_product("Cerveza", dec!(2500), 10).await;

    let body = json!({
        "items": [{ "product_id": product.id, "quantity": 1 }],
        "guest_name": "Juan",
        "guest_phone": "  123  "
    });

    let response = app
        .request(Method::POST, "/api/v1/preorders", Some(body), None)
        .await;
    let (status, _) = read_json(response).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.product_stock(product.id).await, 10);
}

#[tokio::test]
async fn linked_customer_pre_order_drops_guest_fields() {
    let app = TestApp::new().await;
    let user_id = Uuid::new_v4();
    let customer = app.seed_customer(Some(user_id)).await;
    let product = app.seed_product("Ron", dec!(80000), 5).await;
    let token = app.mint_token(user_id, Role::Customer);

    // Guest fields must be ignored once the profile is linked
    let body = json!({
        "items": [{ "product_id": product.id, "quantity": 1 }],
        "guest_name": "No Importa",
        "guest_phone": "3009999999"
    });

    let response = app
        .request(Method::POST, "/api/v1/preorders", Some(body), Some(&token))
        .await;
    let (status, json) = read_json(response).await;

    assert_eq!(status, StatusCode::CREATED);
    let data = &json["data"];
    assert_eq!(data["customer_id"], customer.id.to_string());
    assert!(data["guest_name"].is_null());
    assert!(data["guest_phone"].is_null());
    assert!(data["guest_city"].is_null());
    assert_eq!(app.product_stock(product.id).await, 4);
}

#[tokio::test]
async fn authenticated_user_without_profile_falls_back_to_guest() {
    let app = TestApp::new().await;
    let product = app.seed_product("Vino", dec!(40000), 3).await;
    let token = app.mint_token(Uuid::new_v4(), Role::Customer);

    let body = json!({
        "items": [{ "product_id": product.id, "quantity": 1 }],
        "guest_phone": "3001234567"
    });

    let response = app
        .request(Method::POST, "/api/v1/preorders", Some(body), Some(&token))
        .await;
    let (status, json) = read_json(response).await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(json["data"]["customer_id"].is_null());
    assert_eq!(json["data"]["guest_phone"], "3001234567");
}

#[tokio::test]
async fn request_override_changes_business_number() {
    let app = TestApp::new().await;
    let product = app.seed_product("Gaseosa", dec!(3000), 10).await;

    let body = json!({
        "items": [{ "product_id": product.id, "quantity": 1 }],
        "guest_phone": "3001234567",
        "whatsapp_to": "+57 311 222-3344"
    });

    let response = app
        .request(Method::POST, "/api/v1/preorders", Some(body), None)
        .await;
    let (status, json) = read_json(response).await;

    assert_eq!(status, StatusCode::CREATED);
    let link = json["data"]["whatsapp_link"].as_str().unwrap();
    assert!(link.starts_with("https://wa.me/573112223344?text="));
}

#[tokio::test]
async fn pre_order_stock_shortage_rolls_back() {
    let app = TestApp::new().await;
    let product = app.seed_product("Whisky", dec!(120000), 1).await;

    let body = json!({
        "items": [{ "product_id": product.id, "quantity": 2 }],
        "guest_phone": "3001234567"
    });

    let response = app
        .request(Method::POST, "/api/v1/preorders", Some(body), None)
        .await;
    let (status, _) = read_json(response).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(app.product_stock(product.id).await, 1);
}

#[tokio::test]
async fn unknown_product_fails_pre_order() {
    let app = TestApp::new().await;

    let body = json!({
        "items": [{ "product_id": Uuid::new_v4(), "quantity": 1 }],
        "guest_phone": "3001234567"
    });

    let response = app
        .request(Method::POST, "/api/v1/preorders", Some(body), None)
        .await;
    let (status, _) = read_json(response).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
