mod common;

use axum::http::{Method, StatusCode};
use common::{read_json, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;
use tienda_api::auth::Role;
use uuid::Uuid;

#[tokio::test]
async fn order_consolidates_duplicates_and_uses_catalog_prices() {
    let app = TestApp::new().await;
    let user_id = Uuid::new_v4();
    app.seed_customer(Some(user_id)).await;
    let product = app.seed_product("Cerveza", dec!(1000), 10).await;
    let token = app.mint_token(user_id, Role::Customer);

    // Duplicate lines for the same product, with a client-supplied price the
    // server must ignore.
    let body = json!({
        "items": [
            { "product_id": product.id, "quantity": 2, "price": "1" },
            { "product_id": product.id, "quantity": 3 }
        ]
    });

    let response = app
        .request(Method::POST, "/api/v1/orders", Some(body), Some(&token))
        .await;
    let (status, json) = read_json(response).await;

    assert_eq!(status, StatusCode::CREATED);
    let data = &json["data"];
    assert_eq!(data["total"], "5000");
    assert_eq!(data["status"], "awaiting_confirmation");
    assert_eq!(data["items"].as_array().unwrap().len(), 1);
    assert_eq!(data["items"][0]["quantity"], 5);
    assert_eq!(data["items"][0]["unit_price"], "1000");

    assert_eq!(app.product_stock(product.id).await, 5);
}

#[tokio::test]
async fn unknown_product_aborts_whole_order() {
    let app = TestApp::new().await;
    let user_id = Uuid::new_v4();
    app.seed_customer(Some(user_id)).await;
    let product = app.seed_product("Ron", dec!(80000), 4).await;
    let token = app.mint_token(user_id, Role::Customer);

    let body = json!({
        "items": [
            { "product_id": product.id, "quantity": 2 },
            { "product_id": Uuid::new_v4(), "quantity": 1 }
        ]
    });

    let response = app
        .request(Method::POST, "/api/v1/orders", Some(body), Some(&token))
        .await;
    let (status, _) = read_json(response).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    // Rollback: stock for the known product is untouched
    assert_eq!(app.product_stock(product.id).await, 4);
}

#[tokio::test]
async fn insufficient_stock_aborts_even_when_other_lines_fit() {
    let app = TestApp::new().await;
    let user_id = Uuid::new_v4();
    app.seed_customer(Some(user_id)).await;
    let plenty = app.seed_product("Agua", dec!(2000), 100).await;
    let scarce = app.seed_product("Whisky", dec!(120000), 1).await;
    let token = app.mint_token(user_id, Role::Customer);

    let body = json!({
        "items": [
            { "product_id": plenty.id, "quantity": 5 },
            { "product_id": scarce.id, "quantity": 2 }
        ]
    });

    let response = app
        .request(Method::POST, "/api/v1/orders", Some(body), Some(&token))
        .await;
    let (status, json) = read_json(response).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json["message"]
        .as_str()
        .unwrap_or_default()
        .contains("Whisky"));
    assert_eq!(app.product_stock(plenty.id).await, 100);
    assert_eq!(app.product_stock(scarce.id).await, 1);
}

#[tokio::test]
async fn stock_error_reports_current_availability() {
    let app = TestApp::new().await;
    let user_id = Uuid::new_v4();
    app.seed_customer(Some(user_id)).await;
    let product = app.seed_product("Tequila", dec!(90000), 5).await;
    let token = app.mint_token(user_id, Role::Customer);

    let body = json!({ "items": [{ "product_id": product.id, "quantity": 3 }] });
    let (status, _) = read_json(
        app.request(Method::POST, "/api/v1/orders", Some(body), Some(&token))
            .await,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // The rejection must report what is left now, not the seeded stock
    let body = json!({ "items": [{ "product_id": product.id, "quantity": 4 }] });
    let (status, json) = read_json(
        app.request(Method::POST, "/api/v1/orders", Some(body), Some(&token))
            .await,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    let message = json["message"].as_str().unwrap_or_default();
    assert!(message.contains("Available=2"), "{}", message);
    assert!(message.contains("requested=4"), "{}", message);
}

#[tokio::test]
async fn empty_cart_is_rejected() {
    let app = TestApp::new().await;
    let user_id = Uuid::new_v4();
    app.seed_customer(Some(user_id)).await;
    let token = app.mint_token(user_id, Role::Customer);

    let response = app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(json!({ "items": [] })),
            Some(&token),
        )
        .await;
    let (status, _) = read_json(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn order_requires_linked_customer_profile() {
    let app = TestApp::new().await;
    let user_id = Uuid::new_v4();
    let product = app.seed_product("Gaseosa", dec!(3000), 10).await;
    let token = app.mint_token(user_id, Role::Customer);

    let body = json!({ "items": [{ "product_id": product.id, "quantity": 1 }] });
    let response = app
        .request(Method::POST, "/api/v1/orders", Some(body), Some(&token))
        .await;
    let (status, _) = read_json(response).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(app.product_stock(product.id).await, 10);
}

#[tokio::test]
async fn order_requires_bearer_token() {
    let app = TestApp::new().await;
    let product = app.seed_product("Vino", dec!(40000), 3).await;

    let body = json!({ "items": [{ "product_id": product.id, "quantity": 1 }] });
    let response = app
        .request(Method::POST, "/api/v1/orders", Some(body), None)
        .await;
    let (status, _) = read_json(response).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn owner_and_admin_can_read_order_but_strangers_cannot() {
    let app = TestApp::new().await;
    let owner_user = Uuid::new_v4();
    let stranger_user = Uuid::new_v4();
    app.seed_customer(Some(owner_user)).await;
    app.seed_customer(Some(stranger_user)).await;
    let product = app.seed_product("Cerveza", dec!(1000), 10).await;

    let owner_token = app.mint_token(owner_user, Role::Customer);
    let stranger_token = app.mint_token(stranger_user, Role::Customer);
    let admin_token = app.mint_token(Uuid::new_v4(), Role::Admin);

    let body = json!({ "items": [{ "product_id": product.id, "quantity": 1 }] });
    let response = app
        .request(Method::POST, "/api/v1/orders", Some(body), Some(&owner_token))
        .await;
    let (status, created) = read_json(response).await;
    assert_eq!(status, StatusCode::CREATED);
    let order_id = created["data"]["id"].as_str().unwrap().to_string();
    let uri = format!("/api/v1/orders/{}", order_id);

    let (status, _) = read_json(app.request(Method::GET, &uri, None, Some(&owner_token)).await).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = read_json(app.request(Method::GET, &uri, None, Some(&admin_token)).await).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) =
        read_json(app.request(Method::GET, &uri, None, Some(&stranger_token)).await).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn concurrent_commits_for_last_unit_produce_exactly_one_order() {
    let app = TestApp::new().await;
    let user_a = Uuid::new_v4();
    let user_b = Uuid::new_v4();
    app.seed_customer(Some(user_a)).await;
    app.seed_customer(Some(user_b)).await;
    let product = app.seed_product("Botella unica", dec!(150000), 1).await;

    let token_a = app.mint_token(user_a, Role::Customer);
    let token_b = app.mint_token(user_b, Role::Customer);
    let body = json!({ "items": [{ "product_id": product.id, "quantity": 1 }] });

    let (res_a, res_b) = tokio::join!(
        app.request(Method::POST, "/api/v1/orders", Some(body.clone()), Some(&token_a)),
        app.request(Method::POST, "/api/v1/orders", Some(body.clone()), Some(&token_b)),
    );
    let (status_a, _) = read_json(res_a).await;
    let (status_b, _) = read_json(res_b).await;

    let successes = [status_a, status_b]
        .iter()
        .filter(|s| **s == StatusCode::CREATED)
        .count();
    assert_eq!(successes, 1, "exactly one commit must win: {:?} / {:?}", status_a, status_b);
    assert_eq!(app.product_stock(product.id).await, 0);
}
