mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn health_endpoint_is_open() {
    let app = TestApp::new().await;
    let (status, body) = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn protected_routes_require_a_bearer_token() {
    let app = TestApp::new().await;
    let (status, body) = app.request(Method::GET, "/api/v1/products", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");
}

#[tokio::test]
async fn login_and_me_round_trip() {
    let app = TestApp::new().await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({"email": "cashier@example.com", "password": "password123"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["data"]["access_token"]
        .as_str()
        .expect("token issued")
        .to_string();
    assert_eq!(body["data"]["user"]["role"], "CASHIER");

    let (status, body) = app
        .request(Method::GET, "/api/v1/auth/me", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "cashier@example.com");
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let app = TestApp::new().await;
    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({"email": "cashier@example.com", "password": "not-the-password"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn signup_rejects_duplicate_email() {
    let app = TestApp::new().await;
    let payload = json!({
        "email": "new-operator@example.com",
        "password": "longenoughpw",
        "name": "New Operator"
    });

    let (status, _) = app
        .request(Method::POST, "/api/v1/auth/signup", None, Some(payload.clone()))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .request(Method::POST, "/api/v1/auth/signup", None, Some(payload))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn cashiers_cannot_administer_the_catalog() {
    let app = TestApp::new().await;
    let category = app.seed_category("Drinks").await;

    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/products",
            Some(&app.cashier_token),
            Some(json!({
                "name": "Plain Coffee",
                "price_cents": 250,
                "category_id": category
            })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/categories",
            Some(&app.cashier_token),
            Some(json!({"name": "Snacks"})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn manager_administers_catalog_and_stock() {
    let app = TestApp::new().await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/categories",
            Some(&app.manager_token),
            Some(json!({"name": "Drinks", "description": "Cold and hot drinks"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let category_id = body["data"]["id"].as_str().expect("category id").to_string();

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/products",
            Some(&app.manager_token),
            Some(json!({
                "name": "Plain Coffee",
                "description": "Freshly brewed",
                "price_cents": 250,
                "barcode": "COF-0001",
                "category_id": category_id
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let product_id = body["data"]["id"].as_str().expect("product id").to_string();
    // Creating a product creates its stock row at quantity zero.
    assert_eq!(body["data"]["inventory"]["quantity"], 0);

    let (status, body) = app
        .request(
            Method::PATCH,
            &format!("/api/v1/inventory/{product_id}"),
            Some(&app.manager_token),
            Some(json!({"quantity": 50, "min_stock": 5})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["quantity"], 50);
    assert_eq!(body["data"]["min_stock"], 5);

    let (status, body) = app
        .request(
            Method::GET,
            &format!("/api/v1/inventory/{product_id}"),
            Some(&app.cashier_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["quantity"], 50);
}

#[tokio::test]
async fn order_submission_and_receipts_over_http() {
    let app = TestApp::new().await;
    let category = app.seed_category("Drinks").await;
    let coffee = app.seed_product(category, "Plain Coffee", 250, 50).await;

    // Cashier rings up two coffees for an emailed receipt.
    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(&app.cashier_token),
            Some(json!({
                "items": [{"product_id": coffee, "quantity": 2}],
                "customer_email": "guest@example.com",
                "payment_method": "CARD"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["subtotal_cents"], 500);
    assert_eq!(body["data"]["tax_cents"], 38);
    assert_eq!(body["data"]["total_cents"], 538);
    assert_eq!(body["data"]["status"], "COMPLETED");
    let order_id = body["data"]["id"].as_str().expect("order id").to_string();

    // Over-stock submission maps to 422 and changes nothing.
    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(&app.cashier_token),
            Some(json!({
                "items": [{"product_id": coffee, "quantity": 1000}]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["message"]
        .as_str()
        .expect("message")
        .contains(&coffee.to_string()));
    assert_eq!(app.stock_of(coffee).await, 48);

    // Empty carts map to 400.
    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(&app.cashier_token),
            Some(json!({"items": []})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Receipt rendering is idempotent per order.
    let (status, body) = app
        .request(
            Method::POST,
            &format!("/api/v1/orders/{order_id}/receipt"),
            Some(&app.cashier_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let receipt_id = body["data"]["id"].as_str().expect("receipt id").to_string();
    let receipt_body = body["data"]["body"].as_str().expect("receipt body");
    assert!(receipt_body.contains("Plain Coffee"));
    assert!(receipt_body.contains("$5.38"));

    let (status, body) = app
        .request(
            Method::POST,
            &format!("/api/v1/orders/{order_id}/receipt"),
            Some(&app.cashier_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], receipt_id.as_str());

    // Email delivery marks the receipt sent.
    let (status, body) = app
        .request(
            Method::POST,
            &format!("/api/v1/orders/{order_id}/receipt/email"),
            Some(&app.cashier_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email_sent"], true);

    // The order graph now lists the receipt.
    let (status, body) = app
        .request(
            Method::GET,
            &format!("/api/v1/orders/{order_id}"),
            Some(&app.cashier_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["receipts"].as_array().map(|r| r.len()), Some(1));
}

#[tokio::test]
async fn emailing_without_customer_email_is_invalid() {
    let app = TestApp::new().await;
    let category = app.seed_category("Drinks").await;
    let coffee = app.seed_product(category, "Plain Coffee", 250, 10).await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(&app.cashier_token),
            Some(json!({"items": [{"product_id": coffee, "quantity": 1}]})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let order_id = body["data"]["id"].as_str().expect("order id").to_string();

    let (status, _) = app
        .request(
            Method::POST,
            &format!("/api/v1/orders/{order_id}/receipt/email"),
            Some(&app.cashier_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
