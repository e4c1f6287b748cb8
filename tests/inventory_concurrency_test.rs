mod common;

use common::TestApp;
use pos_api::errors::ServiceError;
use pos_api::services::orders::{OrderLine, SubmitOrderRequest};
use uuid::Uuid;

fn cart(product_id: Uuid, quantity: i32) -> SubmitOrderRequest {
    SubmitOrderRequest {
        items: vec![OrderLine {
            product_id,
            quantity,
        }],
        customer_email: None,
        payment_method: None,
    }
}

/// Two terminals race for the full remaining stock of one product.
/// Exactly one submission commits; the loser fails with
/// InsufficientStock and the final quantity is zero, never negative.
#[tokio::test]
async fn two_terminals_racing_for_last_stock_yield_one_winner() {
    let app = TestApp::new().await;
    let category = app.seed_category("Drinks").await;
    let coffee = app.seed_product(category, "Plain Coffee", 250, 5).await;

    let orders_a = app.state.services.orders.clone();
    let orders_b = app.state.services.orders.clone();
    let buyer = app.cashier.id;

    let task_a = tokio::spawn(async move { orders_a.submit_order(buyer, cart(coffee, 5)).await });
    let task_b = tokio::spawn(async move { orders_b.submit_order(buyer, cart(coffee, 5)).await });

    let result_a = task_a.await.expect("task a");
    let result_b = task_b.await.expect("task b");

    let successes = [&result_a, &result_b]
        .iter()
        .filter(|r| r.is_ok())
        .count();
    assert_eq!(successes, 1, "exactly one submission must commit");

    let loser = if result_a.is_err() {
        result_a.unwrap_err()
    } else {
        result_b.unwrap_err()
    };
    match loser {
        ServiceError::InsufficientStock { product_id, .. } => {
            assert_eq!(product_id, coffee);
        }
        other => panic!("expected InsufficientStock, got {other:?}"),
    }

    assert_eq!(app.stock_of(coffee).await, 0);
    assert_eq!(app.order_count().await, 1);
}

/// Twenty concurrent single-unit sales against a stock of ten: exactly
/// ten commit and the quantity lands on zero.
#[tokio::test]
async fn concurrent_unit_sales_never_oversell() {
    let app = TestApp::new().await;
    let category = app.seed_category("Drinks").await;
    let water = app.seed_product(category, "Bottled Water", 150, 10).await;

    let mut tasks = Vec::new();
    for _ in 0..20 {
        let orders = app.state.services.orders.clone();
        let buyer = app.cashier.id;
        tasks.push(tokio::spawn(async move {
            orders.submit_order(buyer, cart(water, 1)).await.is_ok()
        }));
    }

    let mut successes = 0;
    for task in tasks {
        if task.await.unwrap_or(false) {
            successes += 1;
        }
    }

    assert_eq!(
        successes, 10,
        "exactly 10 sales should commit; got {successes}"
    );
    assert_eq!(app.stock_of(water).await, 0);
    assert_eq!(app.order_count().await, 10);
}
