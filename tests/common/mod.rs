#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use http_body_util::BodyExt;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

use pos_api::{
    auth::{hash_password, AuthConfig, AuthService},
    config::AppConfig,
    db,
    entities::{category, inventory, product, user, user::UserRole},
    events::{self, EventSender},
    handlers::AppServices,
    services::inventory::UpdateInventoryRequest,
    AppState,
};

/// Test harness backed by an in-memory SQLite database.
///
/// The pool is pinned to a single connection so the in-memory database is
/// shared by every query; writes from concurrent tasks serialize on it
/// the way row-level isolation serializes them on a server database.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub manager: user::Model,
    pub cashier: user::Model,
    pub manager_token: String,
    pub cashier_token: String,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "test_secret_key_for_testing_purposes_only_32chars".to_string(),
            3600,
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");
        let db_arc = Arc::new(pool);

        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let auth_service = Arc::new(AuthService::new(
            AuthConfig::new(cfg.jwt_secret.clone(), Duration::from_secs(3600)),
            db_arc.clone(),
        ));
        let services = AppServices::new(
            db_arc.clone(),
            event_sender.clone(),
            auth_service.clone(),
            "POS SYSTEM".to_string(),
        );

        let manager = seed_user(&db_arc, "manager@example.com", UserRole::Manager).await;
        let cashier = seed_user(&db_arc, "cashier@example.com", UserRole::Cashier).await;
        let manager_token = auth_service
            .issue_token(&manager)
            .expect("manager token")
            .access_token;
        let cashier_token = auth_service
            .issue_token(&cashier)
            .expect("cashier token")
            .access_token;

        let state = AppState {
            db: db_arc,
            config: cfg,
            event_sender,
            auth_service,
            services,
        };
        let router = pos_api::build_router(state.clone());

        Self {
            router,
            state,
            manager,
            cashier,
            manager_token,
            cashier_token,
            _event_task: event_task,
        }
    }

    /// Creates a category, returning its id.
    pub async fn seed_category(&self, name: &str) -> Uuid {
        let now = Utc::now();
        category::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            description: Set(None),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        }
        .insert(&*self.state.db)
        .await
        .expect("seed category")
        .id
    }

    /// Creates a product in the given category with the given stock.
    pub async fn seed_product(
        &self,
        category_id: Uuid,
        name: &str,
        price_cents: i64,
        stock: i32,
    ) -> Uuid {
        let now = Utc::now();
        let product_id = Uuid::new_v4();
        product::ActiveModel {
            id: Set(product_id),
            name: Set(name.to_string()),
            description: Set(None),
            price_cents: Set(price_cents),
            barcode: Set(None),
            image_url: Set(None),
            category_id: Set(category_id),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        }
        .insert(&*self.state.db)
        .await
        .expect("seed product");

        inventory::ActiveModel {
            product_id: Set(product_id),
            quantity: Set(stock),
            min_stock: Set(0),
            updated_at: Set(Some(now)),
        }
        .insert(&*self.state.db)
        .await
        .expect("seed inventory");

        product_id
    }

    /// Current stock quantity for a product.
    pub async fn stock_of(&self, product_id: Uuid) -> i32 {
        self.state
            .services
            .inventory
            .get_inventory(product_id)
            .await
            .expect("inventory row")
            .quantity
    }

    /// Number of persisted orders.
    pub async fn order_count(&self) -> u64 {
        self.state
            .services
            .orders
            .list_orders(1, 1)
            .await
            .expect("list orders")
            .total
    }

    pub async fn set_stock(&self, product_id: Uuid, quantity: i32) {
        self.state
            .services
            .inventory
            .update_inventory(
                product_id,
                UpdateInventoryRequest {
                    quantity: Some(quantity),
                    min_stock: None,
                },
            )
            .await
            .expect("set stock");
    }

    /// Issues an HTTP request against the app router and returns status
    /// plus parsed JSON body.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .expect("request"),
            None => builder.body(Body::empty()).expect("request"),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router response");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }
}

async fn seed_user(
    db: &Arc<sea_orm::DatabaseConnection>,
    email: &str,
    role: UserRole,
) -> user::Model {
    let now = Utc::now();
    user::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        password_hash: Set(hash_password("password123").expect("hash")),
        name: Set(email.split('@').next().unwrap_or("operator").to_string()),
        role: Set(role),
        created_at: Set(now),
        updated_at: Set(Some(now)),
    }
    .insert(&**db)
    .await
    .expect("seed user")
}
