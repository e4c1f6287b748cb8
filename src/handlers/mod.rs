pub mod auth;
pub mod categories;
pub mod health;
pub mod inventory;
pub mod orders;
pub mod products;
pub mod receipts;

use crate::auth::AuthService;
use crate::db::DbPool;
use crate::events::EventSender;
use crate::services::{
    categories::CategoryService, inventory::InventoryService, orders::OrderService,
    products::ProductService, receipts::ReceiptService,
};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers.
#[derive(Clone)]
pub struct AppServices {
    pub auth: Arc<AuthService>,
    pub categories: Arc<CategoryService>,
    pub products: Arc<ProductService>,
    pub inventory: Arc<InventoryService>,
    pub orders: Arc<OrderService>,
    pub receipts: Arc<ReceiptService>,
}

impl AppServices {
    pub fn new(
        db: Arc<DbPool>,
        event_sender: EventSender,
        auth: Arc<AuthService>,
        store_name: String,
    ) -> Self {
        let inventory = InventoryService::new(db.clone());
        let orders = Arc::new(OrderService::new(
            db.clone(),
            inventory.clone(),
            event_sender.clone(),
        ));
        let receipts = Arc::new(ReceiptService::new(
            db.clone(),
            orders.clone(),
            event_sender,
            store_name,
        ));

        Self {
            auth,
            categories: Arc::new(CategoryService::new(db.clone())),
            products: Arc::new(ProductService::new(db.clone())),
            inventory: Arc::new(inventory),
            orders,
            receipts,
        }
    }
}
