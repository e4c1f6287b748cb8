use utoipa::OpenApi;

use crate::{auth, entities, errors, handlers, services};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "POS API",
        description = "Point-of-sale backend: catalog, inventory, atomic order submission, receipts"
    ),
    paths(
        handlers::health::health,
        handlers::auth::login,
        handlers::auth::signup,
        handlers::auth::me,
        handlers::products::list_products,
        handlers::products::get_product,
        handlers::products::create_product,
        handlers::products::update_product,
        handlers::products::delete_product,
        handlers::inventory::list_inventory,
        handlers::inventory::get_inventory,
        handlers::inventory::update_inventory,
        handlers::orders::submit_order,
        handlers::orders::list_orders,
        handlers::orders::get_order,
        handlers::receipts::generate_receipt,
        handlers::receipts::email_receipt,
    ),
    components(schemas(
        errors::ErrorResponse,
        auth::LoginRequest,
        auth::SignupRequest,
        auth::TokenResponse,
        auth::UserProfile,
        entities::user::UserRole,
        entities::order::OrderStatus,
        entities::order::PaymentMethod,
        entities::category::Model,
        entities::product::Model,
        entities::inventory::Model,
        entities::receipt::Model,
        handlers::inventory::InventoryRow,
        services::products::CreateProductRequest,
        services::products::UpdateProductRequest,
        services::products::ProductResponse,
        services::products::StockSummary,
        services::inventory::UpdateInventoryRequest,
        services::orders::SubmitOrderRequest,
        services::orders::OrderLine,
        services::orders::OrderResponse,
        services::orders::OrderItemResponse,
        services::orders::OrderSummary,
        services::orders::OrderListResponse,
        services::orders::ProductSummary,
        services::orders::CategorySummary,
        services::orders::ReceiptSummary,
    )),
    tags(
        (name = "health", description = "Liveness"),
        (name = "auth", description = "Operator authentication"),
        (name = "products", description = "Catalog administration"),
        (name = "inventory", description = "Stock ledger"),
        (name = "orders", description = "Order submission and lookup"),
        (name = "receipts", description = "Receipt rendering and delivery")
    )
)]
pub struct ApiDoc;
