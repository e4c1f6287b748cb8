use crate::{
    auth::AuthUser,
    entities::{inventory, product},
    services::inventory::UpdateInventoryRequest,
    ApiResponse, AppState,
};
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Stock row joined with its product for terminal display.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InventoryRow {
    pub product_id: Uuid,
    pub quantity: i32,
    pub min_stock: i32,
    pub product: Option<product::Model>,
}

impl From<(inventory::Model, Option<product::Model>)> for InventoryRow {
    fn from((row, product): (inventory::Model, Option<product::Model>)) -> Self {
        Self {
            product_id: row.product_id,
            quantity: row.quantity,
            min_stock: row.min_stock,
            product,
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/inventory", get(list_inventory))
        .route(
            "/inventory/:product_id",
            get(get_inventory).patch(update_inventory),
        )
}

#[utoipa::path(
    get,
    path = "/api/v1/inventory",
    responses((status = 200, description = "All stock rows", body = [InventoryRow])),
    tag = "inventory"
)]
pub async fn list_inventory(
    State(state): State<AppState>,
    _user: AuthUser,
) -> crate::ApiResult<Vec<InventoryRow>> {
    let rows = state.services.inventory.list_inventory().await?;
    Ok(Json(ApiResponse::success(
        rows.into_iter().map(InventoryRow::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/inventory/{product_id}",
    responses(
        (status = 200, description = "Stock row for product", body = inventory::Model),
        (status = 404, description = "No stock row", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn get_inventory(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(product_id): Path<Uuid>,
) -> crate::ApiResult<inventory::Model> {
    let row = state.services.inventory.get_inventory(product_id).await?;
    Ok(Json(ApiResponse::success(row)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/inventory/{product_id}",
    request_body = UpdateInventoryRequest,
    responses(
        (status = 200, description = "Stock levels updated", body = inventory::Model),
        (status = 403, description = "Manager role required", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn update_inventory(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<Uuid>,
    Json(request): Json<UpdateInventoryRequest>,
) -> crate::ApiResult<inventory::Model> {
    user.require_manager()?;
    let row = state
        .services
        .inventory
        .update_inventory(product_id, request)
        .await?;
    Ok(Json(ApiResponse::success(row)))
}
