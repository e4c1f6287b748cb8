use crate::{
    auth::AuthUser,
    services::orders::{OrderListResponse, OrderResponse, SubmitOrderRequest},
    ApiResponse, AppState, ListQuery,
};
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use uuid::Uuid;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders).post(submit_order))
        .route("/orders/:id", get(get_order))
}

/// Submit a cart as a sale.
///
/// All-or-nothing: the order, its items, and the stock decrements commit
/// together; any validation or stock failure leaves no trace.
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    request_body = SubmitOrderRequest,
    responses(
        (status = 200, description = "Order committed", body = OrderResponse),
        (status = 400, description = "Invalid cart", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown product", body = crate::errors::ErrorResponse),
        (status = 422, description = "Insufficient stock", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn submit_order(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<SubmitOrderRequest>,
) -> crate::ApiResult<OrderResponse> {
    let order = state
        .services
        .orders
        .submit_order(user.user_id, request)
        .await?;
    Ok(Json(ApiResponse::success(order)))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders",
    params(("page" = u64, Query, description = "Page number, 1-based"),
           ("limit" = u64, Query, description = "Page size")),
    responses((status = 200, description = "Order headers, newest first", body = OrderListResponse)),
    tag = "orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<ListQuery>,
) -> crate::ApiResult<OrderListResponse> {
    let limit = query.limit.min(state.config.api_max_page_size);
    let orders = state.services.orders.list_orders(query.page, limit).await?;
    Ok(Json(ApiResponse::success(orders)))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    responses(
        (status = 200, description = "Order with items, buyer, and receipts", body = OrderResponse),
        (status = 404, description = "Unknown order", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> crate::ApiResult<OrderResponse> {
    let order = state.services.orders.get_order(id).await?;
    Ok(Json(ApiResponse::success(order)))
}
