use crate::{auth::AuthUser, entities::receipt, ApiResponse, AppState};
use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use uuid::Uuid;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders/:id/receipt", post(generate_receipt))
        .route("/orders/:id/receipt/email", post(email_receipt))
}

/// Render (or re-print) the receipt for a committed order.
#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/receipt",
    responses(
        (status = 200, description = "Receipt rendered", body = receipt::Model),
        (status = 404, description = "Unknown order", body = crate::errors::ErrorResponse)
    ),
    tag = "receipts"
)]
pub async fn generate_receipt(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> crate::ApiResult<receipt::Model> {
    let receipt = state.services.receipts.generate(id).await?;
    Ok(Json(ApiResponse::success(receipt)))
}

/// Queue the receipt for email delivery to the order's customer email.
#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/receipt/email",
    responses(
        (status = 200, description = "Receipt email queued", body = receipt::Model),
        (status = 400, description = "Order has no customer email", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown order", body = crate::errors::ErrorResponse)
    ),
    tag = "receipts"
)]
pub async fn email_receipt(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> crate::ApiResult<receipt::Model> {
    let receipt = state.services.receipts.email(id).await?;
    Ok(Json(ApiResponse::success(receipt)))
}
