use crate::{
    auth::AuthUser,
    services::products::{CreateProductRequest, ProductResponse, UpdateProductRequest},
    ApiResponse, AppState,
};
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use uuid::Uuid;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/:id",
            get(get_product).patch(update_product).delete(delete_product),
        )
}

#[utoipa::path(
    get,
    path = "/api/v1/products",
    responses((status = 200, description = "Product catalog", body = [ProductResponse])),
    tag = "products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    _user: AuthUser,
) -> crate::ApiResult<Vec<ProductResponse>> {
    let products = state.services.products.list_products().await?;
    Ok(Json(ApiResponse::success(products)))
}

#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    responses(
        (status = 200, description = "Product detail", body = ProductResponse),
        (status = 404, description = "Unknown product", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> crate::ApiResult<ProductResponse> {
    let product = state.services.products.get_product(id).await?;
    Ok(Json(ApiResponse::success(product)))
}

#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = CreateProductRequest,
    responses(
        (status = 200, description = "Product created", body = ProductResponse),
        (status = 403, description = "Manager role required", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateProductRequest>,
) -> crate::ApiResult<ProductResponse> {
    user.require_manager()?;
    let product = state.services.products.create_product(request).await?;
    Ok(Json(ApiResponse::success(product)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/products/{id}",
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 403, description = "Manager role required", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateProductRequest>,
) -> crate::ApiResult<ProductResponse> {
    user.require_manager()?;
    let product = state.services.products.update_product(id, request).await?;
    Ok(Json(ApiResponse::success(product)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/products/{id}",
    responses(
        (status = 200, description = "Product deleted"),
        (status = 403, description = "Manager role required", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> crate::ApiResult<()> {
    user.require_manager()?;
    state.services.products.delete_product(id).await?;
    Ok(Json(ApiResponse::success(())))
}
