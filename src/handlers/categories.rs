use crate::{
    auth::AuthUser,
    entities::category,
    services::categories::{CreateCategoryRequest, UpdateCategoryRequest},
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
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/:id",
            get(get_category)
                .patch(update_category)
                .delete(delete_category),
        )
}

pub async fn list_categories(
    State(state): State<AppState>,
    _user: AuthUser,
) -> crate::ApiResult<Vec<category::Model>> {
    let categories = state.services.categories.list_categories().await?;
    Ok(Json(ApiResponse::success(categories)))
}

pub async fn get_category(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> crate::ApiResult<category::Model> {
    let cat = state.services.categories.get_category(id).await?;
    Ok(Json(ApiResponse::success(cat)))
}

pub async fn create_category(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateCategoryRequest>,
) -> crate::ApiResult<category::Model> {
    user.require_manager()?;
    let cat = state.services.categories.create_category(request).await?;
    Ok(Json(ApiResponse::success(cat)))
}

pub async fn update_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateCategoryRequest>,
) -> crate::ApiResult<category::Model> {
    user.require_manager()?;
    let cat = state
        .services
        .categories
        .update_category(id, request)
        .await?;
    Ok(Json(ApiResponse::success(cat)))
}

pub async fn delete_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> crate::ApiResult<()> {
    user.require_manager()?;
    state.services.categories.delete_category(id).await?;
    Ok(Json(ApiResponse::success(())))
}
