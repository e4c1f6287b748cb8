use crate::{
    auth::{AuthUser, LoginRequest, SignupRequest, TokenResponse, UserProfile},
    ApiResponse, AppState,
};
use axum::{extract::State, routing::get, routing::post, Json, Router};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/signup", post(signup))
        .route("/auth/me", get(me))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 401, description = "Invalid credentials", body = crate::errors::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> crate::ApiResult<TokenResponse> {
    let token = state.services.auth.login(request).await?;
    Ok(Json(ApiResponse::success(token)))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "Account created", body = TokenResponse),
        (status = 409, description = "Email already in use", body = crate::errors::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> crate::ApiResult<TokenResponse> {
    let token = state.services.auth.signup(request).await?;
    Ok(Json(ApiResponse::success(token)))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses((status = 200, description = "Current operator", body = UserProfile)),
    tag = "auth"
)]
pub async fn me(user: AuthUser) -> Json<ApiResponse<UserProfile>> {
    Json(ApiResponse::success(UserProfile {
        id: user.user_id,
        email: user.email,
        name: user.name,
        role: user.role,
    }))
}
