//! 인증 endpoint.
//!
//! 회원가입, 로그인, 토큰 갱신을 제공합니다.
//!
//! - `POST /api/v1/auth/signup`
//! - `POST /api/v1/auth/login`
//! - `POST /api/v1/auth/refresh` (refresh token 필요)
//! - `GET /api/v1/auth/me` (access token 필요)

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use crate::auth::{require_authenticated, AuthUser, RefreshAuth};
use crate::services::{AccountServiceError, LoginRequest, SignUpRequest};
use crate::state::AppState;

/// 회원가입.
///
/// POST /api/v1/auth/signup
pub async fn sign_up(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SignUpRequest>,
) -> Result<impl IntoResponse, AccountServiceError> {
    let response = state.accounts.sign_up(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// 로그인.
///
/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, AccountServiceError> {
    let response = state.accounts.login(request).await?;
    Ok(Json(response))
}

/// 토큰 갱신.
///
/// POST /api/v1/auth/refresh
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    RefreshAuth(user): RefreshAuth,
) -> Result<impl IntoResponse, AccountServiceError> {
    let pair = state.accounts.refresh(user.id).await?;
    Ok(Json(pair))
}

/// 현재 사용자 정보.
///
/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, AccountServiceError> {
    let profile = state.accounts.current_user(user.id).await?;
    Ok(Json(profile))
}

/// 인증 라우터 생성.
pub fn auth_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let authenticated = Router::new()
        .route("/me", get(me))
        .route_layer(middleware::from_fn_with_state(state, require_authenticated));

    Router::new()
        .route("/signup", post(sign_up))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .merge(authenticated)
}
