//! API 라우트 정의.
//!
//! 모든 REST API 엔드포인트를 정의하고 라우터를 구성합니다.

pub mod auth;
pub mod health;
pub mod users;

pub use auth::auth_router;
pub use health::{health_check, health_ready, health_router, HealthResponse};
pub use users::users_router;

use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// 서비스 소개 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
    pub health: String,
}

/// 서비스 소개.
///
/// GET /
pub async fn service_info(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ServiceInfo {
        name: "Identity API".to_string(),
        version: state.version.clone(),
        health: "/health/ready".to_string(),
    })
}

/// 전체 API 라우터 생성.
pub fn create_api_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(service_info))
        .route("/status", get(health_ready))
        // 헬스 체크 엔드포인트
        .nest("/health", health_router())
        // API v1 엔드포인트
        .nest(
            "/api/v1",
            Router::new()
                .nest("/auth", auth_router(state.clone()))
                .merge(users_router(state)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::create_test_state;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_service_info() {
        let state = Arc::new(create_test_state());
        let app = create_api_router(state.clone()).with_state(state);

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let info: ServiceInfo = serde_json::from_slice(&body).unwrap();
        assert_eq!(info.name, "Identity API");
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let state = Arc::new(create_test_state());
        let app = create_api_router(state.clone()).with_state(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
