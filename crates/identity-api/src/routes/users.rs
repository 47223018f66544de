//! 사용자 관리 endpoint (관리자 전용).
//!
//! 모든 라우트는 `admin` 역할을 요구합니다.
//!
//! - `GET /api/v1/users?limit&offset`
//! - `GET /api/v1/user/{user_id}`
//! - `PUT /api/v1/user/{user_id}`
//! - `DELETE /api/v1/user/{user_id}`

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use identity_core::{Role, UserId};
use tracing::debug;

use crate::auth::{require_role, AuthUser, RoleGate};
use crate::services::{AccountServiceError, ListUsersQuery, UpdateUserRequest, UserListResponse};
use crate::state::AppState;

fn parse_user_id(raw: &str) -> Result<UserId, AccountServiceError> {
    raw.parse::<UserId>()
        .map_err(|e| AccountServiceError::Validation(e.to_string()))
}

/// 사용자 목록 조회.
///
/// GET /api/v1/users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListUsersQuery>,
) -> Result<impl IntoResponse, AccountServiceError> {
    let (limit, offset) = query.resolve();
    let users = state.accounts.list_users(&query).await?;
    Ok(Json(UserListResponse {
        users,
        limit,
        offset,
    }))
}

/// 사용자 단건 조회.
///
/// GET /api/v1/user/{user_id}
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AccountServiceError> {
    let user_id = parse_user_id(&user_id)?;
    let user = state.accounts.get_user(user_id).await?;
    Ok(Json(user))
}

/// 사용자 수정.
///
/// PUT /api/v1/user/{user_id}
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    admin: AuthUser,
    Path(user_id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, AccountServiceError> {
    let user_id = parse_user_id(&user_id)?;
    debug!(admin_id = %admin.id, user_id = %user_id, "Admin updating user");
    let user = state.accounts.update_user(user_id, request).await?;
    Ok(Json(user))
}

/// 사용자 삭제.
///
/// DELETE /api/v1/user/{user_id}
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    admin: AuthUser,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AccountServiceError> {
    let user_id = parse_user_id(&user_id)?;
    debug!(admin_id = %admin.id, user_id = %user_id, "Admin deleting user");
    state.accounts.delete_user(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// 사용자 관리 라우터 생성.
///
/// 가드가 역할 조회에 디렉토리를 사용하므로 상태를 미리 받습니다.
pub fn users_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", get(list_users))
        .route(
            "/user/{user_id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route_layer(middleware::from_fn_with_state(
            RoleGate::new(state, Role::Admin),
            require_role,
        ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{SignUpRequest, UserResponse};
    use crate::state::create_test_state;
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    async fn seeded() -> (Router, Arc<AppState>, String, String, UserId) {
        let state = Arc::new(create_test_state());

        let mut admin = signup("admin@x.com");
        admin.user_type = Some("admin".to_string());
        let admin = state.accounts.sign_up(admin).await.unwrap();
        let user = state.accounts.sign_up(signup("user@x.com")).await.unwrap();

        let router = users_router(state.clone()).with_state(state.clone());
        (router, state, admin.access_token, user.access_token, user.user.id)
    }

    fn signup(email: &str) -> SignUpRequest {
        SignUpRequest {
            email: email.to_string(),
            password: "longenough1".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            phone: None,
            user_type: None,
        }
    }

    fn request(method: &str, uri: &str, token: Option<&str>, body: Option<serde_json::Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_admin_can_list_users() {
        let (app, _, admin_token, _, _) = seeded().await;

        let response = app
            .oneshot(request("GET", "/users", Some(&admin_token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let list: UserListResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(list.users.len(), 2);
        assert_eq!(list.limit, 10);
        assert_eq!(list.offset, 0);
    }

    #[tokio::test]
    async fn test_user_role_is_forbidden() {
        let (app, _, _, user_token, user_id) = seeded().await;

        let list = app
            .clone()
            .oneshot(request("GET", "/users", Some(&user_token), None))
            .await
            .unwrap();
        assert_eq!(list.status(), StatusCode::FORBIDDEN);

        let get = app
            .oneshot(request("GET", &format!("/user/{user_id}"), Some(&user_token), None))
            .await
            .unwrap();
        assert_eq!(get.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let (app, _, _, _, _) = seeded().await;

        let response = app.oneshot(request("GET", "/users", None, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_admin_get_update_delete() {
        let (app, _, admin_token, _, user_id) = seeded().await;
        let uri = format!("/user/{user_id}");

        let get = app
            .clone()
            .oneshot(request("GET", &uri, Some(&admin_token), None))
            .await
            .unwrap();
        assert_eq!(get.status(), StatusCode::OK);

        let update = app
            .clone()
            .oneshot(request(
                "PUT",
                &uri,
                Some(&admin_token),
                Some(serde_json::json!({"firstName": "Grace", "userType": "admin"})),
            ))
            .await
            .unwrap();
        assert_eq!(update.status(), StatusCode::OK);
        let body = axum::body::to_bytes(update.into_body(), usize::MAX)
            .await
            .unwrap();
        let updated: UserResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(updated.first_name.as_deref(), Some("Grace"));
        assert_eq!(updated.user_type, Some(Role::Admin));

        let delete = app
            .clone()
            .oneshot(request("DELETE", &uri, Some(&admin_token), None))
            .await
            .unwrap();
        assert_eq!(delete.status(), StatusCode::NO_CONTENT);

        let gone = app
            .oneshot(request("GET", &uri, Some(&admin_token), None))
            .await
            .unwrap();
        assert_eq!(gone.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_update_rejected() {
        let (app, _, admin_token, _, user_id) = seeded().await;

        let response = app
            .clone()
            .oneshot(request(
                "PUT",
                &format!("/user/{user_id}"),
                Some(&admin_token),
                Some(serde_json::json!({"userType": "superuser"})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let conflict = app
            .clone()
            .oneshot(request(
                "PUT",
                &format!("/user/{user_id}"),
                Some(&admin_token),
                Some(serde_json::json!({"email": "admin@x.com"})),
            ))
            .await
            .unwrap();
        assert_eq!(conflict.status(), StatusCode::CONFLICT);

        let bad_id = app
            .oneshot(request("GET", "/user/not-a-uuid", Some(&admin_token), None))
            .await
            .unwrap();
        assert_eq!(bad_id.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_demoted_admin_loses_access() {
        let (app, state, admin_token, _, _) = seeded().await;

        let admin_id = state.tokens.verify(&admin_token).unwrap().user_id;
        state
            .accounts
            .update_user(
                admin_id,
                UpdateUserRequest {
                    user_type: Some("user".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        // 토큰은 여전히 유효하지만 역할은 매 요청마다 디렉토리에서 확인
        let response = app
            .oneshot(request("GET", "/users", Some(&admin_token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
