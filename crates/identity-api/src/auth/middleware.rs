//! 인가 가드 (Authorization Guard).
//!
//! 요청의 Bearer 토큰을 검증하고, 필요하면 디렉토리에서 역할을 확인해
//! 요청 확장(extensions)에 [`AuthUser`]를 붙입니다.
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! Router::new()
//!     .route("/users", get(list_users))
//!     .route_layer(middleware::from_fn_with_state(
//!         RoleGate::new(state.clone(), Role::Admin),
//!         require_role,
//!     ));
//!
//! async fn list_users(user: AuthUser) -> impl IntoResponse { /* ... */ }
//! ```

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use identity_core::{AccountDirectory, Role, UserId};
use tracing::{debug, error};

use super::jwt::{JwtError, TokenKind, TokenService};
use crate::error::ApiErrorResponse;
use crate::state::AppState;

/// 인증된 요청의 사용자 정보.
///
/// 가드 미들웨어가 요청 확장에 넣고, 핸들러는 추출기로 꺼냅니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: UserId,
}

/// 인가 에러.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("인증 토큰이 필요합니다")]
    MissingToken,
    #[error("잘못된 Authorization 헤더 형식")]
    InvalidAuthHeader,
    #[error("토큰이 만료되었습니다")]
    TokenExpired,
    #[error("유효하지 않은 토큰")]
    InvalidToken,
    #[error("권한이 부족합니다")]
    InsufficientRole,
    #[error("사용자 정보를 확인할 수 없습니다")]
    DirectoryUnavailable,
}

impl AuthError {
    /// HTTP 상태 코드. 역할 불일치만 403이고 나머지는 모두 401입니다.
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::InsufficientRole => StatusCode::FORBIDDEN,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "MISSING_TOKEN",
            AuthError::InvalidAuthHeader => "INVALID_AUTH_HEADER",
            AuthError::TokenExpired => "TOKEN_EXPIRED",
            AuthError::InvalidToken => "INVALID_TOKEN",
            AuthError::InsufficientRole => "FORBIDDEN",
            AuthError::DirectoryUnavailable => "UNAUTHORIZED",
        }
    }
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::TokenExpired => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiErrorResponse::new(self.code(), self.to_string()).into_response_with(self.status())
    }
}

/// `Authorization: Bearer <token>` 헤더에서 토큰 추출.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers.get(AUTHORIZATION).ok_or(AuthError::MissingToken)?;
    let value = value.to_str().map_err(|_| AuthError::InvalidAuthHeader)?;

    let token = value
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidAuthHeader)?;
    if token.is_empty() {
        return Err(AuthError::InvalidAuthHeader);
    }
    Ok(token)
}

/// 요청 단위 인가 판단기.
///
/// 토큰 검증은 순수 함수이고, 역할 확인만 디렉토리 왕복이 필요합니다.
#[derive(Clone)]
pub struct AuthGuard {
    tokens: Arc<TokenService>,
    directory: Arc<dyn AccountDirectory>,
    lookup_timeout: Duration,
}

impl AuthGuard {
    pub fn new(
        tokens: Arc<TokenService>,
        directory: Arc<dyn AccountDirectory>,
        lookup_timeout: Duration,
    ) -> Self {
        Self {
            tokens,
            directory,
            lookup_timeout,
        }
    }

    /// RequireAuthenticated: 유효한 access token이 있어야 통과.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<AuthUser, AuthError> {
        self.authenticate_kind(headers, TokenKind::Access)
    }

    /// refresh token으로만 통과 (토큰 갱신 라우트 전용).
    pub fn authenticate_refresh(&self, headers: &HeaderMap) -> Result<AuthUser, AuthError> {
        self.authenticate_kind(headers, TokenKind::Refresh)
    }

    fn authenticate_kind(&self, headers: &HeaderMap, kind: TokenKind) -> Result<AuthUser, AuthError> {
        let token = bearer_token(headers)?;
        let verified = self.tokens.verify_kind(token, kind).map_err(|e| {
            debug!(error = %e, ?kind, "Bearer token rejected");
            AuthError::from(e)
        })?;

        Ok(AuthUser {
            id: verified.user_id,
        })
    }

    /// RequireRole: 인증 후 디렉토리에 저장된 역할이 정확히 일치해야 통과.
    ///
    /// 계정 없음/역할 없음/불일치는 403, 디렉토리 장애나 시간 초과는 401입니다.
    pub async fn authorize(&self, headers: &HeaderMap, required: Role) -> Result<AuthUser, AuthError> {
        let user = self.authenticate(headers)?;

        let lookup = tokio::time::timeout(self.lookup_timeout, self.directory.find_by_id(user.id)).await;
        let account = match lookup {
            Ok(Ok(Some(account))) => account,
            Ok(Ok(None)) => {
                debug!(user_id = %user.id, "Role check failed: account not found");
                return Err(AuthError::InsufficientRole);
            }
            Ok(Err(e)) => {
                error!(user_id = %user.id, error = %e, "Role check failed: directory error");
                return Err(AuthError::DirectoryUnavailable);
            }
            Err(_) => {
                error!(
                    user_id = %user.id,
                    timeout_ms = self.lookup_timeout.as_millis() as u64,
                    "Role check failed: directory lookup timed out"
                );
                return Err(AuthError::DirectoryUnavailable);
            }
        };

        if !account.has_role(required) {
            debug!(
                user_id = %user.id,
                required = %required,
                actual = ?account.role,
                "Role check failed: role mismatch"
            );
            return Err(AuthError::InsufficientRole);
        }

        Ok(user)
    }
}

/// RequireAuthenticated 미들웨어.
pub async fn require_authenticated(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = state.guard.authenticate(request.headers())?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// RequireRole 미들웨어 상태: 공유 상태 + 요구 역할.
#[derive(Clone)]
pub struct RoleGate {
    state: Arc<AppState>,
    role: Role,
}

impl RoleGate {
    pub fn new(state: Arc<AppState>, role: Role) -> Self {
        Self { state, role }
    }
}

/// RequireRole 미들웨어.
pub async fn require_role(
    State(gate): State<RoleGate>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = gate.state.guard.authorize(request.headers(), gate.role).await?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // 가드 미들웨어가 적용되지 않은 라우트에서는 인증되지 않은 것으로 처리
        parts
            .extensions
            .get::<AuthUser>()
            .copied()
            .ok_or(AuthError::MissingToken)
    }
}

/// refresh token 인증 추출기.
///
/// 토큰 갱신 라우트에서 사용하며, access token은 거부합니다.
#[derive(Debug, Clone, Copy)]
pub struct RefreshAuth(pub AuthUser);

impl FromRequestParts<Arc<AppState>> for RefreshAuth {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        state
            .guard
            .authenticate_refresh(&parts.headers)
            .map(RefreshAuth)
    }
}
