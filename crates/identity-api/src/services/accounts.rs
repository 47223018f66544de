//! 계정 서비스.
//!
//! 회원가입, 로그인, 토큰 갱신, 관리자용 사용자 관리 로직을 담당합니다.
//! 라우트 핸들러는 요청 파싱만 하고 이 서비스에 위임합니다.

use std::sync::{Arc, LazyLock};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use identity_core::{
    AccountDirectory, AccountUpdate, DirectoryError, NewAccount, Role, UserId,
};
use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};
use validator::{Validate, ValidationErrors};

use super::types::{
    blank_to_none, validation_message, AuthResponse, ListUsersQuery, LoginRequest, SignUpRequest,
    UpdateUserRequest, UserResponse,
};
use crate::auth::{hash_password, verify_password, JwtError, PasswordError, TokenPair, TokenService};
use crate::error::ApiErrorResponse;

/// 외부로 노출되는 로그인 실패 메시지 (계정 없음/비밀번호 불일치 공통).
const INVALID_CREDENTIALS_MESSAGE: &str = "이메일 또는 비밀번호가 올바르지 않습니다";

/// 존재하지 않는 계정으로 로그인할 때 검증에 쓰는 더미 해시.
/// 계정 유무와 관계없이 Argon2 검증이 한 번 수행됩니다.
static DUMMY_PASSWORD_HASH: LazyLock<String> = LazyLock::new(|| {
    hash_password("identity-dummy-password").unwrap_or_else(|_| {
        "$argon2id$v=19$m=19456,t=2,p=1$ZHVtbXlzYWx0$ZHVtbXloYXNoZHVtbXloYXNo".to_string()
    })
});

/// 계정 서비스 에러.
#[derive(Debug, thiserror::Error)]
pub enum AccountServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("{}", validation_message(.0))]
    InvalidFields(ValidationErrors),

    #[error("이미 사용 중인 이메일입니다")]
    DuplicateEmail,

    #[error("{}", INVALID_CREDENTIALS_MESSAGE)]
    InvalidCredentials,

    #[error("사용자를 찾을 수 없습니다")]
    NotFound,

    #[error("계정이 더 이상 존재하지 않습니다")]
    AccountGone,

    #[error("토큰 발급 실패: {0}")]
    Token(#[from] JwtError),

    #[error("비밀번호 처리 실패: {0}")]
    Password(#[from] PasswordError),

    #[error("저장소 에러: {0}")]
    Directory(DirectoryError),

    #[error("작업 실행 실패: {0}")]
    Task(String),
}

impl From<DirectoryError> for AccountServiceError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::DuplicateEmail => AccountServiceError::DuplicateEmail,
            other => AccountServiceError::Directory(other),
        }
    }
}

impl AccountServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            AccountServiceError::Validation(_) | AccountServiceError::InvalidFields(_) => {
                StatusCode::BAD_REQUEST
            }
            AccountServiceError::DuplicateEmail => StatusCode::CONFLICT,
            AccountServiceError::InvalidCredentials | AccountServiceError::AccountGone => {
                StatusCode::UNAUTHORIZED
            }
            AccountServiceError::NotFound => StatusCode::NOT_FOUND,
            AccountServiceError::Token(_)
            | AccountServiceError::Password(_)
            | AccountServiceError::Directory(_)
            | AccountServiceError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AccountServiceError::Validation(_) | AccountServiceError::InvalidFields(_) => {
                "VALIDATION_ERROR"
            }
            AccountServiceError::DuplicateEmail => "DUPLICATE_EMAIL",
            AccountServiceError::InvalidCredentials => "INVALID_CREDENTIALS",
            AccountServiceError::NotFound => "USER_NOT_FOUND",
            AccountServiceError::AccountGone => "INVALID_TOKEN",
            _ => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AccountServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            // 내부 상세는 로그에만 남김
            error!(error = %self, "Account operation failed");
            "내부 서버 오류가 발생했습니다".to_string()
        } else {
            self.to_string()
        };

        let body = match &self {
            AccountServiceError::InvalidFields(errors) => {
                ApiErrorResponse::with_details(self.code(), message, field_details(errors))
            }
            _ => ApiErrorResponse::new(self.code(), message),
        };
        body.into_response_with(status)
    }
}

/// 필드별 검증 실패 코드 (`{"email": ["email"], ...}`).
fn field_details(errors: &ValidationErrors) -> Value {
    let fields = errors
        .field_errors()
        .into_iter()
        .map(|(field, errors)| {
            let codes = errors
                .iter()
                .map(|e| Value::String(e.code.to_string()))
                .collect();
            (field.to_string(), Value::Array(codes))
        })
        .collect::<Map<_, _>>();
    Value::Object(fields)
}

pub type AccountResult<T> = Result<T, AccountServiceError>;

fn validate<T: Validate>(request: &T) -> AccountResult<()> {
    request
        .validate()
        .map_err(AccountServiceError::InvalidFields)
}

/// 계정 서비스.
#[derive(Clone)]
pub struct AccountService {
    directory: Arc<dyn AccountDirectory>,
    tokens: Arc<TokenService>,
}

impl AccountService {
    pub fn new(directory: Arc<dyn AccountDirectory>, tokens: Arc<TokenService>) -> Self {
        Self { directory, tokens }
    }

    /// 회원가입.
    ///
    /// 입력 검증 → 이메일 중복 확인 → 비밀번호 해싱 → 계정 생성 → 토큰 발급.
    /// 역할을 지정하지 않으면 `user`입니다.
    pub async fn sign_up(&self, mut request: SignUpRequest) -> AccountResult<AuthResponse> {
        request.user_type = blank_to_none(request.user_type);
        validate(&request)?;

        if self.directory.find_by_email(&request.email).await?.is_some() {
            debug!("Sign-up rejected: email already registered");
            return Err(AccountServiceError::DuplicateEmail);
        }

        let role = request
            .user_type
            .as_deref()
            .and_then(Role::parse)
            .unwrap_or_default();
        let password_hash = hash_blocking(request.password).await?;

        let account = self
            .directory
            .create(NewAccount {
                email: request.email,
                password_hash,
                first_name: request.first_name,
                last_name: request.last_name,
                phone: request.phone,
                role,
            })
            .await?;

        info!(user_id = %account.id, role = %role, "Account created");

        let pair = self.tokens.issue_pair(account.id)?;
        Ok(auth_response(account.into(), pair))
    }

    /// 로그인.
    ///
    /// 계정 없음과 비밀번호 불일치는 외부에 같은 에러로 보이고,
    /// 내부 로그에서만 구분됩니다.
    pub async fn login(&self, request: LoginRequest) -> AccountResult<AuthResponse> {
        validate(&request)?;

        let Some(account) = self.directory.find_by_email(&request.email).await? else {
            verify_blocking(request.password, None).await?;
            debug!("Login failed: no account for email");
            return Err(AccountServiceError::InvalidCredentials);
        };

        let matches =
            verify_blocking(request.password, Some(account.password_hash.clone())).await?;

        if !matches {
            debug!(user_id = %account.id, "Login failed: password mismatch");
            return Err(AccountServiceError::InvalidCredentials);
        }

        info!(user_id = %account.id, "Login succeeded");

        let pair = self.tokens.issue_pair(account.id)?;
        Ok(auth_response(account.into(), pair))
    }

    /// 주어진 사용자에게 새 토큰 쌍 발급.
    pub fn issue_pair_for(&self, user_id: UserId) -> AccountResult<TokenPair> {
        Ok(self.tokens.issue_pair(user_id)?)
    }

    /// 토큰 갱신. 삭제된 계정은 갱신할 수 없습니다.
    pub async fn refresh(&self, user_id: UserId) -> AccountResult<TokenPair> {
        if self.directory.find_by_id(user_id).await?.is_none() {
            debug!(user_id = %user_id, "Refresh rejected: account no longer exists");
            return Err(AccountServiceError::AccountGone);
        }
        self.issue_pair_for(user_id)
    }

    /// 토큰 주체의 현재 계정 정보. 삭제된 계정은 인증 실패로 취급합니다.
    pub async fn current_user(&self, user_id: UserId) -> AccountResult<UserResponse> {
        match self.directory.find_by_id(user_id).await? {
            Some(account) => Ok(account.into()),
            None => {
                debug!(user_id = %user_id, "Profile rejected: account no longer exists");
                Err(AccountServiceError::AccountGone)
            }
        }
    }

    /// 사용자 목록 (생성일 역순).
    pub async fn list_users(&self, query: &ListUsersQuery) -> AccountResult<Vec<UserResponse>> {
        let (limit, offset) = query.resolve();
        let accounts = self.directory.list(limit, offset).await?;
        Ok(accounts.into_iter().map(UserResponse::from).collect())
    }

    /// 사용자 단건 조회.
    pub async fn get_user(&self, user_id: UserId) -> AccountResult<UserResponse> {
        self.directory
            .find_by_id(user_id)
            .await?
            .map(UserResponse::from)
            .ok_or(AccountServiceError::NotFound)
    }

    /// 사용자 부분 수정.
    ///
    /// 이메일이 바뀌면 다른 계정과의 중복을 확인합니다.
    pub async fn update_user(
        &self,
        user_id: UserId,
        mut request: UpdateUserRequest,
    ) -> AccountResult<UserResponse> {
        request.user_type = blank_to_none(request.user_type);
        validate(&request)?;

        if let Some(email) = &request.email {
            if let Some(existing) = self.directory.find_by_email(email).await? {
                if existing.id != user_id {
                    return Err(AccountServiceError::DuplicateEmail);
                }
            }
        }

        let update = AccountUpdate {
            email: request.email,
            first_name: request.first_name,
            last_name: request.last_name,
            phone: request.phone,
            role: request.user_type.as_deref().and_then(Role::parse),
        };

        let account = self
            .directory
            .update(user_id, update)
            .await?
            .ok_or(AccountServiceError::NotFound)?;

        info!(user_id = %user_id, "Account updated");
        Ok(account.into())
    }

    /// 사용자 삭제.
    pub async fn delete_user(&self, user_id: UserId) -> AccountResult<()> {
        if !self.directory.delete(user_id).await? {
            return Err(AccountServiceError::NotFound);
        }
        info!(user_id = %user_id, "Account deleted");
        Ok(())
    }
}

/// Argon2 해싱은 CPU 집약적이므로 블로킹 스레드에서 실행.
async fn hash_blocking(password: String) -> AccountResult<String> {
    let hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AccountServiceError::Task(e.to_string()))??;
    Ok(hash)
}

/// 비밀번호 검증을 블로킹 스레드에서 실행.
///
/// `hash`가 없으면 더미 해시로 검증하고 항상 `false`를 반환합니다.
async fn verify_blocking(password: String, hash: Option<String>) -> AccountResult<bool> {
    tokio::task::spawn_blocking(move || match hash {
        Some(hash) => verify_password(&password, &hash),
        None => {
            if let Err(e) = verify_password(&password, &DUMMY_PASSWORD_HASH) {
                warn!(error = %e, "Dummy hash verification failed");
            }
            Ok(false)
        }
    })
    .await
    .map_err(|e| AccountServiceError::Task(e.to_string()))?
    .map_err(AccountServiceError::from)
}

fn auth_response(user: UserResponse, pair: TokenPair) -> AuthResponse {
    AuthResponse {
        user,
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        expires_in: pair.expires_in,
    }
}
