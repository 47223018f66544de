//! 계정 API 타입 정의
//!
//! 요청/응답 타입과 입력 검증 규칙을 정의합니다.

use chrono::{DateTime, Utc};
use identity_core::{Account, Role, UserId};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::auth::validate_password_strength;

// ==================== 커스텀 검증 함수 ====================

/// 역할 문자열 검증 ("user" 또는 "admin")
fn validate_user_type(value: &str) -> Result<(), ValidationError> {
    if Role::parse(value).is_none() {
        return Err(ValidationError::new("invalid_user_type")
            .with_message("userType은 'user' 또는 'admin'이어야 합니다".into()));
    }
    Ok(())
}

/// 비밀번호 강도 검증
fn validate_password(value: &str) -> Result<(), ValidationError> {
    validate_password_strength(value)
        .map_err(|message| ValidationError::new("weak_password").with_message(message.into()))
}

/// 비어 있거나 공백뿐인 값은 지정하지 않은 것으로 취급.
pub fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// 검증 에러를 사람이 읽을 수 있는 한 줄 메시지로 변환.
pub fn validation_message(errors: &ValidationErrors) -> String {
    let mut messages = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{}: 유효하지 않은 값", field))
            })
        })
        .collect::<Vec<_>>();
    messages.sort();
    messages.join("; ")
}

// ==================== 요청 타입 ====================

/// 회원가입 요청
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    #[validate(email(message = "유효한 이메일 주소가 아닙니다"))]
    pub email: String,
    #[validate(custom(function = "validate_password"))]
    pub password: String,
    #[validate(length(min = 1, message = "firstName은 필수입니다"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "lastName은 필수입니다"))]
    pub last_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    /// 역할 (선택, 기본: "user")
    #[serde(default)]
    #[validate(custom(function = "validate_user_type"))]
    pub user_type: Option<String>,
}

/// 로그인 요청
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "유효한 이메일 주소가 아닙니다"))]
    pub email: String,
    #[validate(length(min = 1, message = "비밀번호는 필수입니다"))]
    pub password: String,
}

/// 사용자 수정 요청. 생략된 필드는 변경하지 않습니다.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    #[validate(email(message = "유효한 이메일 주소가 아닙니다"))]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_user_type"))]
    pub user_type: Option<String>,
}

/// 사용자 목록 쿼리.
///
/// 숫자가 아니거나 범위를 벗어난 값은 기본값으로 대체합니다.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListUsersQuery {
    #[serde(default)]
    pub limit: Option<String>,
    #[serde(default)]
    pub offset: Option<String>,
}

impl ListUsersQuery {
    pub const DEFAULT_LIMIT: i64 = 10;
    pub const DEFAULT_OFFSET: i64 = 0;

    /// 유효한 (limit, offset) 쌍 반환.
    pub fn resolve(&self) -> (i64, i64) {
        let limit = self
            .limit
            .as_deref()
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(Self::DEFAULT_LIMIT);
        let offset = self
            .offset
            .as_deref()
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|v| *v >= 0)
            .unwrap_or(Self::DEFAULT_OFFSET);
        (limit, offset)
    }
}

// ==================== 응답 타입 ====================

/// 외부로 노출되는 사용자 정보. 비밀번호 해시는 포함하지 않습니다.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: UserId,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub user_type: Option<Role>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Account> for UserResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            first_name: account.first_name,
            last_name: account.last_name,
            email: account.email,
            phone: account.phone,
            user_type: account.role,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

/// 회원가입/로그인 응답
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
    /// access token 만료까지 남은 시간 (초)
    pub expires_in: i64,
}

/// 사용자 목록 응답
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListResponse {
    pub users: Vec<UserResponse>,
    pub limit: i64,
    pub offset: i64,
}
