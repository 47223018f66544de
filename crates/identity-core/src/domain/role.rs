//! 역할 기반 접근 제어.
//!
//! 역할은 닫힌 열거형이며 **동등 비교만** 지원합니다.
//! 계층이 없으므로 `Admin`이라도 `User`를 요구하는 라우트에 자동으로 통과하지 않습니다.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::IdentityError;

/// 사용자 역할.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// 일반 사용자 (기본값)
    #[default]
    User,
    /// 관리자
    Admin,
}

impl Role {
    /// 저장/전송용 문자열 표현.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    /// 저장된 문자열에서 역할 파싱.
    ///
    /// 대소문자를 포함해 정확히 일치해야 합니다. `"Admin"`은 `None`입니다.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    /// 이 역할이 요구 역할을 충족하는지 확인.
    ///
    /// 동등 비교만 수행합니다.
    pub fn satisfies(&self, required: Role) -> bool {
        *self == required
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::parse(s).ok_or_else(|| IdentityError::UnknownRole(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_equality_only() {
        assert!(Role::Admin.satisfies(Role::Admin));
        assert!(Role::User.satisfies(Role::User));

        // 계층 없음
        assert!(!Role::Admin.satisfies(Role::User));
        assert!(!Role::User.satisfies(Role::Admin));
    }

    #[test]
    fn test_role_parse_is_exact() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("user"), Some(Role::User));
        assert_eq!(Role::parse("Admin"), None);
        assert_eq!(Role::parse(" admin"), None);
        assert_eq!(Role::parse(""), None);
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_default_is_user() {
        assert_eq!(Role::default(), Role::User);
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&Role::Admin).unwrap();
        assert_eq!(json, "\"admin\"");

        let parsed: Role = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(parsed, Role::User);
        assert_eq!(Role::Admin.to_string(), "admin");
    }
}
