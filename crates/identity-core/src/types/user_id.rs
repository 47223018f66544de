//! 사용자 식별자.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::IdentityError;

/// 계정 고유 식별자 (UUID).
///
/// 계정 생성 시 디렉토리가 할당하며 이후 변경되지 않습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// 새 랜덤 ID 생성 (v4).
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// 기존 UUID로부터 생성.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// 내부 UUID 반환.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| IdentityError::InvalidUserId(s.to_string()))
    }
}

impl From<Uuid> for UserId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}
