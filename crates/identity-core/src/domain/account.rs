//! 계정 레코드.

use chrono::{DateTime, Utc};

use super::Role;
use crate::types::UserId;

/// 저장된 사용자 계정.
///
/// `password_hash`는 단방향 해시(PHC 문자열)이며 외부로 직렬화하지 않습니다.
/// 이 타입은 의도적으로 `Serialize`를 구현하지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    /// 저장된 값이 없거나 알 수 없는 문자열이면 `None`
    pub role: Option<Role>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// 저장된 역할이 요구 역할과 정확히 일치하는지 확인.
    ///
    /// 역할이 없으면 어떤 요구도 충족하지 않습니다.
    pub fn has_role(&self, required: Role) -> bool {
        self.role.is_some_and(|role| role.satisfies(required))
    }
}

/// 새 계정 입력. ID와 타임스탬프는 디렉토리가 할당합니다.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub role: Role,
}

/// 계정 부분 수정 입력. `None` 필드는 변경하지 않습니다.
#[derive(Debug, Clone, Default)]
pub struct AccountUpdate {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub role: Option<Role>,
}

impl AccountUpdate {
    /// 변경 사항을 계정에 적용합니다. `updated_at`은 호출자가 관리합니다.
    pub fn apply_to(&self, account: &mut Account) {
        if let Some(email) = &self.email {
            account.email = email.clone();
        }
        if let Some(first_name) = &self.first_name {
            account.first_name = Some(first_name.clone());
        }
        if let Some(last_name) = &self.last_name {
            account.last_name = Some(last_name.clone());
        }
        if let Some(phone) = &self.phone {
            account.phone = Some(phone.clone());
        }
        if let Some(role) = self.role {
            account.role = Some(role);
        }
    }

    /// 변경할 필드가 하나도 없는지 확인.
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.phone.is_none()
            && self.role.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(role: Option<Role>) -> Account {
        let now = Utc::now();
        Account {
            id: UserId::new(),
            email: "a@x.com".to_string(),
            password_hash: "$argon2id$placeholder".to_string(),
            first_name: Some("Ada".to_string()),
            last_name: Some("Lovelace".to_string()),
            phone: None,
            role,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_has_role_exact() {
        assert!(sample(Some(Role::Admin)).has_role(Role::Admin));
        assert!(!sample(Some(Role::Admin)).has_role(Role::User));
        assert!(!sample(Some(Role::User)).has_role(Role::Admin));
        assert!(!sample(None).has_role(Role::User));
    }

    #[test]
    fn test_update_applies_only_present_fields() {
        let mut account = sample(Some(Role::User));
        let update = AccountUpdate {
            phone: Some("010-0000-0000".to_string()),
            role: Some(Role::Admin),
            ..Default::default()
        };
        update.apply_to(&mut account);

        assert_eq!(account.phone.as_deref(), Some("010-0000-0000"));
        assert_eq!(account.role, Some(Role::Admin));
        assert_eq!(account.email, "a@x.com");
        assert_eq!(account.first_name.as_deref(), Some("Ada"));
    }

    #[test]
    fn test_update_is_empty() {
        assert!(AccountUpdate::default().is_empty());
        let update = AccountUpdate {
            last_name: Some("Byron".to_string()),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
