//! 인메모리 계정 디렉토리.
//!
//! 데이터베이스 URL이 설정되지 않았을 때와 테스트에서 사용합니다.
//! 프로세스가 종료되면 모든 계정이 사라집니다.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use identity_core::{
    Account, AccountDirectory, AccountUpdate, DirectoryError, DirectoryResult, NewAccount, UserId,
};
use tokio::sync::RwLock;

/// `RwLock<HashMap>` 기반 계정 디렉토리.
///
/// 이메일 고유성 검사와 쓰기는 같은 쓰기 잠금 안에서 수행됩니다.
#[derive(Default)]
pub struct InMemoryAccountDirectory {
    accounts: RwLock<HashMap<UserId, Account>>,
}

impl InMemoryAccountDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// 저장된 계정을 그대로 삽입합니다 (테스트 시드용).
    pub async fn insert(&self, account: Account) {
        self.accounts.write().await.insert(account.id, account);
    }

    /// 저장된 계정 수.
    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }
}

#[async_trait]
impl AccountDirectory for InMemoryAccountDirectory {
    async fn find_by_email(&self, email: &str) -> DirectoryResult<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().find(|a| a.email == email).cloned())
    }

    async fn find_by_id(&self, id: UserId) -> DirectoryResult<Option<Account>> {
        Ok(self.accounts.read().await.get(&id).cloned())
    }

    async fn create(&self, account: NewAccount) -> DirectoryResult<Account> {
        let mut accounts = self.accounts.write().await;
        if accounts.values().any(|a| a.email == account.email) {
            return Err(DirectoryError::DuplicateEmail);
        }

        let now = Utc::now();
        let created = Account {
            id: UserId::new(),
            email: account.email,
            password_hash: account.password_hash,
            first_name: Some(account.first_name),
            last_name: Some(account.last_name),
            phone: account.phone,
            role: Some(account.role),
            created_at: now,
            updated_at: now,
        };
        accounts.insert(created.id, created.clone());
        Ok(created)
    }

    async fn list(&self, limit: i64, offset: i64) -> DirectoryResult<Vec<Account>> {
        let accounts = self.accounts.read().await;
        let mut all: Vec<Account> = accounts.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let offset = usize::try_from(offset.max(0)).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
        Ok(all.into_iter().skip(offset).take(limit).collect())
    }

    async fn update(&self, id: UserId, update: AccountUpdate) -> DirectoryResult<Option<Account>> {
        let mut accounts = self.accounts.write().await;

        if let Some(email) = &update.email {
            if accounts.values().any(|a| a.id != id && &a.email == email) {
                return Err(DirectoryError::DuplicateEmail);
            }
        }

        let Some(account) = accounts.get_mut(&id) else {
            return Ok(None);
        };
        update.apply_to(account);
        account.updated_at = Utc::now();
        Ok(Some(account.clone()))
    }

    async fn delete(&self, id: UserId) -> DirectoryResult<bool> {
        Ok(self.accounts.write().await.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use identity_core::Role;

    fn new_account(email: &str, role: Role) -> NewAccount {
        NewAccount {
            email: email.to_string(),
            password_hash: "$argon2id$hash".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            phone: None,
            role,
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let directory = InMemoryAccountDirectory::new();
        let created = directory.create(new_account("a@x.com", Role::User)).await.unwrap();

        let by_email = directory.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, created.id);
        assert_eq!(by_email.role, Some(Role::User));

        let by_id = directory.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "a@x.com");

        assert!(directory.find_by_email("b@x.com").await.unwrap().is_none());
        assert!(directory.find_by_id(UserId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let directory = InMemoryAccountDirectory::new();
        directory.create(new_account("a@x.com", Role::User)).await.unwrap();

        let result = directory.create(new_account("a@x.com", Role::Admin)).await;
        assert!(matches!(result, Err(DirectoryError::DuplicateEmail)));
        assert_eq!(directory.len().await, 1);
    }

    #[tokio::test]
    async fn test_update_partial_and_email_conflict() {
        let directory = InMemoryAccountDirectory::new();
        let a = directory.create(new_account("a@x.com", Role::User)).await.unwrap();
        directory.create(new_account("b@x.com", Role::User)).await.unwrap();

        let updated = directory
            .update(
                a.id,
                AccountUpdate {
                    role: Some(Role::Admin),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.role, Some(Role::Admin));
        assert_eq!(updated.email, "a@x.com");
        assert_eq!(updated.first_name.as_deref(), Some("Ada"));

        let conflict = directory
            .update(
                a.id,
                AccountUpdate {
                    email: Some("b@x.com".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(conflict, Err(DirectoryError::DuplicateEmail)));

        // 자기 자신의 이메일로 바꾸는 것은 충돌이 아님
        let same = directory
            .update(
                a.id,
                AccountUpdate {
                    email: Some("a@x.com".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(same.is_some());

        let missing = directory.update(UserId::new(), AccountUpdate::default()).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_list_paging_and_delete() {
        let directory = InMemoryAccountDirectory::new();
        for i in 0..5 {
            directory
                .create(new_account(&format!("u{i}@x.com"), Role::User))
                .await
                .unwrap();
        }

        assert_eq!(directory.list(10, 0).await.unwrap().len(), 5);
        assert_eq!(directory.list(2, 0).await.unwrap().len(), 2);
        assert_eq!(directory.list(10, 4).await.unwrap().len(), 1);
        assert!(directory.list(10, 10).await.unwrap().is_empty());

        let victim = directory.find_by_email("u0@x.com").await.unwrap().unwrap();
        assert!(directory.delete(victim.id).await.unwrap());
        assert!(!directory.delete(victim.id).await.unwrap());
        assert_eq!(directory.len().await, 4);
    }
}
