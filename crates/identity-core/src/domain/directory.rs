//! 계정 디렉토리 추상화.
//!
//! 인증 코어는 저장소 구현을 알지 못하고 이 trait만 사용합니다.
//! 구현체는 동시 호출에 안전해야 하며(`Send + Sync`),
//! 단일 행 읽기-쓰기의 원자성은 구현체가 책임집니다.

use async_trait::async_trait;

use super::{Account, AccountUpdate, NewAccount};
use crate::error::DirectoryResult;
use crate::types::UserId;

/// 계정 저장소 capability.
///
/// 조회 메서드는 계정이 없을 때 `Ok(None)`을 반환하고,
/// 저장소 장애일 때만 `Err`를 반환합니다.
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// 이메일로 계정 조회.
    async fn find_by_email(&self, email: &str) -> DirectoryResult<Option<Account>>;

    /// ID로 계정 조회.
    async fn find_by_id(&self, id: UserId) -> DirectoryResult<Option<Account>>;

    /// 새 계정 생성.
    ///
    /// 이메일이 이미 존재하면 `DirectoryError::DuplicateEmail`.
    async fn create(&self, account: NewAccount) -> DirectoryResult<Account>;

    /// 생성일 역순으로 계정 목록 조회.
    async fn list(&self, limit: i64, offset: i64) -> DirectoryResult<Vec<Account>>;

    /// 계정 부분 수정. 계정이 없으면 `Ok(None)`.
    ///
    /// 이메일 변경이 다른 계정과 충돌하면 `DirectoryError::DuplicateEmail`.
    async fn update(&self, id: UserId, update: AccountUpdate) -> DirectoryResult<Option<Account>>;

    /// 계정 삭제. 삭제된 행이 있으면 `true`.
    async fn delete(&self, id: UserId) -> DirectoryResult<bool>;

    /// 저장소 연결 상태 확인.
    async fn ping(&self) -> DirectoryResult<()> {
        Ok(())
    }
}
