//! 계정 디렉토리 및 도메인 에러 타입.

use thiserror::Error;

/// 계정 디렉토리(저장소) 에러.
///
/// "찾을 수 없음"은 에러가 아니라 `Ok(None)`으로 표현합니다.
/// 이 타입은 저장소 장애와 제약 조건 위반만 나타냅니다.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// 이메일 고유 제약 위반
    #[error("이미 사용 중인 이메일입니다")]
    DuplicateEmail,

    /// 저장소 접근 실패 (연결 끊김, 쿼리 실패 등)
    #[error("저장소 에러: {0}")]
    Storage(String),

    /// 저장소 응답이 제한 시간을 초과함
    #[error("저장소 응답 시간 초과")]
    Timeout,
}

/// 디렉토리 작업을 위한 Result 타입.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// 도메인 값 검증 에러.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentityError {
    /// 알 수 없는 역할 문자열
    #[error("알 수 없는 역할: {0}")]
    UnknownRole(String),

    /// 잘못된 사용자 ID 형식
    #[error("잘못된 사용자 ID 형식: {0}")]
    InvalidUserId(String),
}

impl DirectoryError {
    /// 인프라 장애인지 확인합니다 (제약 위반은 제외).
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, DirectoryError::Storage(_) | DirectoryError::Timeout)
    }
}
