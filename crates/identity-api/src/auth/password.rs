//! 비밀번호 해싱 유틸리티.
//!
//! Argon2id 기반 비밀번호 해싱 및 검증.

use argon2::{
    password_hash::{
        rand_core::OsRng, Error as HashError, PasswordHash, PasswordHasher, PasswordVerifier,
        SaltString,
    },
    Argon2,
};

/// 비밀번호 최소 길이.
pub const MIN_PASSWORD_LEN: usize = 8;

/// 비밀번호 처리 에러.
///
/// 비밀번호 불일치는 에러가 아닙니다. [`verify_password`]는 `Ok(false)`를 반환합니다.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("비밀번호 해싱 실패")]
    HashingFailed,
    #[error("비밀번호 검증 실패")]
    VerificationFailed,
    #[error("잘못된 해시 형식")]
    InvalidHashFormat,
}

/// 비밀번호 해싱.
///
/// Argon2id 알고리즘을 사용하여 비밀번호를 해싱합니다.
/// 호출마다 새 솔트가 생성되므로 같은 입력도 매번 다른 해시가 나옵니다.
///
/// # Returns
///
/// PHC 형식의 해시 문자열 (솔트 포함)
///
/// # Example
///
/// ```rust,ignore
/// let hash = hash_password("my_secure_password").unwrap();
/// // "$argon2id$v=19$m=19456,t=2,p=1$..."
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| PasswordError::HashingFailed)?;

    Ok(hash.to_string())
}

/// 비밀번호 검증.
///
/// 저장된 해시의 파라미터와 솔트로 입력을 다시 해싱해 비교합니다.
/// 비교는 상수 시간으로 수행됩니다.
///
/// # Returns
///
/// 일치하면 `Ok(true)`, 불일치하면 `Ok(false)`.
/// 저장된 해시가 손상되었을 때만 `Err`.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHashFormat)?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(HashError::Password) => Ok(false),
        Err(_) => Err(PasswordError::VerificationFailed),
    }
}

/// 비밀번호 강도 검증.
///
/// 최소 [`MIN_PASSWORD_LEN`]자(문자 단위) 이상이어야 합니다.
pub fn validate_password_strength(password: &str) -> Result<(), &'static str> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err("비밀번호는 최소 8자 이상이어야 합니다");
    }

    Ok(())
}
