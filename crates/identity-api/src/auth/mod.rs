//! 인증 모듈.
//!
//! JWT 기반 인증과 역할 기반 인가를 제공합니다.
//!
//! - `jwt`: 토큰 발급/검증
//! - `password`: Argon2 비밀번호 해싱
//! - `middleware`: 인가 가드 미들웨어와 추출기

pub mod jwt;
pub mod middleware;
pub mod password;

pub use jwt::{Claims, JwtError, TokenKind, TokenPair, TokenService, VerifiedToken};
pub use middleware::{
    bearer_token, require_authenticated, require_role, AuthError, AuthGuard, AuthUser,
    RefreshAuth, RoleGate,
};
pub use password::{
    hash_password, validate_password_strength, verify_password, PasswordError, MIN_PASSWORD_LEN,
};
