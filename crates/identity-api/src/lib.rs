//! 계정/인증 REST API 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Axum 기반 REST API
//! - JWT 발급/검증과 역할 기반 인가 가드
//! - Argon2 비밀번호 해싱
//! - PostgreSQL/인메모리 계정 디렉토리
//! - 헬스 체크 엔드포인트
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트
//! - [`auth`]: JWT 인증, 비밀번호, 인가 가드
//! - [`services`]: 계정 비즈니스 로직
//! - [`repository`]: 계정 디렉토리 구현체

pub mod auth;
pub mod error;
pub mod repository;
pub mod routes;
pub mod services;
pub mod state;

pub use auth::{
    hash_password, verify_password, AuthError, AuthGuard, AuthUser, Claims, TokenPair,
    TokenService,
};
pub use error::ApiErrorResponse;
pub use routes::create_api_router;
pub use state::AppState;
