//! # Identity Core
//!
//! 계정/인증 서비스의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 서비스 전반에서 사용되는 기본 타입을 제공합니다:
//! - 사용자 식별자 ([`UserId`])
//! - 계정 레코드 및 입력 타입
//! - 역할 정의 (동등 비교만 지원, 계층 없음)
//! - 계정 디렉토리 추상화 ([`AccountDirectory`])
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
