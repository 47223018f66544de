//! 계정 디렉토리 구현체.
//!
//! 데이터베이스 접근 로직을 라우트 핸들러와 서비스에서 분리하여 관리합니다.

pub mod memory;
pub mod users;

pub use memory::InMemoryAccountDirectory;
pub use users::PgAccountDirectory;
