//! 계정 관리를 위한 도메인 모델.

mod account;
mod directory;
mod role;

pub use account::*;
pub use directory::*;
pub use role::*;
