//! 비즈니스 로직 서비스.

pub mod accounts;
pub mod types;

pub use accounts::{AccountResult, AccountService, AccountServiceError};
pub use types::{
    AuthResponse, ListUsersQuery, LoginRequest, SignUpRequest, UpdateUserRequest,
    UserListResponse, UserResponse,
};
