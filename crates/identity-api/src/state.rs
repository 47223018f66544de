//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 모든 API 핸들러에서 공유되는 상태를 관리합니다.
//! Arc로 래핑되어 여러 요청 간에 안전하게 공유됩니다.

use std::sync::Arc;
use std::time::Duration;

use identity_core::AccountDirectory;

use crate::auth::{AuthGuard, TokenService};
use crate::repository::InMemoryAccountDirectory;
use crate::services::AccountService;

/// 애플리케이션 공유 상태.
///
/// 토큰 서비스와 디렉토리는 시작 시 한 번 구성되며 이후 변경되지 않습니다.
/// Axum의 State extractor를 통해 핸들러에 주입됩니다.
#[derive(Clone)]
pub struct AppState {
    /// 계정 디렉토리 (PostgreSQL 또는 인메모리)
    pub directory: Arc<dyn AccountDirectory>,

    /// 토큰 발급/검증 서비스
    pub tokens: Arc<TokenService>,

    /// 인가 가드
    pub guard: AuthGuard,

    /// 계정 서비스
    pub accounts: AccountService,

    /// 데이터베이스 연결 풀 (선택적, 헬스 체크용)
    pub db_pool: Option<sqlx::PgPool>,

    /// 서버 시작 시간
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 새 AppState 생성.
    ///
    /// # Arguments
    ///
    /// * `directory` - 계정 디렉토리
    /// * `tokens` - 토큰 서비스
    /// * `directory_timeout` - 가드의 역할 조회 제한 시간
    pub fn new(
        directory: Arc<dyn AccountDirectory>,
        tokens: Arc<TokenService>,
        directory_timeout: Duration,
    ) -> Self {
        let guard = AuthGuard::new(tokens.clone(), directory.clone(), directory_timeout);
        let accounts = AccountService::new(directory.clone(), tokens.clone());

        Self {
            directory,
            tokens,
            guard,
            accounts,
            db_pool: None,
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 인메모리 디렉토리로 AppState 생성.
    ///
    /// 데이터베이스가 설정되지 않은 개발 환경과 통합 테스트에서 사용합니다.
    pub fn in_memory(tokens: Arc<TokenService>, directory_timeout: Duration) -> Self {
        Self::new(
            Arc::new(InMemoryAccountDirectory::new()),
            tokens,
            directory_timeout,
        )
    }

    /// 데이터베이스 연결 설정 (readiness 체크용).
    pub fn with_db_pool(mut self, pool: sqlx::PgPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// 데이터베이스 사용 여부.
    pub fn has_db(&self) -> bool {
        self.db_pool.is_some()
    }

    /// 서버 업타임(초) 반환.
    pub fn uptime_secs(&self) -> i64 {
        chrono::Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds()
    }

    /// 데이터베이스 연결 상태 확인.
    pub async fn is_db_healthy(&self) -> bool {
        if let Some(pool) = &self.db_pool {
            sqlx::query("SELECT 1").fetch_one(pool).await.is_ok()
        } else {
            false
        }
    }

    /// 디렉토리 응답 상태 확인.
    pub async fn is_directory_healthy(&self) -> bool {
        self.directory.ping().await.is_ok()
    }
}

/// 테스트용 AppState 생성 헬퍼.
///
/// 인메모리 디렉토리와 고정 시크릿을 사용합니다.
#[cfg(test)]
pub fn create_test_state() -> AppState {
    use secrecy::SecretString;

    let tokens = TokenService::new(
        &SecretString::from("test-secret-key-for-state-minimum-32-chars"),
        15,
        7,
    );
    AppState::in_memory(Arc::new(tokens), Duration::from_millis(500))
}
