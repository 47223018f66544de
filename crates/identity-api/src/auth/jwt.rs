//! JWT 토큰 처리.
//!
//! Access Token 및 Refresh Token 발급/검증 로직.
//!
//! 서명 시크릿은 시작 시 한 번 [`TokenService`]에 주입되며 이후 변경되지 않습니다.
//! 토큰은 상태가 없으므로 서버 측 폐기 목록이 없고, 수명 주기는 만료뿐입니다.

use chrono::{DateTime, Duration, TimeZone, Utc};
use identity_core::{AuthConfig, UserId};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// 발급 시 사용하는 서명 알고리즘.
const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// 검증 시 허용하는 알고리즘 (HMAC 계열만).
const ACCEPTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// 토큰 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// 요청 단위 인가용 (짧은 수명)
    Access,
    /// 새 토큰 쌍 발급 전용 (긴 수명)
    Refresh,
}

/// JWT 페이로드.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - 사용자 ID
    pub sub: String,
    /// Issued At (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
    /// JWT ID - 토큰 고유 식별자
    pub jti: String,
    /// 토큰 종류
    pub typ: TokenKind,
}

impl Claims {
    fn new(user_id: UserId, kind: TokenKind, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            sub: user_id.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
            typ: kind,
        }
    }
}

/// 검증을 통과한 토큰 정보.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    pub user_id: UserId,
    pub kind: TokenKind,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub jti: String,
}

/// Access Token + Refresh Token 페어.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Access Token
    pub access_token: String,
    /// Refresh Token
    pub refresh_token: String,
    /// Access Token 만료 시간 (초)
    pub expires_in: i64,
    /// 토큰 타입 (항상 "Bearer")
    pub token_type: String,
}

/// JWT 토큰 에러.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("토큰 인코딩 실패: {0}")]
    EncodingError(#[from] jsonwebtoken::errors::Error),
    #[error("토큰이 만료되었습니다")]
    TokenExpired,
    #[error("유효하지 않은 토큰")]
    InvalidToken,
    #[error("허용되지 않는 토큰 종류")]
    WrongTokenKind,
}

/// 토큰 발급/검증 서비스.
///
/// 불변 상태만 보유하므로 `Arc`로 공유해 여러 요청에서 동시에 사용할 수 있습니다.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    /// 새 토큰 서비스 생성.
    ///
    /// # Arguments
    ///
    /// * `secret` - HMAC 서명 시크릿
    /// * `access_ttl_minutes` - Access Token 수명 (분)
    /// * `refresh_ttl_days` - Refresh Token 수명 (일)
    pub fn new(secret: &SecretString, access_ttl_minutes: i64, refresh_ttl_days: i64) -> Self {
        let secret = secret.expose_secret().as_bytes();

        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            access_ttl: Duration::minutes(access_ttl_minutes),
            refresh_ttl: Duration::days(refresh_ttl_days),
        }
    }

    /// 인증 설정으로부터 생성.
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            &config.jwt_secret,
            config.access_token_ttl_minutes,
            config.refresh_token_ttl_days,
        )
    }

    /// Access Token 수명.
    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    /// 현재 시각 기준으로 토큰 쌍 발급.
    pub fn issue_pair(&self, user_id: UserId) -> Result<TokenPair, JwtError> {
        self.issue_pair_at(user_id, Utc::now())
    }

    /// 지정한 발급 시각 기준으로 토큰 쌍 발급.
    ///
    /// 두 토큰은 같은 시크릿으로 각각 독립적으로 서명됩니다.
    pub fn issue_pair_at(
        &self,
        user_id: UserId,
        issued_at: DateTime<Utc>,
    ) -> Result<TokenPair, JwtError> {
        let access_claims = Claims::new(user_id, TokenKind::Access, issued_at, self.access_ttl);
        let refresh_claims = Claims::new(user_id, TokenKind::Refresh, issued_at, self.refresh_ttl);

        Ok(TokenPair {
            access_token: self.sign(&access_claims)?,
            refresh_token: self.sign(&refresh_claims)?,
            expires_in: self.access_ttl.num_seconds(),
            token_type: "Bearer".to_string(),
        })
    }

    fn sign(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(&Header::new(SIGNING_ALGORITHM), claims, &self.encoding_key).map_err(JwtError::from)
    }

    /// 토큰 검증.
    ///
    /// 서명, 알고리즘(HMAC 계열), 만료, 클레임 형식, subject UUID를 확인합니다.
    /// 만료는 `TokenExpired`, 그 외 모든 실패는 `InvalidToken`입니다.
    pub fn verify(&self, token: &str) -> Result<VerifiedToken, JwtError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                _ => JwtError::InvalidToken,
            }
        })?;

        let claims = data.claims;
        let user_id = claims
            .sub
            .parse::<UserId>()
            .map_err(|_| JwtError::InvalidToken)?;
        let issued_at = timestamp_to_datetime(claims.iat)?;
        let expires_at = timestamp_to_datetime(claims.exp)?;

        Ok(VerifiedToken {
            user_id,
            kind: claims.typ,
            issued_at,
            expires_at,
            jti: claims.jti,
        })
    }

    /// 토큰 검증 후 종류까지 확인.
    pub fn verify_kind(&self, token: &str, kind: TokenKind) -> Result<VerifiedToken, JwtError> {
        let verified = self.verify(token)?;
        if verified.kind != kind {
            return Err(JwtError::WrongTokenKind);
        }
        Ok(verified)
    }
}

fn timestamp_to_datetime(ts: i64) -> Result<DateTime<Utc>, JwtError> {
    Utc.timestamp_opt(ts, 0)
        .single()
        .ok_or(JwtError::InvalidToken)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TEST_SECRET: &str = "test-secret-key-for-jwt-testing-minimum-32-chars";
    const OTHER_SECRET: &str = "wrong-secret-key-for-testing-minimum-32-chars";
    /// `{"alg":"none","typ":"JWT"}`
    const NONE_HEADER: &str = "eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0";

    fn service(secret: &str) -> TokenService {
        TokenService::new(&SecretString::from(secret), 15, 7)
    }

    #[test]
    fn test_issue_and_verify_pair() {
        let tokens = service(TEST_SECRET);
        let user_id = UserId::new();
        let pair = tokens.issue_pair(user_id).unwrap();

        assert_eq!(pair.token_type, "Bearer");
        assert_eq!(pair.expires_in, 15 * 60);

        let access = tokens.verify(&pair.access_token).unwrap();
        assert_eq!(access.user_id, user_id);
        assert_eq!(access.kind, TokenKind::Access);
        assert_eq!(access.expires_at - access.issued_at, Duration::minutes(15));

        let refresh = tokens.verify(&pair.refresh_token).unwrap();
        assert_eq!(refresh.user_id, user_id);
        assert_eq!(refresh.kind, TokenKind::Refresh);
        assert_eq!(refresh.expires_at - refresh.issued_at, Duration::days(7));
        assert_ne!(access.jti, refresh.jti);
    }

    #[test]
    fn test_access_token_valid_at_14_minutes() {
        let tokens = service(TEST_SECRET);
        let pair = tokens
            .issue_pair_at(UserId::new(), Utc::now() - Duration::minutes(14))
            .unwrap();
        assert!(tokens.verify(&pair.access_token).is_ok());
    }

    #[test]
    fn test_access_token_expired_at_16_minutes() {
        let tokens = service(TEST_SECRET);
        let pair = tokens
            .issue_pair_at(UserId::new(), Utc::now() - Duration::minutes(16))
            .unwrap();
        assert!(matches!(
            tokens.verify(&pair.access_token),
            Err(JwtError::TokenExpired)
        ));
        // refresh token은 아직 유효
        assert!(tokens.verify(&pair.refresh_token).is_ok());
    }

    #[test]
    fn test_wrong_secret() {
        let pair = service(TEST_SECRET).issue_pair(UserId::new()).unwrap();
        let result = service(OTHER_SECRET).verify(&pair.access_token);
        assert!(matches!(result, Err(JwtError::InvalidToken)));
    }

    #[test]
    fn test_tampered_signature() {
        let tokens = service(TEST_SECRET);
        let pair = tokens.issue_pair(UserId::new()).unwrap();

        let sig_start = pair.access_token.rfind('.').unwrap() + 1;
        let mut chars: Vec<char> = pair.access_token.chars().collect();
        let target = sig_start + 5;
        chars[target] = if chars[target] == 'A' { 'B' } else { 'A' };
        let tampered: String = chars.into_iter().collect();

        assert!(matches!(tokens.verify(&tampered), Err(JwtError::InvalidToken)));
    }

    #[test]
    fn test_none_algorithm_rejected() {
        let tokens = service(TEST_SECRET);
        let pair = tokens.issue_pair(UserId::new()).unwrap();
        let payload = pair.access_token.split('.').nth(1).unwrap();

        let forged = format!("{}.{}.", NONE_HEADER, payload);
        assert!(matches!(tokens.verify(&forged), Err(JwtError::InvalidToken)));
    }

    #[test]
    fn test_other_hmac_variant_accepted() {
        let tokens = service(TEST_SECRET);
        let user_id = UserId::new();
        let claims = Claims::new(user_id, TokenKind::Access, Utc::now(), Duration::minutes(5));
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(tokens.verify(&token).unwrap().user_id, user_id);
    }

    #[test]
    fn test_unparsable_subject_rejected() {
        let tokens = service(TEST_SECRET);
        let now = Utc::now().timestamp();
        let claims = serde_json::json!({
            "sub": "not-a-uuid",
            "iat": now,
            "exp": now + 600,
            "jti": "x",
            "typ": "access",
        });
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap();

        assert!(matches!(tokens.verify(&token), Err(JwtError::InvalidToken)));
    }

    #[test]
    fn test_missing_subject_rejected() {
        let tokens = service(TEST_SECRET);
        let now = Utc::now().timestamp();
        let claims = serde_json::json!({
            "iat": now,
            "exp": now + 600,
            "jti": "x",
            "typ": "access",
        });
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap();

        assert!(matches!(tokens.verify(&token), Err(JwtError::InvalidToken)));
    }

    #[test]
    fn test_garbage_token() {
        let tokens = service(TEST_SECRET);
        assert!(tokens.verify("invalid.token.here").is_err());
        assert!(tokens.verify("").is_err());
    }

    #[test]
    fn test_verify_kind() {
        let tokens = service(TEST_SECRET);
        let pair = tokens.issue_pair(UserId::new()).unwrap();

        assert!(tokens.verify_kind(&pair.access_token, TokenKind::Access).is_ok());
        assert!(matches!(
            tokens.verify_kind(&pair.refresh_token, TokenKind::Access),
            Err(JwtError::WrongTokenKind)
        ));
        assert!(tokens.verify_kind(&pair.refresh_token, TokenKind::Refresh).is_ok());
    }

    #[test]
    fn test_token_pair_serializes_camel_case() {
        let pair = service(TEST_SECRET).issue_pair(UserId::new()).unwrap();
        let json = serde_json::to_value(&pair).unwrap();
        assert!(json.get("accessToken").is_some());
        assert!(json.get("refreshToken").is_some());
        assert_eq!(json["tokenType"], "Bearer");
    }

    proptest! {
        #[test]
        fn prop_foreign_secret_never_verifies(secret in "[a-zA-Z0-9]{32,64}") {
            prop_assume!(secret != TEST_SECRET);
            let pair = service(&secret).issue_pair(UserId::new()).unwrap();
            prop_assert!(service(TEST_SECRET).verify(&pair.access_token).is_err());
            prop_assert!(service(TEST_SECRET).verify(&pair.refresh_token).is_err());
        }
    }
}
