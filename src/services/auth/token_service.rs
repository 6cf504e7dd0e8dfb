//! Bearer 토큰 검증 서비스
//!
//! 토큰은 아이덴티티 프로바이더가 발급합니다. 이 서비스는 서명, 만료,
//! (설정된 경우) audience와 issuer만 확인하고 요청 사용자 정보를 꺼냅니다.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde_json::{Map, Value};

use crate::config::JwtConfig;
use crate::core::errors::{AppError, AppResult};
use crate::domain::models::auth::AuthenticatedUser;

pub const MISSING_TOKEN_MESSAGE: &str = "You are not logged in! Please log in to get access.";
pub const EXPIRED_TOKEN_MESSAGE: &str = "Your token has expired! Please log in again.";
pub const INVALID_TOKEN_MESSAGE: &str = "Invalid token. Please log in again!";

pub struct TokenService {
    decoding_key: DecodingKey,
    validation: Validation,
    app_id_claim: String,
}

impl TokenService {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);

        match &config.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }

        Self {
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            app_id_claim: config.app_id_claim.clone(),
        }
    }

    /// 토큰을 검증하고 요청 사용자 정보를 반환합니다.
    pub fn verify_token(&self, token: &str) -> AppResult<AuthenticatedUser> {
        let claims = decode::<Map<String, Value>>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => {
                    AppError::AuthenticationError(EXPIRED_TOKEN_MESSAGE.to_string())
                }
                _ => {
                    log::debug!("토큰 검증 실패: {}", e);
                    AppError::AuthenticationError(INVALID_TOKEN_MESSAGE.to_string())
                }
            })?;

        let sub = claims
            .get("sub")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::AuthenticationError(INVALID_TOKEN_MESSAGE.to_string()))?;

        let app_user_id = claims
            .get(&self.app_id_claim)
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(AuthenticatedUser {
            sub: sub.to_string(),
            app_user_id,
        })
    }

    /// `Authorization` 헤더 값에서 토큰 부분을 꺼냅니다.
    pub fn extract_bearer_token<'a>(&self, auth_header: &'a str) -> AppResult<&'a str> {
        match auth_header.strip_prefix("Bearer ") {
            Some(token) if !token.trim().is_empty() => Ok(token.trim()),
            _ => Err(AppError::AuthenticationError(MISSING_TOKEN_MESSAGE.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".to_string(),
            audience: None,
            issuer: None,
            app_id_claim: "appId".to_string(),
        }
    }

    fn token(secret: &str, claims: Value) -> String {
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn in_one_hour() -> i64 {
        chrono::Utc::now().timestamp() + 3600
    }

    #[test]
    fn test_valid_token() {
        let service = TokenService::new(&config());
        let jwt = token(
            "test-secret",
            serde_json::json!({ "sub": "auth0|1", "appId": "abc", "exp": in_one_hour() }),
        );

        let user = service.verify_token(&jwt).unwrap();
        assert_eq!(user.sub, "auth0|1");
        assert_eq!(user.app_user_id.as_deref(), Some("abc"));
    }

    #[test]
    fn test_expired_token() {
        let service = TokenService::new(&config());
        let jwt = token(
            "test-secret",
            serde_json::json!({ "sub": "auth0|1", "exp": chrono::Utc::now().timestamp() - 3600 }),
        );

        let err = service.verify_token(&jwt).unwrap_err();
        assert_eq!(err.to_string(), EXPIRED_TOKEN_MESSAGE);
    }

    #[test]
    fn test_wrong_signature() {
        let service = TokenService::new(&config());
        let jwt = token(
            "other-secret",
            serde_json::json!({ "sub": "auth0|1", "exp": in_one_hour() }),
        );

        let err = service.verify_token(&jwt).unwrap_err();
        assert_eq!(err.to_string(), INVALID_TOKEN_MESSAGE);
    }

    #[test]
    fn test_audience_is_checked_when_configured() {
        let mut cfg = config();
        cfg.audience = Some("users-api".to_string());
        let service = TokenService::new(&cfg);

        let wrong = token(
            "test-secret",
            serde_json::json!({ "sub": "auth0|1", "aud": "other", "exp": in_one_hour() }),
        );
        assert!(service.verify_token(&wrong).is_err());

        let right = token(
            "test-secret",
            serde_json::json!({ "sub": "auth0|1", "aud": "users-api", "exp": in_one_hour() }),
        );
        assert!(service.verify_token(&right).is_ok());
    }

    #[test]
    fn test_extract_bearer_token() {
        let service = TokenService::new(&config());

        assert_eq!(service.extract_bearer_token("Bearer abc.def").unwrap(), "abc.def");
        assert!(service.extract_bearer_token("Basic abc").is_err());
        assert!(service.extract_bearer_token("Bearer ").is_err());
    }
}
