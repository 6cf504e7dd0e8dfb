//! # Authentication Configuration Module
//!
//! 외부 아이덴티티 프로바이더(Auth0 Management API)와 Bearer 토큰 검증에
//! 필요한 설정을 관리합니다.
//!
//! 이 서비스는 토큰을 발급하지 않습니다. 토큰은 아이덴티티 프로바이더가
//! 발급하고, 서비스는 서명과 클레임만 검증합니다.
//!
//! ## 환경 변수
//!
//! ```bash
//! # Auth0 Management API
//! export AUTH0_DOMAIN="tenant.eu.auth0.com"
//! export AUTH0_CLIENT_ID="management-client-id"
//! export AUTH0_CLIENT_SECRET="management-client-secret"
//! export AUTH0_AUDIENCE="https://tenant.eu.auth0.com/api/v2/"
//! export AUTH0_DB_CONNECTION="Username-Password-Authentication"
//!
//! # Bearer 토큰 검증
//! export JWT_SECRET="shared-hs256-secret"
//! export JWT_AUDIENCE="users-api"
//! export JWT_ISSUER="https://tenant.eu.auth0.com/"
//! export JWT_APP_ID_CLAIM="appId"
//! ```

use std::env;

use super::data_config::env_or;

/// Auth0 Management API 접속 정보
///
/// 클라이언트 자격 증명(client credentials) 방식으로 관리 토큰을 발급받아
/// 사용자 메타데이터 갱신, 이메일 변경, 계정 삭제, 비밀번호 재설정 메일 발송에 사용합니다.
#[derive(Clone)]
pub struct IdentityProviderConfig {
    pub domain: String,
    pub client_id: String,
    pub client_secret: String,
    /// 관리 API audience (미설정 시 `https://{domain}/api/v2/`)
    pub audience: String,
    /// 비밀번호 재설정 메일에 사용할 DB 커넥션 이름
    pub db_connection: String,
}

impl IdentityProviderConfig {
    pub fn from_env() -> Self {
        let domain = env_or("AUTH0_DOMAIN", "");
        let audience = env::var("AUTH0_AUDIENCE")
            .unwrap_or_else(|_| format!("https://{}/api/v2/", domain));

        if domain.is_empty() {
            log::warn!("AUTH0_DOMAIN 미설정 - 아이덴티티 프로바이더 호출이 실패합니다");
        }

        Self {
            domain,
            client_id: env_or("AUTH0_CLIENT_ID", ""),
            client_secret: env_or("AUTH0_CLIENT_SECRET", ""),
            audience,
            db_connection: env_or("AUTH0_DB_CONNECTION", "Username-Password-Authentication"),
        }
    }

    /// 관리 API 호출이 가능한 최소 설정이 있는지 확인합니다.
    pub fn is_configured(&self) -> bool {
        !self.domain.is_empty() && !self.client_id.is_empty() && !self.client_secret.is_empty()
    }

    /// 테넌트 기본 URL (`https://{domain}`)
    pub fn base_url(&self) -> String {
        if self.domain.starts_with("http://") || self.domain.starts_with("https://") {
            self.domain.trim_end_matches('/').to_string()
        } else {
            format!("https://{}", self.domain.trim_end_matches('/'))
        }
    }
}

// client_secret이 로그에 남지 않도록 Debug를 직접 구현
impl std::fmt::Debug for IdentityProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityProviderConfig")
            .field("domain", &self.domain)
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("audience", &self.audience)
            .field("db_connection", &self.db_connection)
            .finish()
    }
}

/// Bearer 토큰(JWT) 검증 설정
///
/// HS256 공유 비밀키로 서명을 검증합니다. audience와 issuer는 설정된 경우에만 검사합니다.
#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub audience: Option<String>,
    pub issuer: Option<String>,
    /// 애플리케이션 사용자 ID가 담긴 클레임 이름 (기본값: "appId")
    pub app_id_claim: String,
}

impl JwtConfig {
    /// 환경 변수에서 JWT 검증 설정을 읽습니다.
    ///
    /// `JWT_SECRET`이 없으면 개발용 기본값을 사용하며 경고 로그를 남깁니다.
    pub fn from_env() -> Self {
        let secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            log::warn!("JWT_SECRET not set, using default (not secure for production!)");
            "your-secret-key".to_string()
        });

        Self {
            secret,
            audience: non_empty_var("JWT_AUDIENCE"),
            issuer: non_empty_var("JWT_ISSUER"),
            app_id_claim: env_or("JWT_APP_ID_CLAIM", "appId"),
        }
    }
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"***")
            .field("audience", &self.audience)
            .field("issuer", &self.issuer)
            .field("app_id_claim", &self.app_id_claim)
            .finish()
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(domain: &str) -> IdentityProviderConfig {
        IdentityProviderConfig {
            domain: domain.to_string(),
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            audience: String::new(),
            db_connection: "Username-Password-Authentication".to_string(),
        }
    }

    #[test]
    fn test_base_url_adds_scheme() {
        assert_eq!(config("tenant.auth0.com").base_url(), "https://tenant.auth0.com");
        assert_eq!(
            config("http://localhost:9999/").base_url(),
            "http://localhost:9999"
        );
    }

    #[test]
    fn test_is_configured_requires_credentials() {
        assert!(config("tenant.auth0.com").is_configured());
        assert!(!config("").is_configured());
    }

    #[test]
    fn test_debug_masks_secrets() {
        let rendered = format!("{:?}", config("tenant.auth0.com"));
        assert!(!rendered.contains("\"secret\""));
        assert!(rendered.contains("***"));
    }
}
