//! # Auth0 Management API 클라이언트
//!
//! `reqwest`로 Auth0 테넌트를 호출합니다.
//!
//! | 작업 | 엔드포인트 | 토큰 |
//! |------|------------|------|
//! | 관리 토큰 발급 | `POST /oauth/token` (client_credentials) | - |
//! | 메타데이터 갱신 / 이메일 변경 | `PATCH /api/v2/users/{id}` | 관리 토큰 |
//! | 계정 삭제 | `DELETE /api/v2/users/{id}` | 관리 토큰 |
//! | appUserId 검색 | `GET /api/v2/users?q=...` | 관리 토큰 |
//! | 비밀번호 재설정 메일 | `POST /dbconnections/change_password` | - |
//!
//! 관리 토큰은 만료 60초 전까지 메모리에 캐시됩니다.
//! 재시도와 별도 타임아웃은 두지 않으며, 모든 실패는 `ExternalServiceError`로 전달됩니다.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{json, Value};

use super::identity_provider::IdentityProvider;
use crate::config::IdentityProviderConfig;
use crate::core::errors::{AppError, AppResult};
use crate::domain::models::identity::IdentityUser;

/// 토큰 만료 전에 미리 갱신하는 여유 시간
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct ManagementTokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    86_400
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: Instant,
}

pub struct Auth0Client {
    config: IdentityProviderConfig,
    http: reqwest::Client,
    token: Mutex<Option<CachedToken>>,
}

impl Auth0Client {
    pub fn new(config: IdentityProviderConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
            token: Mutex::new(None),
        }
    }

    fn ensure_configured(&self) -> AppResult<()> {
        if self.config.is_configured() {
            Ok(())
        } else {
            Err(AppError::ExternalServiceError {
                status: None,
                message: "Identity provider is not configured".to_string(),
            })
        }
    }

    fn user_url(&self, identity_id: &str) -> String {
        format!(
            "{}/api/v2/users/{}",
            self.config.base_url(),
            urlencoding::encode(identity_id)
        )
    }

    /// 캐시된 관리 토큰을 반환하거나 새로 발급받습니다.
    ///
    /// 락은 네트워크 호출 동안 잡지 않습니다.
    async fn management_token(&self) -> AppResult<String> {
        self.ensure_configured()?;

        let cached = self.token.lock().clone();
        if let Some(cached) = cached {
            if cached.expires_at > Instant::now() + TOKEN_REFRESH_MARGIN {
                return Ok(cached.value);
            }
        }

        let response = self
            .http
            .post(format!("{}/oauth/token", self.config.base_url()))
            .json(&json!({
                "grant_type": "client_credentials",
                "client_id": self.config.client_id,
                "client_secret": self.config.client_secret,
                "audience": self.config.audience,
            }))
            .send()
            .await
            .map_err(request_failed)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(token_request_failed(status, &text));
        }

        let token: ManagementTokenResponse = response.json().await.map_err(request_failed)?;

        log::debug!("Auth0 관리 토큰 발급 (expires_in: {}s)", token.expires_in);

        *self.token.lock() = Some(CachedToken {
            value: token.access_token.clone(),
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        });

        Ok(token.access_token)
    }

    async fn patch_user(&self, identity_id: &str, body: Value) -> AppResult<()> {
        let token = self.management_token().await?;

        let response = self
            .http
            .patch(self.user_url(identity_id))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(request_failed)?;

        check_status(response).await?;
        Ok(())
    }
}

#[async_trait]
impl IdentityProvider for Auth0Client {
    async fn update_app_metadata(&self, identity_id: &str, metadata: Value) -> AppResult<()> {
        self.patch_user(identity_id, json!({ "app_metadata": metadata }))
            .await?;
        log::info!("Auth0 app_metadata 갱신: {}", identity_id);
        Ok(())
    }

    async fn change_email(&self, identity_id: &str, new_email: &str) -> AppResult<()> {
        self.patch_user(
            identity_id,
            json!({
                "email": new_email,
                "verify_email": true,
                "connection": self.config.db_connection,
            }),
        )
        .await?;
        log::info!("Auth0 이메일 변경: {}", identity_id);
        Ok(())
    }

    async fn delete_user(&self, identity_id: &str) -> AppResult<()> {
        let token = self.management_token().await?;

        let response = self
            .http
            .delete(self.user_url(identity_id))
            .bearer_auth(token)
            .send()
            .await
            .map_err(request_failed)?;

        check_status(response).await?;
        log::info!("Auth0 계정 삭제: {}", identity_id);
        Ok(())
    }

    async fn send_reset_password_email(&self, email: &str) -> AppResult<()> {
        self.ensure_configured()?;

        let response = self
            .http
            .post(format!(
                "{}/dbconnections/change_password",
                self.config.base_url()
            ))
            .json(&json!({
                "client_id": self.config.client_id,
                "email": email,
                "connection": self.config.db_connection,
            }))
            .send()
            .await
            .map_err(request_failed)?;

        check_status(response).await?;
        Ok(())
    }

    async fn find_by_app_user_id(&self, app_user_id: &str) -> AppResult<Option<IdentityUser>> {
        let token = self.management_token().await?;
        let query = format!("app_metadata.appUserId:\"{}\"", app_user_id);

        let response = self
            .http
            .get(format!("{}/api/v2/users", self.config.base_url()))
            .bearer_auth(token)
            .query(&[("q", query.as_str()), ("search_engine", "v3")])
            .send()
            .await
            .map_err(request_failed)?;

        let users: Vec<IdentityUser> = check_status(response)
            .await?
            .json()
            .await
            .map_err(request_failed)?;

        Ok(users.into_iter().next())
    }
}

fn request_failed(e: reqwest::Error) -> AppError {
    AppError::ExternalServiceError {
        status: e.status().map(|s| s.as_u16()),
        message: format!("Identity provider request failed: {}", e),
    }
}

/// 관리 토큰 발급 실패는 서버 자격 증명 문제이므로 상태 코드를 버립니다 (500).
fn token_request_failed(status: reqwest::StatusCode, body: &str) -> AppError {
    let detail = upstream_message(body).unwrap_or_else(|| body.to_string());
    log::error!("❌ Auth0 관리 토큰 발급 실패 ({}): {}", status, detail);

    AppError::ExternalServiceError {
        status: None,
        message: format!("Identity provider token request failed ({}): {}", status, detail),
    }
}

/// 성공 응답이 아니면 본문의 `message`(또는 원문)를 담아 에러로 바꿉니다.
async fn check_status(response: reqwest::Response) -> AppResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    Err(AppError::ExternalServiceError {
        status: Some(status.as_u16()),
        message: upstream_message(&text)
            .unwrap_or_else(|| format!("Identity provider responded with {}", status)),
    })
}

fn upstream_message(body: &str) -> Option<String> {
    let parsed: Value = serde_json::from_str(body).ok()?;
    parsed
        .get("message")
        .or_else(|| parsed.get("error_description"))
        .and_then(Value::as_str)
        .map(str::to_string)
}
