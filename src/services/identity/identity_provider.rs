use async_trait::async_trait;
use serde_json::Value;

use crate::core::errors::AppResult;
use crate::domain::models::identity::IdentityUser;

/// 외부 아이덴티티 프로바이더 (계정, 이메일, 비밀번호 소유자)
///
/// `identity_id`는 프로바이더 측 사용자 ID(`auth0|...`)입니다.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// 계정의 `app_metadata`를 병합 갱신합니다.
    async fn update_app_metadata(&self, identity_id: &str, metadata: Value) -> AppResult<()>;

    async fn change_email(&self, identity_id: &str, new_email: &str) -> AppResult<()>;

    async fn delete_user(&self, identity_id: &str) -> AppResult<()>;

    async fn send_reset_password_email(&self, email: &str) -> AppResult<()>;

    /// `app_metadata.appUserId`로 계정을 찾습니다.
    async fn find_by_app_user_id(&self, app_user_id: &str) -> AppResult<Option<IdentityUser>>;
}
