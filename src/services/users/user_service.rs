//! # 사용자 관리 서비스 구현
//!
//! 사용자 프로필의 생명주기를 관리합니다. 계정(이메일, 비밀번호)은 외부
//! 아이덴티티 프로바이더가 소유하고, 이 서비스는 프로필 문서와 두 시스템 사이의
//! 연결(`app_metadata.appUserId`)을 관리합니다.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 UserService                  │
//! │  create / replace / update / get / list      │
//! │  delete / reset password / change email      │
//! └──────────────┬────────────────────┬──────────┘
//!                ▼                    ▼
//!        UserRepository       IdentityProvider
//!          (MongoDB)             (Auth0)
//! ```
//!
//! 모든 메서드는 `AppResult`를 반환하며, 핸들러는 에러를 그대로 전파합니다.

use std::sync::Arc;

use mongodb::bson::{doc, DateTime};
use serde_json::{json, Value};
use validator::Validate;

use crate::core::errors::{AppError, AppResult};
use crate::domain::dto::users::request::{CreateUserRequest, UpdateUserRequest};
use crate::domain::dto::users::response::UserResponse;
use crate::domain::entities::users::{User, UserStatus};
use crate::domain::models::auth::AuthenticatedUser;
use crate::query::{ApiFeatures, FindQuery, QueryParams};
use crate::repositories::parse_object_id;
use crate::repositories::users::UserRepository;
use crate::services::identity::IdentityProvider;
use crate::utils::document::document_to_json;

pub const NO_DOCUMENT_MESSAGE: &str = "No document found with that ID";

/// 사용자 관리 비즈니스 로직 서비스
///
/// 저장소와 아이덴티티 프로바이더는 trait 객체로 주입됩니다.
pub struct UserService {
    users: Arc<dyn UserRepository>,
    identity: Arc<dyn IdentityProvider>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { users, identity }
    }

    /// 새 사용자 프로필 생성
    ///
    /// 저장 후 아이덴티티 계정의 `app_metadata`에 `{appUserId}`를 기록합니다.
    /// 계정 ID는 본문의 `auth0Id`, 없으면 토큰의 subject입니다.
    ///
    /// # 에러
    ///
    /// * `ValidationError` - 필드 검증 실패
    /// * `ConflictError` - username 중복
    /// * `ExternalServiceError` - 메타데이터 갱신 실패
    pub async fn create_user(
        &self,
        request: CreateUserRequest,
        caller: &AuthenticatedUser,
    ) -> AppResult<UserResponse> {
        let start_time = std::time::Instant::now();
        request.validate()?;

        let identity_id = request
            .auth0_id
            .clone()
            .unwrap_or_else(|| caller.sub.clone());

        let created = self.users.create(request.into_user()).await?;
        let user_id = created.id_string().ok_or_else(|| {
            AppError::InternalError("생성된 사용자에 _id가 없습니다".to_string())
        })?;

        self.identity
            .update_app_metadata(&identity_id, json!({ "appUserId": user_id }))
            .await?;

        log::info!(
            "✅ 사용자 생성: {} (identity: {}, {:?})",
            user_id,
            identity_id,
            start_time.elapsed()
        );
        Ok(UserResponse::from(created))
    }

    /// 전체 교체 (PUT). 이름과 username이 모두 있어야 합니다.
    pub async fn replace_user(&self, id: &str, request: UpdateUserRequest) -> AppResult<UserResponse> {
        request.require_complete()?;
        self.update_user(id, request).await
    }

    /// 부분 수정 (PATCH). 지정된 필드만 바꾸고 갱신된 문서를 반환합니다.
    pub async fn update_user(&self, id: &str, request: UpdateUserRequest) -> AppResult<UserResponse> {
        request.validate()?;
        let set = request.to_set_document()?;

        let updated = self
            .users
            .update(id, set)
            .await?
            .ok_or_else(|| AppError::NotFound(NO_DOCUMENT_MESSAGE.to_string()))?;

        log::debug!("사용자 수정: {}", id);
        Ok(UserResponse::from(updated))
    }

    pub async fn get_user(&self, id: &str) -> AppResult<UserResponse> {
        self.users
            .find_by_id(id)
            .await?
            .map(UserResponse::from)
            .ok_or_else(|| AppError::NotFound(NO_DOCUMENT_MESSAGE.to_string()))
    }

    /// 쿼리 빌더를 거친 목록 조회
    pub async fn list_users(&self, params: QueryParams) -> AppResult<Vec<Value>> {
        let query = ApiFeatures::new(FindQuery::default(), params, User::FIELD_TYPES)
            .filter()
            .sort()
            .limit_fields()
            .paginate()
            .into_query();

        let docs = self.users.find(query).await?;
        Ok(docs.into_iter().map(document_to_json).collect())
    }

    /// 계정 폐쇄
    ///
    /// 아이덴티티 계정을 삭제한 뒤 프로필 상태를 `closed`로 바꿉니다.
    /// 프로필 문서 자체는 남겨 둡니다.
    pub async fn delete_user(&self, id: &str) -> AppResult<()> {
        parse_object_id(id)?;

        let account = self
            .identity
            .find_by_app_user_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(NO_DOCUMENT_MESSAGE.to_string()))?;

        self.identity.delete_user(&account.user_id).await?;

        self.users
            .update(
                id,
                doc! { "status": UserStatus::Closed.as_str(), "updatedAt": DateTime::now() },
            )
            .await?
            .ok_or_else(|| AppError::NotFound(NO_DOCUMENT_MESSAGE.to_string()))?;

        log::info!("🗑️ 사용자 계정 폐쇄: {} (identity: {})", id, account.user_id);
        Ok(())
    }

    pub async fn send_reset_password_email(&self, email: &str) -> AppResult<()> {
        self.identity.send_reset_password_email(email).await?;
        log::info!("비밀번호 재설정 메일 요청 처리");
        Ok(())
    }

    /// 이메일 변경
    ///
    /// 본인 요청이면 토큰의 계정을, 아니면 `appUserId`로 찾은 계정을 변경합니다.
    pub async fn change_email(
        &self,
        id: &str,
        new_email: &str,
        caller: &AuthenticatedUser,
    ) -> AppResult<()> {
        let identity_id = if caller.is_self(id) {
            caller.sub.clone()
        } else {
            parse_object_id(id)?;
            self.identity
                .find_by_app_user_id(id)
                .await?
                .map(|account| account.user_id)
                .ok_or_else(|| AppError::NotFound(NO_DOCUMENT_MESSAGE.to_string()))?
        };

        self.identity.change_email(&identity_id, new_email).await?;
        Ok(())
    }
}
