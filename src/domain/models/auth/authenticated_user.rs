use std::future::{ready, Ready};

use actix_web::{Error, FromRequest, HttpMessage, HttpRequest};
use serde::{Deserialize, Serialize};

use crate::core::errors::AppError;
use crate::services::auth::MISSING_TOKEN_MESSAGE;

/// Bearer 토큰에서 추출된 사용자 정보
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    /// 아이덴티티 프로바이더의 사용자 ID (`sub` 클레임)
    pub sub: String,

    /// 애플리케이션 사용자 ID (`users` 문서의 `_id`, 계정 생성 전에는 없음)
    pub app_user_id: Option<String>,
}

impl AuthenticatedUser {
    /// 요청 대상 ID가 본인의 애플리케이션 ID인지 확인
    pub fn is_self(&self, user_id: &str) -> bool {
        self.app_user_id.as_deref() == Some(user_id)
    }
}

/// ActixWeb FromRequest trait 구현
///
/// `AuthMiddleware`가 extensions에 넣어 둔 값을 꺼냅니다.
impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<actix_web::Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedUser>() {
            Some(user) => ready(Ok(user.clone())),
            None => ready(Err(AppError::AuthenticationError(MISSING_TOKEN_MESSAGE.to_string()).into())),
        }
    }
}
