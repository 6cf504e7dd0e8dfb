//! 아이덴티티 계정 관련 요청 DTO

use serde::{Deserialize, Serialize};
use validator::Validate;

/// 비밀번호 재설정 메일 발송 요청
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
}

/// 이메일 변경 요청
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEmailRequest {
    #[validate(email(message = "Please provide a valid email"))]
    pub new_email: String,
}
