//! # 사용자 관련 요청 DTO 모듈
//!
//! 클라이언트 JSON을 타입이 있는 구조체로 역직렬화하고 `validator`로 검증합니다.
//! 검증 실패는 `AppError::ValidationError`로 변환되어
//! `Invalid input data. <메시지>. <메시지>` 형태로 응답됩니다.

pub mod account_request;
pub mod create_user_request;
pub mod update_user_request;

pub use account_request::{ChangeEmailRequest, ResetPasswordRequest};
pub use create_user_request::CreateUserRequest;
pub use update_user_request::UpdateUserRequest;
