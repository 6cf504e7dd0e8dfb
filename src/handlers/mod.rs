//! HTTP 핸들러
//!
//! 핸들러는 추출기로 입력을 받아 서비스에 위임하고 성공 봉투만 만듭니다.
//! 에러 응답은 직접 만들지 않습니다.

pub mod analytics;
pub mod users;

use actix_web::HttpRequest;

use crate::core::errors::AppError;

/// 어떤 라우트에도 맞지 않는 요청
pub async fn not_found(req: HttpRequest) -> Result<actix_web::HttpResponse, AppError> {
    Err(AppError::NotFound(format!(
        "Can't find {} on this server!",
        req.uri()
    )))
}
