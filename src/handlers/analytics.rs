//! 액션 로그 조회 핸들러

use actix_web::{get, web, HttpRequest, HttpResponse};

use crate::core::errors::AppError;
use crate::core::state::AppState;
use crate::domain::dto::users::response::ApiResponse;
use crate::query::QueryParams;

/// `GET /api/v{N}/analytics`
///
/// 사용자 목록과 같은 쿼리 문법을 사용합니다 (`action=user.get&sort=-createdAt`).
#[get("")]
pub async fn get_all_logs(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let params = QueryParams::parse(req.query_string());
    let logs = state.analytics_service.list_logs(params).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::list(logs)))
}
