//! # User Management HTTP Handlers
//!
//! `/api/v{N}/users` 스코프의 엔드포인트입니다. 모든 경로는 `AuthMiddleware`
//! 뒤에 있으며, 실패는 `AppError`로 반환되어 `ErrorNormalizer`가 렌더링합니다.
//!
//! | 메서드 | 경로 | 설명 | 상태 코드 | 액션 |
//! |--------|------|------|-----------|------|
//! | `POST` | `/users` | 사용자 생성 | 201 | `user.create` |
//! | `GET` | `/users` | 목록 조회 | 200 | `user.find` |
//! | `GET` | `/users/{id}` | 단건 조회 | 200 | `user.get` |
//! | `PUT` | `/users/{id}` | 전체 수정 | 200 | `user.update` |
//! | `PATCH` | `/users/{id}` | 부분 수정 | 200 | `user.update` |
//! | `DELETE` | `/users/{id}` | 계정 폐쇄 | 204 | `user.delete` |
//! | `POST` | `/users/reset-password` | 비밀번호 재설정 메일 | 200 | `user.reset_password_email` |
//! | `PATCH` | `/users/{id}/email` | 이메일 변경 | 200 | `user.change_email` |
//!
//! 액션 로그는 작업이 성공한 뒤에 큐에 들어가며 응답을 지연시키지 않습니다.

use actix_web::{delete, get, patch, post, put, web, HttpRequest, HttpResponse};
use validator::Validate;

use crate::core::errors::AppError;
use crate::core::state::AppState;
use crate::domain::dto::users::request::{
    ChangeEmailRequest, CreateUserRequest, ResetPasswordRequest, UpdateUserRequest,
};
use crate::domain::dto::users::response::{ApiResponse, DocEnvelope};
use crate::domain::models::auth::AuthenticatedUser;
use crate::query::QueryParams;

/// 사용자 생성 핸들러
///
/// `auth0Id`가 없으면 토큰 subject의 계정과 연결됩니다.
#[post("")]
pub async fn create_user(
    state: web::Data<AppState>,
    req: HttpRequest,
    caller: AuthenticatedUser,
    payload: web::Json<CreateUserRequest>,
) -> Result<HttpResponse, AppError> {
    let request = payload.into_inner();
    let user = state
        .user_service
        .create_user(request.clone(), &caller)
        .await?;

    state
        .action_logger
        .log_request_with_body(&req, &request, "user.create");

    Ok(HttpResponse::Created().json(ApiResponse::data(user)))
}

/// 목록 조회 핸들러
///
/// `page`, `limit`, `sort`, `fields`와 `field[op]=value` 필터를 지원합니다.
#[get("")]
pub async fn get_all_users(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let params = QueryParams::parse(req.query_string());
    let users = state.user_service.list_users(params).await?;

    state.action_logger.log_request(&req, "user.find");

    Ok(HttpResponse::Ok().json(ApiResponse::list(users)))
}

/// 비밀번호 재설정 메일 발송
#[post("/reset-password")]
pub async fn send_reset_password_email(
    state: web::Data<AppState>,
    req: HttpRequest,
    payload: web::Json<ResetPasswordRequest>,
) -> Result<HttpResponse, AppError> {
    payload.validate()?;
    state
        .user_service
        .send_reset_password_email(&payload.email)
        .await?;

    state
        .action_logger
        .log_request_with_body(&req, &payload.0, "user.reset_password_email");

    Ok(HttpResponse::Ok().json(ApiResponse::<()>::success()))
}

#[get("/{id}")]
pub async fn get_user(
    state: web::Data<AppState>,
    req: HttpRequest,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let user = state.user_service.get_user(&id).await?;

    state.action_logger.log_request(&req, "user.get");

    Ok(HttpResponse::Ok().json(ApiResponse::data(DocEnvelope { doc: user })))
}

/// 전체 수정 (firstName, lastName, username 필수)
#[put("/{id}")]
pub async fn replace_user(
    state: web::Data<AppState>,
    req: HttpRequest,
    id: web::Path<String>,
    payload: web::Json<UpdateUserRequest>,
) -> Result<HttpResponse, AppError> {
    let request = payload.into_inner();
    let user = state
        .user_service
        .replace_user(&id, request.clone())
        .await?;

    state
        .action_logger
        .log_request_with_body(&req, &request, "user.update");

    Ok(HttpResponse::Ok().json(ApiResponse::data(user)))
}

#[patch("/{id}")]
pub async fn update_user(
    state: web::Data<AppState>,
    req: HttpRequest,
    id: web::Path<String>,
    payload: web::Json<UpdateUserRequest>,
) -> Result<HttpResponse, AppError> {
    let request = payload.into_inner();
    let user = state
        .user_service
        .update_user(&id, request.clone())
        .await?;

    state
        .action_logger
        .log_request_with_body(&req, &request, "user.update");

    Ok(HttpResponse::Ok().json(ApiResponse::data(user)))
}

/// 계정 폐쇄 핸들러
///
/// 아이덴티티 계정을 삭제하고 프로필을 `closed` 상태로 남깁니다.
#[delete("/{id}")]
pub async fn delete_user(
    state: web::Data<AppState>,
    req: HttpRequest,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    state.user_service.delete_user(&id).await?;

    state.action_logger.log_request(&req, "user.delete");

    Ok(HttpResponse::NoContent().finish())
}

#[patch("/{id}/email")]
pub async fn change_email(
    state: web::Data<AppState>,
    req: HttpRequest,
    caller: AuthenticatedUser,
    id: web::Path<String>,
    payload: web::Json<ChangeEmailRequest>,
) -> Result<HttpResponse, AppError> {
    payload.validate()?;
    state
        .user_service
        .change_email(&id, &payload.new_email, &caller)
        .await?;

    state
        .action_logger
        .log_request_with_body(&req, &payload.0, "user.change_email");

    Ok(HttpResponse::Ok().json(ApiResponse::<()>::success()))
}
