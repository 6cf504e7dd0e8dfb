//! # Application Error Handling System
//!
//! 서비스 전역 에러 처리 시스템입니다.
//!
//! 핸들러는 에러 응답을 직접 만들지 않습니다. 모든 실패는 `Err(AppError)`로
//! 반환되고, 파이프라인 가장 바깥의 [`ErrorNormalizer`] 미들웨어가 실행 환경에
//! 맞게 단일 JSON 형식으로 렌더링합니다.
//!
//! ## 분류
//!
//! | AppError | HTTP Status | 운영 에러 |
//! |----------|-------------|-----------|
//! | `NotFound` | 404 | O |
//! | `ValidationError` | 400 | O |
//! | `MalformedInput` | 400 | O |
//! | `ConflictError` | 400 | O |
//! | `AuthenticationError` | 401 | O |
//! | `PayloadTooLarge` | 413 | O |
//! | `TooManyRequests` | 429 | O |
//! | `ExternalServiceError` (업스트림 4xx) | 업스트림 상태 | O |
//! | `ExternalServiceError` (그 외) | 500 | X |
//! | `DatabaseError` | 500 | X |
//! | `InternalError` | 500 | X |
//!
//! ## 렌더링
//!
//! - 개발 환경: `{status, error: {name, statusCode, isOperational}, message, stack}`
//! - 프로덕션 운영 에러: `{status, message}`
//! - 프로덕션 비운영 에러: `{"status":"error","message":"Something went very wrong!"}`
//!
//! [`ErrorNormalizer`]: crate::middlewares::error_normalizer::ErrorNormalizer

use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::Serialize;
use thiserror::Error;

use crate::config::Environment;

/// 프로덕션에서 비운영 에러 대신 노출되는 고정 메시지
pub const GENERIC_ERROR_MESSAGE: &str = "Something went very wrong!";

/// MongoDB 중복 키 에러 코드
const DUPLICATE_KEY_CODE: i32 = 11000;

/// 애플리케이션 전역 에러 타입
///
/// 운영 에러(operational)는 클라이언트에게 메시지를 그대로 보여줘도 되는
/// 예상된 실패이고, 나머지는 프로그래밍/인프라 오류로 간주합니다.
#[derive(Error, Debug)]
pub enum AppError {
    /// 요청한 리소스 또는 경로가 존재하지 않음
    #[error("{0}")]
    NotFound(String),

    /// 스키마/필드 검증 실패 (`Invalid input data. a. b`)
    #[error("{0}")]
    ValidationError(String),

    /// 잘못된 식별자 또는 타입 불일치 (`Invalid _id: xyz.`)
    #[error("{0}")]
    MalformedInput(String),

    /// 유니크 필드 중복
    #[error("{0}")]
    ConflictError(String),

    /// 토큰 누락, 만료, 서명 오류
    #[error("{0}")]
    AuthenticationError(String),

    /// 요청 본문 크기 초과
    #[error("{0}")]
    PayloadTooLarge(String),

    /// IP별 요청 한도 초과
    #[error("{0}")]
    TooManyRequests(String),

    /// 아이덴티티 프로바이더 등 외부 서비스 호출 실패
    ///
    /// `status`가 4xx이면 업스트림이 요청을 거부한 것이므로 운영 에러로 전달합니다.
    #[error("{message}")]
    ExternalServiceError { status: Option<u16>, message: String },

    /// 데이터베이스 연산 실패
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// 예상하지 못한 시스템 오류
    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl AppError {
    /// 에러 종류 이름 (개발 환경 응답의 `error.name`)
    pub fn name(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NotFound",
            AppError::ValidationError(_) => "ValidationError",
            AppError::MalformedInput(_) => "MalformedInput",
            AppError::ConflictError(_) => "DuplicateConflict",
            AppError::AuthenticationError(_) => "AuthTokenInvalid",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::TooManyRequests(_) => "TooManyRequests",
            AppError::ExternalServiceError { .. } => "ExternalServiceError",
            AppError::DatabaseError(_) => "DatabaseError",
            AppError::InternalError(_) => "InternalError",
        }
    }

    /// 클라이언트에게 메시지를 그대로 보여줘도 되는 에러인지 여부
    pub fn is_operational(&self) -> bool {
        match self {
            AppError::ExternalServiceError { status, .. } => {
                matches!(status, Some(code) if (400..500).contains(code))
            }
            AppError::DatabaseError(_) | AppError::InternalError(_) => false,
            _ => true,
        }
    }

    fn http_status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ValidationError(_)
            | AppError::MalformedInput(_)
            | AppError::ConflictError(_) => StatusCode::BAD_REQUEST,
            AppError::AuthenticationError(_) => StatusCode::UNAUTHORIZED,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::ExternalServiceError { status, .. } if self.is_operational() => status
                .and_then(|code| StatusCode::from_u16(code).ok())
                .unwrap_or(StatusCode::BAD_REQUEST),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.http_status()
    }

    /// 미들웨어를 거치지 않는 경로에서도 내부 정보가 새지 않도록
    /// 기본 렌더링은 프로덕션 형식을 사용합니다.
    fn error_response(&self) -> HttpResponse {
        NormalizedError::from_app_error(self).render(Environment::Production)
    }
}

/// 편의성을 위한 Result 타입 별칭
pub type AppResult<T> = Result<T, AppError>;

/// 외부 라이브러리 에러를 AppError로 변환하는 확장 trait
///
/// ```rust,ignore
/// use crate::core::errors::ErrorContext;
///
/// let body = serde_json::to_value(&payload).context("Failed to serialize payload")?;
/// ```
pub trait ErrorContext<T> {
    /// 컨텍스트 정보와 함께 에러를 변환합니다.
    fn context(self, msg: &str) -> AppResult<T>;

    /// 클로저를 사용하여 지연 평가된 컨텍스트를 제공합니다.
    fn with_context<F>(self, f: F) -> AppResult<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: std::fmt::Display,
{
    fn context(self, msg: &str) -> AppResult<T> {
        self.map_err(|e| AppError::InternalError(format!("{}: {}", msg, e)))
    }

    fn with_context<F>(self, f: F) -> AppResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AppError::InternalError(format!("{}: {}", f(), e)))
    }
}

impl From<validator::ValidationErrors> for AppError {
    /// 필드별 검증 메시지를 `Invalid input data. a. b` 형태로 합칩니다.
    ///
    /// 필드 순서는 이름순으로 고정합니다.
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|(a, _), (b, _)| a.cmp(b));

        let messages: Vec<String> = fields
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |err| match &err.message {
                    Some(msg) => msg.to_string(),
                    None => format!("Invalid value for field {}", field),
                })
            })
            .collect();

        AppError::ValidationError(format!("Invalid input data. {}", messages.join(". ")))
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        if is_duplicate_key(&err) {
            let raw = err.to_string();
            let value = quoted_value(&raw).unwrap_or("value");
            return AppError::ConflictError(format!(
                "Duplicate field value: {}. Please use another value!",
                value
            ));
        }

        AppError::DatabaseError(err.to_string())
    }
}

impl From<mongodb::bson::oid::Error> for AppError {
    fn from(err: mongodb::bson::oid::Error) -> Self {
        AppError::MalformedInput(format!("Invalid identifier: {}", err))
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};

    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => {
            write_error.code == DUPLICATE_KEY_CODE
        }
        ErrorKind::Command(command_error) => command_error.code == DUPLICATE_KEY_CODE,
        _ => err.to_string().contains("E11000"),
    }
}

/// 드라이버 메시지에서 처음 나오는 따옴표 값(`"john"`)을 따옴표째 꺼냅니다.
fn quoted_value(message: &str) -> Option<&str> {
    let start = message.find(['"', '\''])?;
    let quote = message[start..].chars().next()?;
    let end = message[start + 1..].find(quote)? + start + 1;
    Some(&message[start..=end])
}

/// 실패 지점에서 만들어져 최종 렌더링 단계에서 한 번 소비되는 정규화된 에러
#[derive(Debug, Clone)]
pub struct NormalizedError {
    pub status_code: u16,
    pub message: String,
    pub is_operational: bool,
    pub name: String,
    /// 디버그 출력과 원인 체인 (프로덕션에서는 렌더링되지 않음)
    pub stack: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorDetail<'a> {
    name: &'a str,
    status_code: u16,
    is_operational: bool,
}

#[derive(Serialize)]
struct DevelopmentBody<'a> {
    status: &'static str,
    error: ErrorDetail<'a>,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    stack: Option<&'a str>,
}

#[derive(Serialize)]
struct ProductionBody<'a> {
    status: &'static str,
    message: &'a str,
}

impl NormalizedError {
    pub fn from_app_error(err: &AppError) -> Self {
        Self {
            status_code: err.http_status().as_u16(),
            message: err.to_string(),
            is_operational: err.is_operational(),
            name: err.name().to_string(),
            stack: Some(error_chain(err)),
        }
    }

    /// AppError가 아닌 프레임워크 에러(라우팅, 추출기 등)를 정규화합니다.
    ///
    /// 4xx는 운영 에러로, 5xx는 비운영 에러로 취급합니다.
    pub fn from_framework_error(status: StatusCode, err: &actix_web::Error) -> Self {
        Self {
            status_code: status.as_u16(),
            message: err.to_string(),
            is_operational: status.is_client_error(),
            name: "HttpError".to_string(),
            stack: Some(format!("{:?}", err)),
        }
    }

    /// 4xx는 "fail", 5xx는 "error"
    pub fn status(&self) -> &'static str {
        if (400..500).contains(&self.status_code) {
            "fail"
        } else {
            "error"
        }
    }

    fn http_status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// 실행 환경에 맞는 JSON 응답을 생성합니다.
    pub fn render(&self, environment: Environment) -> HttpResponse {
        let mut builder = HttpResponse::build(self.http_status());

        if environment.is_development() {
            return builder.json(DevelopmentBody {
                status: self.status(),
                error: ErrorDetail {
                    name: &self.name,
                    status_code: self.status_code,
                    is_operational: self.is_operational,
                },
                message: &self.message,
                stack: self.stack.as_deref(),
            });
        }

        if self.is_operational {
            builder.json(ProductionBody {
                status: self.status(),
                message: &self.message,
            })
        } else {
            log::error!(
                "💥 ERROR {} {}: {}",
                self.status_code,
                self.name,
                self.stack.as_deref().unwrap_or(&self.message)
            );
            builder.json(ProductionBody {
                status: "error",
                message: GENERIC_ERROR_MESSAGE,
            })
        }
    }
}

/// Debug 표현과 `source()` 체인을 이어 붙인 진단 문자열
fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut chain = format!("{:?}", err);
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push_str(&format!("\nCaused by: {}", cause));
        source = cause.source();
    }
    chain
}
