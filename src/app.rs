//! 애플리케이션 조립
//!
//! `main`과 통합 테스트가 같은 함수로 앱을 만듭니다.
//!
//! 전역 미들웨어 순서 (바깥 → 안쪽):
//! `Cors` → 보안 헤더 → 요청 로그(개발 환경) → `ErrorNormalizer` → 경로 정규화 → 라우팅

use actix_cors::Cors;
use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::error::{JsonPayloadError, UrlencodedError};
use actix_web::http::header;
use actix_web::middleware::{Condition, Logger, NormalizePath, TrailingSlash};
use actix_web::{web, App, Error};

use crate::core::errors::AppError;
use crate::core::state::AppState;
use crate::handlers;
use crate::middlewares::sanitize::PAYLOAD_TOO_LARGE_MESSAGE;
use crate::middlewares::{security_headers, ErrorNormalizer};
use crate::routes::configure_all_routes;

pub fn create_app(
    state: AppState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
> {
    let config = state.config.clone();
    let environment = config.environment;
    let limit = config.pipeline.body_limit_bytes;

    App::new()
        .app_data(web::Data::new(state.clone()))
        .app_data(web::Data::from(state.token_service.clone()))
        .app_data(json_config(limit))
        .app_data(form_config(limit))
        .wrap(NormalizePath::new(TrailingSlash::Trim))
        .wrap(ErrorNormalizer::new(environment))
        .wrap(Condition::new(environment.is_development(), Logger::default()))
        .wrap(security_headers())
        .wrap(configure_cors(&config.pipeline.cors_allowed_origins))
        .configure(|cfg| configure_all_routes(cfg, &state))
        .default_service(web::to(handlers::not_found))
}

/// 허용 Origin이 비어 있으면 모든 Origin을 허용합니다.
fn configure_cors(allowed_origins: &[String]) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "PATCH", "OPTIONS"])
        .allowed_headers(vec![header::AUTHORIZATION, header::ACCEPT, header::CONTENT_TYPE])
        .max_age(3600);

    if allowed_origins.is_empty() {
        return cors.allow_any_origin().send_wildcard();
    }

    allowed_origins
        .iter()
        .fold(cors, |cors, origin| cors.allowed_origin(origin))
        .supports_credentials()
}

fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req| json_error(err).into())
}

fn form_config(limit: usize) -> web::FormConfig {
    web::FormConfig::default()
        .limit(limit)
        .error_handler(|err, _req| form_error(err).into())
}

fn json_error(err: JsonPayloadError) -> AppError {
    match err {
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            AppError::PayloadTooLarge(PAYLOAD_TOO_LARGE_MESSAGE.to_string())
        }
        other => AppError::ValidationError(format!("Invalid input data. {}", other)),
    }
}

fn form_error(err: UrlencodedError) -> AppError {
    match err {
        UrlencodedError::Overflow { .. } => {
            AppError::PayloadTooLarge(PAYLOAD_TOO_LARGE_MESSAGE.to_string())
        }
        other => AppError::ValidationError(format!("Invalid input data. {}", other)),
    }
}
