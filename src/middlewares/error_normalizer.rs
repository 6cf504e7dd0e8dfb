//! 에러 정규화 미들웨어
//!
//! 파이프라인의 단일 종착점입니다. 내부 서비스가 돌려준 에러 응답
//! (핸들러의 `Err(AppError)`, 추출기 실패, 하위 미들웨어의 거절)을 모두 가로채
//! [`NormalizedError`]로 바꾼 뒤 실행 환경에 맞게 다시 렌더링합니다.

use std::future::{ready, Ready};
use std::rc::Rc;

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header;
use actix_web::{Error, HttpResponse};
use futures_util::future::LocalBoxFuture;

use crate::config::Environment;
use crate::core::errors::{AppError, NormalizedError};

pub struct ErrorNormalizer {
    environment: Environment,
}

impl ErrorNormalizer {
    pub fn new(environment: Environment) -> Self {
        Self { environment }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ErrorNormalizer
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = ErrorNormalizerService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ErrorNormalizerService {
            service: Rc::new(service),
            environment: self.environment,
        }))
    }
}

pub struct ErrorNormalizerService<S> {
    service: Rc<S>,
    environment: Environment,
}

impl<S, B> Service<ServiceRequest> for ErrorNormalizerService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let environment = self.environment;

        Box::pin(async move {
            // Err는 프레임워크의 ResponseError 렌더링(프로덕션 형식)에 맡김
            let res = service.call(req).await.inspect_err(|err| {
                log_failure(&normalize(err), environment);
            })?;

            let normalized = match res.response().error() {
                Some(err) => normalize(err),
                None => return Ok(res.map_into_left_body()),
            };

            log_failure(&normalized, environment);
            let (req, original) = res.into_parts();
            let mut rendered = normalized.render(environment);
            carry_headers(&original, &mut rendered);
            Ok(ServiceResponse::new(req, rendered).map_into_right_body())
        })
    }
}

/// 하위 미들웨어가 붙인 헤더(`X-RateLimit-*` 등)를 새 응답으로 옮깁니다.
fn carry_headers<B>(original: &HttpResponse<B>, rendered: &mut HttpResponse) {
    for (name, value) in original.headers() {
        if name == header::CONTENT_TYPE || name == header::CONTENT_LENGTH {
            continue;
        }
        rendered.headers_mut().append(name.clone(), value.clone());
    }
}

/// 에러가 `AppError`이면 그 분류를, 아니면 프레임워크 상태 코드를 따릅니다.
pub fn normalize(err: &Error) -> NormalizedError {
    match err.as_error::<AppError>() {
        Some(app_err) => NormalizedError::from_app_error(app_err),
        None => {
            let status = err.as_response_error().status_code();
            NormalizedError::from_framework_error(status, err)
        }
    }
}

fn log_failure(normalized: &NormalizedError, environment: Environment) {
    // 프로덕션 비운영 에러는 render()에서 기록됨
    if environment.is_development() && !normalized.is_operational {
        log::error!("💥 {} {}: {}", normalized.status_code, normalized.name, normalized.message);
    } else if normalized.is_operational {
        log::debug!("{} {}", normalized.status_code, normalized.message);
    }
}
