//! 클라이언트 IP 단위 슬라이딩 윈도우 Rate Limit 미들웨어
//!
//! `/api` 스코프에만 적용됩니다. 한도를 넘은 요청은 핸들러까지 가지 않고
//! 429 `TooManyRequests`로 거절되며, 모든 응답에 `X-RateLimit-Limit`과
//! `X-RateLimit-Remaining` 헤더가 붙습니다.
//!
//! 상태는 프로세스 메모리에만 존재하며 모든 워커가 같은 [`RateLimiter`]를 공유합니다.

use std::collections::HashMap;
use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::Error;
use futures_util::future::LocalBoxFuture;
use parking_lot::Mutex;

use crate::core::errors::AppError;

pub const RATE_LIMIT_MESSAGE: &str = "Too many requests from this IP, please try again in an hour!";

const ONE_HOUR: Duration = Duration::from_secs(60 * 60);
const UNKNOWN_CLIENT: &str = "unknown";

/// 한 번의 요청에 대한 판정 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub limit: usize,
    pub remaining: usize,
}

/// 클라이언트별 요청 시각을 윈도우 안에서만 보관하는 메모리 저장소
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    entries: Mutex<HashMap<String, Vec<Instant>>>,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// 1시간 윈도우
    pub fn per_hour(max_requests: usize) -> Self {
        Self::new(max_requests, ONE_HOUR)
    }

    /// 요청을 기록하고 허용 여부를 판정합니다. 거절된 요청은 기록하지 않습니다.
    pub fn check(&self, client: &str) -> RateDecision {
        self.check_at(client, Instant::now())
    }

    fn check_at(&self, client: &str, now: Instant) -> RateDecision {
        let mut entries = self.entries.lock();
        let timestamps = entries.entry(client.to_string()).or_default();
        timestamps.retain(|&t| now.duration_since(t) < self.window);

        if timestamps.len() >= self.max_requests {
            return RateDecision {
                allowed: false,
                limit: self.max_requests,
                remaining: 0,
            };
        }

        timestamps.push(now);
        RateDecision {
            allowed: true,
            limit: self.max_requests,
            remaining: self.max_requests - timestamps.len(),
        }
    }

    /// 윈도우 안에 기록이 없는 클라이언트를 제거합니다.
    pub fn cleanup(&self) {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        let before = entries.len();

        entries.retain(|_, timestamps| {
            timestamps.retain(|&t| now.duration_since(t) < self.window);
            !timestamps.is_empty()
        });

        let removed = before - entries.len();
        if removed > 0 {
            log::debug!("Rate limit 항목 {}개 정리", removed);
        }
    }

    pub fn tracked_clients(&self) -> usize {
        self.entries.lock().len()
    }
}

/// 주기적으로 [`RateLimiter::cleanup`]을 호출하는 백그라운드 태스크를 띄웁니다.
pub fn spawn_cleanup(limiter: Arc<RateLimiter>, every: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            limiter.cleanup();
        }
    });
}

/// Rate Limit 미들웨어
pub struct RateLimit {
    limiter: Arc<RateLimiter>,
}

impl RateLimit {
    pub fn new(limiter: Arc<RateLimiter>) -> Self {
        Self { limiter }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RateLimitService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitService {
            service: Rc::new(service),
            limiter: self.limiter.clone(),
        }))
    }
}

pub struct RateLimitService<S> {
    service: Rc<S>,
    limiter: Arc<RateLimiter>,
}

impl<S, B> Service<ServiceRequest> for RateLimitService<S>
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
        let client = req
            .connection_info()
            .realip_remote_addr()
            .unwrap_or(UNKNOWN_CLIENT)
            .to_string();
        let decision = self.limiter.check(&client);

        Box::pin(async move {
            if !decision.allowed {
                log::warn!("🚫 Rate limit 초과: {}", client);
                let mut res = req
                    .error_response(AppError::TooManyRequests(RATE_LIMIT_MESSAGE.to_string()))
                    .map_into_right_body();
                insert_headers(&mut res, decision);
                return Ok(res);
            }

            let mut res = service.call(req).await?.map_into_left_body();
            insert_headers(&mut res, decision);
            Ok(res)
        })
    }
}

fn insert_headers<B>(res: &mut ServiceResponse<B>, decision: RateDecision) {
    let headers = res.headers_mut();
    headers.insert(
        HeaderName::from_static("x-ratelimit-limit"),
        HeaderValue::from(decision.limit),
    );
    headers.insert(
        HeaderName::from_static("x-ratelimit-remaining"),
        HeaderValue::from(decision.remaining),
    );
}
