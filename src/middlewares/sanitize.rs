//! 입력 새니타이징 미들웨어
//!
//! 쿼리 문자열과 JSON/폼 본문에 규칙을 적용한 뒤 요청을 다시 조립합니다.
//!
//! - [`SanitizeRule::QueryOperators`]: `$`로 시작하거나 `.`이 포함된 키를 제거 (MongoDB 연산자 주입 방지)
//! - [`SanitizeRule::Xss`]: 문자열 값의 `<`, `>`를 HTML 엔티티로 치환
//!
//! 본문은 최대 `limit` 바이트까지만 읽으며, 넘으면 413 `PayloadTooLarge`로 거절합니다.
//! JSON이 아닌 본문이나 파싱할 수 없는 JSON은 그대로 다음 단계에 넘깁니다.

use std::future::{ready, Ready};
use std::rc::Rc;

use actix_web::body::EitherBody;
use actix_web::dev::{self, forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{self, HeaderValue};
use actix_web::http::Uri;
use actix_web::web::{Bytes, BytesMut};
use actix_web::{Error, HttpMessage};
use futures_util::future::LocalBoxFuture;
use futures_util::StreamExt;
use serde_json::{Map, Value};

use crate::core::errors::AppError;
use crate::utils::string_utils::{escape_html, is_operator_key};

pub const PAYLOAD_TOO_LARGE_MESSAGE: &str = "Request body is too large";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SanitizeRule {
    QueryOperators,
    Xss,
}

impl SanitizeRule {
    /// 키/값 쌍 목록에 규칙을 적용합니다.
    pub fn apply_pairs(self, pairs: Vec<(String, String)>) -> Vec<(String, String)> {
        match self {
            SanitizeRule::QueryOperators => pairs
                .into_iter()
                .filter(|(key, _)| !is_operator_key(key))
                .collect(),
            SanitizeRule::Xss => pairs
                .into_iter()
                .map(|(key, value)| {
                    let value = escape_html(&value).into_owned();
                    (key, value)
                })
                .collect(),
        }
    }

    /// JSON 값에 재귀적으로 규칙을 적용합니다.
    pub fn apply_json(self, value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let cleaned: Map<String, Value> = map
                    .into_iter()
                    .filter(|(key, _)| self != SanitizeRule::QueryOperators || !is_operator_key(key))
                    .map(|(key, inner)| (key, self.apply_json(inner)))
                    .collect();
                Value::Object(cleaned)
            }
            Value::Array(items) => Value::Array(items.into_iter().map(|v| self.apply_json(v)).collect()),
            Value::String(s) if self == SanitizeRule::Xss => Value::String(escape_html(&s).into_owned()),
            other => other,
        }
    }
}

/// 새니타이징 미들웨어
pub struct Sanitize {
    rule: SanitizeRule,
    limit: usize,
}

impl Sanitize {
    pub fn new(rule: SanitizeRule, limit: usize) -> Self {
        Self { rule, limit }
    }

    pub fn query_operators(limit: usize) -> Self {
        Self::new(SanitizeRule::QueryOperators, limit)
    }

    pub fn xss(limit: usize) -> Self {
        Self::new(SanitizeRule::Xss, limit)
    }
}

impl<S, B> Transform<S, ServiceRequest> for Sanitize
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = SanitizeService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SanitizeService {
            service: Rc::new(service),
            rule: self.rule,
            limit: self.limit,
        }))
    }
}

pub struct SanitizeService<S> {
    service: Rc<S>,
    rule: SanitizeRule,
    limit: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    Json,
    Form,
}

impl<S, B> Service<ServiceRequest> for SanitizeService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let rule = self.rule;
        let limit = self.limit;

        Box::pin(async move {
            if !req.query_string().is_empty() {
                let pairs: Vec<(String, String)> = url::form_urlencoded::parse(req.query_string().as_bytes())
                    .into_owned()
                    .collect();
                replace_query(&mut req, &rule.apply_pairs(pairs));
            }

            if let Some(kind) = body_kind(&req) {
                let raw = match read_body(&mut req, limit).await {
                    Ok(raw) => raw,
                    Err(err) => return Ok(req.error_response(err).map_into_right_body()),
                };
                let cleaned = sanitize_body(rule, kind, raw);
                replace_body(&mut req, cleaned);
            }

            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}

fn body_kind(req: &ServiceRequest) -> Option<BodyKind> {
    let content_type = req.content_type().to_ascii_lowercase();
    if content_type == "application/json" || content_type.ends_with("+json") {
        Some(BodyKind::Json)
    } else if content_type == "application/x-www-form-urlencoded" {
        Some(BodyKind::Form)
    } else {
        None
    }
}

/// 본문을 `limit` 바이트까지 읽습니다.
async fn read_body(req: &mut ServiceRequest, limit: usize) -> Result<Bytes, AppError> {
    let too_large = || AppError::PayloadTooLarge(PAYLOAD_TOO_LARGE_MESSAGE.to_string());

    let declared = req
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared.is_some_and(|len| len > limit) {
        return Err(too_large());
    }

    let mut payload = req.take_payload();
    let mut body = BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| AppError::ValidationError(format!("Invalid request body: {}", e)))?;
        if body.len() + chunk.len() > limit {
            return Err(too_large());
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body.freeze())
}

fn sanitize_body(rule: SanitizeRule, kind: BodyKind, raw: Bytes) -> Bytes {
    if raw.is_empty() {
        return raw;
    }

    match kind {
        BodyKind::Json => match serde_json::from_slice::<Value>(&raw) {
            Ok(value) => match serde_json::to_vec(&rule.apply_json(value)) {
                Ok(encoded) => Bytes::from(encoded),
                Err(_) => raw,
            },
            // 파싱 에러는 Json 추출기가 보고함
            Err(_) => raw,
        },
        BodyKind::Form => {
            let pairs: Vec<(String, String)> = url::form_urlencoded::parse(&raw).into_owned().collect();
            Bytes::from(encode_pairs(&rule.apply_pairs(pairs)))
        }
    }
}

fn replace_body(req: &mut ServiceRequest, body: Bytes) {
    req.headers_mut()
        .insert(header::CONTENT_LENGTH, HeaderValue::from(body.len()));

    let (_, mut payload) = actix_http::h1::Payload::create(true);
    payload.unread_data(body);
    req.set_payload(dev::Payload::from(payload));
}

pub(crate) fn encode_pairs(pairs: &[(String, String)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

/// 요청 URI의 쿼리 부분을 다시 씁니다. 경로는 바뀌지 않습니다.
pub(crate) fn replace_query(req: &mut ServiceRequest, pairs: &[(String, String)]) {
    let query = encode_pairs(pairs);
    let path = req.path().to_string();
    let rebuilt = if query.is_empty() {
        path
    } else {
        format!("{}?{}", path, query)
    };

    match rebuilt.parse::<Uri>() {
        Ok(uri) => req.head_mut().uri = uri,
        Err(e) => log::warn!("쿼리 재작성 실패: {}", e),
    }
}
