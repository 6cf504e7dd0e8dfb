//! # Action Logger
//!
//! 요청 단위 "누가 무엇을 했는지" 이벤트를 비동기로 기록합니다.
//!
//! 핸들러는 [`ActionLogger::log_request`]로 이벤트를 채널에 넣고 바로 응답을
//! 계속 만듭니다. 저장은 백그라운드 태스크가 하나씩 처리하며, 실패는
//! `log::error!`로만 남고 클라이언트에게 전달되지 않습니다.
//!
//! ```text
//! handler ──try_send──► [mpsc, 1024] ──► persist_loop ──► ActionLogRepository
//!                        (가득 차면 버림)        (실패 시 log::error!)
//! ```

use std::sync::Arc;

use actix_web::{HttpMessage, HttpRequest};
use mongodb::bson::{self, oid::ObjectId, Document};
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::mpsc;

use crate::domain::entities::analytics::ActionLog;
use crate::domain::models::auth::AuthenticatedUser;
use crate::query::QueryParams;
use crate::repositories::analytics::ActionLogRepository;

/// 채널 용량
const CHANNEL_CAPACITY: usize = 1024;

/// 값이 가려지는 키 (소문자 부분 일치)
const REDACTED_KEYS: &[&str] = &["password", "secret", "token"];
const REDACTED: &str = "[REDACTED]";

/// 저장 대기 중인 액션 이벤트
#[derive(Debug, Clone, PartialEq)]
pub struct ActionEvent {
    pub action: String,
    pub request_user: Option<ObjectId>,
    pub payload: Value,
}

/// 비동기 액션 로거
#[derive(Clone)]
pub struct ActionLogger {
    tx: mpsc::Sender<ActionEvent>,
}

impl ActionLogger {
    /// 로거를 만들고 저장 태스크를 띄웁니다. tokio 런타임 안에서 호출해야 합니다.
    pub fn spawn(repository: Arc<dyn ActionLogRepository>) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        tokio::spawn(persist_loop(repository, rx));
        Self { tx }
    }

    /// 요청 본문 없이 경로 파라미터와 쿼리만 기록합니다.
    pub fn log_request(&self, req: &HttpRequest, action: &str) {
        self.record(build_event(req, None, action));
    }

    /// 역직렬화된 요청 본문까지 함께 기록합니다.
    pub fn log_request_with_body<B: Serialize>(&self, req: &HttpRequest, body: &B, action: &str) {
        let body = match serde_json::to_value(body) {
            Ok(value) => Some(value),
            Err(e) => {
                log::error!("❌ 액션 로그 본문 직렬화 실패 ({}): {}", action, e);
                None
            }
        };
        self.record(build_event(req, body, action));
    }

    /// 이벤트를 큐에 넣습니다. 블로킹하지 않으며 실패해도 호출자에게 알리지 않습니다.
    pub fn record(&self, event: ActionEvent) {
        if let Err(e) = self.tx.try_send(event) {
            log::error!("❌ 액션 로그 큐 적재 실패: {}", e);
        }
    }
}

/// 요청에서 액션 이벤트를 만듭니다.
///
/// payload는 `{body, params, query}` 스냅샷이며 비밀번호류 값은 가려집니다.
pub fn build_event(req: &HttpRequest, body: Option<Value>, action: &str) -> ActionEvent {
    let request_user = req
        .extensions()
        .get::<AuthenticatedUser>()
        .and_then(|user| user.app_user_id.as_deref())
        .and_then(|id| ObjectId::parse_str(id).ok());

    let params: Map<String, Value> = req
        .match_info()
        .iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
        .collect();

    let mut query = Map::new();
    for (key, value) in QueryParams::parse(req.query_string()).pairs() {
        match query.get_mut(key) {
            Some(Value::Array(values)) => values.push(Value::String(value.clone())),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, Value::String(value.clone())]);
            }
            None => {
                query.insert(key.clone(), Value::String(value.clone()));
            }
        }
    }

    let mut payload = serde_json::json!({
        "body": body.unwrap_or_else(|| Value::Object(Map::new())),
        "params": params,
        "query": query,
    });
    redact(&mut payload);

    ActionEvent {
        action: action.to_string(),
        request_user,
        payload,
    }
}

/// 비밀번호류 키의 값을 `[REDACTED]`로 바꿉니다. 중첩 객체와 배열도 처리합니다.
pub fn redact(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, inner) in map.iter_mut() {
                let lowered = key.to_lowercase();
                if REDACTED_KEYS.iter().any(|k| lowered.contains(k)) {
                    *inner = Value::String(REDACTED.to_string());
                } else {
                    redact(inner);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact),
        _ => {}
    }
}

async fn persist_loop(
    repository: Arc<dyn ActionLogRepository>,
    mut rx: mpsc::Receiver<ActionEvent>,
) {
    while let Some(event) = rx.recv().await {
        let action = event.action.clone();
        if let Err(e) = persist(repository.as_ref(), event).await {
            log::error!("❌ 액션 로그 저장 실패 ({}): {}", action, e);
        }
    }
    log::debug!("액션 로거 종료");
}

async fn persist(
    repository: &dyn ActionLogRepository,
    event: ActionEvent,
) -> crate::core::errors::AppResult<()> {
    let payload: Document = match bson::to_bson(&event.payload) {
        Ok(bson::Bson::Document(doc)) => doc,
        Ok(_) => Document::new(),
        Err(e) => {
            return Err(crate::core::errors::AppError::InternalError(format!(
                "payload 변환 실패: {}",
                e
            )))
        }
    };

    let entry = ActionLog::new(event.action, event.request_user, payload)?;
    repository.insert(entry).await?;
    Ok(())
}
