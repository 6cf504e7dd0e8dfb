//! 액션 로그 조회 서비스

use std::sync::Arc;

use serde_json::Value;

use crate::core::errors::AppResult;
use crate::domain::entities::analytics::ActionLog;
use crate::query::{ApiFeatures, FindQuery, QueryParams};
use crate::repositories::analytics::ActionLogRepository;
use crate::utils::document::document_to_json;

pub struct AnalyticsService {
    logs: Arc<dyn ActionLogRepository>,
}

impl AnalyticsService {
    pub fn new(logs: Arc<dyn ActionLogRepository>) -> Self {
        Self { logs }
    }

    /// 쿼리 파라미터로 필터/정렬/projection/페이지를 적용해 로그를 조회합니다.
    pub async fn list_logs(&self, params: QueryParams) -> AppResult<Vec<Value>> {
        let query = ApiFeatures::new(FindQuery::default(), params, ActionLog::FIELD_TYPES)
            .filter()
            .sort()
            .limit_fields()
            .paginate()
            .into_query();

        let docs = self.logs.find(query).await?;
        log::debug!("액션 로그 {}건 조회", docs.len());

        Ok(docs.into_iter().map(document_to_json).collect())
    }
}
