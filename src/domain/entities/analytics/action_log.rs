//! 액션 로그 엔티티
//!
//! "누가 무엇을 했는지" 기록하는 분석용 문서입니다. 한 번 저장되면
//! 수정되거나 삭제되지 않습니다.

use mongodb::bson::{oid::ObjectId, DateTime, Document};
use serde::{Deserialize, Serialize};

use crate::core::errors::{AppError, AppResult};
use crate::query::{FieldType, FieldTypes};

/// `analyticslogs` 컬렉션 문서
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionLog {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// 액션 이름 (예: `user.create`)
    pub action: String,
    /// 요청한 사용자의 애플리케이션 ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_user: Option<ObjectId>,
    /// 요청 스냅샷 (body, params, query)
    #[serde(default)]
    pub payload: Document,
    pub created_at: DateTime,
    pub updated_at: DateTime,
    #[serde(rename = "__v", default)]
    pub version: i32,
}

impl ActionLog {
    pub const FIELD_TYPES: FieldTypes = &[
        ("_id", FieldType::ObjectId),
        ("action", FieldType::String),
        ("requestUser", FieldType::ObjectId),
        ("createdAt", FieldType::Date),
        ("updatedAt", FieldType::Date),
        ("__v", FieldType::Number),
    ];

    /// 새 로그 엔트리를 만듭니다. 액션 이름은 비어 있을 수 없습니다.
    pub fn new(
        action: impl Into<String>,
        request_user: Option<ObjectId>,
        payload: Document,
    ) -> AppResult<Self> {
        let action = action.into();
        if action.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Invalid input data. Action name is required!".to_string(),
            ));
        }

        let now = DateTime::now();
        Ok(Self {
            id: None,
            action,
            request_user,
            payload,
            created_at: now,
            updated_at: now,
            version: 0,
        })
    }
}
