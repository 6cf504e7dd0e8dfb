//! 액션 로그 리포지토리
//!
//! 로그는 추가 전용입니다. 수정/삭제 연산은 제공하지 않습니다.

use std::sync::Arc;

use async_trait::async_trait;
use mongodb::bson::{doc, Document};
use mongodb::options::IndexOptions;
use mongodb::{Collection, IndexModel};

use crate::repositories::find_documents;
use crate::core::errors::{AppError, AppResult};
use crate::db::Database;
use crate::domain::entities::analytics::ActionLog;
use crate::query::FindQuery;

pub const ACTION_LOGS_COLLECTION: &str = "analyticslogs";

/// 액션 로그 저장소 추상화
#[async_trait]
pub trait ActionLogRepository: Send + Sync {
    async fn insert(&self, entry: ActionLog) -> AppResult<ActionLog>;

    async fn find(&self, query: FindQuery) -> AppResult<Vec<Document>>;
}

pub struct MongoActionLogRepository {
    db: Arc<Database>,
}

impl MongoActionLogRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    fn collection(&self) -> Collection<ActionLog> {
        self.db
            .get_database()
            .collection::<ActionLog>(ACTION_LOGS_COLLECTION)
    }

    pub async fn create_indexes(&self) -> AppResult<()> {
        let created_at_index = IndexModel::builder()
            .keys(doc! { "createdAt": -1 })
            .options(
                IndexOptions::builder()
                    .name("created_at_desc".to_string())
                    .build(),
            )
            .build();

        let action_index = IndexModel::builder()
            .keys(doc! { "action": 1, "createdAt": -1 })
            .options(IndexOptions::builder().name("action_created_at".to_string()).build())
            .build();

        self.collection()
            .create_indexes([created_at_index, action_index])
            .await?;

        log::info!("✅ analyticslogs 인덱스 생성 완료");
        Ok(())
    }
}

#[async_trait]
impl ActionLogRepository for MongoActionLogRepository {
    async fn insert(&self, mut entry: ActionLog) -> AppResult<ActionLog> {
        let result = self.collection().insert_one(&entry).await?;

        entry.id = Some(result.inserted_id.as_object_id().ok_or_else(|| {
            AppError::InternalError("insert_one returned a non-ObjectId _id".to_string())
        })?);

        Ok(entry)
    }

    async fn find(&self, query: FindQuery) -> AppResult<Vec<Document>> {
        let collection = self
            .db
            .get_database()
            .collection::<Document>(ACTION_LOGS_COLLECTION);

        find_documents(&collection, query).await
    }
}
