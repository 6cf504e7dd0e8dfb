//! # Repository Layer
//!
//! MongoDB 컬렉션 접근을 담당합니다. 서비스는 trait(`UserRepository`,
//! `ActionLogRepository`)에만 의존하므로 테스트에서는 메모리 구현으로 대체할 수 있습니다.
//!
//! | 리포지토리 | 컬렉션 | 인덱스 |
//! |-----------|--------|--------|
//! | [`users::MongoUserRepository`] | `users` | `username` unique, `createdAt` desc |
//! | [`analytics::MongoActionLogRepository`] | `analyticslogs` | `createdAt` desc, `action` |

pub mod analytics;
pub mod users;

use futures_util::TryStreamExt;
use mongodb::bson::{oid::ObjectId, Document};
use mongodb::Collection;

use crate::core::errors::{AppError, AppResult};
use crate::query::FindQuery;

/// 경로 파라미터의 ID를 ObjectId로 변환합니다.
///
/// 형식이 맞지 않으면 `Invalid _id: {id}.` 메시지의 400 에러가 됩니다.
pub fn parse_object_id(id: &str) -> AppResult<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| AppError::MalformedInput(format!("Invalid _id: {}.", id)))
}

/// 빌드된 find 요청을 실행하고 projection이 적용된 원시 문서를 모읍니다.
pub(crate) async fn find_documents(
    collection: &Collection<Document>,
    query: FindQuery,
) -> AppResult<Vec<Document>> {
    let cursor = collection
        .find(query.filter)
        .with_options(query.options)
        .await?;

    Ok(cursor.try_collect().await?)
}
