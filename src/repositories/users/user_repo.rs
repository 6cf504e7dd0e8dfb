//! # 사용자 리포지토리 구현
//!
//! `users` 컬렉션의 데이터 액세스 계층입니다.
//! 수정은 `find_one_and_update`로 원자적으로 수행하고 갱신된 문서를 돌려받습니다.
//! 중복 username은 unique 인덱스가 막고, 드라이버 에러가 `ConflictError`로 변환됩니다.

use std::sync::Arc;

use async_trait::async_trait;
use mongodb::bson::{doc, Document};
use mongodb::options::{FindOneAndUpdateOptions, IndexOptions, ReturnDocument};
use mongodb::{Collection, IndexModel};

use crate::repositories::{find_documents, parse_object_id};
use crate::core::errors::{AppError, AppResult};
use crate::db::Database;
use crate::domain::entities::users::User;
use crate::query::FindQuery;

pub const USERS_COLLECTION: &str = "users";

/// 사용자 저장소 추상화
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// 새 사용자를 저장하고 `_id`가 채워진 엔티티를 반환합니다.
    async fn create(&self, user: User) -> AppResult<User>;

    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>>;

    /// `$set` 갱신 후 변경된 문서를 반환합니다. 없으면 `None`.
    async fn update(&self, id: &str, set: Document) -> AppResult<Option<User>>;

    /// 쿼리 빌더가 만든 요청으로 목록을 조회합니다.
    async fn find(&self, query: FindQuery) -> AppResult<Vec<Document>>;
}

pub struct MongoUserRepository {
    db: Arc<Database>,
}

impl MongoUserRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    fn collection(&self) -> Collection<User> {
        self.db.get_database().collection::<User>(USERS_COLLECTION)
    }

    fn raw_collection(&self) -> Collection<Document> {
        self.db.get_database().collection::<Document>(USERS_COLLECTION)
    }

    pub async fn create_indexes(&self) -> AppResult<()> {
        let username_index = IndexModel::builder()
            .keys(doc! { "username": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("username_unique".to_string())
                    .build(),
            )
            .build();

        let created_at_index = IndexModel::builder()
            .keys(doc! { "createdAt": -1 })
            .options(
                IndexOptions::builder()
                    .name("created_at_desc".to_string())
                    .build(),
            )
            .build();

        self.collection()
            .create_indexes([username_index, created_at_index])
            .await?;

        log::info!("✅ users 인덱스 생성 완료");
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn create(&self, mut user: User) -> AppResult<User> {
        let result = self.collection().insert_one(&user).await?;

        let id = result.inserted_id.as_object_id().ok_or_else(|| {
            AppError::InternalError("insert_one returned a non-ObjectId _id".to_string())
        })?;
        user.id = Some(id);

        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        let object_id = parse_object_id(id)?;

        Ok(self
            .collection()
            .find_one(doc! { "_id": object_id })
            .await?)
    }

    async fn update(&self, id: &str, set: Document) -> AppResult<Option<User>> {
        let object_id = parse_object_id(id)?;

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        Ok(self
            .collection()
            .find_one_and_update(doc! { "_id": object_id }, doc! { "$set": set })
            .with_options(options)
            .await?)
    }

    async fn find(&self, query: FindQuery) -> AppResult<Vec<Document>> {
        find_documents(&self.raw_collection(), query).await
    }
}
