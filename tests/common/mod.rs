//! 통합 테스트 공용 도구
//!
//! MongoDB와 Auth0 없이 앱 전체를 조립할 수 있도록 메모리 저장소와
//! 가짜 아이덴티티 프로바이더를 제공합니다.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::{encode, EncodingKey, Header};
use mongodb::bson::{self, oid::ObjectId, Document};
use parking_lot::Mutex;
use serde_json::Value;

use users_ms::config::{
    AppConfig, DatabaseConfig, Environment, IdentityProviderConfig, JwtConfig, PipelineConfig,
    ServerConfig,
};
use users_ms::core::errors::{AppError, AppResult};
use users_ms::core::state::AppState;
use users_ms::domain::entities::analytics::ActionLog;
use users_ms::domain::entities::users::{User, UserStatus};
use users_ms::domain::models::identity::IdentityUser;
use users_ms::query::FindQuery;
use users_ms::repositories::analytics::ActionLogRepository;
use users_ms::repositories::parse_object_id;
use users_ms::repositories::users::UserRepository;
use users_ms::services::identity::IdentityProvider;

pub const JWT_SECRET: &str = "integration-secret";

/// 메모리 사용자 저장소. 마지막 find 요청을 기록합니다.
#[derive(Default)]
pub struct MemoryUsers {
    pub users: Mutex<Vec<User>>,
    pub last_query: Mutex<Option<FindQuery>>,
}

impl MemoryUsers {
    pub fn seed(&self, count: usize) -> Vec<ObjectId> {
        let mut users = self.users.lock();
        (0..count)
            .map(|i| {
                let mut user = User::new(
                    format!("First{}", i),
                    format!("Last{}", i),
                    format!("user_{}", i),
                );
                let id = ObjectId::new();
                user.id = Some(id);
                users.push(user);
                id
            })
            .collect()
    }
}

#[async_trait]
impl UserRepository for MemoryUsers {
    async fn create(&self, mut user: User) -> AppResult<User> {
        let mut users = self.users.lock();
        if users.iter().any(|u| u.username == user.username) {
            return Err(AppError::ConflictError(format!(
                "Duplicate field value: {}. Please use another value!",
                user.username
            )));
        }
        user.id = Some(ObjectId::new());
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        let oid = parse_object_id(id)?;
        Ok(self.users.lock().iter().find(|u| u.id == Some(oid)).cloned())
    }

    async fn update(&self, id: &str, set: Document) -> AppResult<Option<User>> {
        let oid = parse_object_id(id)?;
        let mut users = self.users.lock();
        let Some(user) = users.iter_mut().find(|u| u.id == Some(oid)) else {
            return Ok(None);
        };

        if let Ok(name) = set.get_str("firstName") {
            user.first_name = name.to_string();
        }
        if let Ok(name) = set.get_str("lastName") {
            user.last_name = name.to_string();
        }
        if let Ok(username) = set.get_str("username") {
            user.username = username.to_string();
        }
        if matches!(set.get_str("status"), Ok("closed")) {
            user.status = UserStatus::Closed;
        }
        Ok(Some(user.clone()))
    }

    async fn find(&self, query: FindQuery) -> AppResult<Vec<Document>> {
        let skip = query.options.skip.unwrap_or(0) as usize;
        let limit = query.options.limit.unwrap_or(i64::MAX).max(0) as usize;

        let docs = self
            .users
            .lock()
            .iter()
            .skip(skip)
            .take(limit)
            .filter_map(|u| bson::to_document(u).ok())
            .collect();

        *self.last_query.lock() = Some(query);
        Ok(docs)
    }
}

/// 저장된 로그를 보관하는 저장소
#[derive(Default)]
pub struct MemoryActionLogs {
    pub entries: Mutex<Vec<ActionLog>>,
}

impl MemoryActionLogs {
    pub fn actions(&self) -> Vec<String> {
        self.entries.lock().iter().map(|e| e.action.clone()).collect()
    }
}

#[async_trait]
impl ActionLogRepository for MemoryActionLogs {
    async fn insert(&self, mut entry: ActionLog) -> AppResult<ActionLog> {
        entry.id = Some(ObjectId::new());
        self.entries.lock().push(entry.clone());
        Ok(entry)
    }

    async fn find(&self, _query: FindQuery) -> AppResult<Vec<Document>> {
        Ok(self
            .entries
            .lock()
            .iter()
            .filter_map(|e| bson::to_document(e).ok())
            .collect())
    }
}

/// 항상 실패하는 로그 저장소
pub struct FailingActionLogs;

#[async_trait]
impl ActionLogRepository for FailingActionLogs {
    async fn insert(&self, _entry: ActionLog) -> AppResult<ActionLog> {
        Err(AppError::DatabaseError("analytics store is down".into()))
    }

    async fn find(&self, _query: FindQuery) -> AppResult<Vec<Document>> {
        Err(AppError::DatabaseError("analytics store is down".into()))
    }
}

/// 호출을 문자열로 기록하는 가짜 아이덴티티 프로바이더
#[derive(Default)]
pub struct FakeIdentity {
    pub accounts: Mutex<Vec<IdentityUser>>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeIdentity {
    pub fn link(&self, identity_id: &str, app_user_id: &ObjectId) {
        self.accounts.lock().push(IdentityUser {
            user_id: identity_id.to_string(),
            email: None,
            app_metadata: Some(serde_json::json!({ "appUserId": app_user_id.to_hex() })),
        });
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn update_app_metadata(&self, identity_id: &str, metadata: Value) -> AppResult<()> {
        self.calls.lock().push(format!(
            "metadata:{}:{}",
            identity_id,
            metadata["appUserId"].as_str().unwrap_or("")
        ));
        Ok(())
    }

    async fn change_email(&self, identity_id: &str, new_email: &str) -> AppResult<()> {
        self.calls.lock().push(format!("email:{}:{}", identity_id, new_email));
        Ok(())
    }

    async fn delete_user(&self, identity_id: &str) -> AppResult<()> {
        self.calls.lock().push(format!("delete:{}", identity_id));
        Ok(())
    }

    async fn send_reset_password_email(&self, email: &str) -> AppResult<()> {
        self.calls.lock().push(format!("reset:{}", email));
        Ok(())
    }

    async fn find_by_app_user_id(&self, app_user_id: &str) -> AppResult<Option<IdentityUser>> {
        Ok(self
            .accounts
            .lock()
            .iter()
            .find(|a| a.app_user_id() == Some(app_user_id))
            .cloned())
    }
}

pub fn test_config(environment: Environment) -> AppConfig {
    AppConfig {
        environment,
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            workers: 1,
        },
        database: DatabaseConfig {
            uri: "mongodb://localhost:27017".to_string(),
            database_name: "users_ms_test".to_string(),
        },
        pipeline: PipelineConfig::default(),
        identity: IdentityProviderConfig {
            domain: "tenant.example.com".to_string(),
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            audience: "https://tenant.example.com/api/v2/".to_string(),
            db_connection: "Username-Password-Authentication".to_string(),
        },
        jwt: JwtConfig {
            secret: JWT_SECRET.to_string(),
            audience: None,
            issuer: None,
            app_id_claim: "appId".to_string(),
        },
    }
}

/// 앱 조립에 쓰인 협력 객체 묶음
pub struct TestContext {
    pub state: AppState,
    pub users: Arc<MemoryUsers>,
    pub logs: Arc<MemoryActionLogs>,
    pub identity: Arc<FakeIdentity>,
}

impl TestContext {
    pub fn new(config: AppConfig) -> Self {
        let users = Arc::new(MemoryUsers::default());
        let logs = Arc::new(MemoryActionLogs::default());
        let identity = Arc::new(FakeIdentity::default());

        let state = AppState::new(config, users.clone(), logs.clone(), identity.clone());

        Self {
            state,
            users,
            logs,
            identity,
        }
    }

    /// 백그라운드 로거가 `count`개 이상 저장할 때까지 기다립니다.
    pub async fn wait_for_logs(&self, count: usize) -> Vec<String> {
        for _ in 0..100 {
            if self.logs.entries.lock().len() >= count {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.logs.actions()
    }
}

/// 한 시간 뒤 만료되는 HS256 토큰
pub fn bearer(sub: &str, app_user_id: Option<&ObjectId>) -> String {
    let mut claims = serde_json::json!({
        "sub": sub,
        "exp": chrono::Utc::now().timestamp() + 3600,
    });
    if let Some(id) = app_user_id {
        claims["appId"] = Value::String(id.to_hex());
    }

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap();
    format!("Bearer {}", token)
}
