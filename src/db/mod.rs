//! # Database Module
//!
//! MongoDB 연결을 관리합니다. 시작 시 한 번 연결하고 ping으로 상태를 확인한 뒤
//! 리포지토리들이 같은 클라이언트(내부 커넥션 풀)를 공유합니다.

use log::info;
use mongodb::{options::ClientOptions, Client};

use crate::config::DatabaseConfig;
use crate::core::errors::AppResult;

/// MongoDB 애플리케이션 이름 (서버 측 모니터링에 표시됨)
const APP_NAME: &str = "users_ms";

#[derive(Clone)]
pub struct Database {
    client: Client,
    database_name: String,
}

impl Database {
    /// 새 MongoDB 데이터베이스 연결을 생성합니다.
    ///
    /// 연결 직후 `ping` 명령으로 서버 도달 여부를 확인합니다.
    ///
    /// ```rust,ignore
    /// let database = Database::connect(&config.database).await?;
    /// ```
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        let mut client_options = ClientOptions::parse(&config.uri).await?;
        client_options.app_name = Some(APP_NAME.to_string());

        let client = Client::with_options(client_options)?;

        client
            .database(&config.database_name)
            .run_command(mongodb::bson::doc! { "ping": 1 })
            .await?;

        info!("✅ MongoDB 연결 성공: {}", config.database_name);

        Ok(Self {
            client,
            database_name: config.database_name.clone(),
        })
    }

    /// 리포지토리가 컬렉션에 접근할 때 사용하는 데이터베이스 핸들
    pub fn get_database(&self) -> mongodb::Database {
        self.client.database(&self.database_name)
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn database_name(&self) -> &str {
        &self.database_name
    }
}
