//! # Configuration Module
//!
//! 서비스 설정을 관리하는 모듈입니다.
//!
//! 모든 설정값은 시작 시점에 [`AppConfig::from_env`]로 한 번만 읽혀
//! 애플리케이션 구성 함수에 명시적으로 전달됩니다. 요청 처리 중에
//! 환경 변수를 다시 읽지 않습니다.
//!
//! ## 모듈 구성
//!
//! - [`data_config`] - 실행 환경, 서버, 데이터베이스, 요청 파이프라인 설정
//! - [`auth_config`] - 아이덴티티 프로바이더, JWT 검증 설정
//!
//! ## 사용 예제
//!
//! ```rust,ignore
//! use users_ms::config::AppConfig;
//!
//! let config = AppConfig::from_env();
//! println!("Server will bind to {}", config.server.bind_address());
//! println!("API prefix: /api{}", config.pipeline.version_prefix());
//! ```

pub mod auth_config;
pub mod data_config;

pub use auth_config::*;
pub use data_config::*;

/// 시작 시점에 한 번 구성되는 전체 애플리케이션 설정
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub pipeline: PipelineConfig,
    pub identity: IdentityProviderConfig,
    pub jwt: JwtConfig,
}

impl AppConfig {
    /// 환경 변수(및 `.env` 파일)에서 전체 설정을 읽습니다.
    pub fn from_env() -> Self {
        Self {
            environment: Environment::current(),
            server: ServerConfig::from_env(),
            database: DatabaseConfig::from_env(),
            pipeline: PipelineConfig::from_env(),
            identity: IdentityProviderConfig::from_env(),
            jwt: JwtConfig::from_env(),
        }
    }
}
