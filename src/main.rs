//! 사용자 관리 서비스 메인 애플리케이션
//!
//! 설정을 읽고 MongoDB와 아이덴티티 프로바이더 클라이언트를 준비한 뒤
//! Actix-web HTTP 서버를 구동합니다.

use std::sync::Arc;
use std::time::Duration;

use actix_web::HttpServer;
use dotenv::dotenv;
use log::{error, info};

use users_ms::app::create_app;
use users_ms::config::{AppConfig, Environment};
use users_ms::core::errors::AppResult;
use users_ms::core::state::AppState;
use users_ms::db::Database;
use users_ms::logging::init_logging;
use users_ms::middlewares::rate_limit::spawn_cleanup;
use users_ms::repositories::analytics::MongoActionLogRepository;
use users_ms::repositories::users::MongoUserRepository;
use users_ms::services::identity::Auth0Client;

/// Rate limit 항목 정리 주기
const RATE_LIMIT_CLEANUP_INTERVAL: Duration = Duration::from_secs(10 * 60);

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // 로거 초기화 전이라 결과는 나중에 기록
    let profile_message = load_env_file();
    init_logging(Environment::current());
    info!("{}", profile_message);

    let config = AppConfig::from_env();

    info!("🚀 사용자 관리 서비스 시작중... ({:?})", config.environment);

    let state = match initialize_state(config).await {
        Ok(state) => state,
        Err(e) => {
            error!("❌ 서비스 초기화 실패: {}", e);
            return Err(std::io::Error::other(e.to_string()));
        }
    };

    info!("✅ 모든 서비스가 성공적으로 초기화되었습니다!");

    start_http_server(state).await
}

/// 저장소와 외부 클라이언트를 연결하고 공유 상태를 조립합니다.
async fn initialize_state(config: AppConfig) -> AppResult<AppState> {
    info!("📡 데이터베이스 연결 중...");
    let database = Arc::new(Database::connect(&config.database).await?);

    let users = MongoUserRepository::new(database.clone());
    users.create_indexes().await?;

    let action_logs = MongoActionLogRepository::new(database);
    action_logs.create_indexes().await?;

    let identity = Auth0Client::new(config.identity.clone());

    let state = AppState::new(
        config,
        Arc::new(users),
        Arc::new(action_logs),
        Arc::new(identity),
    );

    spawn_cleanup(state.rate_limiter.clone(), RATE_LIMIT_CLEANUP_INTERVAL);

    Ok(state)
}

/// HTTP 서버를 구성하고 실행합니다
async fn start_http_server(state: AppState) -> std::io::Result<()> {
    let bind_address = state.config.server.bind_address();
    let workers = state.config.server.workers;
    let prefix = state.config.pipeline.version_prefix();

    info!("🌐 서버가 http://{} 에서 실행중입니다", bind_address);
    info!("📍 Health check: http://{}/health", bind_address);
    info!("📍 API: http://{}/api{}", bind_address, prefix);
    info!(
        "🛡️ Rate Limiting 활성화: IP당 시간당 {}요청",
        state.config.pipeline.max_requests_per_hour
    );

    HttpServer::new(move || create_app(state.clone()))
        .bind(bind_address)?
        .workers(workers)
        .run()
        .await
}

/// 환경별 설정 파일을 로드합니다
///
/// * `PROFILE=dev` - .env.dev 파일 로드 (기본값)
/// * `PROFILE=prod` - .env.prod 파일 로드
/// * 기타 - 기본 .env 파일 로드
fn load_env_file() -> String {
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "dev".to_string());

    let result = match profile.as_str() {
        "prod" => dotenv::from_filename(".env.prod").map(|_| ".env.prod 파일 로드 됨"),
        "dev" => dotenv::from_filename(".env.dev").map(|_| ".env.dev 파일 로드 됨"),
        _ => dotenv().map(|_| "기본 .env 파일 로드"),
    };

    match result {
        Ok(message) => format!("Current profile: {} ({})", profile, message),
        Err(e) => format!("Current profile: {} (설정 파일 로드 실패: {})", profile, e),
    }
}
