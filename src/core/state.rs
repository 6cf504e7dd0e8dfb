//! 애플리케이션 공유 상태
//!
//! 시작 시점에 한 번 조립되어 `web::Data<AppState>`로 모든 워커에 공유됩니다.
//! 서비스와 설정은 전역 싱글톤 대신 이 구조체를 통해서만 전달됩니다.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::middlewares::rate_limit::RateLimiter;
use crate::repositories::analytics::ActionLogRepository;
use crate::repositories::users::UserRepository;
use crate::services::analytics::{ActionLogger, AnalyticsService};
use crate::services::auth::TokenService;
use crate::services::identity::IdentityProvider;
use crate::services::users::UserService;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub user_service: Arc<UserService>,
    pub analytics_service: Arc<AnalyticsService>,
    pub action_logger: ActionLogger,
    pub token_service: Arc<TokenService>,
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    /// 협력 객체로부터 상태를 조립합니다.
    ///
    /// 액션 로거의 저장 태스크가 여기서 시작되므로 tokio 런타임 안에서 호출해야 합니다.
    pub fn new(
        config: AppConfig,
        users: Arc<dyn UserRepository>,
        action_logs: Arc<dyn ActionLogRepository>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        let token_service = Arc::new(TokenService::new(&config.jwt));
        let rate_limiter = Arc::new(RateLimiter::per_hour(config.pipeline.max_requests_per_hour));

        Self {
            user_service: Arc::new(UserService::new(users, identity)),
            analytics_service: Arc::new(AnalyticsService::new(action_logs.clone())),
            action_logger: ActionLogger::spawn(action_logs),
            token_service,
            rate_limiter,
            config: Arc::new(config),
        }
    }
}
