//! 라우트 등록
//!
//! ```text
//! /health                      상태 확인
//! /api                         RateLimit → Sanitize($) → Sanitize(XSS) → HPP
//!   /v{N}/users                AuthMiddleware
//!   /v{N}/analytics            AuthMiddleware
//!   (그 외)                    404
//! /                            정적 파일 (STATIC_DIR 설정 시)
//! ```

use actix_files::Files;
use actix_web::web;
use serde_json::json;

use crate::config::PipelineConfig;
use crate::core::state::AppState;
use crate::handlers;
use crate::middlewares::{AuthMiddleware, ParameterPollution, RateLimit, Sanitize};

pub fn configure_all_routes(cfg: &mut web::ServiceConfig, state: &AppState) {
    let pipeline = &state.config.pipeline;

    // Health check endpoint
    cfg.service(health_check);

    // wrap은 나중에 등록한 것이 바깥쪽
    cfg.service(
        web::scope("/api")
            .wrap(ParameterPollution::new(pipeline.hpp_whitelist.clone()))
            .wrap(Sanitize::xss(pipeline.body_limit_bytes))
            .wrap(Sanitize::query_operators(pipeline.body_limit_bytes))
            .wrap(RateLimit::new(state.rate_limiter.clone()))
            .service(web::scope(&pipeline.version_prefix()).configure(configure_api_routes))
            .default_service(web::to(handlers::not_found)),
    );

    configure_static_files(cfg, pipeline);
}

fn configure_api_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .wrap(AuthMiddleware::required())
            .service(handlers::users::create_user)
            .service(handlers::users::get_all_users)
            .service(handlers::users::send_reset_password_email)
            .service(handlers::users::get_user)
            .service(handlers::users::replace_user)
            .service(handlers::users::update_user)
            .service(handlers::users::delete_user)
            .service(handlers::users::change_email),
    );

    cfg.service(
        web::scope("/analytics")
            .wrap(AuthMiddleware::required())
            .service(handlers::analytics::get_all_logs),
    );
}

fn configure_static_files(cfg: &mut web::ServiceConfig, pipeline: &PipelineConfig) {
    if let Some(dir) = &pipeline.static_dir {
        log::info!("📁 정적 파일 제공: {}", dir);
        cfg.service(
            Files::new("/", dir)
                .index_file("index.html")
                .default_handler(web::to(handlers::not_found)),
        );
    }
}

#[actix_web::get("/health")]
async fn health_check() -> actix_web::HttpResponse {
    actix_web::HttpResponse::Ok().json(json!({
        "status": "healthy",
        "service": "user-service",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
