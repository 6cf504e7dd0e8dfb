//! JWT 인증 미들웨어
//!
//! ActixWeb 요청 파이프라인에서 Bearer 토큰을 검증하고 사용자 정보를 추출합니다.
//! 검증은 앱 데이터로 등록된 [`TokenService`](crate::services::auth::TokenService)가 담당합니다.

use std::future::{ready, Ready};
use std::rc::Rc;

use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    Error, Result,
};

use crate::middlewares::auth_inner::AuthMiddlewareService;

/// JWT 인증 미들웨어
///
/// 토큰이 없거나 유효하지 않으면 401 `AuthenticationError`로 거절하고,
/// 통과하면 [`AuthenticatedUser`](crate::domain::models::auth::AuthenticatedUser)를
/// request extensions에 넣습니다.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthMiddleware;

impl AuthMiddleware {
    /// 필수 인증 미들웨어 생성
    pub fn required() -> Self {
        Self
    }
}

/// ActixWeb Transform trait 구현
impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{web, App, HttpResponse};
    use jsonwebtoken::{encode, EncodingKey, Header};

    use crate::config::JwtConfig;
    use crate::domain::models::auth::AuthenticatedUser;
    use crate::services::auth::TokenService;

    fn jwt_config() -> JwtConfig {
        JwtConfig {
            secret: "middleware-secret".to_string(),
            audience: None,
            issuer: None,
            app_id_claim: "appId".to_string(),
        }
    }

    async fn whoami(user: AuthenticatedUser) -> HttpResponse {
        HttpResponse::Ok().body(user.sub)
    }

    fn token(sub: &str) -> String {
        encode(
            &Header::default(),
            &serde_json::json!({ "sub": sub, "exp": chrono::Utc::now().timestamp() + 600 }),
            &EncodingKey::from_secret(b"middleware-secret"),
        )
        .unwrap()
    }

    #[actix_web::test]
    async fn test_valid_token_reaches_handler() {
        let app = actix_web::test::init_service(
            App::new()
                .app_data(web::Data::new(TokenService::new(&jwt_config())))
                .service(
                    web::scope("")
                        .wrap(AuthMiddleware::required())
                        .route("/me", web::get().to(whoami)),
                ),
        )
        .await;

        let req = actix_web::test::TestRequest::get()
            .uri("/me")
            .insert_header(("Authorization", format!("Bearer {}", token("auth0|42"))))
            .to_request();
        let body = actix_web::test::call_and_read_body(&app, req).await;

        assert_eq!(body, "auth0|42");
    }

    #[actix_web::test]
    async fn test_missing_token_is_rejected() {
        let app = actix_web::test::init_service(
            App::new()
                .app_data(web::Data::new(TokenService::new(&jwt_config())))
                .service(
                    web::scope("")
                        .wrap(AuthMiddleware::required())
                        .route("/me", web::get().to(whoami)),
                ),
        )
        .await;

        let res = actix_web::test::call_service(&app, actix_web::test::TestRequest::get().uri("/me").to_request()).await;
        assert_eq!(res.status(), 401);
    }
}
