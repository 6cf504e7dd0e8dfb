//! HTTP 파이프라인 통합 테스트
//!
//! `create_app`으로 실제 미들웨어 체인과 라우트를 조립하고
//! 메모리 저장소로 요청 단위 동작을 확인합니다.

mod common;

use std::sync::Arc;

use actix_web::http::header;
use actix_web::test;
use mongodb::bson::doc;
use serde_json::{json, Value};

use common::{bearer, test_config, FailingActionLogs, FakeIdentity, MemoryUsers, TestContext};
use users_ms::app::create_app;
use users_ms::config::Environment;
use users_ms::core::state::AppState;
use users_ms::domain::entities::users::UserStatus;
use users_ms::middlewares::rate_limit::RATE_LIMIT_MESSAGE;
use users_ms::services::auth::MISSING_TOKEN_MESSAGE;

#[actix_web::test]
async fn test_health_check_carries_security_headers() {
    let ctx = TestContext::new(test_config(Environment::Test));
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let res = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(res.status(), 200);
    assert_eq!(
        res.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );

    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "user-service");
}

#[actix_web::test]
async fn test_list_users_paginates_and_logs_action() {
    let ctx = TestContext::new(test_config(Environment::Test));
    ctx.users.seed(5);
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/users?page=2&limit=2")
        .insert_header((header::AUTHORIZATION, bearer("auth0|1", None)))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "success");
    assert_eq!(body["results"], 2);
    assert_eq!(body["data"][0]["username"], "user_2");

    let query = ctx.users.last_query.lock().clone().unwrap();
    assert_eq!(query.options.skip, Some(2));
    assert_eq!(query.options.limit, Some(2));
    assert_eq!(query.options.sort, Some(doc! { "createdAt": -1 }));

    let actions = ctx.wait_for_logs(1).await;
    assert_eq!(actions, vec!["user.find".to_string()]);
}

#[actix_web::test]
async fn test_trailing_slash_is_trimmed() {
    let ctx = TestContext::new(test_config(Environment::Test));
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/users/")
        .insert_header((header::AUTHORIZATION, bearer("auth0|1", None)))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), 200);
}

#[actix_web::test]
async fn test_missing_user_is_operational_404() {
    let ctx = TestContext::new(test_config(Environment::Production));
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/users/5f8d0d55b54764421b7156c3")
        .insert_header((header::AUTHORIZATION, bearer("auth0|1", None)))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), 404);

    let body: Value = test::read_body_json(res).await;
    assert_eq!(
        body,
        json!({ "status": "fail", "message": "No document found with that ID" })
    );
}

#[actix_web::test]
async fn test_malformed_id_is_rejected() {
    let ctx = TestContext::new(test_config(Environment::Production));
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/users/not-an-id")
        .insert_header((header::AUTHORIZATION, bearer("auth0|1", None)))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), 400);

    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["message"], "Invalid _id: not-an-id.");
}

#[actix_web::test]
async fn test_unknown_routes_return_404() {
    let ctx = TestContext::new(test_config(Environment::Production));
    let app = test::init_service(create_app(ctx.state.clone())).await;

    for uri in ["/api/v1/nothing", "/nowhere"] {
        let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(res.status(), 404);

        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["status"], "fail");
        assert_eq!(body["message"], format!("Can't find {} on this server!", uri));
    }
}

#[actix_web::test]
async fn test_missing_token_is_401() {
    let ctx = TestContext::new(test_config(Environment::Production));
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/v1/users").to_request(),
    )
    .await;
    assert_eq!(res.status(), 401);

    let body: Value = test::read_body_json(res).await;
    assert_eq!(body, json!({ "status": "fail", "message": MISSING_TOKEN_MESSAGE }));
}

fn failing_analytics_state(environment: Environment) -> AppState {
    AppState::new(
        test_config(environment),
        Arc::new(MemoryUsers::default()),
        Arc::new(FailingActionLogs),
        Arc::new(FakeIdentity::default()),
    )
}

#[actix_web::test]
async fn test_programming_errors_are_masked_in_production() {
    let app = test::init_service(create_app(failing_analytics_state(Environment::Production))).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/analytics")
        .insert_header((header::AUTHORIZATION, bearer("auth0|1", None)))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), 500);

    let body: Value = test::read_body_json(res).await;
    assert_eq!(
        body,
        json!({ "status": "error", "message": "Something went very wrong!" })
    );
}

#[actix_web::test]
async fn test_development_errors_include_diagnostics() {
    let app = test::init_service(create_app(failing_analytics_state(Environment::Development))).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/analytics")
        .insert_header((header::AUTHORIZATION, bearer("auth0|1", None)))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), 500);

    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["error"]["statusCode"], 500);
    assert!(body["stack"].is_string());
}

#[actix_web::test]
async fn test_failing_log_sink_does_not_affect_response() {
    let state = failing_analytics_state(Environment::Production);
    let app = test::init_service(create_app(state)).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/users")
        .insert_header((header::AUTHORIZATION, bearer("auth0|1", None)))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), 200);
}

#[actix_web::test]
async fn test_rate_limit_rejects_after_budget() {
    let mut config = test_config(Environment::Production);
    config.pipeline.max_requests_per_hour = 2;
    let ctx = TestContext::new(config);
    let app = test::init_service(create_app(ctx.state.clone())).await;

    for remaining in ["1", "0"] {
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/v1/nothing").to_request(),
        )
        .await;
        assert_eq!(res.status(), 404);
        assert_eq!(res.headers().get("x-ratelimit-remaining").unwrap(), remaining);
    }

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/v1/nothing").to_request(),
    )
    .await;
    assert_eq!(res.status(), 429);
    assert_eq!(res.headers().get("x-ratelimit-limit").unwrap(), "2");

    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["message"], RATE_LIMIT_MESSAGE);

    // /api 밖은 제한 대상이 아님
    let res = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(res.status(), 200);
}

#[actix_web::test]
async fn test_parameter_pollution_keeps_last_value() {
    let ctx = TestContext::new(test_config(Environment::Test));
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/users?sort=-createdAt&sort=username&role=user&role=admin")
        .insert_header((header::AUTHORIZATION, bearer("auth0|1", None)))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), 200);

    let query = ctx.users.last_query.lock().clone().unwrap();
    assert_eq!(query.options.sort, Some(doc! { "username": 1 }));
    // 화이트리스트 키는 반복이 유지되어 $in이 됨
    let role = query.filter.get_document("role").unwrap();
    assert!(role.contains_key("$in"));
}

#[actix_web::test]
async fn test_query_operator_keys_are_stripped() {
    let ctx = TestContext::new(test_config(Environment::Test));
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/users?%24where=1&role=admin")
        .insert_header((header::AUTHORIZATION, bearer("auth0|1", None)))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), 200);

    let query = ctx.users.last_query.lock().clone().unwrap();
    assert!(!query.filter.contains_key("$where"));
    assert!(query.filter.contains_key("role"));
}

#[actix_web::test]
async fn test_create_user_escapes_markup_and_links_identity() {
    let ctx = TestContext::new(test_config(Environment::Test));
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/users")
        .insert_header((header::AUTHORIZATION, bearer("auth0|new", None)))
        .set_json(json!({
            "firstName": "<b>Ada</b>",
            "lastName": "Lovelace",
            "username": "ada_l",
        }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), 201);

    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["firstName"], "&lt;b&gt;Ada&lt;/b&gt;");

    let id = body["data"]["_id"].as_str().unwrap().to_string();
    assert_eq!(ctx.identity.calls(), vec![format!("metadata:auth0|new:{}", id)]);

    let actions = ctx.wait_for_logs(1).await;
    assert_eq!(actions, vec!["user.create".to_string()]);
}

#[actix_web::test]
async fn test_invalid_json_body_is_validation_error() {
    let ctx = TestContext::new(test_config(Environment::Production));
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/users")
        .insert_header((header::AUTHORIZATION, bearer("auth0|new", None)))
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{ not json")
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), 400);

    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["status"], "fail");
}

#[actix_web::test]
async fn test_oversized_body_is_413() {
    let ctx = TestContext::new(test_config(Environment::Production));
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/users")
        .insert_header((header::AUTHORIZATION, bearer("auth0|new", None)))
        .set_json(json!({ "firstName": "a".repeat(11 * 1024) }))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), 413);
    assert!(ctx.users.users.lock().is_empty());
}

#[actix_web::test]
async fn test_delete_closes_account_and_keeps_profile() {
    let ctx = TestContext::new(test_config(Environment::Test));
    let id = ctx.users.seed(1)[0];
    ctx.identity.link("auth0|42", &id);
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/users/{}", id.to_hex()))
        .insert_header((header::AUTHORIZATION, bearer("auth0|admin", None)))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), 204);

    assert_eq!(ctx.identity.calls(), vec!["delete:auth0|42".to_string()]);
    let users = ctx.users.users.lock();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].status, UserStatus::Closed);
}

#[actix_web::test]
async fn test_change_own_email_uses_token_subject() {
    let ctx = TestContext::new(test_config(Environment::Test));
    let id = ctx.users.seed(1)[0];
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::patch()
        .uri(&format!("/api/v1/users/{}/email", id.to_hex()))
        .insert_header((header::AUTHORIZATION, bearer("auth0|self", Some(&id))))
        .set_json(json!({ "newEmail": "ada@example.com" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), 200);

    assert_eq!(
        ctx.identity.calls(),
        vec!["email:auth0|self:ada@example.com".to_string()]
    );
}

#[actix_web::test]
async fn test_numeric_looking_username_filter_stays_string() {
    let ctx = TestContext::new(test_config(Environment::Test));
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/users?username=12345&phone=612345678")
        .insert_header((header::AUTHORIZATION, bearer("auth0|1", None)))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), 200);

    let query = ctx.users.last_query.lock().clone().unwrap();
    assert_eq!(query.filter, doc! { "username": "12345", "phone": "612345678" });
}
