//! # users_ms
//!
//! 사용자 관리 마이크로서비스입니다. 사용자 프로필을 MongoDB에 저장하고,
//! 계정(이메일, 비밀번호)은 외부 아이덴티티 프로바이더(Auth0)에 위임합니다.
//! 모든 작업은 비동기 액션 로그로 기록됩니다.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   Middlewares   │ ← CORS, 보안 헤더, Rate Limit, 새니타이징, HPP, 에러 정규화
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │    Handlers     │ ← 요청/응답 처리, 액션 로그 적재
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐      ┌──────────────────┐
//! │    Services     │ ───► │ IdentityProvider │ ← Auth0 Management API
//! └─────────────────┘      └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │  Repositories   │ ← users, analyticslogs
//! └─────────────────┘
//! ```
//!
//! 목록 엔드포인트는 [`query::ApiFeatures`]로 쿼리 파라미터를 MongoDB 요청으로 바꿉니다.

pub mod app;
pub mod config;
pub mod core;
pub mod db;
pub mod domain;
pub mod handlers;
pub mod logging;
pub mod middlewares;
pub mod query;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod utils;
