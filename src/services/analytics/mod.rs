//! 분석용 액션 로그
//!
//! - [`action_logger`] - 요청 처리와 분리된 비동기 기록기
//! - [`analytics_service`] - 기록된 로그 조회

pub mod action_logger;
pub mod analytics_service;

pub use action_logger::{ActionEvent, ActionLogger};
pub use analytics_service::AnalyticsService;
