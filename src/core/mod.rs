//! # Core Module
//!
//! - [`errors`] - 전역 에러 타입과 정규화된 에러 렌더링
//! - [`state`] - 핸들러와 미들웨어가 공유하는 애플리케이션 상태

pub mod errors;
pub mod state;

pub use errors::*;
pub use state::AppState;
