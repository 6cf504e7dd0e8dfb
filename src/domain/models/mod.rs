//! # Domain Models Module
//!
//! 저장되지 않는 도메인 모델입니다.
//!
//! - [`auth`] - 요청에 붙는 인증 사용자 정보
//! - [`identity`] - 외부 아이덴티티 프로바이더의 계정 표현

pub mod auth;
pub mod identity;

pub use auth::*;
pub use identity::*;
