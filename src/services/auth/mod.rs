//! 인증 서비스 모듈
//!
//! 아이덴티티 프로바이더가 발급한 Bearer 토큰을 검증합니다.

pub mod token_service;

pub use token_service::*;
