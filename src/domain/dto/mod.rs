//! # Data Transfer Objects (DTO) Module
//!
//! HTTP 계층에서 주고받는 요청/응답 구조체입니다. 엔티티와 분리되어
//! 클라이언트 계약이 저장 형식에 묶이지 않도록 합니다.

pub mod users;

pub use users::*;
