//! # Domain Layer Module
//!
//! ```text
//! Domain Layer (이 모듈)
//! ├── entities  - MongoDB 문서 (User, ActionLog)
//! ├── dto       - HTTP 요청/응답
//! └── models    - 인증 사용자, 아이덴티티 계정
//!      │
//!      ▼
//! Services → Repositories → MongoDB / Identity Provider
//! ```

pub mod dto;
pub mod entities;
pub mod models;
