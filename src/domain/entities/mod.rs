//! # Domain Entities Module
//!
//! MongoDB 컬렉션과 1:1로 대응하는 문서 구조체들입니다.
//!
//! | 엔티티 | 컬렉션 |
//! |--------|--------|
//! | [`users::User`] | `users` |
//! | [`analytics::ActionLog`] | `analyticslogs` |
//!
//! 모든 엔티티는 `_id`를 `Option<ObjectId>`로 두어 삽입 전에는 비워 두고,
//! 필드 이름은 camelCase로 저장합니다.

pub mod analytics;
pub mod users;
