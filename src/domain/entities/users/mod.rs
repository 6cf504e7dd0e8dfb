//! Users Entity Module
//!
//! 사용자 프로필 엔티티와 그 값 타입(상태, 역할, 성별, 주소)을 정의합니다.

pub mod user;

pub use user::{Address, Gender, User, UserRole, UserStatus};
