//! 사용자 관리 서비스 모듈
//!
//! 프로필 CRUD와 아이덴티티 계정 작업(삭제, 이메일 변경, 비밀번호 재설정)을
//! 묶어 제공합니다.

pub mod user_service;

pub use user_service::UserService;
