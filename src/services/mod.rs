//! 비즈니스 로직을 담당하는 서비스 계층 모듈
//!
//! 서비스는 시작 시 한 번 생성되어 [`AppState`](crate::core::state::AppState)로
//! 핸들러에 전달됩니다.
//!
//! - [`users`] - 사용자 프로필 생명주기
//! - [`analytics`] - 액션 로그 기록과 조회
//! - [`auth`] - Bearer 토큰 검증
//! - [`identity`] - 외부 아이덴티티 프로바이더 연동

pub mod analytics;
pub mod auth;
pub mod identity;
pub mod users;
