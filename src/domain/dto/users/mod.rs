//! # User Data Transfer Objects Module
//!
//! 사용자 API의 요청/응답 구조를 정의합니다.
//!
//! ```text
//! users/
//! ├── request/
//! │   ├── create_user_request.rs   # POST /users
//! │   ├── update_user_request.rs   # PUT, PATCH /users/{id}
//! │   └── account_request.rs       # reset-password, email 변경
//! └── response/
//!     ├── mod.rs                   # 성공 응답 봉투
//!     └── user_response.rs         # 사용자 응답
//! ```

pub mod request;
pub mod response;

pub use request::*;
pub use response::*;
