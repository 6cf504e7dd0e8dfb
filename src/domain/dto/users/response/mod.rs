//! # 응답 DTO 모듈
//!
//! 성공 응답은 모두 `{status: "success", ...}` 봉투를 사용합니다.
//!
//! | 엔드포인트 | 본문 |
//! |-----------|------|
//! | 단건 생성/수정 | `{status, data}` |
//! | 단건 조회 | `{status, data: {doc}}` |
//! | 목록 조회 | `{status, results, data}` |
//! | 계정 작업 | `{status}` |

pub mod user_response;

pub use user_response::UserResponse;

use serde::Serialize;

/// 성공 응답 봉투
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn data(data: T) -> Self {
        Self {
            status: "success",
            results: None,
            data: Some(data),
        }
    }
}

impl<T: Serialize> ApiResponse<Vec<T>> {
    pub fn list(items: Vec<T>) -> Self {
        Self {
            status: "success",
            results: Some(items.len()),
            data: Some(items),
        }
    }
}

impl ApiResponse<()> {
    /// 데이터 없이 `{status: "success"}`만 보내는 응답
    pub fn success() -> Self {
        Self {
            status: "success",
            results: None,
            data: None,
        }
    }
}

/// 단건 조회용 `{doc}` 래퍼
#[derive(Debug, Clone, Serialize)]
pub struct DocEnvelope<T: Serialize> {
    pub doc: T,
}
