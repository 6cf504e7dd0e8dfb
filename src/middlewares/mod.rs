//! 미들웨어 모듈
//!
//! 요청 파이프라인의 횡단 관심사를 처리합니다. 적용 순서(바깥 → 안쪽)는
//! [`crate::app::create_app`]에 고정되어 있습니다.
//!
//! | 미들웨어 | 범위 | 역할 |
//! |----------|------|------|
//! | [`error_normalizer::ErrorNormalizer`] | 전체 | 에러 응답 정규화 |
//! | [`security_headers::security_headers`] | 전체 | 보안 응답 헤더 |
//! | [`rate_limit::RateLimit`] | `/api` | IP당 시간당 요청 제한 |
//! | [`sanitize::Sanitize`] | `/api` | 연산자 키 제거, XSS 문자 치환, 본문 크기 제한 |
//! | [`parameter_pollution::ParameterPollution`] | `/api` | 중복 쿼리 키 정리 |
//! | [`auth_middleware::AuthMiddleware`] | 리소스 스코프 | Bearer 토큰 검증 |

pub mod auth_middleware;
mod auth_inner;
pub mod error_normalizer;
pub mod parameter_pollution;
pub mod rate_limit;
pub mod sanitize;
pub mod security_headers;

// 미들웨어 재export
pub use auth_middleware::AuthMiddleware;
pub use error_normalizer::ErrorNormalizer;
pub use parameter_pollution::ParameterPollution;
pub use rate_limit::{RateLimit, RateLimiter};
pub use sanitize::{Sanitize, SanitizeRule};
pub use security_headers::security_headers;
