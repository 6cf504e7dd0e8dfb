//! 공통 유틸리티 함수 모듈
//!
//! # Modules
//!
//! - [`string_utils`] - 문자열 정리, HTML 이스케이프, 연산자 키 판별
//! - [`document`] - BSON → JSON 응답 변환

pub mod document;
pub mod string_utils;
