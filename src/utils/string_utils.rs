//! # 문자열 유틸리티
//!
//! 입력 정리와 새니타이징에 쓰이는 문자열 함수들입니다.

use std::borrow::Cow;

use serde::Deserialize;

/// 선택적 문자열 필드 정리
///
/// None 값이거나 빈 문자열/공백만 있는 경우 None을 반환하고,
/// 유효한 문자열인 경우 앞뒤 공백을 제거한 문자열을 Some 옵션으로 반환합니다.
///
/// # 예제
/// ```rust,ignore
/// use crate::utils::string_utils::clean_optional_string;
///
/// assert_eq!(clean_optional_string(Some("  Hello  ".to_string())), Some("Hello".to_string()));
/// assert_eq!(clean_optional_string(Some("   ".to_string())), None);
/// assert_eq!(clean_optional_string(None), None);
/// ```
pub fn clean_optional_string(value: Option<String>) -> Option<String> {
    value.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// 선택적 문자열 필드를 위한 serde deserializer
///
/// `#[serde(default, deserialize_with = "deserialize_optional_string")]`와 함께 사용합니다.
/// 빈 문자열과 공백 문자열은 None이 됩니다.
pub fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(clean_optional_string(opt))
}

/// HTML 태그 시작/끝 문자를 엔티티로 바꿉니다.
///
/// 바꿀 문자가 없으면 복사하지 않습니다.
pub fn escape_html(value: &str) -> Cow<'_, str> {
    if !value.contains(['<', '>']) {
        return Cow::Borrowed(value);
    }

    let mut escaped = String::with_capacity(value.len() + 8);
    for ch in value.chars() {
        match ch {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    Cow::Owned(escaped)
}

/// MongoDB 연산자 주입에 쓰일 수 있는 키인지 확인합니다.
///
/// `$`로 시작하는 키, `.`이 포함된 키, 브래킷 안에서 `$`로 시작하는 키(`age[$gt]`)가 해당됩니다.
pub fn is_operator_key(key: &str) -> bool {
    key.starts_with('$') || key.contains('.') || key.contains("[$")
}
