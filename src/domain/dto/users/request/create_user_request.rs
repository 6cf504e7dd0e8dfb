//! 사용자 생성 요청 DTO
//!
//! 프로필 필드의 형식 검증 규칙을 함께 정의합니다. 같은 규칙이
//! 수정 요청([`UpdateUserRequest`](super::UpdateUserRequest))에도 쓰입니다.

use chrono::{DateTime as ChronoDateTime, NaiveDate};
use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::domain::entities::users::{Address, Gender, User, UserRole, UserStatus};
use crate::utils::string_utils::deserialize_optional_string;

/// 새 사용자 생성 요청
///
/// `auth0Id`가 없으면 토큰의 subject가 아이덴티티 계정으로 사용됩니다.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub auth0_id: Option<String>,

    #[validate(length(min = 1, max = 50, message = "A user must have a first name"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 50, message = "A user must have a last name"))]
    pub last_name: String,

    #[serde(default)]
    pub gender: Option<Gender>,

    #[serde(default, deserialize_with = "deserialize_optional_string")]
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,

    #[validate(length(
        min = 3,
        max = 30,
        message = "Username must be between 3 and 30 characters"
    ))]
    #[validate(custom(function = "validate_username"))]
    pub username: String,

    #[serde(default, deserialize_with = "deserialize_optional_string")]
    #[validate(custom(function = "validate_birth_date"))]
    pub birth_date: Option<String>,

    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub avatar: Option<String>,

    #[serde(default)]
    pub status: Option<UserStatus>,

    #[serde(default)]
    pub role: Option<UserRole>,

    #[serde(default)]
    pub addresses: Option<Vec<Address>>,
}

impl CreateUserRequest {
    /// 검증이 끝난 요청을 저장할 엔티티로 변환합니다.
    pub fn into_user(self) -> User {
        let mut user = User::new(self.first_name, self.last_name, self.username);
        user.gender = self.gender;
        user.phone = self.phone;
        user.birth_date = self.birth_date.as_deref().and_then(parse_birth_date);
        user.avatar = self.avatar;
        user.status = self.status.unwrap_or_default();
        user.role = self.role.unwrap_or_default();
        user.addresses = self.addresses.unwrap_or_default();
        user
    }
}

/// 사용자명 형식 검증 (영문, 숫자, 언더스코어만 허용)
pub(crate) fn validate_username(username: &str) -> Result<(), ValidationError> {
    if !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ValidationError::new("invalid_username").with_message(
            "Username may only contain letters, numbers and underscores".into(),
        ));
    }
    Ok(())
}

/// 전화번호 형식 검증 (숫자 6-20자리, `+`, 공백, `-`, 괄호 허용)
pub(crate) fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    let allowed = phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-' | '(' | ')'));

    if !allowed || !(6..=20).contains(&digits) {
        return Err(ValidationError::new("invalid_phone")
            .with_message("Please provide a valid phone number".into()));
    }
    Ok(())
}

pub(crate) fn validate_birth_date(raw: &str) -> Result<(), ValidationError> {
    match parse_birth_date(raw) {
        Some(date) if date <= DateTime::now() => Ok(()),
        _ => Err(ValidationError::new("invalid_birth_date")
            .with_message("Please provide a valid birth date".into())),
    }
}

/// `YYYY-MM-DD` 또는 RFC3339 문자열을 BSON 날짜로 변환합니다.
pub fn parse_birth_date(raw: &str) -> Option<DateTime> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let midnight = date.and_hms_opt(0, 0, 0)?;
        return Some(DateTime::from_millis(midnight.and_utc().timestamp_millis()));
    }

    ChronoDateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| DateTime::from_millis(dt.timestamp_millis()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateUserRequest {
        serde_json::from_value(serde_json::json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "username": "ada_l",
            "phone": "+33 6 12 34 56 78",
            "birthDate": "1815-12-10",
            "role": "admin",
            "addresses": [{ "city": "London" }]
        }))
        .unwrap()
    }

    #[test]
    fn test_valid_request() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn test_invalid_username() {
        let mut req = request();
        req.username = "ada lovelace!".to_string();

        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("username"));
    }

    #[test]
    fn test_invalid_phone_and_birth_date() {
        let mut req = request();
        req.phone = Some("call me".to_string());
        req.birth_date = Some("not-a-date".to_string());

        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("phone"));
        assert!(fields.contains_key("birth_date"));
    }

    #[test]
    fn test_empty_first_name_rejected() {
        let mut req = request();
        req.first_name = String::new();

        assert!(req.validate().is_err());
    }

    #[test]
    fn test_into_user() {
        let user = request().into_user();

        assert_eq!(user.username, "ada_l");
        assert_eq!(user.role, UserRole::Admin);
        assert_eq!(user.status, UserStatus::Active);
        assert_eq!(user.addresses[0].city.as_deref(), Some("London"));
        assert!(user.birth_date.is_some());
    }

    #[test]
    fn test_parse_birth_date_formats() {
        assert!(parse_birth_date("2000-01-31").is_some());
        assert!(parse_birth_date("2000-01-31T10:00:00+02:00").is_some());
        assert!(parse_birth_date("31/01/2000").is_none());
    }
}
