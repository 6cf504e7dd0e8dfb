//! 사용자 수정 요청 DTO (PUT / PATCH 공용)

use mongodb::bson::{self, DateTime, Document};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use super::create_user_request::{
    parse_birth_date, validate_birth_date, validate_phone, validate_username,
};
use crate::core::errors::{AppResult, ErrorContext};
use crate::domain::entities::users::{Address, Gender, UserRole, UserStatus};
use crate::utils::string_utils::deserialize_optional_string;

/// 수정 요청
///
/// 모든 필드가 선택이며, 지정된 필드만 `$set`으로 반영됩니다.
/// PUT은 [`require_complete`](Self::require_complete)로 필수 필드를 추가 검사합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 50, message = "A user must have a first name"))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 50, message = "A user must have a last name"))]
    pub last_name: Option<String>,

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
    pub username: Option<String>,

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

impl UpdateUserRequest {
    /// 전체 교체(PUT)에 필요한 필드가 모두 있는지 검사합니다.
    pub fn require_complete(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let required = [
            ("first_name", self.first_name.is_none(), "A user must have a first name"),
            ("last_name", self.last_name.is_none(), "A user must have a last name"),
            ("username", self.username.is_none(), "A user must have a username"),
        ];

        for (field, missing, message) in required {
            if missing {
                errors.add(
                    field,
                    ValidationError::new("required").with_message(message.into()),
                );
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// 지정된 필드만 담은 `$set` 문서를 만듭니다. `updatedAt`은 항상 갱신됩니다.
    pub fn to_set_document(&self) -> AppResult<Document> {
        let mut set = Document::new();

        if let Some(v) = &self.first_name {
            set.insert("firstName", v.as_str());
        }
        if let Some(v) = &self.last_name {
            set.insert("lastName", v.as_str());
        }
        if let Some(v) = self.gender {
            set.insert("gender", v.as_str());
        }
        if let Some(v) = &self.phone {
            set.insert("phone", v.as_str());
        }
        if let Some(v) = &self.username {
            set.insert("username", v.as_str());
        }
        if let Some(date) = self.birth_date.as_deref().and_then(parse_birth_date) {
            set.insert("birthDate", date);
        }
        if let Some(v) = &self.avatar {
            set.insert("avatar", v.as_str());
        }
        if let Some(v) = self.status {
            set.insert("status", v.as_str());
        }
        if let Some(v) = self.role {
            set.insert("role", v.as_str());
        }
        if let Some(addresses) = &self.addresses {
            set.insert(
                "addresses",
                bson::to_bson(addresses).context("Failed to encode addresses")?,
            );
        }

        set.insert("updatedAt", DateTime::now());
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_update_only_sets_given_fields() {
        let req: UpdateUserRequest =
            serde_json::from_value(serde_json::json!({ "lastName": "Byron", "status": "inactive" }))
                .unwrap();

        assert!(req.validate().is_ok());
        let set = req.to_set_document().unwrap();

        assert_eq!(set.get_str("lastName").unwrap(), "Byron");
        assert_eq!(set.get_str("status").unwrap(), "inactive");
        assert!(set.contains_key("updatedAt"));
        assert!(!set.contains_key("firstName"));
    }

    #[test]
    fn test_require_complete_lists_missing_fields() {
        let req = UpdateUserRequest {
            last_name: Some("Byron".into()),
            ..Default::default()
        };

        let errors = req.require_complete().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("first_name"));
        assert!(fields.contains_key("username"));
        assert!(!fields.contains_key("last_name"));
    }

    #[test]
    fn test_update_validators_apply_to_present_fields() {
        let req = UpdateUserRequest {
            username: Some("no spaces allowed".into()),
            ..Default::default()
        };

        assert!(req.validate().is_err());
        assert!(UpdateUserRequest::default().validate().is_ok());
    }
}
