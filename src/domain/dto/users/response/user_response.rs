use serde::{Deserialize, Serialize};

use crate::domain::entities::users::{Address, Gender, User, UserRole, UserStatus};

/// 사용자 응답 DTO
///
/// ObjectId는 hex 문자열, 날짜는 RFC3339 문자열로 내보냅니다.
/// 내부 버전 필드 `__v`는 포함하지 않습니다.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub status: UserStatus,
    pub role: UserRole,
    pub addresses: Vec<Address>,
    pub created_at: String,
    pub updated_at: String,
}

fn rfc3339(dt: mongodb::bson::DateTime) -> String {
    dt.try_to_rfc3339_string()
        .unwrap_or_else(|_| dt.timestamp_millis().to_string())
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        let User {
            id,
            first_name,
            last_name,
            gender,
            phone,
            username,
            birth_date,
            avatar,
            status,
            role,
            addresses,
            created_at,
            updated_at,
            ..
        } = user;

        Self {
            id: id.map(|id| id.to_hex()).unwrap_or_default(),
            first_name,
            last_name,
            gender,
            phone,
            username,
            birth_date: birth_date.map(rfc3339),
            avatar,
            status,
            role,
            addresses,
            created_at: rfc3339(created_at),
            updated_at: rfc3339(updated_at),
        }
    }
}
