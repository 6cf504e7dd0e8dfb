//! User Entity Implementation
//!
//! `users` 컬렉션에 저장되는 사용자 문서입니다.
//! 인증 정보(이메일, 비밀번호)는 아이덴티티 프로바이더가 소유하며
//! 이 엔티티는 애플리케이션 프로필만 보관합니다.

use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use crate::query::{FieldType, FieldTypes};

/// 계정 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
    /// 아이덴티티 계정이 삭제된 사용자 (문서는 보존)
    Closed,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Inactive => "inactive",
            UserStatus::Closed => "closed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

/// 주소 (임베디드 문서)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
}

/// 사용자 엔티티
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// 사용자명 (unique 인덱스)
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default)]
    pub status: UserStatus,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub addresses: Vec<Address>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
    /// 문서 버전 필드 (목록 조회 시 기본으로 제외됨)
    #[serde(rename = "__v", default)]
    pub version: i32,
}

impl User {
    /// 목록 필터가 값을 변환할 때 쓰는 저장 타입
    pub const FIELD_TYPES: FieldTypes = &[
        ("_id", FieldType::ObjectId),
        ("firstName", FieldType::String),
        ("lastName", FieldType::String),
        ("gender", FieldType::String),
        ("phone", FieldType::String),
        ("username", FieldType::String),
        ("birthDate", FieldType::Date),
        ("avatar", FieldType::String),
        ("status", FieldType::String),
        ("role", FieldType::String),
        ("createdAt", FieldType::Date),
        ("updatedAt", FieldType::Date),
        ("__v", FieldType::Number),
    ];

    /// 필수 필드만으로 새 사용자를 만듭니다. 나머지는 기본값.
    pub fn new(first_name: String, last_name: String, username: String) -> Self {
        let now = DateTime::now();

        Self {
            id: None,
            first_name,
            last_name,
            gender: None,
            phone: None,
            username,
            birth_date: None,
            avatar: None,
            status: UserStatus::default(),
            role: UserRole::default(),
            addresses: Vec::new(),
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    /// ID를 hex 문자열로 반환
    pub fn id_string(&self) -> Option<String> {
        self.id.map(|id| id.to_hex())
    }

    pub fn is_closed(&self) -> bool {
        self.status == UserStatus::Closed
    }
}
