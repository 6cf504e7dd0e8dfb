use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 아이덴티티 프로바이더가 돌려주는 사용자 계정
///
/// Management API 응답 중 서비스가 사용하는 필드만 매핑합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityUser {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_metadata: Option<Value>,
}

impl IdentityUser {
    /// `app_metadata.appUserId`
    pub fn app_user_id(&self) -> Option<&str> {
        self.app_metadata
            .as_ref()
            .and_then(|meta| meta.get("appUserId"))
            .and_then(Value::as_str)
    }
}
