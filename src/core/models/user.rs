use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct UserRegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserRegisterResponse {
    pub id: i64,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserLoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserLoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserItem {
    pub id: i64,
    pub email: String,
    pub nickname: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserUpdateRequest {
    pub nickname: String,
}
