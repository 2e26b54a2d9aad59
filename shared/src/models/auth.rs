//! Authentication request and response bodies

use serde::{Deserialize, Serialize};

use super::user::User;

/// Body of `POST /auth/login`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Body returned by a successful login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub user: User,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of `GET /auth/profile`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub user: User,
}
