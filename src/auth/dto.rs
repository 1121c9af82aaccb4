use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{claims::Identity, repo_types::User, role::Role};

/// Request body for user registration. Fields are optional so that missing
/// ones surface as 400 rather than a deserialisation rejection.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

/// Request body for login.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Identity returned by `/me`.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

impl From<Identity> for MeResponse {
    fn from(i: Identity) -> Self {
        Self {
            id: i.id,
            email: i.email,
            role: i.role,
        }
    }
}
