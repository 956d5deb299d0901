use serde::{Deserialize, Serialize};

/// Request body for login. Missing fields deserialize as empty and are
/// rejected with a 400.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Email and password parts of a signup body.
#[derive(Debug, Clone)]
pub struct NewCredentials {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    #[serde(default)]
    pub password_current: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirm: String,
}

/// Response returned after signup, login or a password change.
#[derive(Debug, Serialize)]
pub struct SessionResponse<P> {
    pub status: &'static str,
    pub token: String,
    pub data: SessionData<P>,
}

#[derive(Debug, Serialize)]
pub struct SessionData<P> {
    pub user: P,
}

impl<P> SessionResponse<P> {
    pub fn new(token: String, principal: P) -> Self {
        Self {
            status: "success",
            token,
            data: SessionData { user: principal },
        }
    }
}
