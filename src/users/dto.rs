use serde::{Deserialize, Serialize};

use crate::{
    auth::dto::NewCredentials,
    error::AppError,
    users::repo_types::{Gender, NewUser, Role, User, UserUpdate},
    validation,
};

/// Request body for patient signup, also used by admins to create users.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub name: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirm: String,
    pub phone: Option<String>,
    pub date_of_birth: Option<String>,
    pub gender: Option<Gender>,
    pub address: Option<String>,
    /// Honored only on the admin create route.
    pub role: Option<Role>,
}

impl SignupRequest {
    /// Splits into credentials and a validated profile. `allow_role` is false
    /// on public signup, where every account starts as a patient.
    pub fn into_parts(self, allow_role: bool) -> Result<(NewCredentials, NewUser), AppError> {
        let profile = NewUser {
            name: validation::required(self.name, "name")?,
            phone: validation::optional(self.phone)
                .map(|p| validation::phone(&p))
                .transpose()?,
            date_of_birth: validation::optional(self.date_of_birth)
                .map(|d| validation::date(&d))
                .transpose()?,
            gender: self.gender,
            address: validation::optional(self.address),
            role: if allow_role {
                self.role.unwrap_or(Role::Patient)
            } else {
                Role::Patient
            },
        };
        let creds = NewCredentials {
            email: self.email,
            password: self.password,
            password_confirm: self.password_confirm,
        };
        Ok((creds, profile))
    }
}

/// Self-service profile update. Only the listed fields can change; the
/// password fields exist so their presence can be rejected.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMeRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<String>,
    pub gender: Option<Gender>,
    pub password: Option<String>,
    pub password_confirm: Option<String>,
}

pub const NOT_FOR_PASSWORDS: &str =
    "This route is not for password updates. Please use /updateMyPassword.";

impl UpdateMeRequest {
    pub fn into_update(self) -> Result<UserUpdate, AppError> {
        if self.password.is_some() || self.password_confirm.is_some() {
            return Err(AppError::validation(NOT_FOR_PASSWORDS));
        }
        profile_update(
            self.name,
            self.email,
            self.phone,
            self.address,
            self.date_of_birth,
            self.gender,
            None,
        )
    }
}

/// Admin update; may also change the role.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUpdateRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<String>,
    pub gender: Option<Gender>,
    pub role: Option<Role>,
}

impl AdminUpdateRequest {
    pub fn into_update(self) -> Result<UserUpdate, AppError> {
        profile_update(
            self.name,
            self.email,
            self.phone,
            self.address,
            self.date_of_birth,
            self.gender,
            self.role,
        )
    }
}

fn profile_update(
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    address: Option<String>,
    date_of_birth: Option<String>,
    gender: Option<Gender>,
    role: Option<Role>,
) -> Result<UserUpdate, AppError> {
    Ok(UserUpdate {
        name: name.map(|n| validation::required(Some(n), "name")).transpose()?,
        email: email.map(|e| validation::normalize_email(&e)).transpose()?,
        phone: phone.map(|p| validation::phone(&p)).transpose()?,
        address: validation::optional(address),
        date_of_birth: date_of_birth.map(|d| validation::date(&d)).transpose()?,
        gender,
        role,
    })
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub status: &'static str,
    pub data: UserData,
}

#[derive(Debug, Serialize)]
pub struct UserData {
    pub user: User,
}

impl UserResponse {
    pub fn new(user: User) -> Self {
        Self {
            status: "success",
            data: UserData { user },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub status: &'static str,
    pub results: usize,
    pub data: UserListData,
}

#[derive(Debug, Serialize)]
pub struct UserListData {
    pub users: Vec<User>,
}

impl UserListResponse {
    pub fn new(users: Vec<User>) -> Self {
        Self {
            status: "success",
            results: users.len(),
            data: UserListData { users },
        }
    }
}
