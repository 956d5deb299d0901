use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use super::{guard::Authenticated, jwt::JwtKeys};
use crate::{
    error::AppError,
    store::CredentialStore,
    users::repo_types::{Role, User},
};

pub const FORBIDDEN: &str = "You do not have permission to perform this action";

/// Passes only users whose role is one of `allowed`.
pub fn restrict_to(allowed: &[Role], user: &User) -> Result<(), AppError> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        warn!(user_id = %user.id, role = %user.role, ?allowed, "role not permitted");
        Err(AppError::Forbidden(FORBIDDEN.into()))
    }
}

/// An authenticated user holding the `admin` role.
///
/// Also gates doctor management; doctors themselves carry no role.
pub struct AdminUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
    Arc<dyn CredentialStore<User>>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Authenticated(user) = Authenticated::<User>::from_request_parts(parts, state).await?;
        restrict_to(&[Role::Admin], &user)?;
        Ok(AdminUser(user))
    }
}
