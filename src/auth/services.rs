use time::{Duration, OffsetDateTime};
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    dto::{NewCredentials, UpdatePasswordRequest},
    jwt::JwtKeys,
    password::Hasher,
    principal::Principal,
};
use crate::{error::AppError, store::CredentialStore, validation};

pub const BAD_CREDENTIALS: &str = "Incorrect email or password";
pub const MISSING_CREDENTIALS: &str = "Please provide email and password";
pub const WRONG_CURRENT_PASSWORD: &str = "Your current password is wrong.";

/// `password_changed_at` is recorded this far in the past. Together with the
/// whole-second comparison in the guard, tokens issued up to about one second
/// before a change keep working.
pub const PASSWORD_CHANGE_MARGIN: Duration = Duration::seconds(1);

/// A freshly issued token and the principal it was issued for.
pub struct Session<P> {
    pub token: String,
    pub principal: P,
}

/// Validates credentials, hashes the password and persists the principal.
/// Used directly by admin creation; signup adds a token on top.
pub async fn create_account<P: Principal>(
    store: &dyn CredentialStore<P>,
    hasher: &Hasher,
    creds: NewCredentials,
    profile: P::Profile,
) -> Result<P, AppError> {
    let email = validation::normalize_email(&creds.email)?;
    validation::new_password(&creds.password, &creds.password_confirm)?;

    if store.find_by_email_with_secret(&email).await?.is_some() {
        warn!(%email, kind = %P::KIND, "email already registered");
        return Err(AppError::validation("That email is already in use"));
    }

    let hash = hasher.hash(&creds.password).await?;
    let principal = store.create(&email, &hash, profile).await?;
    info!(id = %principal.id(), kind = %P::KIND, "account created");
    Ok(principal)
}

pub async fn signup<P: Principal>(
    store: &dyn CredentialStore<P>,
    hasher: &Hasher,
    keys: &JwtKeys,
    creds: NewCredentials,
    profile: P::Profile,
) -> Result<Session<P>, AppError> {
    let principal = create_account(store, hasher, creds, profile).await?;
    let token = keys.sign(principal.id(), P::KIND)?;
    info!(id = %principal.id(), email = %principal.email(), kind = %P::KIND, "signed up");
    Ok(Session { token, principal })
}

/// Unknown email and wrong password fail identically.
pub async fn login<P: Principal>(
    store: &dyn CredentialStore<P>,
    hasher: &Hasher,
    keys: &JwtKeys,
    email: &str,
    password: &str,
) -> Result<Session<P>, AppError> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || password.is_empty() {
        return Err(AppError::validation(MISSING_CREDENTIALS));
    }

    let Some(creds) = store.find_by_email_with_secret(&email).await? else {
        warn!(%email, kind = %P::KIND, "login unknown email");
        return Err(AppError::unauthenticated(BAD_CREDENTIALS));
    };

    if !hasher.verify(password, &creds.password_hash).await? {
        warn!(id = %creds.principal.id(), kind = %P::KIND, "login invalid password");
        return Err(AppError::unauthenticated(BAD_CREDENTIALS));
    }

    let token = keys.sign(creds.principal.id(), P::KIND)?;
    info!(id = %creds.principal.id(), kind = %P::KIND, "logged in");
    Ok(Session {
        token,
        principal: creds.principal,
    })
}

/// Replaces the password, which revokes every token issued before now, and
/// hands back a fresh token.
pub async fn change_password<P: Principal>(
    store: &dyn CredentialStore<P>,
    hasher: &Hasher,
    keys: &JwtKeys,
    id: Uuid,
    req: UpdatePasswordRequest,
) -> Result<Session<P>, AppError> {
    let creds = store
        .find_by_id_with_secret(id)
        .await?
        .ok_or_else(|| AppError::unauthenticated(format!("The {} no longer exists.", P::KIND)))?;

    if !hasher.verify(&req.password_current, &creds.password_hash).await? {
        warn!(%id, kind = %P::KIND, "password change with wrong current password");
        return Err(AppError::unauthenticated(WRONG_CURRENT_PASSWORD));
    }
    validation::new_password(&req.password, &req.password_confirm)?;

    let hash = hasher.hash(&req.password).await?;
    let changed_at = OffsetDateTime::now_utc() - PASSWORD_CHANGE_MARGIN;
    store.set_password(id, &hash, changed_at).await?;

    let principal = store
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::unauthenticated(format!("The {} no longer exists.", P::KIND)))?;
    let token = keys.sign(id, P::KIND)?;
    info!(%id, kind = %P::KIND, "password changed");
    Ok(Session { token, principal })
}
