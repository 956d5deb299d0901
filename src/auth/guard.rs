use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use tracing::warn;

use super::{jwt::JwtKeys, principal::Principal};
use crate::{error::AppError, store::CredentialStore};

pub const NOT_LOGGED_IN: &str = "You are not logged in! Please log in to get access.";
pub const INVALID_TOKEN: &str = "Invalid or expired token. Please log in again.";
pub const PASSWORD_CHANGED: &str =
    "Password was changed after this token was issued. Please log in again.";

/// Resolves a bearer token to an active principal of one credential track.
pub struct AccessGuard<P: Principal> {
    keys: JwtKeys,
    store: Arc<dyn CredentialStore<P>>,
}

impl<P: Principal> AccessGuard<P> {
    pub fn new(keys: JwtKeys, store: Arc<dyn CredentialStore<P>>) -> Self {
        Self { keys, store }
    }

    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<P, AppError> {
        let token = bearer_token(headers).ok_or_else(|| AppError::unauthenticated(NOT_LOGGED_IN))?;

        let claims = self.keys.verify(token, P::KIND).map_err(|e| {
            warn!(error = %e, kind = %P::KIND, "token rejected");
            AppError::unauthenticated(INVALID_TOKEN)
        })?;

        let principal = self.store.find_by_id(claims.sub).await?.ok_or_else(|| {
            warn!(subject = %claims.sub, kind = %P::KIND, "token subject no longer exists");
            AppError::unauthenticated(format!(
                "The {} belonging to this token no longer exists.",
                P::KIND
            ))
        })?;

        if principal.changed_password_after(claims.iat) {
            warn!(subject = %claims.sub, kind = %P::KIND, "token predates password change");
            return Err(AppError::unauthenticated(PASSWORD_CHANGED));
        }

        Ok(principal)
    }
}

/// `Authorization: Bearer <token>`, with a non-empty token.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Extractor for routes protected by an [`AccessGuard`].
///
/// The resolved principal is also stored in the request extensions.
pub struct Authenticated<P>(pub P);

#[async_trait]
impl<S, P> FromRequestParts<S> for Authenticated<P>
where
    S: Send + Sync,
    P: Principal,
    JwtKeys: FromRef<S>,
    Arc<dyn CredentialStore<P>>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(principal) = parts.extensions.get::<P>() {
            return Ok(Self(principal.clone()));
        }
        let guard = AccessGuard::new(
            JwtKeys::from_ref(state),
            <Arc<dyn CredentialStore<P>> as FromRef<S>>::from_ref(state),
        );
        let principal = guard.authenticate(&parts.headers).await?;
        parts.extensions.insert(principal.clone());
        Ok(Self(principal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::principal::PrincipalKind,
        doctors::repo_types::Doctor,
        state::AppState,
        store::memory::MemoryStore,
        users::repo_types::{Role, User},
    };
    use axum::http::{HeaderValue, StatusCode};
    use time::{Duration, OffsetDateTime};
    use uuid::Uuid;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    async fn seeded() -> (AppState, Arc<MemoryStore<User>>, User) {
        let (state, users, _) = AppState::fake_with_stores();
        let user = users.insert_user("pat@example.com", Role::Patient).await;
        (state, users, user)
    }

    fn user_guard(state: &AppState) -> AccessGuard<User> {
        AccessGuard::new(state.keys.clone(), state.users.clone())
    }

    fn assert_unauthenticated(err: AppError, msg: &str) {
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.to_string(), msg);
    }

    #[tokio::test]
    async fn missing_or_malformed_header_rejected_before_lookup() {
        let (state, users, _) = seeded().await;
        let guard = user_guard(&state);

        for headers in [
            HeaderMap::new(),
            headers_with("Basic abc"),
            headers_with("bearer abc"),
            headers_with("Bearer "),
            headers_with("Token"),
        ] {
            let err = guard.authenticate(&headers).await.unwrap_err();
            assert_unauthenticated(err, NOT_LOGGED_IN);
        }
        assert_eq!(users.lookups(), 0);
    }

    #[tokio::test]
    async fn valid_token_resolves_principal() {
        let (state, _, user) = seeded().await;
        let token = state.keys.sign(user.id, PrincipalKind::User).unwrap();
        let resolved = user_guard(&state)
            .authenticate(&headers_with(&format!("Bearer {token}")))
            .await
            .unwrap();
        assert_eq!(resolved.id, user.id);
    }

    #[tokio::test]
    async fn invalid_token_rejected() {
        let (state, _, _) = seeded().await;
        let err = user_guard(&state)
            .authenticate(&headers_with("Bearer not-a-token"))
            .await
            .unwrap_err();
        assert_unauthenticated(err, INVALID_TOKEN);
    }

    #[tokio::test]
    async fn doctor_token_rejected_by_user_guard() {
        let (state, _, user) = seeded().await;
        let token = state.keys.sign(user.id, PrincipalKind::Doctor).unwrap();
        let err = user_guard(&state)
            .authenticate(&headers_with(&format!("Bearer {token}")))
            .await
            .unwrap_err();
        assert_unauthenticated(err, INVALID_TOKEN);
    }

    #[tokio::test]
    async fn unknown_subject_rejected() {
        let (state, _, _) = seeded().await;
        let token = state.keys.sign(Uuid::new_v4(), PrincipalKind::User).unwrap();
        let err = user_guard(&state)
            .authenticate(&headers_with(&format!("Bearer {token}")))
            .await
            .unwrap_err();
        assert_unauthenticated(err, "The user belonging to this token no longer exists.");
    }

    #[tokio::test]
    async fn deactivated_subject_rejected() {
        let (state, users, user) = seeded().await;
        let token = state.keys.sign(user.id, PrincipalKind::User).unwrap();
        assert!(users.deactivate(user.id).await.unwrap());
        let err = user_guard(&state)
            .authenticate(&headers_with(&format!("Bearer {token}")))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn token_issued_before_password_change_rejected() {
        let (state, users, user) = seeded().await;
        let now = OffsetDateTime::now_utc();
        let old = state
            .keys
            .sign_at(user.id, PrincipalKind::User, now - Duration::seconds(30))
            .unwrap();
        users
            .set_password(user.id, "irrelevant", now - Duration::seconds(1))
            .await
            .unwrap();

        let err = user_guard(&state)
            .authenticate(&headers_with(&format!("Bearer {old}")))
            .await
            .unwrap_err();
        assert_unauthenticated(err, PASSWORD_CHANGED);

        let fresh = state.keys.sign_at(user.id, PrincipalKind::User, now).unwrap();
        assert!(user_guard(&state)
            .authenticate(&headers_with(&format!("Bearer {fresh}")))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn token_issued_in_change_second_is_accepted() {
        let (state, users, user) = seeded().await;
        let changed = OffsetDateTime::now_utc() - Duration::seconds(10);
        users.set_password(user.id, "irrelevant", changed).await.unwrap();
        let token = state.keys.sign_at(user.id, PrincipalKind::User, changed).unwrap();
        assert!(user_guard(&state)
            .authenticate(&headers_with(&format!("Bearer {token}")))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn doctor_guard_uses_doctor_store() {
        let (state, _, doctors) = AppState::fake_with_stores();
        let doctor: Doctor = doctors.insert_doctor("doc@example.com").await;
        let guard = AccessGuard::new(state.keys.clone(), state.doctors.clone());
        let token = state.keys.sign(doctor.id, PrincipalKind::Doctor).unwrap();
        let resolved = guard
            .authenticate(&headers_with(&format!("Bearer {token}")))
            .await
            .unwrap();
        assert_eq!(resolved.id, doctor.id);
    }
}
