use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::principal::{Credentials, Principal};

#[cfg(test)]
pub mod memory;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate value for {0}")]
    Duplicate(&'static str),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Turns a unique-constraint violation into [`StoreError::Duplicate`],
    /// naming the field by the constraint that fired.
    pub fn from_sqlx(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            if db.is_unique_violation() {
                let field = match db.constraint() {
                    Some(c) if c.contains("license") => "license number",
                    _ => "email",
                };
                return StoreError::Duplicate(field);
            }
        }
        StoreError::Database(e)
    }
}

/// Persistence of principal records for one credential track.
///
/// Every lookup only sees active records; soft-deleted principals are
/// invisible to authentication and to the default listing.
#[async_trait]
pub trait CredentialStore<P: Principal>: Send + Sync {
    async fn create(
        &self,
        email: &str,
        password_hash: &str,
        profile: P::Profile,
    ) -> Result<P, StoreError>;

    async fn find_by_email_with_secret(
        &self,
        email: &str,
    ) -> Result<Option<Credentials<P>>, StoreError>;

    async fn find_by_id_with_secret(&self, id: Uuid)
        -> Result<Option<Credentials<P>>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<P>, StoreError>;

    async fn list(&self) -> Result<Vec<P>, StoreError>;

    /// Applies the typed update and returns the new state, or `None` if no
    /// active record has this id.
    async fn update_fields(&self, id: Uuid, update: P::Update) -> Result<Option<P>, StoreError>;

    async fn set_password(
        &self,
        id: Uuid,
        password_hash: &str,
        changed_at: OffsetDateTime,
    ) -> Result<(), StoreError>;

    /// Soft delete. Returns false when no active record matched.
    async fn deactivate(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Hard delete, reserved for admin management.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}
