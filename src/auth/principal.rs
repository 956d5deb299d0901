use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Which credential track a principal (and a token) belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PrincipalKind {
    User,
    Doctor,
}

impl PrincipalKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PrincipalKind::User => "user",
            PrincipalKind::Doctor => "doctor",
        }
    }
}

impl fmt::Display for PrincipalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An authenticated entity with its own credential storage.
///
/// Implementors never carry the password hash; the hash only travels inside
/// [`Credentials`] so a serialized principal cannot leak it.
pub trait Principal: Clone + Serialize + Send + Sync + 'static {
    /// Validated profile attributes needed to create a record.
    type Profile: Send + 'static;
    /// Typed allow-list of updatable fields.
    type Update: Send + 'static;

    const KIND: PrincipalKind;

    fn id(&self) -> Uuid;
    fn email(&self) -> &str;
    fn password_changed_at(&self) -> Option<OffsetDateTime>;

    /// True when the credential changed after a token issued at `issued_at`
    /// (epoch seconds). Sub-second precision is dropped before comparing.
    fn changed_password_after(&self, issued_at: i64) -> bool {
        match self.password_changed_at() {
            Some(changed) => changed.unix_timestamp() > issued_at,
            None => false,
        }
    }
}

/// A principal together with its stored password hash.
#[derive(Debug, Clone)]
pub struct Credentials<P> {
    pub principal: P,
    pub password_hash: String,
}
