use anyhow::Context;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use tracing::{error, warn};

/// Salted one-way hashing of credentials with a fixed argon2id work factor.
///
/// Both operations run on the blocking pool so a slow hash never stalls the
/// async workers.
#[derive(Clone)]
pub struct Hasher {
    argon2: Argon2<'static>,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::with_params(Params::default())
    }
}

impl Hasher {
    pub fn with_params(params: Params) -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }

    /// Cheap parameters so test suites don't spend seconds per signup.
    #[cfg(test)]
    pub fn fast() -> Self {
        Self::with_params(Params::new(1024, 1, 1, None).expect("valid argon2 params"))
    }

    pub async fn hash(&self, plain: &str) -> anyhow::Result<String> {
        let argon2 = self.argon2.clone();
        let plain = plain.to_owned();
        tokio::task::spawn_blocking(move || hash_with(&argon2, &plain))
            .await
            .context("hash task panicked")?
    }

    /// `false` on mismatch and on a hash that does not parse.
    pub async fn verify(&self, plain: &str, hash: &str) -> anyhow::Result<bool> {
        let argon2 = self.argon2.clone();
        let plain = plain.to_owned();
        let hash = hash.to_owned();
        tokio::task::spawn_blocking(move || verify_with(&argon2, &plain, &hash))
            .await
            .context("verify task panicked")
    }
}

fn hash_with(argon2: &Argon2<'_>, plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

fn verify_with(argon2: &Argon2<'_>, plain: &str, hash: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "stored password hash does not parse");
            return false;
        }
    };
    argon2.verify_password(plain.as_bytes(), &parsed).is_ok()
}
