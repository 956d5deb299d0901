use axum::extract::FromRef;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use super::{claims::Claims, principal::PrincipalKind};
use crate::{config::JwtConfig, state::AppState};

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),
    #[error("token was issued for a {0}")]
    WrongKind(PrincipalKind),
}

/// Signing and verification keys, built once from configuration.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.keys.clone()
    }
}

impl JwtKeys {
    pub fn new(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl: Duration::minutes(cfg.ttl_minutes),
        }
    }

    pub fn sign(&self, subject: Uuid, kind: PrincipalKind) -> anyhow::Result<String> {
        self.sign_at(subject, kind, OffsetDateTime::now_utc())
    }

    /// Signs a token as if issued at `now`.
    pub fn sign_at(
        &self,
        subject: Uuid,
        kind: PrincipalKind,
        now: OffsetDateTime,
    ) -> anyhow::Result<String> {
        let exp = now + self.ttl;
        let claims = Claims {
            sub: subject,
            iat: now.unix_timestamp(),
            exp: exp.unix_timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            kind,
            jti: Uuid::new_v4(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        debug!(subject = %subject, %kind, "jwt signed");
        Ok(token)
    }

    /// Checks signature, issuer, audience and expiry (no leeway) and that the
    /// token belongs to the expected credential track.
    pub fn verify(&self, token: &str, expected: PrincipalKind) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        validation.set_required_spec_claims(&["exp", "iat", "sub", "iss", "aud"]);

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            if matches!(e.kind(), ErrorKind::ExpiredSignature) {
                TokenError::Expired
            } else {
                TokenError::Invalid(e)
            }
        })?;
        if data.claims.kind != expected {
            return Err(TokenError::WrongKind(data.claims.kind));
        }
        debug!(subject = %data.claims.sub, kind = %data.claims.kind, "jwt verified");
        Ok(data.claims)
    }
}
