use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::principal::PrincipalKind;

/// JWT payload used for authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,           // principal ID
    pub iat: i64,            // issued at (unix timestamp)
    pub exp: i64,            // expires at (unix timestamp)
    pub iss: String,         // issuer
    pub aud: String,         // audience
    pub kind: PrincipalKind, // credential track the token was minted for
    pub jti: Uuid,           // unique per token
}
