use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::roles::RoleSet;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User id, as a string.
    pub sub: String,
    pub rls: RoleSet,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: i64, roles: RoleSet, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id.to_string(),
            rls: roles,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }

    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

pub fn encode_token(claims: &Claims, secret: &str) -> Result<String, String> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| format!("JWT encode failed: {e}"))
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| format!("JWT decode failed: {e}"))
}
