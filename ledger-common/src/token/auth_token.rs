use crate::token::{Expiring, HmacSha256Verifier, Token};

use base64::engine::general_purpose::URL_SAFE as b64_urlsafe;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthTokenClaims {
    #[serde(rename = "uid")]
    pub user_id: i32,
    #[serde(rename = "unm")]
    pub username: String,
    #[serde(rename = "exp")]
    pub expiration: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewAuthTokenClaims<'a> {
    #[serde(rename = "uid")]
    pub user_id: i32,
    #[serde(rename = "unm")]
    pub username: &'a str,
    #[serde(rename = "exp")]
    pub expiration: u64,
}

impl<'a> NewAuthTokenClaims<'a> {
    pub fn expiring_in(user_id: i32, username: &'a str, lifetime: Duration) -> Self {
        let expiration = (SystemTime::now() + lifetime)
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        Self {
            user_id,
            username,
            expiration,
        }
    }
}

impl Expiring for AuthTokenClaims {
    fn expiration(&self) -> u64 {
        self.expiration
    }
}

pub struct AuthToken {}

impl AuthToken {
    pub fn sign_new(claims: NewAuthTokenClaims, signing_key: &[u8]) -> String {
        let mut token_unencoded =
            serde_json::to_vec(&claims).expect("Failed to transform claims into JSON");

        let signature = HmacSha256Verifier::sign(&token_unencoded, signing_key);
        token_unencoded.extend_from_slice(&signature);

        b64_urlsafe.encode(&token_unencoded)
    }
}

impl Token for AuthToken {
    type Claims = AuthTokenClaims;
    type Verifier = HmacSha256Verifier;

    fn token_name() -> &'static str {
        "AuthToken"
    }
}
