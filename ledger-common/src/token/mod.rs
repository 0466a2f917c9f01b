pub mod auth_token;

use base64::engine::general_purpose::URL_SAFE as b64_urlsafe;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::de::DeserializeOwned;
use sha2::Sha256;
use std::marker::PhantomData;
use std::time::{SystemTime, UNIX_EPOCH};

type HmacSha256 = Hmac<Sha256>;

const HMAC_SHA256_LENGTH: usize = 32;
const MAX_TOKEN_LENGTH: usize = 4096;

#[derive(Debug, PartialEq, Eq)]
pub enum TokenError {
    TokenInvalid,
    TokenExpired,
    TokenMissing,
}

impl std::error::Error for TokenError {}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenError::TokenInvalid => write!(f, "TokenInvalid"),
            TokenError::TokenExpired => write!(f, "TokenExpired"),
            TokenError::TokenMissing => write!(f, "TokenMissing"),
        }
    }
}

pub trait Expiring {
    fn expiration(&self) -> u64;
}

pub trait TokenSignatureVerifier {
    fn signature_length() -> usize;
    fn verify(json: &[u8], signature: &[u8], key: &[u8]) -> bool;
}

/// A token whose claims have been parsed but whose signature and expiration have not yet
/// been checked.
#[derive(Debug)]
pub struct DecodedToken<C, V>
where
    C: Expiring + DeserializeOwned,
    V: TokenSignatureVerifier,
{
    pub json: Vec<u8>,
    pub signature: Vec<u8>,
    pub claims: C,
    phantom: PhantomData<V>,
}

impl<C, V> DecodedToken<C, V>
where
    C: Expiring + DeserializeOwned,
    V: TokenSignatureVerifier,
{
    pub fn verify(&self, key: &[u8]) -> Result<&C, TokenError> {
        if !V::verify(&self.json, &self.signature, key) {
            return Err(TokenError::TokenInvalid);
        }

        let Ok(now) = SystemTime::now().duration_since(UNIX_EPOCH) else {
            return Err(TokenError::TokenInvalid);
        };

        if self.claims.expiration() <= now.as_secs() {
            return Err(TokenError::TokenExpired);
        }

        Ok(&self.claims)
    }

    pub fn into_verified(self, key: &[u8]) -> Result<C, TokenError> {
        self.verify(key)?;
        Ok(self.claims)
    }
}

pub trait Token {
    type Claims: Expiring + DeserializeOwned;
    type Verifier: TokenSignatureVerifier;

    fn token_name() -> &'static str;

    fn decode(token: &str) -> Result<DecodedToken<Self::Claims, Self::Verifier>, TokenError> {
        if token.len() > MAX_TOKEN_LENGTH {
            return Err(TokenError::TokenInvalid);
        }

        let decoded_token = b64_urlsafe
            .decode(token)
            .map_err(|_| TokenError::TokenInvalid)?;

        if decoded_token.len() <= Self::Verifier::signature_length() {
            return Err(TokenError::TokenInvalid);
        }

        let (json, signature) =
            decoded_token.split_at(decoded_token.len() - Self::Verifier::signature_length());

        let claims: Self::Claims =
            serde_json::from_slice(json).map_err(|_| TokenError::TokenInvalid)?;

        Ok(DecodedToken {
            json: Vec::from(json),
            signature: Vec::from(signature),
            claims,
            phantom: PhantomData,
        })
    }
}

#[derive(Debug)]
pub struct HmacSha256Verifier {}

impl HmacSha256Verifier {
    pub(crate) fn sign(json: &[u8], key: &[u8]) -> Vec<u8> {
        // HMAC accepts keys of any length
        let mut mac = match HmacSha256::new_from_slice(key) {
            Ok(m) => m,
            Err(_) => return Vec::new(),
        };

        mac.update(json);
        mac.finalize().into_bytes().to_vec()
    }
}

impl TokenSignatureVerifier for HmacSha256Verifier {
    fn signature_length() -> usize {
        HMAC_SHA256_LENGTH
    }

    fn verify(json: &[u8], signature: &[u8], key: &[u8]) -> bool {
        let correct_signature = Self::sign(json, key);

        if correct_signature.len() != signature.len() || signature.is_empty() {
            return false;
        }

        // Do bitwise comparison to prevent timing attacks
        let signatures_dont_match = correct_signature
            .iter()
            .zip(signature)
            .fold(0u8, |acc, (a, b)| acc | (a ^ b));

        signatures_dont_match == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde::{Deserialize, Serialize};

    #[derive(Clone, Copy, Debug, Serialize, Deserialize)]
    struct TestClaims {
        id: i32,
        exp: u64,
    }

    impl Expiring for TestClaims {
        fn expiration(&self) -> u64 {
            self.exp
        }
    }

    struct TestToken {}

    impl Token for TestToken {
        type Claims = TestClaims;
        type Verifier = HmacSha256Verifier;

        fn token_name() -> &'static str {
            "TestToken"
        }
    }

    fn sign_test_token(claims: TestClaims, signing_key: &[u8]) -> String {
        let mut token_unencoded = serde_json::to_vec(&claims).unwrap();
        let signature = HmacSha256Verifier::sign(&token_unencoded, signing_key);
        token_unencoded.extend_from_slice(&signature);

        b64_urlsafe.encode(&token_unencoded)
    }

    fn expiration_from_now(offset_secs: i64) -> u64 {
        let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs();
        (now as i64 + offset_secs) as u64
    }

    #[test]
    fn test_decode() {
        let exp = expiration_from_now(10);
        let token = sign_test_token(TestClaims { id: 42, exp }, &[10; 64]);
        let t = TestToken::decode(&token).unwrap();

        assert_eq!(t.claims.id, 42);
        assert_eq!(t.claims.exp, exp);

        let claims = t.verify(&[10; 64]).unwrap();

        assert_eq!(claims.id, 42);
        assert_eq!(claims.exp, exp);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert_eq!(
            TestToken::decode("not base64!").unwrap_err(),
            TokenError::TokenInvalid
        );

        let too_short = b64_urlsafe.encode([1u8; 16]);
        assert_eq!(
            TestToken::decode(&too_short).unwrap_err(),
            TokenError::TokenInvalid
        );

        let mut not_json = b"{\"id\": ".to_vec();
        not_json.extend_from_slice(&[0u8; 32]);
        assert_eq!(
            TestToken::decode(&b64_urlsafe.encode(not_json)).unwrap_err(),
            TokenError::TokenInvalid
        );

        let huge = "a".repeat(MAX_TOKEN_LENGTH + 4);
        assert_eq!(
            TestToken::decode(&huge).unwrap_err(),
            TokenError::TokenInvalid
        );
    }

    #[test]
    fn test_verify_hmac() {
        let key = [2; 64];
        let exp = expiration_from_now(10);

        let token = sign_test_token(TestClaims { id: 7, exp }, &key);
        let claims = TestToken::decode(&token).unwrap().into_verified(&key).unwrap();

        assert_eq!(claims.id, 7);
        assert_eq!(claims.exp, exp);

        // Wrong key
        assert_eq!(
            TestToken::decode(&token)
                .unwrap()
                .verify(&[3; 64])
                .unwrap_err(),
            TokenError::TokenInvalid
        );

        // Tampered signature
        let mut decoded = b64_urlsafe.decode(&token).unwrap();
        let last_byte = decoded.pop().unwrap();
        decoded.push(last_byte ^ 0x01);
        let tampered = b64_urlsafe.encode(decoded);

        assert_eq!(
            TestToken::decode(&tampered)
                .unwrap()
                .verify(&key)
                .unwrap_err(),
            TokenError::TokenInvalid
        );

        // Expired
        let exp = expiration_from_now(-10);
        let token = sign_test_token(TestClaims { id: 7, exp }, &key);
        assert_eq!(
            TestToken::decode(&token).unwrap().verify(&key).unwrap_err(),
            TokenError::TokenExpired
        );
    }
}
