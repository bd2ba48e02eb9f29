// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Identity token rewriting.
//!
//! The subscription service scopes its admin API through a JWT whose `db`
//! claim names the database the call acts on. Rewriting that claim for the
//! restored database requires re-signing, so the HS256 secret must be
//! available. Only the `db` claim changes; every other claim is carried
//! over as-is.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use serde_json::{Value, json};
use sha2::Sha256;
use thiserror::Error;

use pgmirror_core::error::HookError;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token is not a three-part JWT")]
    Shape,

    #[error("token payload is not valid base64url: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("token payload is not a JSON object")]
    Payload,

    #[error("token has no 'db' claim to rewrite")]
    MissingClaim,
}

impl From<TokenError> for HookError {
    fn from(e: TokenError) -> Self {
        HookError::Token(e.to_string())
    }
}

/// Re-target a JWT at `new_database` by rewriting its `db` claim and
/// re-signing with HS256.
pub fn rewrite_database_claim(
    token: &str,
    new_database: &str,
    secret: &str,
) -> Result<String, TokenError> {
    let mut parts = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(TokenError::Shape);
    };

    let decoded = URL_SAFE_NO_PAD.decode(payload)?;
    let mut claims: Value = serde_json::from_slice(&decoded).map_err(|_| TokenError::Payload)?;
    let map = claims.as_object_mut().ok_or(TokenError::Payload)?;

    if !map.contains_key("db") {
        return Err(TokenError::MissingClaim);
    }
    map.insert("db".to_string(), Value::String(new_database.to_string()));

    Ok(sign(&claims, secret))
}

/// Encode and sign a claims object as an HS256 JWT.
fn sign(claims: &Value, secret: &str) -> String {
    let header = json!({"alg": "HS256", "typ": "JWT"});
    let header_b64 = URL_SAFE_NO_PAD.encode(header.to_string());
    let payload_b64 = URL_SAFE_NO_PAD.encode(claims.to_string());
    let signing_input = format!("{header_b64}.{payload_b64}");

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(signing_input.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    format!("{signing_input}.{signature}")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    fn token_with_claims(claims: Value) -> String {
        sign(&claims, SECRET)
    }

    fn claims_of(token: &str) -> Value {
        let payload = token.split('.').nth(1).expect("three-part token");
        let decoded = URL_SAFE_NO_PAD.decode(payload).expect("valid base64url");
        serde_json::from_slice(&decoded).expect("JSON payload")
    }

    fn signature_is_valid(token: &str, secret: &str) -> bool {
        let mut parts = token.rsplitn(2, '.');
        let signature = parts.next().unwrap();
        let signing_input = parts.next().unwrap();
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(signing_input.as_bytes());
        let expected = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        expected == signature
    }

    #[test]
    fn rewrites_db_claim_and_keeps_the_rest() {
        let token = token_with_claims(json!({
            "db": "sp_d1_123_acme",
            "sub": "admin",
            "exp": 4102444800u64
        }));

        let rewritten =
            rewrite_database_claim(&token, "rj_d1_901_varejo", SECRET).expect("rewrite");
        let claims = claims_of(&rewritten);
        assert_eq!(claims["db"], "rj_d1_901_varejo");
        assert_eq!(claims["sub"], "admin");
        assert_eq!(claims["exp"], 4102444800u64);
    }

    #[test]
    fn rewritten_token_is_validly_signed() {
        let token = token_with_claims(json!({"db": "a"}));
        let rewritten = rewrite_database_claim(&token, "b", SECRET).expect("rewrite");
        assert!(signature_is_valid(&rewritten, SECRET));
        assert!(!signature_is_valid(&rewritten, "wrong-secret"));
    }

    #[test]
    fn rejects_token_without_db_claim() {
        let token = token_with_claims(json!({"sub": "admin"}));
        let err = rewrite_database_claim(&token, "x", SECRET).expect_err("must reject");
        assert!(matches!(err, TokenError::MissingClaim));
    }

    #[test]
    fn rejects_malformed_tokens() {
        assert!(matches!(
            rewrite_database_claim("not-a-jwt", "x", SECRET),
            Err(TokenError::Shape)
        ));
        assert!(matches!(
            rewrite_database_claim("a.b.c.d", "x", SECRET),
            Err(TokenError::Shape)
        ));
        assert!(rewrite_database_claim("a.!!!.c", "x", SECRET).is_err());
    }
}
