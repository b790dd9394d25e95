// ABOUTME: Claim set, header and response types of registry bearer tokens
// ABOUTME: Field declaration order is the canonical JSON order placed on the wire
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt::{self, Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::access::ResourceActions;
use crate::constants::token::TYPE_JWT;

/// JWS algorithms a signing key can produce
///
/// The algorithm is a property of the key, never a caller choice: RSA keys
/// sign with `RS256`, P-256 keys with `ES256`, P-384 keys with `ES384` and
/// P-521 keys with `ES512`.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SigningAlgorithm {
    /// RSASSA-PKCS1-v1_5 with SHA-256
    #[serde(rename = "RS256")]
    Rs256,
    /// ECDSA P-256 with SHA-256
    #[serde(rename = "ES256")]
    Es256,
    /// ECDSA P-384 with SHA-384
    #[serde(rename = "ES384")]
    Es384,
    /// ECDSA P-521 with SHA-512
    #[serde(rename = "ES512")]
    Es512,
}

impl SigningAlgorithm {
    /// JWS name of the algorithm
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Rs256 => "RS256",
            Self::Es256 => "ES256",
            Self::Es384 => "ES384",
            Self::Es512 => "ES512",
        }
    }
}

impl Display for SigningAlgorithm {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token header (signing metadata)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenHeader {
    /// Token type marker, always `JWT`
    #[serde(rename = "typ")]
    pub token_type: String,
    /// Algorithm that produced the token signature
    #[serde(rename = "alg")]
    pub signing_alg: SigningAlgorithm,
    /// Fingerprint of the signing public key
    #[serde(rename = "kid", default, skip_serializing_if = "String::is_empty")]
    pub key_id: String,
    /// Optional certificate chain (base64 DER)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub x5c: Vec<String>,
    /// Optional embedded public key
    #[serde(rename = "jwk", default, skip_serializing_if = "Option::is_none")]
    pub raw_jwk: Option<serde_json::Value>,
}

impl TokenHeader {
    /// Header for a token signed with `signing_alg` by the key `key_id`
    #[must_use]
    pub fn new(signing_alg: SigningAlgorithm, key_id: impl Into<String>) -> Self {
        Self {
            token_type: TYPE_JWT.to_owned(),
            signing_alg,
            key_id: key_id.into(),
            x5c: Vec::new(),
            raw_jwk: None,
        }
    }
}

/// Token payload
///
/// Timestamps are Unix seconds. `not_before <= issued_at <= expiration`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimSet {
    /// Token issuer
    #[serde(rename = "iss")]
    pub issuer: String,
    /// Authenticated account
    #[serde(rename = "sub")]
    pub subject: String,
    /// Target registry service
    #[serde(rename = "aud")]
    pub audience: String,
    /// Expiration time
    #[serde(rename = "exp")]
    pub expiration: i64,
    /// Not-before time
    #[serde(rename = "nbf")]
    pub not_before: i64,
    /// Issued-at time
    #[serde(rename = "iat")]
    pub issued_at: i64,
    /// Unique token identifier
    #[serde(rename = "jti")]
    pub jwt_id: String,
    /// Granted resource actions, in grant order
    pub access: Vec<ResourceActions>,
}

impl ClaimSet {
    /// Seconds between issuance and expiration
    #[must_use]
    pub const fn expires_in(&self) -> i64 {
        self.expiration - self.issued_at
    }
}

/// Body returned by a registry token endpoint
///
/// `access_token` duplicates `token` for OAuth2-style clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Signed bearer token
    pub token: String,
    /// Same value as `token`
    pub access_token: String,
    /// Validity in seconds
    pub expires_in: i64,
    /// Issuance time
    pub issued_at: DateTime<Utc>,
}

impl TokenResponse {
    /// Build the response for `token` issued with `claims`
    #[must_use]
    pub fn new(token: String, claims: &ClaimSet) -> Self {
        Self {
            access_token: token.clone(),
            token,
            expires_in: claims.expires_in(),
            issued_at: DateTime::from_timestamp(claims.issued_at, 0).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::access::AccessGrant;

    fn sample_claims() -> ClaimSet {
        ClaimSet {
            issuer: "registry-token-issuer".into(),
            subject: "alice".into(),
            audience: "registry.example.com".into(),
            expiration: 1_700_000_600,
            not_before: 1_699_999_400,
            issued_at: 1_700_000_000,
            jwt_id: "42".into(),
            access: vec![ResourceActions::from(AccessGrant::new(
                "repository",
                "library/nginx",
                ["push", "pull"],
            ))],
        }
    }

    #[test]
    fn test_claims_field_order() {
        let json = serde_json::to_string(&sample_claims()).unwrap();
        assert_eq!(
            json,
            concat!(
                r#"{"iss":"registry-token-issuer","sub":"alice","aud":"registry.example.com","#,
                r#""exp":1700000600,"nbf":1699999400,"iat":1700000000,"jti":"42","#,
                r#""access":[{"type":"repository","name":"library/nginx","actions":["pull","push"]}]}"#
            )
        );
    }

    #[test]
    fn test_header_omits_empty_optional_fields() {
        let header = TokenHeader::new(SigningAlgorithm::Es256, "");
        let json = serde_json::to_string(&header).unwrap();
        assert_eq!(json, r#"{"typ":"JWT","alg":"ES256"}"#);

        let header = TokenHeader::new(SigningAlgorithm::Rs256, "ABCD:EFGH");
        let json = serde_json::to_string(&header).unwrap();
        assert_eq!(json, r#"{"typ":"JWT","alg":"RS256","kid":"ABCD:EFGH"}"#);
    }

    #[test]
    fn test_algorithm_wire_names() {
        for alg in [
            SigningAlgorithm::Rs256,
            SigningAlgorithm::Es256,
            SigningAlgorithm::Es384,
            SigningAlgorithm::Es512,
        ] {
            let json = serde_json::to_string(&alg).unwrap();
            assert_eq!(json, format!("\"{}\"", alg.as_str()));
            assert_eq!(serde_json::from_str::<SigningAlgorithm>(&json).unwrap(), alg);
        }
        assert_eq!(SigningAlgorithm::Es512.to_string(), "ES512");
        assert!(serde_json::from_str::<SigningAlgorithm>("\"HS256\"").is_err());
    }

    #[test]
    fn test_token_response_from_claims() {
        let response = TokenResponse::new("a.b.c".into(), &sample_claims());
        assert_eq!(response.access_token, "a.b.c");
        assert_eq!(response.expires_in, 600);
        assert_eq!(response.issued_at.timestamp(), 1_700_000_000);
    }
}
