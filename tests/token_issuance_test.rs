// ABOUTME: Integration tests for the registry token issuance pipeline
// ABOUTME: Checks encoding, claim windows, determinism and independent signature verification
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use registry_token_auth::{
    constants::config_keys,
    errors::ErrorCode,
    models::{AccessGrant, ClaimSet},
    token::{TokenIssuer, TokenRequest},
};
use std::fs;

fn nginx_request() -> TokenRequest {
    TokenRequest::new(
        "alice",
        "registry.example.com",
        [AccessGrant::new("repository", "library/nginx", ["push", "pull"])],
    )
}

fn segment_json(segment: &str) -> serde_json::Value {
    serde_json::from_slice(&URL_SAFE_NO_PAD.decode(segment).unwrap()).unwrap()
}

#[test]
fn test_token_has_three_unpadded_segments() {
    let issuer = TokenIssuer::new(common::store_for("rsa_pkcs1.key", "rsa.crt"));
    let token = issuer
        .issue_token(
            "alice",
            "registry.example.com",
            [AccessGrant::new("repository", "library/nginx", ["pull"])],
        )
        .unwrap();

    let segments: Vec<&str> = token.split('.').collect();
    assert_eq!(segments.len(), 3);
    for segment in segments {
        assert!(!segment.is_empty());
        assert!(!segment.contains('='));
        assert!(URL_SAFE_NO_PAD.decode(segment).is_ok());
    }
}

#[test]
fn test_header_and_claims_layout() {
    let issuer = TokenIssuer::new(common::store_for("rsa_pkcs1.key", "rsa.crt"));
    let mut rng = ChaCha20Rng::seed_from_u64(42);
    let issued = issuer
        .issue_with(&nginx_request(), common::fixed_now(), &mut rng)
        .unwrap();

    let segments: Vec<&str> = issued.token.split('.').collect();
    let header = URL_SAFE_NO_PAD.decode(segments[0]).unwrap();
    assert_eq!(
        String::from_utf8(header).unwrap(),
        format!(
            r#"{{"typ":"JWT","alg":"RS256","kid":"{}"}}"#,
            common::RSA_KEY_ID
        )
    );

    let claims = segment_json(segments[1]);
    let t = 1_700_000_000_i64;
    assert_eq!(claims["iss"], common::TEST_ISSUER);
    assert_eq!(claims["sub"], "alice");
    assert_eq!(claims["aud"], "registry.example.com");
    assert_eq!(claims["nbf"], t - common::TEST_VALIDITY_SECS);
    assert_eq!(claims["iat"], t);
    assert_eq!(claims["exp"], t + common::TEST_VALIDITY_SECS);
    assert_eq!(
        claims["access"],
        serde_json::json!([{
            "type": "repository",
            "name": "library/nginx",
            "actions": ["pull", "push"]
        }])
    );

    let jti: u64 = claims["jti"].as_str().unwrap().parse().unwrap();
    assert!(i64::try_from(jti).is_ok());
    assert_eq!(issued.claims.jwt_id, jti.to_string());
}

#[test]
fn test_null_actions_encode_as_empty_list() {
    let issuer = TokenIssuer::new(common::store_for("ec256_sec1.key", "ec256.crt"));
    let request = TokenRequest::new(
        "bob",
        "registry.example.com",
        [
            AccessGrant::without_actions("repository", "team/app"),
            AccessGrant::new("registry", "catalog", ["*"]),
        ],
    );
    let issued = issuer.issue(&request).unwrap();

    let claims_segment = issued.token.split('.').nth(1).unwrap();
    let raw = String::from_utf8(URL_SAFE_NO_PAD.decode(claims_segment).unwrap()).unwrap();
    assert!(raw.contains(r#"{"type":"repository","name":"team/app","actions":[]}"#));
    assert!(!raw.contains("null"));
}

#[test]
fn test_same_instant_and_seed_give_identical_tokens() {
    let issuer = TokenIssuer::new(common::store_for("rsa_pkcs8.key", "rsa.crt"));

    let first = issuer
        .issue_with(
            &nginx_request(),
            common::fixed_now(),
            &mut ChaCha20Rng::seed_from_u64(7),
        )
        .unwrap();
    let second = issuer
        .issue_with(
            &nginx_request(),
            common::fixed_now(),
            &mut ChaCha20Rng::seed_from_u64(7),
        )
        .unwrap();
    let third = issuer
        .issue_with(
            &nginx_request(),
            common::fixed_now(),
            &mut ChaCha20Rng::seed_from_u64(8),
        )
        .unwrap();

    assert_eq!(first.token, second.token);
    assert_ne!(first.claims.jwt_id, third.claims.jwt_id);
}

fn verify(token: &str, public_pem: &str, algorithm: Algorithm) -> ClaimSet {
    let key = match algorithm {
        Algorithm::RS256 => DecodingKey::from_rsa_pem(public_pem.as_bytes()).unwrap(),
        _ => DecodingKey::from_ec_pem(public_pem.as_bytes()).unwrap(),
    };
    let mut validation = Validation::new(algorithm);
    validation.set_audience(&["registry.example.com"]);
    validation.set_issuer(&[common::TEST_ISSUER]);
    decode::<ClaimSet>(token, &key, &validation).unwrap().claims
}

#[test]
fn test_tokens_verify_against_certificate_public_key() {
    let cases = [
        ("rsa_pkcs1.key", "rsa.crt", "rsa.pub", Algorithm::RS256, common::RSA_KEY_ID),
        ("rsa_pkcs8.key", "rsa.crt", "rsa.pub", Algorithm::RS256, common::RSA_KEY_ID),
        ("ec256_sec1.key", "ec256.crt", "ec256.pub", Algorithm::ES256, common::EC256_KEY_ID),
        ("ec256_pkcs8.key", "ec256.crt", "ec256.pub", Algorithm::ES256, common::EC256_KEY_ID),
        ("ec384_sec1.key", "ec384.crt", "ec384.pub", Algorithm::ES384, common::EC384_KEY_ID),
    ];

    for (key, cert, public, algorithm, key_id) in cases {
        let issuer = TokenIssuer::new(common::store_for(key, cert));
        let issued = issuer.issue(&nginx_request()).unwrap();

        let header = decode_header(&issued.token).unwrap();
        assert_eq!(header.alg, algorithm, "{key}");
        assert_eq!(header.kid.as_deref(), Some(key_id), "{key}");

        let claims = verify(&issued.token, &common::fixture(public), algorithm);
        assert_eq!(claims, issued.claims, "{key}");
        assert_eq!(claims.access[0].actions, ["pull", "push"]);
    }
}

#[test]
fn test_p521_tokens_verify_against_certificate_public_key() {
    use p521::ecdsa::{Signature, VerifyingKey};
    use p521::pkcs8::DecodePublicKey;
    use rsa::signature::Verifier;

    let public = p521::PublicKey::from_public_key_pem(&common::fixture("ec521.pub")).unwrap();
    let verifying_key = VerifyingKey::from_sec1_bytes(&public.to_sec1_bytes()).unwrap();

    for key in ["ec521_sec1.key", "ec521_pkcs8.key"] {
        let issuer = TokenIssuer::new(common::store_for(key, "ec521.crt"));
        let issued = issuer.issue(&nginx_request()).unwrap();

        let segments: Vec<&str> = issued.token.split('.').collect();
        let header = segment_json(segments[0]);
        assert_eq!(header["alg"], "ES512", "{key}");
        assert_eq!(header["kid"], common::EC521_KEY_ID, "{key}");

        let signature = URL_SAFE_NO_PAD.decode(segments[2]).unwrap();
        assert_eq!(signature.len(), 132, "{key}");
        let signature = Signature::from_slice(&signature).unwrap();
        let signing_input = format!("{}.{}", segments[0], segments[1]);
        assert!(
            verifying_key.verify(signing_input.as_bytes(), &signature).is_ok(),
            "{key}"
        );

        let claims: ClaimSet = serde_json::from_value(segment_json(segments[1])).unwrap();
        assert_eq!(claims, issued.claims, "{key}");
    }
}

#[test]
fn test_missing_signing_key_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let key_path = dir.path().join("token.key");
    let cert_path = dir.path().join("token.crt");

    let mut store = common::store_for("rsa_pkcs1.key", "rsa.crt")
        .with(config_keys::TOKEN_KEY_PATH, key_path.to_string_lossy())
        .with(config_keys::TOKEN_CERT_PATH, cert_path.to_string_lossy());
    store.remove(config_keys::TOKEN_KEY);

    let err = TokenIssuer::new(&store)
        .issue_token("alice", "registry.example.com", Vec::new())
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::ConfigUnavailable);
    assert!(!key_path.exists());
    assert!(!cert_path.exists());
}

#[test]
fn test_invalid_expiration_is_rejected_before_republish() {
    let dir = tempfile::tempdir().unwrap();
    let key_path = dir.path().join("token.key");

    for expiration in ["0", "-30", "soon"] {
        let store = common::store_for("rsa_pkcs1.key", "rsa.crt")
            .with(config_keys::TOKEN_EXPIRATION, expiration)
            .with(config_keys::TOKEN_KEY_PATH, key_path.to_string_lossy());

        let err = TokenIssuer::new(store).issue(&nginx_request()).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigInvalid, "{expiration}");
    }
    assert!(!key_path.exists());
}

#[test]
fn test_issuance_republishes_key_material() {
    let dir = tempfile::tempdir().unwrap();
    let key_path = dir.path().join("token.key");
    let cert_path = dir.path().join("token.crt");
    let store = common::store_for("ec384_sec1.key", "ec384.crt")
        .with(config_keys::TOKEN_KEY_PATH, key_path.to_string_lossy())
        .with(config_keys::TOKEN_CERT_PATH, cert_path.to_string_lossy());

    TokenIssuer::new(&store).issue(&nginx_request()).unwrap();

    assert_eq!(
        fs::read_to_string(&key_path).unwrap(),
        common::fixture("ec384_sec1.key")
    );
    assert_eq!(
        fs::read_to_string(&cert_path).unwrap(),
        common::fixture("ec384.crt")
    );
}

#[test]
fn test_unwritable_republish_path_does_not_fail_issuance() {
    let dir = tempfile::tempdir().unwrap();
    let store = common::store_for("ec256_pkcs8.key", "ec256.crt").with(
        config_keys::TOKEN_KEY_PATH,
        dir.path().join("absent").join("token.key").to_string_lossy(),
    );

    let token = TokenIssuer::new(store)
        .issue_token("alice", "registry.example.com", Vec::new())
        .unwrap();
    assert_eq!(token.split('.').count(), 3);
}

#[test]
fn test_response_body() {
    let issuer = TokenIssuer::new(common::store_for("rsa_pkcs1.key", "rsa.crt"));
    let mut rng = ChaCha20Rng::seed_from_u64(1);
    let issued = issuer
        .issue_with(&nginx_request(), common::fixed_now(), &mut rng)
        .unwrap();
    let token = issued.token.clone();

    let body = serde_json::to_value(issued.into_response()).unwrap();
    assert_eq!(body["token"], token.as_str());
    assert_eq!(body["access_token"], token.as_str());
    assert_eq!(body["expires_in"], common::TEST_VALIDITY_SECS);
    assert_eq!(body["issued_at"], "2023-11-14T22:13:20Z");
}

#[test]
fn test_store_shared_between_threads() {
    let store = std::sync::Arc::new(common::store_for("ec256_sec1.key", "ec256.crt"));
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let store = std::sync::Arc::clone(&store);
            std::thread::spawn(move || {
                TokenIssuer::new(store)
                    .issue_token(&format!("user{i}"), "registry.example.com", Vec::new())
                    .unwrap()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().split('.').count(), 3);
    }
}
