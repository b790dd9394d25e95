// ABOUTME: Registry token module covering claims, compact encoding, scopes and issuance
// ABOUTME: Exposes the issuance pipeline used by the CLI and library callers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Registry bearer tokens
//!
//! A token is `b64url(header) "." b64url(claims) "." b64url(signature)`
//! with every segment unpadded. The registry backend checks the signature
//! with the republished certificate and then trusts the `access` claim.

/// Claim set construction
pub mod claims;
/// Compact three-segment encoding
pub mod encoder;
/// Issuance pipeline
pub mod issuer;
/// Registry scope parsing
pub mod scope;

pub use claims::{generate_jwt_id, ClaimSetBuilder};
pub use encoder::{decode_unverified, encode, signing_input};
pub use issuer::{sign_token, IssuedToken, TokenIssuer, TokenRequest};
pub use scope::{parse_scope_list, parse_scopes};
