// ABOUTME: Main library entry point for the registry token authority
// ABOUTME: Issues signed bearer tokens that a container image registry verifies
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Registry Token Authority
//!
//! External authentication authority for a container image registry. A
//! client that has been authenticated and authorized elsewhere receives a
//! short-lived token granting actions on named resources. The registry
//! backend verifies the token signature with the certificate this crate
//! republishes and then trusts the `access` claim.
//!
//! ## Architecture
//!
//! - **Config**: injected key/value store for settings and key material
//! - **Crypto**: signing identity loading, key republishing, signing
//! - **Token**: claim sets, compact encoding, scopes and the issuance pipeline
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use registry_token_auth::config::EnvConfigStore;
//! use registry_token_auth::errors::AppResult;
//! use registry_token_auth::models::AccessGrant;
//! use registry_token_auth::token::TokenIssuer;
//!
//! fn main() -> AppResult<()> {
//!     let issuer = TokenIssuer::new(EnvConfigStore::new());
//!     let token = issuer.issue_token(
//!         "alice",
//!         "registry.example.com",
//!         [AccessGrant::new("repository", "library/nginx", ["pull"])],
//!     )?;
//!     println!("{token}");
//!     Ok(())
//! }
//! ```

/// Configuration stores and typed token settings
pub mod config;

/// Signing identities, key republishing and signatures
pub mod crypto;

/// Structured logging setup
pub mod logging;

/// Token construction, encoding and issuance
pub mod token;

pub use registry_token_core::{constants, errors, models};
