// ABOUTME: Configuration management module for the token authority
// ABOUTME: Exposes the injectable configuration store and typed token settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//! Configuration module
//!
//! Configuration is never looked up ambiently. Components receive a
//! [`ConfigStore`] at construction, which keeps the issuance pipeline
//! testable without a live configuration backend.
//!
//! - **Store**: string / int64 lookups by key (environment or in-memory)
//! - **Token**: typed issuer and validity settings read from a store

/// Key-value configuration stores
pub mod store;
/// Typed token issuance settings
pub mod token;

pub use store::{ConfigStore, EnvConfigStore, LayeredConfigStore, MemoryConfigStore};
pub use token::TokenConfig;
