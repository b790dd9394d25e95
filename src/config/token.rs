// ABOUTME: Typed token issuance settings resolved from a configuration store
// ABOUTME: Validates the issuer name and the token validity duration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::Duration;
use registry_token_core::constants::config_keys;
use registry_token_core::errors::{AppError, AppResult};

use super::store::ConfigStore;

/// Issuer and validity settings for claim sets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenConfig {
    /// Value of the `iss` claim
    pub issuer: String,
    /// Distance between `iat` and `exp`
    pub validity: Duration,
}

impl TokenConfig {
    /// Read token settings from `store`
    ///
    /// # Errors
    ///
    /// Returns `ConfigUnavailable` when the issuer or expiration key is
    /// missing and `ConfigInvalid` when the expiration is not a positive
    /// number of seconds
    pub fn from_store<S: ConfigStore + ?Sized>(store: &S) -> AppResult<Self> {
        let issuer = store.get_string(config_keys::TOKEN_ISSUER)?;
        let seconds = store.get_i64(config_keys::TOKEN_EXPIRATION)?;
        if seconds <= 0 {
            return Err(AppError::config_invalid(format!(
                "{} must be a positive number of seconds, got {seconds}",
                config_keys::TOKEN_EXPIRATION
            )));
        }
        let validity = Duration::try_seconds(seconds).ok_or_else(|| {
            AppError::config_invalid(format!(
                "{} is out of range: {seconds}",
                config_keys::TOKEN_EXPIRATION
            ))
        })?;
        Ok(Self { issuer, validity })
    }
}
