// ABOUTME: Configuration store abstraction with environment and in-memory implementations
// ABOUTME: Lookup failures surface as ConfigUnavailable, unparsable numbers as ConfigInvalid
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::HashMap;
use std::env;
use std::sync::Arc;

use registry_token_core::errors::{AppError, AppResult, ErrorCode};

/// Read-only key-value configuration capability
///
/// Implementations must be safe to share between threads; issuance calls
/// may run concurrently against the same store.
pub trait ConfigStore: Send + Sync {
    /// Look up a string value
    ///
    /// # Errors
    ///
    /// Returns `ConfigUnavailable` if the key is missing or unreadable
    fn get_string(&self, key: &str) -> AppResult<String>;

    /// Look up an integer value
    ///
    /// # Errors
    ///
    /// Returns `ConfigUnavailable` if the key is missing and `ConfigInvalid`
    /// if the value is not a base-10 `i64`
    fn get_i64(&self, key: &str) -> AppResult<i64> {
        let raw = self.get_string(key)?;
        raw.trim().parse::<i64>().map_err(|e| {
            AppError::config_invalid(format!("configuration key '{key}' is not an integer: {raw}"))
                .with_source(e)
        })
    }

    /// Look up a value whose absence is tolerated
    ///
    /// # Errors
    ///
    /// Returns any failure other than `ConfigUnavailable`
    fn get_optional_string(&self, key: &str) -> AppResult<Option<String>> {
        match self.get_string(key) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.code == ErrorCode::ConfigUnavailable => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl<T: ConfigStore + ?Sized> ConfigStore for &T {
    fn get_string(&self, key: &str) -> AppResult<String> {
        (**self).get_string(key)
    }
}

impl<T: ConfigStore + ?Sized> ConfigStore for Arc<T> {
    fn get_string(&self, key: &str) -> AppResult<String> {
        (**self).get_string(key)
    }
}

/// Configuration store backed by process environment variables
///
/// A key maps to its upper-cased name, optionally prefixed:
/// `registry_token_issuer` reads `REGISTRY_TOKEN_ISSUER`, or
/// `<PREFIX>_REGISTRY_TOKEN_ISSUER` when a prefix is set. Empty values
/// count as missing.
#[derive(Debug, Clone, Default)]
pub struct EnvConfigStore {
    prefix: Option<String>,
}

impl EnvConfigStore {
    /// Store reading unprefixed variables
    #[must_use]
    pub const fn new() -> Self {
        Self { prefix: None }
    }

    /// Store reading variables under `prefix`
    #[must_use]
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }

    /// Environment variable name for a configuration key
    #[must_use]
    pub fn var_name(&self, key: &str) -> String {
        let name = key.to_ascii_uppercase();
        match &self.prefix {
            Some(prefix) => format!("{}_{name}", prefix.to_ascii_uppercase()),
            None => name,
        }
    }
}

impl ConfigStore for EnvConfigStore {
    fn get_string(&self, key: &str) -> AppResult<String> {
        let var = self.var_name(key);
        match env::var(&var) {
            Ok(value) if !value.is_empty() => Ok(value),
            Ok(_) => Err(AppError::config_unavailable(key)),
            Err(env::VarError::NotPresent) => Err(AppError::config_unavailable(key)),
            Err(e @ env::VarError::NotUnicode(_)) => Err(AppError::new(
                ErrorCode::ConfigUnavailable,
                format!("environment variable {var} is not valid UTF-8"),
            )
            .with_source(e)),
        }
    }
}

/// In-memory configuration store
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigStore {
    values: HashMap<String, String>,
}

impl MemoryConfigStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Insert or replace a value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Remove a value, returning it if present
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }
}

impl ConfigStore for MemoryConfigStore {
    fn get_string(&self, key: &str) -> AppResult<String> {
        self.values
            .get(key)
            .cloned()
            .ok_or_else(|| AppError::config_unavailable(key))
    }
}

/// Store consulting `overrides` first and `fallback` for anything missing
#[derive(Debug, Clone, Default)]
pub struct LayeredConfigStore<S> {
    overrides: MemoryConfigStore,
    fallback: S,
}

impl<S: ConfigStore> LayeredConfigStore<S> {
    /// Layer `overrides` over `fallback`
    #[must_use]
    pub const fn new(overrides: MemoryConfigStore, fallback: S) -> Self {
        Self {
            overrides,
            fallback,
        }
    }
}

impl<S: ConfigStore> ConfigStore for LayeredConfigStore<S> {
    fn get_string(&self, key: &str) -> AppResult<String> {
        match self.overrides.get_string(key) {
            Err(e) if e.code == ErrorCode::ConfigUnavailable => self.fallback.get_string(key),
            found => found,
        }
    }
}
