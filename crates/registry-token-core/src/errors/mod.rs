// ABOUTME: Unified error handling for token issuance with stable error codes
// ABOUTME: Defines ErrorCode, AppError and the AppResult alias used across the workspace
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling System
//!
//! Every failure in the issuance pipeline is surfaced as a single [`AppError`]
//! carrying an [`ErrorCode`], a human-readable message and an optional source
//! error for the cause chain. None of these errors are retried internally;
//! retry policy belongs to the caller.

use std::error::Error as StdError;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Standard error codes used throughout the token authority
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    // Configuration (1000-1999)
    /// A required configuration key is missing or unreadable
    #[serde(rename = "CONFIG_UNAVAILABLE")]
    ConfigUnavailable = 1000,
    /// A configuration value is present but unusable
    #[serde(rename = "CONFIG_INVALID")]
    ConfigInvalid = 1001,

    // Key material (2000-2999)
    /// Certificate and key blobs do not form a usable pair
    #[serde(rename = "KEY_LOAD_ERROR")]
    KeyLoad = 2000,
    /// The leading certificate is not valid DER
    #[serde(rename = "CERT_PARSE_ERROR")]
    CertParse = 2001,
    /// The key type is not supported for token signing
    #[serde(rename = "KEY_CONVERSION_ERROR")]
    KeyConversion = 2002,

    // Signing and encoding (3000-3999)
    /// The signing operation failed
    #[serde(rename = "SIGNING_ERROR")]
    Signing = 3000,
    /// The probe algorithm differs from the payload signature algorithm
    #[serde(rename = "ALGORITHM_MISMATCH")]
    AlgorithmMismatch = 3001,
    /// Header or claim serialization failed
    #[serde(rename = "ENCODING_ERROR")]
    Encoding = 3002,

    // Input and storage (4000-4999)
    /// Caller supplied malformed input (e.g. an unparsable scope)
    #[serde(rename = "INVALID_INPUT")]
    InvalidInput = 4000,
    /// Writing key material to the filesystem failed
    #[serde(rename = "STORAGE_ERROR")]
    Storage = 4001,
}

impl ErrorCode {
    /// Get a short description of this error class
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::ConfigUnavailable => "Required configuration is unavailable",
            Self::ConfigInvalid => "Configuration is invalid",
            Self::KeyLoad => "Failed to load signing key pair",
            Self::CertParse => "Failed to parse signing certificate",
            Self::KeyConversion => "Signing key type is not supported",
            Self::Signing => "Failed to sign token",
            Self::AlgorithmMismatch => "Signing algorithm changed between probe and payload",
            Self::Encoding => "Failed to encode token",
            Self::InvalidInput => "The provided input is invalid",
            Self::Storage => "Failed to write key material",
        }
    }
}

/// Unified error type for the token authority
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn StdError + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Add a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Required configuration key is missing or unreadable
    #[must_use]
    pub fn config_unavailable(key: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ConfigUnavailable,
            format!("configuration key '{}' is not set", key.into()),
        )
    }

    /// Configuration value present but unusable
    #[must_use]
    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalid, message)
    }

    /// Certificate/key blobs do not form a valid pair
    #[must_use]
    pub fn key_load(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::KeyLoad, message)
    }

    /// Malformed certificate DER
    #[must_use]
    pub fn cert_parse(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::CertParse, message)
    }

    /// Unsupported key type or curve
    #[must_use]
    pub fn key_conversion(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::KeyConversion, message)
    }

    /// Signing operation failure
    #[must_use]
    pub fn signing(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Signing, message)
    }

    /// Probe and payload algorithms disagree
    #[must_use]
    pub fn algorithm_mismatch(probe: impl fmt::Display, payload: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::AlgorithmMismatch,
            format!("header advertises {probe} but payload was signed with {payload}"),
        )
    }

    /// Header or claim serialization failure
    #[must_use]
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Encoding, message)
    }

    /// Invalid caller input
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Filesystem write failure
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Storage, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::encoding(format!("JSON serialization failed: {error}")).with_source(error)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;
