// ABOUTME: Shared test utilities and fixture loaders for integration tests
// ABOUTME: Builds in-memory configuration stores around the PEM fixtures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `registry_token_auth`

use chrono::{DateTime, Utc};
use registry_token_auth::{config::MemoryConfigStore, constants::config_keys};
use std::fs;
use std::path::PathBuf;
use std::sync::Once;

static INIT_LOGGER: Once = Once::new();

/// Issuer name configured by [`store_for`]
pub const TEST_ISSUER: &str = "registry-token-issuer";
/// Validity configured by [`store_for`]
pub const TEST_VALIDITY_SECS: i64 = 600;

/// Key identifiers computed independently from the fixture certificates
pub const RSA_KEY_ID: &str = "2I37:SLRW:BG7R:JB3I:ABTJ:WSDC:FUQL:QNHQ:IDPC:HFEP:QMCC:JU7G";
pub const EC256_KEY_ID: &str = "6MRH:5QZJ:VXCH:WC6A:5QTE:KPOO:AGKN:4TEB:43LP:FJHE:ZKCN:HCNZ";
pub const EC384_KEY_ID: &str = "64IC:NMF5:4AQS:ZBLV:SIUD:OU2F:UCMZ:UOYW:5SNL:M2XS:ZFKP:GH3Z";
pub const EC521_KEY_ID: &str = "4SUA:AVYE:2TSN:LY3W:AD4L:M3AW:JNBA:PBDU:7S52:ODLU:RUVW:ZWCI";

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        let _ = tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .try_init();
    });
}

/// Path of a file under `tests/fixtures`
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Contents of a fixture file
pub fn fixture(name: &str) -> String {
    fs::read_to_string(fixture_path(name)).unwrap()
}

/// Store with issuer, validity, and the given key and certificate fixtures
pub fn store_for(key_fixture: &str, cert_fixture: &str) -> MemoryConfigStore {
    init_test_logging();
    MemoryConfigStore::new()
        .with(config_keys::TOKEN_ISSUER, TEST_ISSUER)
        .with(config_keys::TOKEN_EXPIRATION, TEST_VALIDITY_SECS.to_string())
        .with(config_keys::TOKEN_KEY, fixture(key_fixture))
        .with(config_keys::TOKEN_CERT, fixture(cert_fixture))
}

/// A fixed issuance instant
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}
