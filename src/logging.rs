// ABOUTME: Logging configuration and structured logging setup for the token authority
// ABOUTME: Configures level filters and output format, always writing to stderr
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Structured logging configuration
//!
//! Logs go to stderr so that the CLI's stdout only carries token responses.

use anyhow::Result;
use registry_token_core::constants::service_names;
use std::env;
use std::io;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive
    pub level: String,
    /// Output format (json, pretty, compact)
    pub format: LogFormat,
    /// Include source file and line numbers
    pub include_location: bool,
    /// Service name for structured logging
    pub service_name: String,
    /// Service version
    pub service_version: String,
}

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// `JSON` format for log collectors
    Json,
    /// Pretty format for development
    Pretty,
    /// Compact single-line format
    Compact,
}

impl LogFormat {
    /// Format named by `LOG_FORMAT`, pretty for anything unrecognized
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            "compact" => Self::Compact,
            _ => Self::Pretty,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Compact,
            include_location: false,
            service_name: service_names::REGISTRY_TOKEN_AUTHORITY.into(),
            service_version: env!("CARGO_PKG_VERSION").to_owned(),
        }
    }
}

impl LoggingConfig {
    /// Create logging configuration from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            level: env::var("RUST_LOG").unwrap_or(defaults.level),
            format: env::var("LOG_FORMAT")
                .map_or(defaults.format, |name| LogFormat::from_name(&name)),
            include_location: env::var("LOG_INCLUDE_LOCATION")
                .is_ok_and(|v| v != "false" && v != "0"),
            service_name: env::var("SERVICE_NAME").unwrap_or(defaults.service_name),
            service_version: defaults.service_version,
        }
    }

    /// Initialize the global tracing subscriber
    ///
    /// # Errors
    ///
    /// Returns an error if a global subscriber is already installed
    pub fn init(&self) -> Result<()> {
        let env_filter = EnvFilter::try_new(&self.level)
            .unwrap_or_else(|_| EnvFilter::new("info"));
        let registry = tracing_subscriber::registry().with(env_filter);

        match self.format {
            LogFormat::Json => {
                let json_layer = fmt::layer()
                    .with_file(self.include_location)
                    .with_line_number(self.include_location)
                    .with_target(true)
                    .with_writer(io::stderr)
                    .json();
                registry.with(json_layer).try_init()?;
            }
            LogFormat::Pretty => {
                let pretty_layer = fmt::layer()
                    .with_file(self.include_location)
                    .with_line_number(self.include_location)
                    .with_target(true)
                    .with_writer(io::stderr);
                registry.with(pretty_layer).try_init()?;
            }
            LogFormat::Compact => {
                let compact_layer = fmt::layer()
                    .compact()
                    .with_file(self.include_location)
                    .with_line_number(self.include_location)
                    .with_target(false)
                    .with_writer(io::stderr);
                registry.with(compact_layer).try_init()?;
            }
        }

        info!(
            service.name = %self.service_name,
            service.version = %self.service_version,
            log.level = %self.level,
            log.format = ?self.format,
            "Logging initialized"
        );
        Ok(())
    }
}

/// Initialize logging from environment
///
/// # Errors
///
/// Returns an error if logging initialization fails
pub fn init_from_env() -> Result<()> {
    LoggingConfig::from_env().init()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_format_names() {
        assert_eq!(LogFormat::from_name("json"), LogFormat::Json);
        assert_eq!(LogFormat::from_name("COMPACT"), LogFormat::Compact);
        assert_eq!(LogFormat::from_name("anything"), LogFormat::Pretty);
    }

    #[test]
    #[serial]
    fn test_from_env() {
        env::set_var("RUST_LOG", "registry_token_auth=debug");
        env::set_var("LOG_FORMAT", "json");
        env::set_var("LOG_INCLUDE_LOCATION", "1");

        let config = LoggingConfig::from_env();

        env::remove_var("RUST_LOG");
        env::remove_var("LOG_FORMAT");
        env::remove_var("LOG_INCLUDE_LOCATION");

        assert_eq!(config.level, "registry_token_auth=debug");
        assert_eq!(config.format, LogFormat::Json);
        assert!(config.include_location);
        assert_eq!(config.service_name, service_names::REGISTRY_TOKEN_AUTHORITY);
    }

    #[test]
    #[serial]
    fn test_defaults_without_env() {
        env::remove_var("RUST_LOG");
        env::remove_var("LOG_FORMAT");
        env::remove_var("LOG_INCLUDE_LOCATION");

        assert_eq!(LoggingConfig::from_env(), LoggingConfig::default());
    }
}
