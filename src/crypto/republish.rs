// ABOUTME: Best-effort republishing of signing key material for the registry backend
// ABOUTME: Writes the private key and certificate to their configured paths and reports the outcome
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use registry_token_core::constants::{config_keys, file_modes};
use registry_token_core::errors::{AppError, AppResult};

use crate::config::ConfigStore;

/// Which files a republish pass wrote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepublishReport {
    /// Private key written to the configured key path
    pub key_written: bool,
    /// Certificate written to the configured cert path
    pub cert_written: bool,
}

impl RepublishReport {
    /// Both files were written
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.key_written && self.cert_written
    }
}

/// Overwrite `path` with `content` and apply `mode` on Unix
///
/// # Errors
///
/// Returns `Storage` if the file cannot be written or its mode set
pub fn write_key_material(path: &Path, content: &str, mode: u32) -> AppResult<()> {
    fs::write(path, content).map_err(|e| {
        AppError::storage(format!("failed to write {}", path.display())).with_source(e)
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(|e| {
            AppError::storage(format!("failed to set mode on {}", path.display())).with_source(e)
        })?;
    }
    #[cfg(not(unix))]
    let _ = mode;

    Ok(())
}

/// Republish key material to the paths configured in `store`
///
/// The key path receives the private key blob and the cert path receives the
/// certificate blob. Failures never propagate: each one is logged and
/// reflected in the returned report.
#[must_use]
pub fn republish_key_material<S: ConfigStore + ?Sized>(
    store: &S,
    key_pem: &str,
    cert_pem: &str,
) -> RepublishReport {
    RepublishReport {
        key_written: publish_one(
            store,
            config_keys::TOKEN_KEY_PATH,
            key_pem,
            file_modes::PRIVATE_KEY,
        ),
        cert_written: publish_one(
            store,
            config_keys::TOKEN_CERT_PATH,
            cert_pem,
            file_modes::CERTIFICATE,
        ),
    }
}

fn publish_one<S: ConfigStore + ?Sized>(
    store: &S,
    path_key: &str,
    content: &str,
    mode: u32,
) -> bool {
    let path = match store.get_optional_string(path_key) {
        Ok(Some(path)) => path,
        Ok(None) => {
            warn!(config.key = path_key, "Republish path not configured, skipping");
            return false;
        }
        Err(e) => {
            warn!(config.key = path_key, error = %e, "Failed to read republish path");
            return false;
        }
    };

    match write_key_material(Path::new(&path), content, mode) {
        Ok(()) => {
            debug!(config.key = path_key, path = %path, "Republished key material");
            true
        }
        Err(e) => {
            warn!(
                config.key = path_key,
                path = %path,
                error = %e,
                "Failed to republish key material for registry backend"
            );
            false
        }
    }
}
