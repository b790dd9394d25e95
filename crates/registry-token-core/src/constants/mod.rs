// ABOUTME: Constants module grouping configuration keys and token wire values
// ABOUTME: Pure data constants shared by the issuance pipeline and its binaries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants module
//!
//! Constants are grouped into logical domains rather than being in a single
//! flat namespace.

/// Keys looked up in the configuration store
pub mod config_keys {
    /// PEM-encoded private key used to sign tokens
    pub const TOKEN_KEY: &str = "registry_auth_token_key";
    /// PEM-encoded certificate matching [`TOKEN_KEY`]
    pub const TOKEN_CERT: &str = "registry_auth_token_cert";
    /// Path the private key is republished to for the registry backend
    pub const TOKEN_KEY_PATH: &str = "registry_auth_token_key_path";
    /// Path the certificate is republished to for the registry backend
    pub const TOKEN_CERT_PATH: &str = "registry_auth_token_cert_path";
    /// Issuer name placed in the `iss` claim
    pub const TOKEN_ISSUER: &str = "registry_token_issuer";
    /// Token validity in seconds
    pub const TOKEN_EXPIRATION: &str = "registry_token_expiration";
}

/// Token wire format constants
pub mod token {
    /// Separator between the three token segments
    pub const SEPARATOR: char = '.';
    /// Value of the `typ` header field
    pub const TYPE_JWT: &str = "JWT";
    /// Fixed input signed to discover the key's algorithm
    pub const PROBE_PAYLOAD: &[u8] = b"dummy";
    /// Number of bytes of the SHA-256 key fingerprint kept in the key id
    pub const KEY_ID_FINGERPRINT_BYTES: usize = 30;
    /// Characters per `:`-separated key id group
    pub const KEY_ID_GROUP_LEN: usize = 4;
}

/// Filesystem modes used when republishing key material
pub mod file_modes {
    /// Private key file (owner read/write)
    pub const PRIVATE_KEY: u32 = 0o600;
    /// Certificate file (world readable)
    pub const CERTIFICATE: u32 = 0o644;
}

/// Service identifiers used in logs
pub mod service_names {
    /// Name reported by the token authority in structured logs
    pub const REGISTRY_TOKEN_AUTHORITY: &str = "registry-token-authority";
}
