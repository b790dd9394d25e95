// ABOUTME: Cryptography module providing signing identities and token signatures
// ABOUTME: Centralizes key loading, key republishing and algorithm-consistent signing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Cryptographic key handling for the registry token authority

/// Key material loading and conversion
pub mod keys;
/// Best-effort republishing of key material for the registry backend
pub mod republish;
/// Probe-then-sign token signing protocol
pub mod signer;

pub use keys::{KeyProvider, PrivateKey, PublicKey, SigningIdentity};
pub use republish::{republish_key_material, write_key_material, RepublishReport};
pub use signer::{probe, sign_payload, SignatureOutput, TokenSigner};
