// ABOUTME: Token signing seam with the probe-then-sign algorithm consistency protocol
// ABOUTME: Signs with RS256, ES256, ES384 or ES512 depending on the loaded private key
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Token signing
//!
//! The algorithm advertised in a token header has to be fixed before the
//! payload it is concatenated with exists. Issuance therefore runs two
//! phases against a [`TokenSigner`]:
//!
//! 1. [`probe`] signs a fixed throwaway input to learn the algorithm
//! 2. [`sign_payload`] signs the real input and rejects the signature if
//!    its algorithm differs from the probe

use rsa::pkcs1v15;
use rsa::signature::{SignatureEncoding, Signer};
use sha2::Sha256;
use tracing::error;

use registry_token_core::constants::token::PROBE_PAYLOAD;
use registry_token_core::errors::{AppError, AppResult};
use registry_token_core::models::SigningAlgorithm;

use super::keys::PrivateKey;

/// Raw signature bytes and the algorithm that produced them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureOutput {
    /// Signature bytes (PKCS#1 v1.5 for RSA, fixed-width `r || s` for ECDSA)
    pub bytes: Vec<u8>,
    /// Algorithm used
    pub algorithm: SigningAlgorithm,
}

/// Anything able to sign an arbitrary byte string
pub trait TokenSigner {
    /// Sign `payload`, reporting the algorithm actually applied
    ///
    /// # Errors
    ///
    /// Returns `Signing` if the underlying key cannot produce a signature
    fn sign(&self, payload: &[u8]) -> AppResult<SignatureOutput>;
}

impl TokenSigner for PrivateKey {
    fn sign(&self, payload: &[u8]) -> AppResult<SignatureOutput> {
        let signing_error =
            |e: rsa::signature::Error| AppError::signing(format!("signature failed: {e}"));

        let bytes = match self {
            Self::Rsa(key) => {
                let signing_key = pkcs1v15::SigningKey::<Sha256>::new((**key).clone());
                signing_key
                    .try_sign(payload)
                    .map_err(signing_error)?
                    .to_vec()
            }
            Self::P256(key) => {
                let signing_key = p256::ecdsa::SigningKey::from(key);
                let signature: p256::ecdsa::Signature =
                    signing_key.try_sign(payload).map_err(signing_error)?;
                signature.to_bytes().to_vec()
            }
            Self::P384(key) => {
                let signing_key = p384::ecdsa::SigningKey::from(key);
                let signature: p384::ecdsa::Signature =
                    signing_key.try_sign(payload).map_err(signing_error)?;
                signature.to_bytes().to_vec()
            }
            Self::P521(key) => {
                let signing_key = p521::ecdsa::SigningKey::from_bytes(&key.to_bytes())
                    .map_err(signing_error)?;
                let signature: p521::ecdsa::Signature =
                    signing_key.try_sign(payload).map_err(signing_error)?;
                signature.to_bytes().to_vec()
            }
        };

        Ok(SignatureOutput {
            bytes,
            algorithm: self.algorithm(),
        })
    }
}

/// Learn which algorithm `signer` produces by signing a throwaway input
///
/// # Errors
///
/// Returns `Signing` if the probe signature fails
pub fn probe<S: TokenSigner + ?Sized>(signer: &S) -> AppResult<SigningAlgorithm> {
    Ok(signer.sign(PROBE_PAYLOAD)?.algorithm)
}

/// Sign `payload` and check the algorithm against the probed one
///
/// # Errors
///
/// Returns `Signing` if signing fails and `AlgorithmMismatch` if the
/// signature was produced with a different algorithm than `expected`
pub fn sign_payload<S: TokenSigner + ?Sized>(
    signer: &S,
    payload: &[u8],
    expected: SigningAlgorithm,
) -> AppResult<Vec<u8>> {
    let output = signer.sign(payload)?;
    if output.algorithm != expected {
        error!(
            probe.algorithm = %expected,
            payload.algorithm = %output.algorithm,
            "Signing algorithm changed between probe and payload signature"
        );
        return Err(AppError::algorithm_mismatch(expected, output.algorithm));
    }
    Ok(output.bytes)
}
