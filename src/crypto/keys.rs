// ABOUTME: Signing identity resolution from certificate and private key PEM blobs
// ABOUTME: Parses, converts and pair-checks key material, then republishes it for the registry
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Key material for token signing
//!
//! The signing identity is loaded fresh on every issuance call: no key
//! material is cached between calls, so rotating the configured
//! certificate takes effect on the next token.

use base64::Engine;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::{
    DecodePrivateKey, DecodePublicKey, EncodePublicKey, ObjectIdentifier, PrivateKeyInfo,
    SubjectPublicKeyInfoRef,
};
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};
use x509_parser::pem::Pem;
use x509_parser::prelude::{FromDer, X509Certificate};
use zeroize::Zeroizing;

use registry_token_core::constants::{config_keys, token};
use registry_token_core::errors::{AppError, AppResult};
use registry_token_core::models::SigningAlgorithm;

use super::republish::{republish_key_material, RepublishReport};
use crate::config::ConfigStore;

const OID_RSA_ENCRYPTION: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");
const OID_EC_PUBLIC_KEY: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");
const OID_SECP256R1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.3.1.7");
const OID_SECP384R1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.34");
const OID_SECP521R1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.35");

const PEM_LABEL_CERTIFICATE: &str = "CERTIFICATE";
const PEM_LABEL_PRIVATE_KEY_SUFFIX: &str = "PRIVATE KEY";

/// Public half of a signing identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicKey {
    /// RSA public key
    Rsa(RsaPublicKey),
    /// NIST P-256 public key
    P256(p256::PublicKey),
    /// NIST P-384 public key
    P384(p384::PublicKey),
    /// NIST P-521 public key
    P521(p521::PublicKey),
}

impl PublicKey {
    /// Convert a DER `SubjectPublicKeyInfo`
    ///
    /// # Errors
    ///
    /// Returns `KeyConversion` for algorithms or curves that cannot sign tokens
    pub fn from_spki_der(der: &[u8]) -> AppResult<Self> {
        let spki = SubjectPublicKeyInfoRef::try_from(der)
            .map_err(|e| AppError::key_conversion(format!("invalid SubjectPublicKeyInfo: {e}")))?;
        let conversion_error = |e: rsa::pkcs8::spki::Error| {
            AppError::key_conversion(format!("failed to convert public key: {e}"))
        };

        match spki.algorithm.oid {
            OID_RSA_ENCRYPTION => RsaPublicKey::from_public_key_der(der)
                .map(Self::Rsa)
                .map_err(conversion_error),
            OID_EC_PUBLIC_KEY => match spki.algorithm.parameters_oid() {
                Ok(OID_SECP256R1) => p256::PublicKey::from_public_key_der(der)
                    .map(Self::P256)
                    .map_err(conversion_error),
                Ok(OID_SECP384R1) => p384::PublicKey::from_public_key_der(der)
                    .map(Self::P384)
                    .map_err(conversion_error),
                Ok(OID_SECP521R1) => p521::PublicKey::from_public_key_der(der)
                    .map(Self::P521)
                    .map_err(conversion_error),
                Ok(curve) => Err(AppError::key_conversion(format!(
                    "unsupported elliptic curve: {curve}"
                ))),
                Err(e) => Err(AppError::key_conversion(format!(
                    "elliptic curve public key without named curve: {e}"
                ))),
            },
            other => Err(AppError::key_conversion(format!(
                "unsupported public key algorithm: {other}"
            ))),
        }
    }

    /// DER `SubjectPublicKeyInfo` encoding
    ///
    /// # Errors
    ///
    /// Returns `KeyConversion` if the key cannot be encoded
    pub fn to_spki_der(&self) -> AppResult<Vec<u8>> {
        let document = match self {
            Self::Rsa(key) => key.to_public_key_der(),
            Self::P256(key) => key.to_public_key_der(),
            Self::P384(key) => key.to_public_key_der(),
            Self::P521(key) => key.to_public_key_der(),
        }
        .map_err(|e| AppError::key_conversion(format!("failed to encode public key: {e}")))?;
        Ok(document.as_bytes().to_vec())
    }

    /// Key identifier advertised in the token header
    ///
    /// SHA-256 of the DER public key, truncated to 30 bytes, base32 encoded
    /// and split into `:`-separated groups of four characters. This is the
    /// fingerprint the registry backend computes for its trusted keys.
    ///
    /// # Errors
    ///
    /// Returns `KeyConversion` if the key cannot be encoded
    pub fn key_id(&self) -> AppResult<String> {
        let digest = Sha256::digest(self.to_spki_der()?);
        Ok(key_id_encode(&digest[..token::KEY_ID_FINGERPRINT_BYTES]))
    }

    /// PEM `PUBLIC KEY` block
    ///
    /// # Errors
    ///
    /// Returns `KeyConversion` if the key cannot be encoded
    pub fn to_pem(&self) -> AppResult<String> {
        let body = base64::engine::general_purpose::STANDARD.encode(self.to_spki_der()?);
        let mut pem = String::from("-----BEGIN PUBLIC KEY-----\n");
        for line in body.as_bytes().chunks(64) {
            pem.push_str(&String::from_utf8_lossy(line));
            pem.push('\n');
        }
        pem.push_str("-----END PUBLIC KEY-----\n");
        Ok(pem)
    }
}

/// Private half of a signing identity
#[derive(Clone)]
pub enum PrivateKey {
    /// RSA private key
    Rsa(Box<RsaPrivateKey>),
    /// NIST P-256 secret key
    P256(p256::SecretKey),
    /// NIST P-384 secret key
    P384(p384::SecretKey),
    /// NIST P-521 secret key
    P521(p521::SecretKey),
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            Self::Rsa(_) => "Rsa",
            Self::P256(_) => "P256",
            Self::P384(_) => "P384",
            Self::P521(_) => "P521",
        };
        f.debug_tuple(kind).field(&"<redacted>").finish()
    }
}

impl PrivateKey {
    /// Decode private key DER in PKCS#1, PKCS#8 or SEC1 form
    ///
    /// # Errors
    ///
    /// Returns `KeyLoad` for undecodable DER and `KeyConversion` for well-formed
    /// PKCS#8 keys of an unsupported algorithm or curve
    pub fn from_der(der: &[u8]) -> AppResult<Self> {
        if let Ok(key) = RsaPrivateKey::from_pkcs1_der(der) {
            return Ok(Self::Rsa(Box::new(key)));
        }
        if let Ok(info) = PrivateKeyInfo::try_from(der) {
            return Self::from_pkcs8(&info, der);
        }
        if let Ok(key) = p256::SecretKey::from_sec1_der(der) {
            return Ok(Self::P256(key));
        }
        if let Ok(key) = p384::SecretKey::from_sec1_der(der) {
            return Ok(Self::P384(key));
        }
        if let Ok(key) = p521::SecretKey::from_sec1_der(der) {
            return Ok(Self::P521(key));
        }
        Err(AppError::key_load(
            "private key is not PKCS#1, PKCS#8 or SEC1 (P-256/P-384/P-521) DER",
        ))
    }

    fn from_pkcs8(info: &PrivateKeyInfo<'_>, der: &[u8]) -> AppResult<Self> {
        let load_error = |e: rsa::pkcs8::Error| {
            AppError::key_load(format!("failed to decode PKCS#8 private key: {e}"))
        };

        match info.algorithm.oid {
            OID_RSA_ENCRYPTION => RsaPrivateKey::from_pkcs8_der(der)
                .map(|key| Self::Rsa(Box::new(key)))
                .map_err(load_error),
            OID_EC_PUBLIC_KEY => match info.algorithm.parameters_oid() {
                Ok(OID_SECP256R1) => p256::SecretKey::from_pkcs8_der(der)
                    .map(Self::P256)
                    .map_err(load_error),
                Ok(OID_SECP384R1) => p384::SecretKey::from_pkcs8_der(der)
                    .map(Self::P384)
                    .map_err(load_error),
                Ok(OID_SECP521R1) => p521::SecretKey::from_pkcs8_der(der)
                    .map(Self::P521)
                    .map_err(load_error),
                Ok(curve) => Err(AppError::key_conversion(format!(
                    "unsupported elliptic curve: {curve}"
                ))),
                Err(e) => Err(AppError::key_conversion(format!(
                    "elliptic curve private key without named curve: {e}"
                ))),
            },
            other => Err(AppError::key_conversion(format!(
                "unsupported private key algorithm: {other}"
            ))),
        }
    }

    /// Public key derived from this private key
    #[must_use]
    pub fn public_key(&self) -> PublicKey {
        match self {
            Self::Rsa(key) => PublicKey::Rsa(key.to_public_key()),
            Self::P256(key) => PublicKey::P256(key.public_key()),
            Self::P384(key) => PublicKey::P384(key.public_key()),
            Self::P521(key) => PublicKey::P521(key.public_key()),
        }
    }

    /// Algorithm this key signs with
    #[must_use]
    pub const fn algorithm(&self) -> SigningAlgorithm {
        match self {
            Self::Rsa(_) => SigningAlgorithm::Rs256,
            Self::P256(_) => SigningAlgorithm::Es256,
            Self::P384(_) => SigningAlgorithm::Es384,
            Self::P521(_) => SigningAlgorithm::Es512,
        }
    }
}

/// Public/private key pair derived from the configured certificate and key
#[derive(Debug, Clone)]
pub struct SigningIdentity {
    /// Public key taken from the leading certificate
    pub public_key: PublicKey,
    /// Private key matching `public_key`
    pub private_key: PrivateKey,
}

impl SigningIdentity {
    /// Build an identity from PEM blobs without touching the filesystem
    ///
    /// The certificate is classified before the key is decoded, so a pair on
    /// an unsupported curve reports `KeyConversion` whatever the key encoding.
    ///
    /// # Errors
    ///
    /// - `KeyLoad` if the blobs lack the expected PEM blocks, the key DER is
    ///   unreadable, or the key does not belong to the certificate
    /// - `CertParse` if the leading certificate is malformed DER
    /// - `KeyConversion` if the key type cannot sign tokens
    pub fn from_pem(cert_pem: &str, key_pem: &str) -> AppResult<Self> {
        let cert_der = leading_certificate_der(cert_pem)?;
        let key_der = private_key_der(key_pem)?;

        let (_, certificate) = X509Certificate::from_der(&cert_der)
            .map_err(|e| AppError::cert_parse(format!("failed to parse certificate: {e}")))?;
        let public_key = PublicKey::from_spki_der(certificate.public_key().raw)?;

        let private_key = PrivateKey::from_der(&key_der)?;

        if private_key.public_key() != public_key {
            return Err(AppError::key_load(
                "private key does not match certificate public key",
            ));
        }

        Ok(Self {
            public_key,
            private_key,
        })
    }

    /// Algorithm tokens signed by this identity use
    #[must_use]
    pub const fn algorithm(&self) -> SigningAlgorithm {
        self.private_key.algorithm()
    }

    /// Key identifier of the public key
    ///
    /// # Errors
    ///
    /// Returns `KeyConversion` if the public key cannot be encoded
    pub fn key_id(&self) -> AppResult<String> {
        self.public_key.key_id()
    }
}

/// Resolves the signing identity from a configuration store
pub struct KeyProvider<S> {
    store: S,
}

impl<S: ConfigStore> KeyProvider<S> {
    /// Provider reading key material from `store`
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Load the signing identity and republish its material for the registry
    ///
    /// Republishing is best effort: failures are logged and the identity is
    /// still returned.
    ///
    /// # Errors
    ///
    /// Returns `ConfigUnavailable` if the key or certificate is not
    /// configured, or any error of [`SigningIdentity::from_pem`]. Nothing is
    /// written to disk when an error is returned.
    pub fn load_signing_identity(&self) -> AppResult<SigningIdentity> {
        let (identity, report) = self.load_and_republish()?;
        debug!(
            algorithm = %identity.algorithm(),
            key_written = report.key_written,
            cert_written = report.cert_written,
            "Loaded registry signing identity"
        );
        Ok(identity)
    }

    /// Like [`Self::load_signing_identity`], also reporting which files were
    /// republished
    ///
    /// # Errors
    ///
    /// Same as [`Self::load_signing_identity`]
    pub fn load_and_republish(&self) -> AppResult<(SigningIdentity, RepublishReport)> {
        let (key_pem, cert_pem) = self.read_pem()?;

        let identity = SigningIdentity::from_pem(&cert_pem, &key_pem)?;
        let report = republish_key_material(&self.store, &key_pem, &cert_pem);
        if !report.is_complete() {
            warn!("Registry backend may be unable to verify tokens until key material is republished");
        }

        Ok((identity, report))
    }

    /// Resolve the signing identity without republishing anything
    ///
    /// For inspecting the configured key; issuance goes through
    /// [`Self::load_signing_identity`].
    ///
    /// # Errors
    ///
    /// Same as [`Self::load_signing_identity`]
    pub fn read_signing_identity(&self) -> AppResult<SigningIdentity> {
        let (key_pem, cert_pem) = self.read_pem()?;
        SigningIdentity::from_pem(&cert_pem, &key_pem)
    }

    fn read_pem(&self) -> AppResult<(Zeroizing<String>, String)> {
        let key_pem = Zeroizing::new(self.store.get_string(config_keys::TOKEN_KEY)?);
        let cert_pem = self.store.get_string(config_keys::TOKEN_CERT)?;
        Ok((key_pem, cert_pem))
    }
}

fn leading_certificate_der(cert_pem: &str) -> AppResult<Vec<u8>> {
    for block in Pem::iter_from_buffer(cert_pem.as_bytes()) {
        let block = block
            .map_err(|e| AppError::key_load(format!("invalid PEM in certificate blob: {e}")))?;
        if block.label == PEM_LABEL_CERTIFICATE {
            return Ok(block.contents);
        }
    }
    Err(AppError::key_load(
        "no CERTIFICATE PEM block found in certificate blob",
    ))
}

fn private_key_der(key_pem: &str) -> AppResult<Zeroizing<Vec<u8>>> {
    for block in Pem::iter_from_buffer(key_pem.as_bytes()) {
        let block = block
            .map_err(|e| AppError::key_load(format!("invalid PEM in private key blob: {e}")))?;
        if block.label == PEM_LABEL_PRIVATE_KEY_SUFFIX
            || block.label.ends_with(&format!(" {PEM_LABEL_PRIVATE_KEY_SUFFIX}"))
        {
            return Ok(Zeroizing::new(block.contents));
        }
    }
    Err(AppError::key_load(
        "no PRIVATE KEY PEM block found in private key blob",
    ))
}

/// Unpadded standard base32, grouped in fours with `:`
fn key_id_encode(bytes: &[u8]) -> String {
    const ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

    let mut encoded = String::with_capacity(bytes.len() * 8 / 5 + 1);
    let mut buffer: u32 = 0;
    let mut bits = 0u32;
    for &byte in bytes {
        buffer = (buffer << 8) | u32::from(byte);
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            encoded.push(char::from(ALPHABET[((buffer >> bits) & 0x1f) as usize]));
        }
    }
    if bits > 0 {
        encoded.push(char::from(ALPHABET[((buffer << (5 - bits)) & 0x1f) as usize]));
    }

    let groups: Vec<&str> = encoded
        .as_bytes()
        .chunks(token::KEY_ID_GROUP_LEN)
        .filter_map(|chunk| std::str::from_utf8(chunk).ok())
        .collect();
    groups.join(":")
}
