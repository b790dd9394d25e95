// ABOUTME: Compact serialization of registry tokens into three dot-separated segments
// ABOUTME: Each segment is unpadded URL-safe base64 of header JSON, claims JSON or signature
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

use registry_token_core::constants::token::SEPARATOR;
use registry_token_core::errors::{AppError, AppResult};
use registry_token_core::models::{ClaimSet, TokenHeader};

/// Unpadded URL-safe base64 of `bytes`
#[must_use]
pub fn encode_segment(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode one unpadded URL-safe base64 segment
///
/// # Errors
///
/// Returns `Encoding` if the segment is not valid base64
pub fn decode_segment(segment: &str) -> AppResult<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| AppError::encoding(format!("invalid token segment: {e}")))
}

/// `base64(header) "." base64(claims)`, the exact input that gets signed
///
/// # Errors
///
/// Returns `Encoding` if either part fails to serialize
pub fn signing_input(header: &TokenHeader, claims: &ClaimSet) -> AppResult<String> {
    let header_json = serde_json::to_vec(header)?;
    let claims_json = serde_json::to_vec(claims)?;
    Ok(format!(
        "{}{SEPARATOR}{}",
        encode_segment(&header_json),
        encode_segment(&claims_json)
    ))
}

/// Append the signature segment to a signing input
#[must_use]
pub fn append_signature(signing_input: &str, signature: &[u8]) -> String {
    format!("{signing_input}{SEPARATOR}{}", encode_segment(signature))
}

/// Serialize a complete token
///
/// # Errors
///
/// Returns `Encoding` if the header or claims fail to serialize
pub fn encode(header: &TokenHeader, claims: &ClaimSet, signature: &[u8]) -> AppResult<String> {
    Ok(append_signature(&signing_input(header, claims)?, signature))
}

/// Split a token into its decoded header and claims plus raw signature
///
/// No signature verification happens here.
///
/// # Errors
///
/// Returns `Encoding` if the token does not have three well-formed segments
pub fn decode_unverified(token: &str) -> AppResult<(TokenHeader, ClaimSet, Vec<u8>)> {
    let mut parts = token.split(SEPARATOR);
    let (Some(header), Some(claims), Some(signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(AppError::encoding("token must have exactly three segments"));
    };

    let header: TokenHeader = serde_json::from_slice(&decode_segment(header)?)?;
    let claims: ClaimSet = serde_json::from_slice(&decode_segment(claims)?)?;
    Ok((header, claims, decode_segment(signature)?))
}
