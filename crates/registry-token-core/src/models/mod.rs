// ABOUTME: Token data models shared between the issuance pipeline and its callers
// ABOUTME: Re-exports grants, claim sets, token headers and token endpoint responses
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Resource access grants and their canonical claim form
pub mod access;
/// Claim set, header, algorithm and response types
pub mod token;

pub use access::{AccessGrant, ResourceActions};
pub use token::{ClaimSet, SigningAlgorithm, TokenHeader, TokenResponse};
