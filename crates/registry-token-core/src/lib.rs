// ABOUTME: Core types and constants for the container registry token authority
// ABOUTME: Foundation crate with error handling, token models, and configuration keys
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Registry Token Core
//!
//! Foundation crate providing shared types and constants for the registry
//! token authority. This crate is designed to change infrequently, enabling
//! incremental compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError` and `ErrorCode`
//! - **constants**: Configuration keys and token wire constants
//! - **models**: Grants, claim sets, token headers and token responses

/// Unified error handling system with standard error codes
pub mod errors;

/// Configuration keys and token wire constants
pub mod constants;

/// Token data models (grants, claims, header, response)
pub mod models;
