// ABOUTME: Claim set construction with a validity window and a random token identifier
// ABOUTME: Grants keep their order while each action list is normalized and sorted
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;

use registry_token_core::models::{AccessGrant, ClaimSet, ResourceActions};

use crate::config::TokenConfig;

/// Builds claim sets for one issuer and validity
///
/// `nbf` is placed `not_before_offset` before issuance, and that offset
/// equals the validity duration. The resulting window is twice the
/// validity, starting one validity before `now`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimSetBuilder {
    issuer: String,
    validity: Duration,
    not_before_offset: Duration,
}

impl ClaimSetBuilder {
    /// Builder for `issuer` with tokens valid for `validity`
    #[must_use]
    pub fn new(issuer: impl Into<String>, validity: Duration) -> Self {
        Self {
            issuer: issuer.into(),
            validity,
            not_before_offset: validity,
        }
    }

    /// Builder from resolved token settings
    #[must_use]
    pub fn from_config(config: &TokenConfig) -> Self {
        Self::new(config.issuer.clone(), config.validity)
    }

    /// Token validity
    #[must_use]
    pub const fn validity(&self) -> Duration {
        self.validity
    }

    /// Distance between `nbf` and `iat`
    #[must_use]
    pub const fn not_before_offset(&self) -> Duration {
        self.not_before_offset
    }

    /// Build the claim set for `account` on `service`
    #[must_use]
    pub fn build<I, R>(
        &self,
        account: &str,
        service: &str,
        grants: I,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> ClaimSet
    where
        I: IntoIterator<Item = AccessGrant>,
        R: RngCore + ?Sized,
    {
        let now = now.timestamp();
        ClaimSet {
            issuer: self.issuer.clone(),
            subject: account.to_owned(),
            audience: service.to_owned(),
            expiration: now.saturating_add(self.validity.num_seconds()),
            not_before: now.saturating_sub(self.not_before_offset.num_seconds()),
            issued_at: now,
            jwt_id: generate_jwt_id(rng),
            access: grants.into_iter().map(ResourceActions::from).collect(),
        }
    }
}

/// Decimal string of a random non-negative 63-bit integer
#[must_use]
pub fn generate_jwt_id<R: RngCore + ?Sized>(rng: &mut R) -> String {
    (rng.next_u64() >> 1).to_string()
}
