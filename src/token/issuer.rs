// ABOUTME: Token issuance pipeline from configuration to signed compact token
// ABOUTME: Resolves settings and keys, probes the algorithm, builds claims, signs and encodes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use rand::RngCore;
use tracing::{debug, info};

use registry_token_core::errors::AppResult;
use registry_token_core::models::{AccessGrant, ClaimSet, TokenHeader, TokenResponse};

use crate::config::{ConfigStore, TokenConfig};
use crate::crypto::{probe, sign_payload, KeyProvider, TokenSigner};

use super::claims::ClaimSetBuilder;
use super::encoder;

/// Who a token is for and what it grants
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRequest {
    /// Authenticated account, becomes `sub`
    pub account: String,
    /// Registry service, becomes `aud`
    pub service: String,
    /// Already-authorized grants
    pub grants: Vec<AccessGrant>,
}

impl TokenRequest {
    /// Create a request
    #[must_use]
    pub fn new<I>(account: impl Into<String>, service: impl Into<String>, grants: I) -> Self
    where
        I: IntoIterator<Item = AccessGrant>,
    {
        Self {
            account: account.into(),
            service: service.into(),
            grants: grants.into_iter().collect(),
        }
    }
}

/// A signed token together with the header and claims it encodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Compact `header.claims.signature` form
    pub token: String,
    /// Header as placed in the token
    pub header: TokenHeader,
    /// Claims as placed in the token
    pub claims: ClaimSet,
}

impl IssuedToken {
    /// Token endpoint response body for this token
    #[must_use]
    pub fn into_response(self) -> TokenResponse {
        TokenResponse::new(self.token, &self.claims)
    }
}

/// Issues registry tokens using settings and key material from a store
///
/// Nothing is cached: configuration and keys are read again on every call,
/// so rotated material takes effect on the next token.
pub struct TokenIssuer<S> {
    store: S,
}

impl<S: ConfigStore> TokenIssuer<S> {
    /// Issuer reading from `store`
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Issue a token for `account` on `service` and return its compact form
    ///
    /// # Errors
    ///
    /// See [`Self::issue_with`]
    pub fn issue_token<I>(&self, account: &str, service: &str, grants: I) -> AppResult<String>
    where
        I: IntoIterator<Item = AccessGrant>,
    {
        let request = TokenRequest::new(account, service, grants);
        Ok(self.issue(&request)?.token)
    }

    /// Issue a token using the wall clock and thread-local randomness
    ///
    /// # Errors
    ///
    /// See [`Self::issue_with`]
    pub fn issue(&self, request: &TokenRequest) -> AppResult<IssuedToken> {
        self.issue_with(request, Utc::now(), &mut rand::thread_rng())
    }

    /// Issue a token at `now` drawing the token id from `rng`
    ///
    /// All required settings and key material are read before anything is
    /// written to disk, so a configuration error leaves no republished files.
    ///
    /// # Errors
    ///
    /// - `ConfigUnavailable` / `ConfigInvalid` for missing or bad settings
    /// - `KeyLoad`, `CertParse` or `KeyConversion` for unusable key material
    /// - `Signing` or `AlgorithmMismatch` if signing fails
    /// - `Encoding` if the header or claims cannot be serialized
    pub fn issue_with<R: RngCore + ?Sized>(
        &self,
        request: &TokenRequest,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> AppResult<IssuedToken> {
        let config = TokenConfig::from_store(&self.store)?;
        let identity = KeyProvider::new(&self.store).load_signing_identity()?;

        let algorithm = probe(&identity.private_key)?;
        let header = TokenHeader::new(algorithm, identity.key_id()?);
        let claims = ClaimSetBuilder::from_config(&config).build(
            &request.account,
            &request.service,
            request.grants.iter().cloned(),
            now,
            rng,
        );
        debug!(
            account = %claims.subject,
            service = %claims.audience,
            grants = claims.access.len(),
            "Built registry token claims"
        );

        let issued = sign_token(&identity.private_key, header, claims)?;
        info!(
            account = %issued.claims.subject,
            service = %issued.claims.audience,
            jti = %issued.claims.jwt_id,
            algorithm = %issued.header.signing_alg,
            "Issued registry token"
        );
        Ok(issued)
    }
}

/// Sign and encode `claims` under `header`
///
/// `header.signing_alg` must be the probed algorithm of `signer`; a
/// signature produced with any other algorithm is rejected.
///
/// # Errors
///
/// Returns `Encoding`, `Signing` or `AlgorithmMismatch`
pub fn sign_token<T: TokenSigner + ?Sized>(
    signer: &T,
    header: TokenHeader,
    claims: ClaimSet,
) -> AppResult<IssuedToken> {
    let signing_input = encoder::signing_input(&header, &claims)?;
    let signature = sign_payload(signer, signing_input.as_bytes(), header.signing_alg)?;
    Ok(IssuedToken {
        token: encoder::append_signature(&signing_input, &signature),
        header,
        claims,
    })
}
