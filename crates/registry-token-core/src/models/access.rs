// ABOUTME: Resource access grants handed to the token authority and their claim representation
// ABOUTME: Normalizes action lists so equal grants always encode to identical bytes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};

/// An already-decided authorization grant, as received from the caller
///
/// `actions` is `None` when the caller did not supply an action list at all
/// (a JSON `null` or a missing field).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessGrant {
    /// Resource kind, e.g. `repository`
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Resource name, e.g. `library/nginx`
    pub name: String,
    /// Granted actions in caller order
    #[serde(default)]
    pub actions: Option<Vec<String>>,
}

impl AccessGrant {
    /// Create a grant with an explicit action list
    #[must_use]
    pub fn new<I, S>(resource_type: impl Into<String>, name: impl Into<String>, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
            actions: Some(actions.into_iter().map(Into::into).collect()),
        }
    }

    /// Create a grant without any action list
    #[must_use]
    pub fn without_actions(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
            actions: None,
        }
    }

    /// Parse a registry scope string such as `repository:library/nginx:pull,push`
    ///
    /// The type runs up to the first `:` and the actions follow the last
    /// one, so names may themselves contain `:` (a registry host with a
    /// port). A trailing `:` yields an empty action list.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the type, name or action separator is missing
    pub fn from_scope(scope: &str) -> AppResult<Self> {
        let (resource_type, rest) = scope.split_once(':').ok_or_else(|| {
            AppError::invalid_input(format!("scope '{scope}' has no resource type"))
        })?;
        let (name, actions) = rest.rsplit_once(':').ok_or_else(|| {
            AppError::invalid_input(format!("scope '{scope}' has no action list"))
        })?;

        if resource_type.is_empty() || name.is_empty() {
            return Err(AppError::invalid_input(format!(
                "scope '{scope}' must name a resource type and a resource"
            )));
        }

        Ok(Self::new(
            resource_type,
            name,
            actions.split(',').filter(|action| !action.is_empty()),
        ))
    }
}

impl FromStr for AccessGrant {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_scope(s)
    }
}

/// One `access` entry of a claim set
///
/// Invariant: `actions` is present (possibly empty) and sorted ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceActions {
    /// Resource kind
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Resource name
    pub name: String,
    /// Sorted granted actions
    pub actions: Vec<String>,
}

impl From<AccessGrant> for ResourceActions {
    fn from(grant: AccessGrant) -> Self {
        let mut actions = grant.actions.unwrap_or_default();
        actions.sort_unstable();
        Self {
            resource_type: grant.resource_type,
            name: grant.name,
            actions,
        }
    }
}
