// ABOUTME: Parsing of whitespace-separated registry scope lists into access grants
// ABOUTME: Repeated resources are merged so each resource appears once in the claim set
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use registry_token_core::errors::AppResult;
use registry_token_core::models::AccessGrant;

/// Parse a space-separated list of scopes
///
/// Scopes naming the same resource type and name are merged into one grant
/// with the union of their actions, keeping the position of the first one.
///
/// # Errors
///
/// Returns `InvalidInput` for the first malformed scope
pub fn parse_scopes(scopes: &str) -> AppResult<Vec<AccessGrant>> {
    parse_scope_list(scopes.split_whitespace())
}

/// Parse individually supplied scopes, merging repeated resources
///
/// # Errors
///
/// Returns `InvalidInput` for the first malformed scope
pub fn parse_scope_list<'a, I>(scopes: I) -> AppResult<Vec<AccessGrant>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut grants: Vec<AccessGrant> = Vec::new();
    for scope in scopes {
        let grant = AccessGrant::from_scope(scope)?;
        match grants
            .iter_mut()
            .find(|g| g.resource_type == grant.resource_type && g.name == grant.name)
        {
            Some(existing) => merge_actions(existing, grant.actions.unwrap_or_default()),
            None => grants.push(grant),
        }
    }
    Ok(grants)
}

fn merge_actions(grant: &mut AccessGrant, actions: Vec<String>) {
    let merged = grant.actions.get_or_insert_with(Vec::new);
    for action in actions {
        if !merged.contains(&action) {
            merged.push(action);
        }
    }
}
