// ABOUTME: Command-line interface issuing registry tokens from environment configuration
// ABOUTME: Prints token responses as JSON and inspects the configured signing identity
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Usage:
//! ```bash
//! # Issue a token for alice with pull and push on one repository
//! registry-token issue --account alice --service registry.example.com \
//!     --scope repository:team/app:pull,push
//!
//! # Same, reading key material from files instead of the environment
//! registry-token --key-file token.key --cert-file token.crt issue \
//!     --account alice --service registry.example.com
//!
//! # Print the key identifier registry backends expect in `kid`
//! registry-token key-id
//!
//! # Print the public key for the registry's verification bundle
//! registry-token public-key
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use registry_token_auth::{
    config::{ConfigStore, EnvConfigStore, LayeredConfigStore, MemoryConfigStore},
    constants::config_keys,
    crypto::KeyProvider,
    logging::{LogFormat, LoggingConfig},
    token::{parse_scope_list, TokenIssuer, TokenRequest},
};
use std::fs;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "registry-token",
    about = "Container registry token authority",
    long_about = "Issue signed bearer tokens for a container image registry. Settings and key material are read from REGISTRY_* environment variables."
)]
struct RegistryTokenArgs {
    #[command(subcommand)]
    command: RegistryTokenCommand,

    /// Prefix for configuration environment variables
    #[arg(long)]
    env_prefix: Option<String>,

    /// Read the signing key PEM from this file
    #[arg(long)]
    key_file: Option<PathBuf>,

    /// Read the certificate PEM from this file
    #[arg(long)]
    cert_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[derive(Subcommand)]
enum RegistryTokenCommand {
    /// Issue a token and print the token endpoint response
    Issue {
        /// Authenticated account (token subject)
        #[arg(long)]
        account: String,

        /// Registry service (token audience)
        #[arg(long)]
        service: String,

        /// Granted scope, `type:name:action[,action...]`; may be repeated
        #[arg(long = "scope")]
        scopes: Vec<String>,

        /// Print only the compact token
        #[arg(long)]
        token_only: bool,
    },

    /// Print the key identifier of the configured certificate
    KeyId,

    /// Print the configured certificate's public key as PEM
    PublicKey,
}

fn main() -> Result<()> {
    let args = RegistryTokenArgs::parse();

    let mut logging = LoggingConfig::from_env();
    if args.verbose {
        logging.level = "debug".into();
        logging.format = LogFormat::Pretty;
    }
    logging.init()?;

    let store = build_store(&args)?;

    match args.command {
        RegistryTokenCommand::Issue {
            account,
            service,
            scopes,
            token_only,
        } => {
            let grants = parse_scope_list(scopes.iter().map(String::as_str))?;
            let request = TokenRequest::new(account, service, grants);
            let issued = TokenIssuer::new(&store).issue(&request)?;
            if token_only {
                println!("{}", issued.token);
            } else {
                let response = issued.into_response();
                println!("{}", serde_json::to_string_pretty(&response)?);
            }
        }
        RegistryTokenCommand::KeyId => {
            let identity = KeyProvider::new(&store).read_signing_identity()?;
            info!(algorithm = %identity.algorithm(), "Loaded signing identity");
            println!("{}", identity.key_id()?);
        }
        RegistryTokenCommand::PublicKey => {
            let identity = KeyProvider::new(&store).read_signing_identity()?;
            print!("{}", identity.public_key.to_pem()?);
        }
    }

    Ok(())
}

fn build_store(args: &RegistryTokenArgs) -> Result<impl ConfigStore> {
    let env_store = args
        .env_prefix
        .as_ref()
        .map_or_else(EnvConfigStore::new, EnvConfigStore::with_prefix);

    let mut overrides = MemoryConfigStore::new();
    if let Some(path) = &args.key_file {
        let pem = fs::read_to_string(path)
            .with_context(|| format!("failed to read key file {}", path.display()))?;
        overrides.set(config_keys::TOKEN_KEY, pem);
    }
    if let Some(path) = &args.cert_file {
        let pem = fs::read_to_string(path)
            .with_context(|| format!("failed to read certificate file {}", path.display()))?;
        overrides.set(config_keys::TOKEN_CERT, pem);
    }

    Ok(LayeredConfigStore::new(overrides, env_store))
}
