//! Layered CLI settings: built-in defaults, then a TOML file, then
//! `REVFUND_*` environment variables.
//!
//! ```toml
//! rpc_url = "https://rpc.example.org"
//! chain_id = 1
//!
//! [ensemble]
//! shards = ["0x...", "0x..."]
//! first_accrual_offset = 0
//! ```
//!
//! Nested keys use `__` in the environment, e.g.
//! `REVFUND_ENSEMBLE__FIRST_ACCRUAL_OFFSET=4`. `REVFUND_ENSEMBLE__SHARDS`
//! takes a comma separated list.

use anyhow::Context;
use config::{Config, ConfigError, Environment, File};
use revfund_core::Signer;
use revfund_ethers::EnsembleSettings;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "revfund.toml";
pub const DEFAULT_RPC_URL: &str = "http://localhost:8545";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub rpc_url: String,
    /// Queried from the node when unset.
    #[serde(default)]
    pub chain_id: Option<u64>,
    pub ensemble: EnsembleSettings,
    /// Hex private key, needed for claims and withdrawals only.
    #[serde(default)]
    pub private_key: Option<String>,
}

impl Settings {
    /// Load settings. An explicitly given file must exist; the default one is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::builder(path)?.build()?.try_deserialize()
    }

    fn builder(
        path: Option<&Path>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        let file = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        Ok(Config::builder()
            .set_default("rpc_url", DEFAULT_RPC_URL)?
            .set_default("ensemble.first_accrual_offset", 0)?
            .add_source(File::from(file.as_path()).required(path.is_some()))
            .add_source(
                Environment::with_prefix("REVFUND")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("ensemble.shards"),
            ))
    }

    pub fn signer(&self) -> anyhow::Result<Option<Signer>> {
        self.private_key
            .as_deref()
            .map(|key| {
                key.trim_start_matches("0x")
                    .parse::<Signer>()
                    .context("invalid private key")
            })
            .transpose()
    }
}
