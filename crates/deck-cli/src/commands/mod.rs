//! CLI commands

use deck_core::{DeckConfig, Deckfile};
use std::path::Path;

use crate::error::Result;

pub mod get;
pub mod list;
pub mod remove;
pub mod template;
pub mod version;

/// Load the user configuration, from `path` when given
pub fn load_config(path: Option<&Path>) -> Result<DeckConfig> {
    let config = match path {
        Some(path) => DeckConfig::load_from(path)?.with_env_overrides(),
        None => DeckConfig::load()?,
    };
    Ok(config)
}

pub fn load_deckfile(path: &Path) -> Result<Deckfile> {
    Ok(Deckfile::load(path)?)
}

/// Connect to the cluster of the current kubectl context
///
/// Deck never provisions clusters, so `--no-cluster` only changes the log line.
pub fn connect(no_cluster: bool) -> Result<deck_kube::Cluster> {
    if no_cluster {
        tracing::debug!("--no-cluster given, using the current kubectl context");
    }
    Ok(deck_kube::Cluster::connect()?)
}
