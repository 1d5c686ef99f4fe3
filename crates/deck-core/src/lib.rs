//! Deck Core - Core types for deploying Decks onto Kubernetes
//!
//! This crate provides the foundational types used throughout Deck:
//! - `Deckfile`: The root descriptor declaring one or more Decks
//! - `Source`: Where a Deck's manifests come from (helm, git, inline, local, http)
//! - `K8sSourceFile`: A rendered workload document tagged with its namespace
//! - `Protocol`: Classification of source references
//! - `DeckConfig`: User configuration

pub mod config;
pub mod deckfile;
pub mod error;
pub mod parameter;
pub mod protocol;
pub mod workload;

pub use config::{DeckConfig, ToolPaths};
pub use deckfile::{
    Deck, Deckfile, GitSource, HelmSource, HttpSource, InlineSource, LocalSource, Source,
};
pub use error::{CoreError, Result};
pub use parameter::{MalformedParameter, set_argument};
pub use protocol::{Protocol, sniff_protocol};
pub use workload::{DEFAULT_NAMESPACE, K8sSourceFile, decode_documents, resolve_namespace};
