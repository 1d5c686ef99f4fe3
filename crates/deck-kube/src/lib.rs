//! Deck Kube - Kubernetes integration for Deck
//!
//! This crate provides:
//! - **Version lookup**: the API server version feeding `helm template`
//! - **Apply / delete**: Server-Side Apply of rendered decks, CRDs first
//! - **Readiness**: waiting for the pods of a deck to become ready

pub mod cluster;
pub mod error;
pub mod order;
pub mod resources;
pub mod wait;

pub use cluster::Cluster;
pub use error::{KubeError, Result};
pub use order::{ApplyPlan, Phase};
pub use resources::{OperationSummary, Outcome, ResourceManager};
