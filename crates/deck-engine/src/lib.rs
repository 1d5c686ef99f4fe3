//! Deck Engine - rendering Deck sources into Kubernetes workload files
//!
//! This crate turns the sources of a deck into [`deck_core::K8sSourceFile`]s:
//! - Helm charts rendered with `helm template` (local, git or chart repository)
//! - Plain manifests from git repositories, local paths or http(s) URLs
//! - Inline documents embedded in the Deckfile
//!
//! External tools are driven through [`ToolRunner`] and the target cluster's
//! API version is looked up through [`ClusterVersion`].

pub mod collect;
pub mod error;
pub mod renderer;
pub mod scratch;
pub mod sources;
pub mod tool;
pub mod version;

pub use error::{EngineError, Result};
pub use renderer::{RenderedDeck, Renderer, RendererBuilder};
pub use scratch::{ScratchDir, cleanup_scratch_dirs};
pub use sources::{DeckfileContext, SourceBackend, SourceContext};
pub use tool::{CommandPlan, ProcessRunner, ToolCommand, ToolOutput, ToolRunner};
pub use version::{ClusterVersion, NoCluster, StaticVersion, VersionInfo};
