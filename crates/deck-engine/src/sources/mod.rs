//! Source backends
//!
//! Each Deckfile source kind has a backend turning its descriptor into
//! [`K8sSourceFile`]s. All backends share the same contract: documents come out
//! in a deterministic order and every document carries the resolved namespace.

use deck_core::{Deck, Deckfile, K8sSourceFile, Source, resolve_namespace};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::tool::ToolRunner;
use crate::version::ClusterVersion;

pub mod git;
pub mod helm;
pub mod http;
pub mod inline;
pub mod local;

pub use git::Git;
pub use helm::{ChartTarget, Helm};
pub use http::Http;
pub use inline::Inline;
pub use local::Local;

/// Deckfile-level information a backend may need
#[derive(Debug, Clone)]
pub struct DeckfileContext {
    /// Directory of the Deckfile; relative local refs start here
    pub location: PathBuf,
}

impl DeckfileContext {
    pub fn new(location: impl Into<PathBuf>) -> Self {
        Self {
            location: location.into(),
        }
    }

    pub fn for_deckfile(deckfile: &Deckfile) -> Self {
        Self::new(deckfile.location.clone())
    }

    /// Resolve a local reference against the Deckfile directory
    pub fn resolve(&self, reference: &str) -> PathBuf {
        let path = Path::new(reference);
        if path.is_absolute() {
            return path.to_path_buf();
        }
        self.location.join(reference.trim_start_matches("./"))
    }
}

/// One source of a deck, with its namespace already resolved
#[derive(Debug, Clone)]
pub struct SourceContext<'a> {
    pub deck: &'a str,
    pub source: &'a Source,
    pub namespace: String,
}

impl<'a> SourceContext<'a> {
    /// Resolve the namespace as source → deck → `fallback` → `"default"`
    pub fn new(
        deck: &'a str,
        source: &'a Source,
        deck_namespace: Option<&str>,
        fallback: Option<&str>,
    ) -> Self {
        let namespace = resolve_namespace(&[source.namespace(), deck_namespace, fallback]);
        Self {
            deck,
            source,
            namespace,
        }
    }

    pub fn for_deck(deck: &'a Deck, source: &'a Source, fallback: Option<&str>) -> Self {
        Self::new(&deck.name, source, deck.namespace.as_deref(), fallback)
    }
}

/// The capability every source kind implements
pub trait SourceBackend {
    fn render(
        &self,
        deckfile: &DeckfileContext,
        source: &SourceContext<'_>,
    ) -> Result<Vec<K8sSourceFile>>;
}

/// Shared collaborators handed to backends
#[derive(Clone, Copy)]
pub struct Toolbox<'a> {
    pub runner: &'a dyn ToolRunner,
    pub versions: &'a dyn ClusterVersion,
}

/// Pick the backend for a source descriptor
pub fn backend_for<'a>(source: &'a Source, tools: Toolbox<'a>) -> Box<dyn SourceBackend + 'a> {
    match source {
        Source::Helm(helm) => Box::new(Helm::new(helm, tools.runner, tools.versions)),
        Source::Git(git) => Box::new(Git::new(git, tools.runner)),
        Source::Inline(inline) => Box::new(Inline::new(inline)),
        Source::Local(local) => Box::new(Local::new(local)),
        Source::Http(http) => Box::new(Http::new(http, tools)),
    }
}
