//! Render orchestration
//!
//! Turns a deck into its full, ordered list of workload files by dispatching
//! every source to its backend.

use deck_core::{Deck, DeckConfig, Deckfile, K8sSourceFile};

use crate::error::{EngineError, Result};
use crate::sources::{DeckfileContext, SourceContext, Toolbox, backend_for};
use crate::tool::{ProcessRunner, ToolRunner};
use crate::version::{ClusterVersion, NoCluster};

/// Everything a deck renders to
#[derive(Debug, Clone, Default)]
pub struct RenderedDeck {
    /// Workload files in source order
    pub files: Vec<K8sSourceFile>,

    /// Namespaces referenced by the files, first-seen order
    pub namespaces: Vec<String>,
}

impl RenderedDeck {
    fn from_files(files: Vec<K8sSourceFile>) -> Self {
        let mut namespaces: Vec<String> = Vec::new();
        for file in &files {
            if !namespaces.contains(&file.namespace) {
                namespaces.push(file.namespace.clone());
            }
        }
        Self { files, namespaces }
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Renderer builder
pub struct RendererBuilder {
    config: DeckConfig,
    runner: Option<Box<dyn ToolRunner>>,
    versions: Box<dyn ClusterVersion>,
}

impl Default for RendererBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RendererBuilder {
    pub fn new() -> Self {
        Self {
            config: DeckConfig::default(),
            runner: None,
            versions: Box::new(NoCluster),
        }
    }

    pub fn config(mut self, config: DeckConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the process runner (defaults to the configured executables)
    pub fn runner(mut self, runner: impl ToolRunner + 'static) -> Self {
        self.runner = Some(Box::new(runner));
        self
    }

    /// Where the Kubernetes API version comes from (defaults to [`NoCluster`])
    pub fn versions(mut self, versions: impl ClusterVersion + 'static) -> Self {
        self.versions = Box::new(versions);
        self
    }

    pub fn build(self) -> Renderer {
        let runner = self
            .runner
            .unwrap_or_else(|| {
                Box::new(ProcessRunner::new(self.config.tools.clone())) as Box<dyn ToolRunner>
            });

        Renderer {
            config: self.config,
            runner,
            versions: self.versions,
        }
    }
}

/// The render orchestrator
pub struct Renderer {
    config: DeckConfig,
    runner: Box<dyn ToolRunner>,
    versions: Box<dyn ClusterVersion>,
}

impl Renderer {
    pub fn builder() -> RendererBuilder {
        RendererBuilder::new()
    }

    fn toolbox(&self) -> Toolbox<'_> {
        Toolbox {
            runner: &*self.runner,
            versions: &*self.versions,
        }
    }

    /// Render the named deck (or the first one) of a Deckfile
    pub fn render(&self, deckfile: &Deckfile, name: Option<&str>) -> Result<RenderedDeck> {
        let deck = deckfile.get_deck(name)?;
        self.render_deck(&DeckfileContext::for_deckfile(deckfile), deck)
    }

    /// Render every source of a deck in declaration order
    ///
    /// The first failing source aborts the render.
    pub fn render_deck(&self, deckfile: &DeckfileContext, deck: &Deck) -> Result<RenderedDeck> {
        let fallback = Some(self.config.default_namespace.as_str());
        let mut files = Vec::new();

        tracing::info!("Rendering deck '{}' ({} sources)", deck.name, deck.sources.len());

        for (index, source) in deck.sources.iter().enumerate() {
            let ctx = SourceContext::for_deck(deck, source, fallback);

            let rendered = backend_for(source, self.toolbox())
                .render(deckfile, &ctx)
                .map_err(|e| EngineError::Source {
                    deck: deck.name.clone(),
                    index,
                    kind: source.kind().to_string(),
                    source: Box::new(e),
                })?;

            tracing::debug!(
                "Source #{} ({}) produced {} documents in namespace {}",
                index,
                source.kind(),
                rendered.len(),
                ctx.namespace
            );
            files.extend(rendered);
        }

        Ok(RenderedDeck::from_files(files))
    }
}
