//! Manifest files and directories next to the Deckfile

use deck_core::{CoreError, K8sSourceFile, LocalSource};

use super::{DeckfileContext, SourceBackend, SourceContext};
use crate::collect::collect_manifest_tree;
use crate::error::Result;

pub struct Local<'a> {
    source: &'a LocalSource,
}

impl<'a> Local<'a> {
    pub fn new(source: &'a LocalSource) -> Self {
        Self { source }
    }
}

impl SourceBackend for Local<'_> {
    fn render(
        &self,
        deckfile: &DeckfileContext,
        source: &SourceContext<'_>,
    ) -> Result<Vec<K8sSourceFile>> {
        let reference = self
            .source
            .reference
            .as_deref()
            .filter(|r| !r.trim().is_empty())
            .ok_or(CoreError::UnrecognizedSource)?;

        let path = deckfile.resolve(reference);
        if !path.exists() {
            return Err(CoreError::InvalidSource {
                kind: "local".to_string(),
                message: format!("{} does not exist", path.display()),
            }
            .into());
        }

        tracing::debug!("Reading local manifests from {}", path.display());
        collect_manifest_tree(&path, &source.namespace)
    }
}
