//! Documents embedded in the Deckfile

use deck_core::{InlineSource, K8sSourceFile};

use super::{DeckfileContext, SourceBackend, SourceContext};
use crate::error::Result;

/// Wraps the embedded document as exactly one workload file
pub struct Inline<'a> {
    source: &'a InlineSource,
}

impl<'a> Inline<'a> {
    pub fn new(source: &'a InlineSource) -> Self {
        Self { source }
    }
}

impl SourceBackend for Inline<'_> {
    fn render(
        &self,
        _deckfile: &DeckfileContext,
        source: &SourceContext<'_>,
    ) -> Result<Vec<K8sSourceFile>> {
        let name = format!("{}/inline", source.deck);
        Ok(vec![K8sSourceFile::new(
            name,
            self.source.content.clone(),
            source.namespace.clone(),
        )])
    }
}
