//! Plain manifests from a git repository

use deck_core::{CoreError, GitSource, K8sSourceFile};

use super::{DeckfileContext, SourceBackend, SourceContext};
use crate::collect::collect_manifest_tree;
use crate::error::Result;
use crate::scratch::ScratchDir;
use crate::tool::{CommandPlan, ToolCommand, ToolRunner};

/// Shallow clone command for `reference` into `dest`
pub fn clone_command(
    reference: &str,
    revision: Option<&str>,
    dest: &std::path::Path,
) -> ToolCommand {
    let mut cmd = ToolCommand::new("git").args(["clone", "--quiet", "--depth", "1"]);
    if let Some(revision) = revision.filter(|r| !r.is_empty()) {
        cmd = cmd.arg("--branch").arg(revision);
    }
    cmd.arg(reference).arg(dest.display().to_string())
}

/// Clone a repository into a fresh scratch directory
pub fn checkout(
    runner: &dyn ToolRunner,
    reference: &str,
    revision: Option<&str>,
) -> Result<ScratchDir> {
    let scratch = ScratchDir::new()?;
    let plan = CommandPlan::new().then(clone_command(reference, revision, scratch.path()));

    tracing::info!("Cloning {}", reference);
    runner.run_plan(&plan)?;
    Ok(scratch)
}

pub struct Git<'a> {
    source: &'a GitSource,
    runner: &'a dyn ToolRunner,
}

impl<'a> Git<'a> {
    pub fn new(source: &'a GitSource, runner: &'a dyn ToolRunner) -> Self {
        Self { source, runner }
    }
}

impl SourceBackend for Git<'_> {
    fn render(
        &self,
        _deckfile: &DeckfileContext,
        source: &SourceContext<'_>,
    ) -> Result<Vec<K8sSourceFile>> {
        let reference = self
            .source
            .reference
            .as_deref()
            .filter(|r| !r.trim().is_empty())
            .ok_or(CoreError::UnrecognizedSource)?;

        let repo = checkout(self.runner, reference, self.source.target_revision.as_deref())?;

        let root = match self.source.path.as_deref() {
            Some(path) if !path.is_empty() => repo.path().join(path.trim_start_matches("./")),
            _ => repo.path().to_path_buf(),
        };

        if !root.exists() {
            return Err(CoreError::InvalidSource {
                kind: "git".to_string(),
                message: format!(
                    "path '{}' not found in {}",
                    self.source.path.as_deref().unwrap_or_default(),
                    reference
                ),
            }
            .into());
        }

        let files = collect_manifest_tree(&root, &source.namespace)?;
        repo.close()?;
        Ok(files)
    }
}
