//! Helm charts rendered with `helm template`
//!
//! The chart is never installed. Depending on the protocol of `ref` the plan is
//!
//! - git/local: `helm dep up <chart>` && `helm [plugins] template <release> <chart> ...`
//! - http(s):   `helm repo add this <ref>` && `helm [plugins] template <release> this/<chart> ...`
//!
//! followed by collecting the YAML written to the scratch `--output-dir`.

use deck_core::{CoreError, HelmSource, K8sSourceFile, Protocol, set_argument, sniff_protocol};
use once_cell::unsync::OnceCell;
use std::path::{Path, PathBuf};

use super::{DeckfileContext, SourceBackend, SourceContext, git};
use crate::collect::collect_workload_files;
use crate::error::Result;
use crate::scratch::ScratchDir;
use crate::tool::{CommandPlan, ToolCommand, ToolRunner};
use crate::version::ClusterVersion;

/// Alias the remote chart repository is registered under
pub const REPO_ALIAS: &str = "this";

/// Where the chart comes from once the source has been prepared
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartTarget {
    /// A chart directory on disk (local ref or git checkout)
    Path(PathBuf),
    /// A chart inside a remote chart repository
    Repository { url: String, chart: String },
}

pub struct Helm<'a> {
    source: &'a HelmSource,
    runner: &'a dyn ToolRunner,
    versions: &'a dyn ClusterVersion,
    kube_version: OnceCell<String>,
}

impl<'a> Helm<'a> {
    pub fn new(
        source: &'a HelmSource,
        runner: &'a dyn ToolRunner,
        versions: &'a dyn ClusterVersion,
    ) -> Self {
        Self {
            source,
            runner,
            versions,
            kube_version: OnceCell::new(),
        }
    }

    /// Protocol of `ref`
    pub fn protocol(&self) -> Result<Protocol> {
        Ok(sniff_protocol(self.source.reference.as_deref())?)
    }

    /// The cluster's `major.minor`, looked up once per backend
    pub fn kube_version(&self) -> Result<&str> {
        self.kube_version
            .get_or_try_init(|| {
                let info = self.versions.server_version()?;
                tracing::debug!("Kube API version: {:?}", info);
                info.major_minor()
            })
            .map(String::as_str)
    }

    fn reference(&self) -> Result<&str> {
        Ok(self
            .source
            .reference
            .as_deref()
            .ok_or(CoreError::UnrecognizedSource)?)
    }

    /// `releaseName`, falling back to the chart name
    fn release_name(&self) -> Result<&str> {
        self.source
            .release_name
            .as_deref()
            .or(self.source.chart.as_deref())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| {
                CoreError::MissingField {
                    field: "releaseName".to_string(),
                }
                .into()
            })
    }

    /// Chart directory for a local ref: `<deckfile dir>/<ref>/<path>`
    pub fn local_chart(&self, deckfile: &DeckfileContext) -> Result<PathBuf> {
        Ok(self.chart_in(&deckfile.resolve(self.reference()?)))
    }

    fn chart_in(&self, base: &Path) -> PathBuf {
        match self.source.path.as_deref() {
            Some(path) if !path.is_empty() => base.join(path.trim_start_matches("./")),
            _ => base.to_path_buf(),
        }
    }

    fn remote_chart(&self) -> Result<ChartTarget> {
        let chart = self
            .source
            .chart
            .clone()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| CoreError::MissingField {
                field: "chart".to_string(),
            })?;

        Ok(ChartTarget::Repository {
            url: self.reference()?.to_string(),
            chart,
        })
    }

    /// Build the full helm command plan for a prepared chart
    pub fn build_command(
        &self,
        target: &ChartTarget,
        namespace: &str,
        output_dir: &Path,
    ) -> Result<CommandPlan> {
        let mut template = self.helm_with_plugins().args(self.helm_template(target, namespace)?);
        template = template.args(self.helm_source_params());
        template = template.arg("--output-dir").arg(output_dir.display().to_string());
        template = template.args(self.helm_api_versions()?);
        template = template.args(self.source.helm_args.iter().cloned());

        Ok(CommandPlan::new().then(self.helm_prep(target)).then(template))
    }

    /// Run helm for a prepared chart and collect what it writes
    pub fn render_chart(
        &self,
        target: &ChartTarget,
        namespace: &str,
    ) -> Result<Vec<K8sSourceFile>> {
        let output = ScratchDir::new()?;
        let plan = self.build_command(target, namespace, output.path())?;

        tracing::info!("Rendering helm chart for release {}", self.release_name()?);
        self.runner.run_plan(&plan)?;

        collect_workload_files(output, namespace)
    }

    fn helm_prep(&self, target: &ChartTarget) -> ToolCommand {
        match target {
            ChartTarget::Path(chart) => {
                ToolCommand::new("helm").args(["dep", "up"]).arg(chart.display().to_string())
            }
            ChartTarget::Repository { url, .. } => {
                ToolCommand::new("helm").args(["repo", "add", REPO_ALIAS]).arg(url.as_str())
            }
        }
    }

    fn helm_with_plugins(&self) -> ToolCommand {
        ToolCommand::new("helm").args(self.source.helm_plugins.iter().cloned())
    }

    fn helm_template(&self, target: &ChartTarget, namespace: &str) -> Result<Vec<String>> {
        let chart_ref = match target {
            ChartTarget::Path(chart) => chart.display().to_string(),
            ChartTarget::Repository { chart, .. } => format!("{}/{}", REPO_ALIAS, chart),
        };

        let mut args = vec![
            "template".to_string(),
            self.release_name()?.to_string(),
            chart_ref,
            "--include-crds".to_string(),
            "--namespace".to_string(),
            namespace.to_string(),
        ];

        if let ChartTarget::Path(chart) = target {
            for value_file in &self.source.value_files {
                args.push("--values".to_string());
                args.push(chart.join(value_file.trim_start_matches("./")).display().to_string());
            }
        }

        Ok(args)
    }

    fn helm_source_params(&self) -> Vec<String> {
        let mut params = Vec::new();

        for entry in &self.source.parameters {
            match set_argument(entry) {
                Ok(arg) => {
                    params.push("--set".to_string());
                    params.push(arg);
                }
                Err(e) => {
                    tracing::error!(
                        "The parameters in Deck with ref {} are malformed: {}",
                        self.source.reference.as_deref().unwrap_or("<none>"),
                        e
                    );
                }
            }
        }

        params
    }

    fn helm_api_versions(&self) -> Result<Vec<String>> {
        let version = self.kube_version()?;
        Ok(vec![
            "--kube-version".to_string(),
            version.to_string(),
            "--api-versions".to_string(),
            version.to_string(),
        ])
    }
}

impl SourceBackend for Helm<'_> {
    fn render(
        &self,
        deckfile: &DeckfileContext,
        source: &SourceContext<'_>,
    ) -> Result<Vec<K8sSourceFile>> {
        let protocol = self.protocol()?;

        // Keeps a git checkout alive until helm has run
        let mut checkout: Option<ScratchDir> = None;

        let target = match protocol {
            Protocol::Local => ChartTarget::Path(self.local_chart(deckfile)?),
            Protocol::Git => {
                let repo = git::checkout(self.runner, self.reference()?, None)?;
                let chart = self.chart_in(repo.path());
                checkout = Some(repo);
                ChartTarget::Path(chart)
            }
            Protocol::Http | Protocol::Https => self.remote_chart()?,
        };

        tracing::debug!("Helm chart ref is {}", protocol);
        let files = self.render_chart(&target, &source.namespace)?;

        if let Some(repo) = checkout {
            repo.close()?;
        }

        Ok(files)
    }
}
