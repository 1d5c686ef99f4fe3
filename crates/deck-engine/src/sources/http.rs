//! Manifests and charts downloaded over http(s)
//!
//! A plain body is decoded as a multi-document YAML stream. Gzipped tarballs
//! (`.tgz`, `.tar.gz`) are unpacked into a scratch directory. A packaged chart
//! (a `Chart.yaml` at the top of the archive) is rendered with `helm template`
//! exactly like a local chart; any other archive is collected as a manifest
//! tree.

use deck_core::{
    CoreError, HelmSource, HttpSource, K8sSourceFile, decode_documents, sniff_protocol,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use super::{ChartTarget, DeckfileContext, Helm, SourceBackend, SourceContext, Toolbox};
use crate::collect::collect_unpacked;
use crate::error::{EngineError, Result};
use crate::scratch::ScratchDir;

const USER_AGENT: &str = concat!("deck/", env!("CARGO_PKG_VERSION"));
const TIMEOUT: Duration = Duration::from_secs(60);
const CHART_FILE: &str = "Chart.yaml";

pub struct Http<'a> {
    source: &'a HttpSource,
    tools: Toolbox<'a>,
}

impl<'a> Http<'a> {
    pub fn new(source: &'a HttpSource, tools: Toolbox<'a>) -> Self {
        Self { source, tools }
    }

    fn url(&self) -> Result<Url> {
        let reference = self.source.reference.as_deref();
        let protocol = sniff_protocol(reference)?;
        let reference = reference.unwrap_or_default();

        if !protocol.is_http() {
            return Err(invalid(format!("'{}' is not an http(s) URL", reference)));
        }

        Url::parse(reference).map_err(|e| invalid(format!("'{}': {}", reference, e)))
    }

    fn download(&self, url: &Url) -> Result<Vec<u8>> {
        let failed = |e: reqwest::Error| EngineError::Download {
            url: url.to_string(),
            message: e.to_string(),
        };

        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(TIMEOUT)
            .build()
            .map_err(failed)?;

        tracing::info!("Downloading {}", url);
        let response = client
            .get(url.clone())
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(failed)?;

        Ok(response.bytes().map_err(failed)?.to_vec())
    }

    fn render_archive(
        &self,
        url: &Url,
        body: &[u8],
        namespace: &str,
    ) -> Result<Vec<K8sSourceFile>> {
        let scratch = extract_archive(body)?;

        let Some(chart) = find_chart(scratch.path())? else {
            return collect_unpacked(scratch, namespace);
        };

        let rendered = self.render_packaged_chart(url, &chart, namespace);
        let closed = scratch.close();

        let files = rendered?;
        closed?;
        Ok(files)
    }

    /// `helm dep up` and `helm template` on the unpacked chart directory
    fn render_packaged_chart(
        &self,
        url: &Url,
        chart: &Path,
        namespace: &str,
    ) -> Result<Vec<K8sSourceFile>> {
        let source = HelmSource {
            reference: Some(url.to_string()),
            release_name: Some(chart_name(chart)?),
            ..Default::default()
        };
        tracing::debug!("{} is a packaged chart", url);

        Helm::new(&source, self.tools.runner, self.tools.versions)
            .render_chart(&ChartTarget::Path(chart.to_path_buf()), namespace)
    }
}

fn invalid(message: String) -> EngineError {
    CoreError::InvalidSource {
        kind: "http".to_string(),
        message,
    }
    .into()
}

/// Whether the URL points at a gzipped tarball
pub fn is_archive(url: &Url) -> bool {
    let path = url.path().to_lowercase();
    path.ends_with(".tgz") || path.ends_with(".tar.gz")
}

/// Unpack a `.tar.gz` body into a fresh scratch directory
fn extract_archive(data: &[u8]) -> Result<ScratchDir> {
    use flate2::read::GzDecoder;
    use tar::Archive;

    let scratch = ScratchDir::new()?;
    let gz = GzDecoder::new(std::io::Cursor::new(data));
    let mut archive = Archive::new(gz);
    archive.unpack(scratch.path())?;

    Ok(scratch)
}

/// The chart directory of an unpacked archive
///
/// `helm package` puts the chart in a top-level directory named after it;
/// a `Chart.yaml` directly at the root is accepted too.
pub fn find_chart(root: &Path) -> Result<Option<PathBuf>> {
    if root.join(CHART_FILE).is_file() {
        return Ok(Some(root.to_path_buf()));
    }

    let mut charts = Vec::new();
    for entry in std::fs::read_dir(root)? {
        let path = entry?.path();
        if path.join(CHART_FILE).is_file() {
            charts.push(path);
        }
    }
    charts.sort();

    Ok(charts.into_iter().next())
}

/// `name` from `Chart.yaml`, else the directory name
fn chart_name(chart: &Path) -> Result<String> {
    let manifest = chart.join(CHART_FILE);
    let text = std::fs::read_to_string(&manifest)?;
    let documents = decode_documents(&manifest.display().to_string(), &text, "default")?;

    let declared = documents
        .first()
        .and_then(|doc| doc.content.get("name"))
        .and_then(|name| name.as_str())
        .filter(|name| !name.is_empty())
        .map(str::to_string);

    declared
        .or_else(|| {
            chart
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
        .ok_or_else(|| invalid(format!("{} has no chart name", manifest.display())))
}

impl SourceBackend for Http<'_> {
    fn render(
        &self,
        _deckfile: &DeckfileContext,
        source: &SourceContext<'_>,
    ) -> Result<Vec<K8sSourceFile>> {
        let url = self.url()?;
        let body = self.download(&url)?;

        if is_archive(&url) {
            return self.render_archive(&url, &body, &source.namespace);
        }

        let text = String::from_utf8(body).map_err(|e| EngineError::Download {
            url: url.to_string(),
            message: format!("body is not valid UTF-8: {}", e),
        })?;

        Ok(decode_documents(url.as_str(), &text, &source.namespace)?)
    }
}
