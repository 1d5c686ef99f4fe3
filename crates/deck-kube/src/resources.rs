//! Sending rendered documents to the cluster
//!
//! Documents are sent with Server-Side Apply as dynamic objects resolved
//! against API discovery. A deck that ships its own CRDs is applied in two
//! steps: the definitions first, then discovery is refreshed until the new
//! kinds are served, then everything else.

use deck_core::K8sSourceFile;
use k8s_openapi::api::core::v1::Namespace;
use kube::{
    Client,
    api::{Api, DeleteParams, DynamicObject, Patch, PatchParams, PropagationPolicy},
    core::GroupVersion,
    discovery::{ApiResource, Discovery, Scope},
};
use serde_json::json;
use std::fmt;
use std::time::Duration;

use crate::error::{KubeError, Result};
use crate::order::{ApplyPlan, delete_order};

/// Field manager name for Server-Side Apply
const FIELD_MANAGER: &str = "deck";

const DISCOVERY_ATTEMPTS: u32 = 10;
const DISCOVERY_RETRY: Duration = Duration::from_secs(1);

/// What happened to a single document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Created,
    Configured,
    Deleted,
    NotFound,
    Failed(String),
}

impl Outcome {
    fn label(&self) -> &'static str {
        match self {
            Outcome::Created => "created",
            Outcome::Configured => "configured",
            Outcome::Deleted => "deleted",
            Outcome::NotFound => "not found",
            Outcome::Failed(_) => "failed",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Failed(reason) => write!(f, "failed: {}", reason),
            other => f.write_str(other.label()),
        }
    }
}

/// Per-document outcomes of an apply or delete, in the order they ran
#[derive(Debug, Clone, Default)]
pub struct OperationSummary {
    pub entries: Vec<(String, Outcome)>,
}

impl OperationSummary {
    pub fn record(&mut self, resource: impl Into<String>, outcome: Outcome) {
        self.entries.push((resource.into(), outcome));
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    /// `(resource, reason)` for every failed document
    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().filter_map(|(resource, outcome)| match outcome {
            Outcome::Failed(reason) => Some((resource.as_str(), reason.as_str())),
            _ => None,
        })
    }

    /// Documents that were already gone when deleting
    pub fn not_found(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, outcome)| *outcome == Outcome::NotFound)
            .map(|(resource, _)| resource.as_str())
    }
}

impl fmt::Display for OperationSummary {
    /// Counts per outcome, e.g. `2 created, 1 failed`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut counts: Vec<(&'static str, usize)> = Vec::new();
        for (_, outcome) in &self.entries {
            match counts.iter_mut().find(|(label, _)| *label == outcome.label()) {
                Some((_, n)) => *n += 1,
                None => counts.push((outcome.label(), 1)),
            }
        }

        if counts.is_empty() {
            return f.write_str("nothing to do");
        }

        let parts: Vec<String> = counts
            .iter()
            .map(|(label, n)| format!("{} {}", n, label))
            .collect();
        f.write_str(&parts.join(", "))
    }
}

/// `Kind/name` of a document for messages
pub fn describe(file: &K8sSourceFile) -> String {
    format!(
        "{}/{}",
        file.kind().unwrap_or("<no kind>"),
        file.resource_name().unwrap_or("<unnamed>")
    )
}

/// A document the API server knows how to handle
struct Target {
    obj: DynamicObject,
    resource: ApiResource,
    namespaced: bool,
}

impl Target {
    fn name(&self) -> &str {
        self.obj.metadata.name.as_deref().unwrap_or_default()
    }

    fn api(&self, client: &Client) -> Api<DynamicObject> {
        match self.obj.metadata.namespace.as_deref() {
            Some(ns) if self.namespaced => {
                Api::namespaced_with(client.clone(), ns, &self.resource)
            }
            _ => Api::all_with(client.clone(), &self.resource),
        }
    }
}

/// Applies and deletes the documents of a rendered deck
pub struct ResourceManager {
    client: Client,
    discovery: Discovery,
}

impl ResourceManager {
    pub async fn new(client: Client) -> Result<Self> {
        let discovery = Discovery::new(client.clone()).run().await?;
        Ok(Self { client, discovery })
    }

    /// Create every namespace with Server-Side Apply (idempotent)
    pub async fn ensure_namespaces(&self, namespaces: &[String]) -> Result<()> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        let params = PatchParams::apply(FIELD_MANAGER);

        for namespace in namespaces {
            let patch = json!({
                "apiVersion": "v1",
                "kind": "Namespace",
                "metadata": { "name": namespace },
            });
            api.patch(namespace, &params, &Patch::Apply(&patch)).await?;
            tracing::debug!("Namespace {} ready", namespace);
        }

        Ok(())
    }

    /// Apply CRDs, wait for their kinds, then apply the rest
    pub async fn apply_files(&mut self, files: &[K8sSourceFile]) -> Result<OperationSummary> {
        let plan = ApplyPlan::new(files);
        let mut summary = OperationSummary::default();

        self.apply_all(&plan.definitions, &mut summary).await;
        if plan.defines_kinds() {
            self.await_kinds(&plan.resources).await?;
        }
        self.apply_all(&plan.resources, &mut summary).await;

        Ok(summary)
    }

    /// Delete in reverse apply order; documents already gone are not errors
    pub async fn delete_files(&self, files: &[K8sSourceFile]) -> Result<OperationSummary> {
        let mut summary = OperationSummary::default();

        for file in delete_order(files) {
            let outcome = match self.delete(file).await {
                Ok(()) => Outcome::Deleted,
                Err(e) if e.is_not_found() => Outcome::NotFound,
                Err(e) => Outcome::Failed(e.to_string()),
            };
            tracing::info!("{} {}", describe(file), outcome);
            summary.record(describe(file), outcome);
        }

        Ok(summary)
    }

    async fn apply_all(&self, files: &[&K8sSourceFile], summary: &mut OperationSummary) {
        for file in files {
            let outcome = match self.apply(file).await {
                Ok(true) => Outcome::Created,
                Ok(false) => Outcome::Configured,
                Err(e) => Outcome::Failed(e.to_string()),
            };
            tracing::info!("{} {}", describe(file), outcome);
            summary.record(describe(file), outcome);
        }
    }

    /// Refresh discovery until every kind used by `files` is served
    ///
    /// Kinds still unknown after the last attempt fail when they are applied.
    async fn await_kinds(&mut self, files: &[&K8sSourceFile]) -> Result<()> {
        for attempt in 1..=DISCOVERY_ATTEMPTS {
            self.discovery = Discovery::new(self.client.clone()).run().await?;

            let unknown = files
                .iter()
                .filter(|file| matches!(self.resolve(file), Err(KubeError::UnknownResource { .. })))
                .count();
            if unknown == 0 {
                return Ok(());
            }

            tracing::debug!("{} documents use kinds not served yet (attempt {})", unknown, attempt);
            if attempt < DISCOVERY_ATTEMPTS {
                tokio::time::sleep(DISCOVERY_RETRY).await;
            }
        }

        Ok(())
    }

    /// Returns whether the resource was newly created
    async fn apply(&self, file: &K8sSourceFile) -> Result<bool> {
        let target = self.resolve(file)?;
        let api = target.api(&self.client);

        let exists = api.get_opt(target.name()).await?.is_some();

        let mut params = PatchParams::apply(FIELD_MANAGER);
        params.force = true;
        api.patch(target.name(), &params, &Patch::Apply(&target.obj))
            .await?;

        Ok(!exists)
    }

    async fn delete(&self, file: &K8sSourceFile) -> Result<()> {
        let target = self.resolve(file)?;
        let params = DeleteParams {
            propagation_policy: Some(PropagationPolicy::Background),
            ..Default::default()
        };

        target.api(&self.client).delete(target.name(), &params).await?;
        Ok(())
    }

    fn resolve(&self, file: &K8sSourceFile) -> Result<Target> {
        let invalid = |message: String| KubeError::InvalidManifest {
            name: file.name.clone(),
            message,
        };

        let mut obj: DynamicObject =
            serde_json::from_value(file.content.clone()).map_err(|e| invalid(e.to_string()))?;
        let types = obj
            .types
            .clone()
            .ok_or_else(|| invalid("missing apiVersion or kind".to_string()))?;
        if obj.metadata.name.is_none() {
            return Err(invalid("missing metadata.name".to_string()));
        }

        let gvk = types
            .api_version
            .parse::<GroupVersion>()
            .map_err(|e| invalid(e.to_string()))?
            .with_kind(&types.kind);
        let (resource, capabilities) =
            self.discovery
                .resolve_gvk(&gvk)
                .ok_or_else(|| KubeError::UnknownResource {
                    api_version: types.api_version.clone(),
                    kind: types.kind.clone(),
                })?;

        let namespaced = capabilities.scope == Scope::Namespaced;
        if namespaced && obj.metadata.namespace.is_none() {
            obj.metadata.namespace = Some(file.namespace.clone());
        }

        Ok(Target {
            obj,
            resource,
            namespaced,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(entries: Vec<(&str, Outcome)>) -> OperationSummary {
        let mut summary = OperationSummary::default();
        for (resource, outcome) in entries {
            summary.record(resource, outcome);
        }
        summary
    }

    #[test]
    fn test_summary_counts_in_first_seen_order() {
        let summary = summary(vec![
            ("Deployment/web", Outcome::Created),
            ("Service/web", Outcome::Configured),
            ("ConfigMap/web", Outcome::Created),
        ]);

        assert!(summary.is_success());
        assert_eq!(summary.to_string(), "2 created, 1 configured");
        assert_eq!(OperationSummary::default().to_string(), "nothing to do");
    }

    #[test]
    fn test_summary_failures_and_not_found() {
        let summary = summary(vec![
            ("Widget/w", Outcome::Failed("unknown resource type example.com/v1/Widget".into())),
            ("Secret/old", Outcome::NotFound),
            ("Deployment/web", Outcome::Deleted),
        ]);

        assert!(!summary.is_success());
        assert_eq!(
            summary.failures().collect::<Vec<_>>(),
            vec![("Widget/w", "unknown resource type example.com/v1/Widget")]
        );
        assert_eq!(summary.not_found().collect::<Vec<_>>(), vec!["Secret/old"]);
        assert_eq!(summary.to_string(), "1 failed, 1 not found, 1 deleted");
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(Outcome::Created.to_string(), "created");
        assert_eq!(Outcome::Failed("forbidden".into()).to_string(), "failed: forbidden");
    }

    #[test]
    fn test_describe() {
        let file = K8sSourceFile::new(
            "all.yaml",
            json!({"apiVersion": "v1", "kind": "Service", "metadata": {"name": "web"}}),
            "apps",
        );
        assert_eq!(describe(&file), "Service/web");

        let file = K8sSourceFile::new("x.yaml", json!({"data": {}}), "apps");
        assert_eq!(describe(&file), "<no kind>/<unnamed>");
    }
}
