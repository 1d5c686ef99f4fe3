//! Apply and delete order of a rendered deck
//!
//! Documents are grouped into [`Phase`]s. Within a phase the rendered order is
//! kept. CustomResourceDefinitions form their own phase so the API server can
//! learn the new kinds before any instance of them is resolved.

use deck_core::K8sSourceFile;

/// Coarse apply stage of a document, earliest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Definitions,
    Namespaces,
    Access,
    Config,
    Storage,
    Network,
    Workloads,
    Batch,
    Autoscaling,
    /// Instances of custom kinds and anything not listed above
    Custom,
}

impl Phase {
    pub fn of(file: &K8sSourceFile) -> Self {
        match file.kind().unwrap_or_default() {
            "CustomResourceDefinition" => Phase::Definitions,
            "Namespace" | "ResourceQuota" | "LimitRange" => Phase::Namespaces,
            "ServiceAccount" | "Role" | "RoleBinding" | "ClusterRole" | "ClusterRoleBinding" => {
                Phase::Access
            }
            "ConfigMap" | "Secret" => Phase::Config,
            "StorageClass" | "PersistentVolume" | "PersistentVolumeClaim" => Phase::Storage,
            "Service" | "Endpoints" | "Ingress" | "IngressClass" | "NetworkPolicy" => {
                Phase::Network
            }
            "Pod" | "ReplicaSet" | "Deployment" | "StatefulSet" | "DaemonSet" => Phase::Workloads,
            "Job" | "CronJob" => Phase::Batch,
            "HorizontalPodAutoscaler" | "PodDisruptionBudget" => Phase::Autoscaling,
            _ => Phase::Custom,
        }
    }
}

/// A rendered deck split for a two-step apply
#[derive(Debug)]
pub struct ApplyPlan<'a> {
    /// CRDs, applied before discovery is refreshed
    pub definitions: Vec<&'a K8sSourceFile>,
    /// Everything else in phase order
    pub resources: Vec<&'a K8sSourceFile>,
}

impl<'a> ApplyPlan<'a> {
    pub fn new(files: &'a [K8sSourceFile]) -> Self {
        let (definitions, resources) = apply_order(files)
            .into_iter()
            .partition(|file| Phase::of(file) == Phase::Definitions);

        Self {
            definitions,
            resources,
        }
    }

    /// Whether discovery must be refreshed between the two steps
    pub fn defines_kinds(&self) -> bool {
        !self.definitions.is_empty()
    }
}

/// Files in apply order
pub fn apply_order(files: &[K8sSourceFile]) -> Vec<&K8sSourceFile> {
    let mut ordered: Vec<_> = files.iter().collect();
    ordered.sort_by_key(|file| Phase::of(file));
    ordered
}

/// Files in delete order: the exact reverse of [`apply_order`]
pub fn delete_order(files: &[K8sSourceFile]) -> Vec<&K8sSourceFile> {
    let mut ordered = apply_order(files);
    ordered.reverse();
    ordered
}
