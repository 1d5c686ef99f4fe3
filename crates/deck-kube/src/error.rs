//! Error types for deck-kube

use thiserror::Error;

/// Result type for deck-kube operations
pub type Result<T> = std::result::Result<T, KubeError>;

/// Errors that can occur while talking to the cluster
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KubeError {
    /// Kubernetes API error
    #[error("Kubernetes API error: {0}")]
    Api(#[from] kube::Error),

    /// A rendered document cannot be sent to the API server
    #[error("invalid manifest {name}: {message}")]
    InvalidManifest { name: String, message: String },

    /// The API server does not serve this kind
    #[error("unknown resource type {api_version}/{kind}")]
    UnknownResource { api_version: String, kind: String },

    /// Pods did not become ready in time
    #[error("pods not ready after {seconds}s: {}", pending.join(", "))]
    Timeout { seconds: u64, pending: Vec<String> },

    /// IO error (runtime setup)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl KubeError {
    /// Check if this is a Kubernetes 404 Not Found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, KubeError::Api(kube::Error::Api(resp)) if resp.code == 404)
    }
}
