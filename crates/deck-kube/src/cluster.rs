//! Blocking facade over the current kube context
//!
//! Rendering is synchronous, so the cluster owns a tokio runtime and blocks on
//! every API call.

use deck_engine::{ClusterVersion, EngineError, RenderedDeck, VersionInfo};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;

use crate::error::Result;
use crate::resources::{OperationSummary, ResourceManager};
use crate::wait;

/// Connection to the cluster of the current kube context
#[derive(Clone)]
pub struct Cluster {
    runtime: Arc<Runtime>,
    client: kube::Client,
}

impl Cluster {
    /// Connect using the default kubeconfig / in-cluster configuration
    pub fn connect() -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        let client = runtime.block_on(kube::Client::try_default())?;

        Ok(Self {
            runtime: Arc::new(runtime),
            client,
        })
    }

    /// Ensure the deck's namespaces, then apply every file, CRDs first
    pub fn apply(&self, deck: &RenderedDeck) -> Result<OperationSummary> {
        self.runtime.block_on(async {
            let mut manager = ResourceManager::new(self.client.clone()).await?;
            manager.ensure_namespaces(&deck.namespaces).await?;
            manager.apply_files(&deck.files).await
        })
    }

    /// Delete every file of the deck
    pub fn delete(&self, deck: &RenderedDeck) -> Result<OperationSummary> {
        self.runtime.block_on(async {
            let manager = ResourceManager::new(self.client.clone()).await?;
            manager.delete_files(&deck.files).await
        })
    }

    /// Block until all pods in `namespaces` are ready
    pub fn wait_for_pods(&self, namespaces: &[String], timeout: Duration) -> Result<()> {
        self.runtime
            .block_on(wait::wait_for_pods(&self.client, namespaces, timeout))
    }
}

impl ClusterVersion for Cluster {
    fn server_version(&self) -> deck_engine::Result<VersionInfo> {
        let info = self
            .runtime
            .block_on(self.client.apiserver_version())
            .map_err(|e| EngineError::ClusterVersion(e.to_string()))?;

        Ok(VersionInfo::new(info.major, info.minor))
    }
}
