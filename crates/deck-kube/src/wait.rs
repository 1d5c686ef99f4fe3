//! Waiting for pods to become ready

use futures::future::try_join_all;
use k8s_openapi::api::core::v1::Pod;
use kube::{
    Client,
    api::{Api, ListParams},
};
use std::time::{Duration, Instant};

use crate::error::{KubeError, Result};

/// Delay between two polls
pub const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// A pod is done waiting when it has completed or its `Ready` condition is true
pub fn pod_is_ready(pod: &Pod) -> bool {
    let Some(status) = pod.status.as_ref() else {
        return false;
    };

    if status.phase.as_deref() == Some("Succeeded") {
        return true;
    }

    status
        .conditions
        .as_ref()
        .map(|conditions| {
            conditions
                .iter()
                .any(|c| c.type_ == "Ready" && c.status == "True")
        })
        .unwrap_or(false)
}

fn pod_name(pod: &Pod) -> String {
    format!(
        "{}/{}",
        pod.metadata.namespace.as_deref().unwrap_or_default(),
        pod.metadata.name.as_deref().unwrap_or("unnamed")
    )
}

/// Pods across `namespaces` that are not ready yet
async fn pending_pods(client: &Client, namespaces: &[String]) -> Result<Vec<String>> {
    let lists = try_join_all(namespaces.iter().map(|ns| {
        let api: Api<Pod> = Api::namespaced(client.clone(), ns);
        async move { api.list(&ListParams::default()).await }
    }))
    .await?;

    Ok(lists
        .into_iter()
        .flat_map(|list| list.items)
        .filter(|pod| !pod_is_ready(pod))
        .map(|pod| pod_name(&pod))
        .collect())
}

/// Poll until every pod in `namespaces` is ready or `timeout` expires
pub async fn wait_for_pods(
    client: &Client,
    namespaces: &[String],
    timeout: Duration,
) -> Result<()> {
    let deadline = Instant::now() + timeout;

    loop {
        let pending = pending_pods(client, namespaces).await?;
        if pending.is_empty() {
            return Ok(());
        }

        if Instant::now() >= deadline {
            return Err(KubeError::Timeout {
                seconds: timeout.as_secs(),
                pending,
            });
        }

        tracing::debug!("Waiting for {} pods: {}", pending.len(), pending.join(", "));
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}
