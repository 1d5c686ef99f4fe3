//! Kubernetes API version lookup
//!
//! Helm output is pinned to the target cluster with `--kube-version` and
//! `--api-versions`. Where the version comes from is abstracted behind
//! [`ClusterVersion`]: a live cluster in `deck-kube`, or a fixed value for
//! offline rendering.

use crate::error::{EngineError, Result};

/// The `major`/`minor` pair reported by `GET /version`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    pub major: String,
    pub minor: String,
}

impl VersionInfo {
    pub fn new(major: impl Into<String>, minor: impl Into<String>) -> Self {
        Self {
            major: major.into(),
            minor: minor.into(),
        }
    }

    /// `X.Y` with every non-digit removed from both parts (`"27+"` → `"27"`)
    pub fn major_minor(&self) -> Result<String> {
        let major = digits(&self.major);
        let minor = digits(&self.minor);

        if major.is_empty() || minor.is_empty() {
            return Err(EngineError::ClusterVersion(format!(
                "unusable version major={:?} minor={:?}",
                self.major, self.minor
            )));
        }

        Ok(format!("{}.{}", major, minor))
    }
}

fn digits(s: &str) -> String {
    s.chars().filter(char::is_ascii_digit).collect()
}

/// Source of the target cluster's API version
pub trait ClusterVersion {
    fn server_version(&self) -> Result<VersionInfo>;
}

/// A fixed version, for rendering without a cluster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticVersion(pub VersionInfo);

impl StaticVersion {
    /// Parse `X.Y` (a leading `v` is accepted)
    pub fn parse(version: &str) -> Result<Self> {
        let trimmed = version.trim().trim_start_matches('v');
        let (major, minor) = trimmed.split_once('.').ok_or_else(|| {
            EngineError::ClusterVersion(format!("expected MAJOR.MINOR, got '{}'", version))
        })?;
        let minor = minor.split('.').next().unwrap_or(minor);

        let info = VersionInfo::new(major, minor);
        info.major_minor()?;
        Ok(Self(info))
    }
}

impl ClusterVersion for StaticVersion {
    fn server_version(&self) -> Result<VersionInfo> {
        Ok(self.0.clone())
    }
}

/// A cluster that cannot be reached; every lookup fails
#[derive(Debug, Clone, Default)]
pub struct NoCluster;

impl ClusterVersion for NoCluster {
    fn server_version(&self) -> Result<VersionInfo> {
        Err(EngineError::ClusterVersion(
            "no cluster connection available; pass --kube-version to render offline".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_major_minor_strips_non_digits() {
        assert_eq!(VersionInfo::new("1", "27+").major_minor().unwrap(), "1.27");
        assert_eq!(VersionInfo::new("v1", "30-gke").major_minor().unwrap(), "1.30");
    }

    #[test]
    fn test_major_minor_rejects_empty() {
        assert!(VersionInfo::new("", "27").major_minor().is_err());
        assert!(VersionInfo::new("1", "x").major_minor().is_err());
    }

    #[test]
    fn test_static_version_parse() {
        assert_eq!(StaticVersion::parse("1.29").unwrap().0, VersionInfo::new("1", "29"));
        assert_eq!(StaticVersion::parse("v1.28.3").unwrap().0, VersionInfo::new("1", "28"));
        assert!(StaticVersion::parse("129").is_err());
    }

    #[test]
    fn test_no_cluster_fails() {
        assert!(matches!(
            NoCluster.server_version(),
            Err(EngineError::ClusterVersion(_))
        ));
    }
}
