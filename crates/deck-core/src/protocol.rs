//! Source reference classification
//!
//! A reference is sniffed purely from its syntax:
//! - VCS schemes (`git@`, `git://`, `ssh://`, `git+...`) or a `.git` suffix → git
//! - `http://` / `https://` → http(s)
//! - anything else → a local filesystem path

use std::fmt;

use crate::error::{CoreError, Result};

const GIT_PREFIXES: &[&str] = &[
    "git@",
    "git://",
    "ssh://",
    "git+ssh://",
    "git+http://",
    "git+https://",
];

/// Protocol of a source reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    Local,
    Git,
    Http,
    Https,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Local => "local",
            Protocol::Git => "git",
            Protocol::Http => "http",
            Protocol::Https => "https",
        }
    }

    /// http and https take the same code paths
    pub fn is_http(&self) -> bool {
        matches!(self, Protocol::Http | Protocol::Https)
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a source reference
///
/// Fails with [`CoreError::UnrecognizedSource`] when the reference is absent
/// or blank.
pub fn sniff_protocol(reference: Option<&str>) -> Result<Protocol> {
    let reference = reference
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .ok_or(CoreError::UnrecognizedSource)?;

    let lower = reference.to_ascii_lowercase();

    if GIT_PREFIXES.iter().any(|p| lower.starts_with(p))
        || lower.trim_end_matches('/').ends_with(".git")
    {
        return Ok(Protocol::Git);
    }

    if lower.starts_with("https://") {
        return Ok(Protocol::Https);
    }
    if lower.starts_with("http://") {
        return Ok(Protocol::Http);
    }

    Ok(Protocol::Local)
}
