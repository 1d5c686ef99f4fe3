//! Engine error types

use deck_core::CoreError;
use thiserror::Error;

/// Errors raised while rendering sources
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EngineError {
    /// Deckfile or source configuration problem
    #[error(transparent)]
    Core(#[from] CoreError),

    /// An external tool exited with a non-zero status
    #[error("`{command}` failed with exit code {}: {stderr}", code_or_none(exit_code))]
    ToolExecution {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    /// An external tool could not be started
    #[error("`{program}` could not be started: {message}")]
    ToolNotFound { program: String, message: String },

    /// The cluster version could not be determined
    #[error("could not query the Kubernetes API version: {0}")]
    ClusterVersion(String),

    /// An http(s) source could not be fetched
    #[error("failed to download {url}: {message}")]
    Download { url: String, message: String },

    /// A source failed while rendering a deck
    #[error("source #{index} ({kind}) of deck '{deck}' failed: {source}")]
    Source {
        deck: String,
        index: usize,
        kind: String,
        #[source]
        source: Box<EngineError>,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn code_or_none(code: &Option<i32>) -> String {
    code.map_or_else(|| "none".to_string(), |c| c.to_string())
}

impl EngineError {
    /// Configuration errors are never worth retrying
    pub fn is_configuration(&self) -> bool {
        match self {
            EngineError::Core(e) => e.is_configuration(),
            EngineError::Source { source, .. } => source.is_configuration(),
            _ => false,
        }
    }

    /// The exit code of a failed tool, if that is what happened
    pub fn tool_exit_code(&self) -> Option<i32> {
        match self {
            EngineError::ToolExecution { exit_code, .. } => *exit_code,
            EngineError::Source { source, .. } => source.tool_exit_code(),
            _ => None,
        }
    }
}

impl From<walkdir::Error> for EngineError {
    fn from(e: walkdir::Error) -> Self {
        EngineError::Io(e.into())
    }
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
