//! CLI error type with exit code handling

use deck_core::CoreError;
use deck_engine::EngineError;
use deck_kube::KubeError;
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// Everything a command can fail with
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// Deckfile or configuration problem
    #[error(transparent)]
    #[diagnostic(code(deck::deckfile), help("check the Deckfile and its source definitions"))]
    Deckfile(#[from] CoreError),

    /// Rendering a source failed
    #[error(transparent)]
    #[diagnostic(code(deck::render))]
    Render(#[from] EngineError),

    /// Talking to the cluster failed
    #[error(transparent)]
    #[diagnostic(code(deck::cluster), help("check the current kube context"))]
    Cluster(#[from] KubeError),

    /// Some resources could not be applied or deleted
    #[error("{action} failed for {count} resource(s): {details}")]
    #[diagnostic(code(deck::resources))]
    Resources {
        action: &'static str,
        count: usize,
        details: String,
    },

    /// Writing output failed
    #[error("IO error: {0}")]
    #[diagnostic(code(deck::io))]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        exit_codes::ERROR
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
