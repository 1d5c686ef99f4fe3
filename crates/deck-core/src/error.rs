//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Deckfile not found: {path}")]
    DeckfileNotFound { path: String },

    #[error("Invalid Deckfile: {message}")]
    InvalidDeckfile { message: String },

    #[error("Deck not found: {name}")]
    DeckNotFound { name: String },

    #[error("Deckfile declares no decks")]
    NoDecks,

    /// The source reference is absent (or blank) so no protocol can be chosen
    #[error("`source.ref` not specified, cannot determine the source protocol")]
    UnrecognizedSource,

    #[error("Invalid {kind} source: {message}")]
    InvalidSource { kind: String, message: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Failed to parse YAML in {name}: {source}")]
    Document {
        name: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to parse Deckfile: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Whether this is a configuration problem (bad or incomplete Deckfile)
    /// rather than an environment failure
    pub fn is_configuration(&self) -> bool {
        !matches!(self, CoreError::Io(_))
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
