//! Deckfile definition and loading

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::error::{CoreError, Result};
use crate::protocol::{Protocol, sniff_protocol};

/// File names tried when a Deckfile location is a directory
pub const DECKFILE_NAMES: &[&str] = &["deck.yaml", ".deck.yaml"];

/// The root descriptor: one or more Decks
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deckfile {
    /// Optional Deckfile name
    #[serde(default)]
    pub name: Option<String>,

    /// Declared decks
    #[serde(default)]
    pub decks: Vec<Deck>,

    /// Directory the Deckfile was loaded from (base for relative local refs)
    #[serde(skip)]
    pub location: PathBuf,
}

/// A named application bundle
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    pub name: String,

    /// Target namespace for all sources without their own
    #[serde(default)]
    pub namespace: Option<String>,

    /// Free text shown after the deck was installed
    #[serde(default)]
    pub notes: Option<String>,

    /// Sources in render/apply order
    #[serde(default)]
    pub sources: Vec<Source>,
}

/// A source of Kubernetes manifests, tagged by `type`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Source {
    Helm(HelmSource),
    Git(GitSource),
    Inline(InlineSource),
    Local(LocalSource),
    Http(HttpSource),
}

/// A Helm chart from a local path, a git repository or a chart repository
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HelmSource {
    #[serde(rename = "ref", default)]
    pub reference: Option<String>,

    /// Chart directory inside `ref`
    #[serde(default)]
    pub path: Option<String>,

    /// Chart name inside a chart repository (http refs)
    #[serde(default)]
    pub chart: Option<String>,

    #[serde(default)]
    pub release_name: Option<String>,

    /// Value files, relative to the chart directory
    #[serde(default)]
    pub value_files: Vec<String>,

    /// `--set` parameters as `{name, value}` entries
    #[serde(default)]
    pub parameters: Vec<Value>,

    /// Raw arguments appended to `helm template`
    #[serde(default)]
    pub helm_args: Vec<String>,

    /// Plugin subcommands placed between `helm` and `template`
    #[serde(default)]
    pub helm_plugins: Vec<String>,

    #[serde(default)]
    pub namespace: Option<String>,
}

/// Plain manifests inside a git repository
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GitSource {
    #[serde(rename = "ref", default)]
    pub reference: Option<String>,

    /// File or directory inside the repository
    #[serde(default)]
    pub path: Option<String>,

    /// Branch or tag to check out
    #[serde(default)]
    pub target_revision: Option<String>,

    #[serde(default)]
    pub namespace: Option<String>,
}

/// A document embedded in the Deckfile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct InlineSource {
    #[serde(default)]
    pub content: Value,

    #[serde(default)]
    pub namespace: Option<String>,
}

/// A manifest file or directory next to the Deckfile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LocalSource {
    #[serde(rename = "ref", default)]
    pub reference: Option<String>,

    #[serde(default)]
    pub namespace: Option<String>,
}

/// A manifest or chart archive served over http(s)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HttpSource {
    #[serde(rename = "ref", default)]
    pub reference: Option<String>,

    #[serde(default)]
    pub namespace: Option<String>,
}

impl Source {
    /// The `type` tag of this source
    pub fn kind(&self) -> &'static str {
        match self {
            Source::Helm(_) => "helm",
            Source::Git(_) => "git",
            Source::Inline(_) => "inline",
            Source::Local(_) => "local",
            Source::Http(_) => "http",
        }
    }

    /// Namespace declared on the source itself
    pub fn namespace(&self) -> Option<&str> {
        match self {
            Source::Helm(s) => s.namespace.as_deref(),
            Source::Git(s) => s.namespace.as_deref(),
            Source::Inline(s) => s.namespace.as_deref(),
            Source::Local(s) => s.namespace.as_deref(),
            Source::Http(s) => s.namespace.as_deref(),
        }
    }

    /// The `ref` location, if this kind has one
    pub fn reference(&self) -> Option<&str> {
        match self {
            Source::Helm(s) => s.reference.as_deref(),
            Source::Git(s) => s.reference.as_deref(),
            Source::Local(s) => s.reference.as_deref(),
            Source::Http(s) => s.reference.as_deref(),
            Source::Inline(_) => None,
        }
    }

    /// Sniffed protocol of `ref`
    pub fn protocol(&self) -> Result<Protocol> {
        sniff_protocol(self.reference())
    }
}

impl Deckfile {
    /// Load a Deckfile from a file, or from a directory containing `deck.yaml`
    pub fn load(path: &Path) -> Result<Self> {
        let file = Self::locate(path)?;
        let content = std::fs::read_to_string(&file)?;
        let mut deckfile = Self::from_yaml(&content)?;

        deckfile.location = file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        tracing::debug!("Loaded Deckfile {}", file.display());
        Ok(deckfile)
    }

    /// Parse and validate Deckfile content; `location` is left empty
    pub fn from_yaml(content: &str) -> Result<Self> {
        let deckfile: Deckfile = serde_yaml::from_str(content)?;
        deckfile.validate()?;
        Ok(deckfile)
    }

    /// Resolve the Deckfile path for a file or directory argument
    pub fn locate(path: &Path) -> Result<PathBuf> {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }

        if path.is_dir() {
            for name in DECKFILE_NAMES {
                let candidate = path.join(name);
                if candidate.is_file() {
                    return Ok(candidate);
                }
            }
        }

        Err(CoreError::DeckfileNotFound {
            path: path.display().to_string(),
        })
    }

    fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();

        for deck in &self.decks {
            if deck.name.trim().is_empty() {
                return Err(CoreError::InvalidDeckfile {
                    message: "every deck needs a non-empty `name`".to_string(),
                });
            }
            if !seen.insert(deck.name.as_str()) {
                return Err(CoreError::InvalidDeckfile {
                    message: format!("deck `{}` is declared more than once", deck.name),
                });
            }
        }

        Ok(())
    }

    /// Names of all declared decks, in declaration order
    pub fn deck_names(&self) -> Vec<&str> {
        self.decks.iter().map(|d| d.name.as_str()).collect()
    }

    /// The named deck, or the first one when no name is given
    pub fn get_deck(&self, name: Option<&str>) -> Result<&Deck> {
        match name {
            Some(name) => self
                .decks
                .iter()
                .find(|d| d.name == name)
                .ok_or_else(|| CoreError::DeckNotFound {
                    name: name.to_string(),
                }),
            None => self.decks.first().ok_or(CoreError::NoDecks),
        }
    }
}
