//! Rendered workload documents

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CoreError, Result};

/// Namespace used when neither the source nor the deck names one
pub const DEFAULT_NAMESPACE: &str = "default";

/// A single decoded Kubernetes document ready to be applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct K8sSourceFile {
    /// Provenance (file path, URL or source description)
    pub name: String,

    /// Decoded document tree
    pub content: Value,

    /// Target namespace, never empty
    pub namespace: String,
}

impl K8sSourceFile {
    pub fn new(name: impl Into<String>, content: Value, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        Self {
            name: name.into(),
            content,
            namespace: if namespace.is_empty() {
                DEFAULT_NAMESPACE.to_string()
            } else {
                namespace
            },
        }
    }

    /// `kind` of the document, if present
    pub fn kind(&self) -> Option<&str> {
        self.content.get("kind").and_then(Value::as_str)
    }

    /// `metadata.name` of the document, if present
    pub fn resource_name(&self) -> Option<&str> {
        self.content
            .get("metadata")
            .and_then(|m| m.get("name"))
            .and_then(Value::as_str)
    }

    /// Render the document back to YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.content)?)
    }
}

/// Pick the first non-empty namespace, falling back to `"default"`
pub fn resolve_namespace(candidates: &[Option<&str>]) -> String {
    candidates
        .iter()
        .flatten()
        .map(|ns| ns.trim())
        .find(|ns| !ns.is_empty())
        .unwrap_or(DEFAULT_NAMESPACE)
        .to_string()
}

/// Decode a (multi-document) YAML stream into workload files
///
/// Null and empty documents are dropped.
pub fn decode_documents(name: &str, text: &str, namespace: &str) -> Result<Vec<K8sSourceFile>> {
    use serde::Deserialize as _;

    let mut files = Vec::new();

    for document in serde_yaml::Deserializer::from_str(text) {
        let content = Value::deserialize(document).map_err(|source| CoreError::Document {
            name: name.to_string(),
            source,
        })?;

        if is_empty_document(&content) {
            continue;
        }

        files.push(K8sSourceFile::new(name, content, namespace));
    }

    Ok(files)
}

fn is_empty_document(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolve_namespace() {
        assert_eq!(resolve_namespace(&[None, None]), "default");
        assert_eq!(resolve_namespace(&[None, Some("test")]), "test");
        assert_eq!(resolve_namespace(&[Some("own"), Some("deck")]), "own");
        assert_eq!(resolve_namespace(&[Some(""), Some("deck")]), "deck");
        assert_eq!(resolve_namespace(&[Some(" "), None]), "default");
    }

    #[test]
    fn test_new_never_empty_namespace() {
        let file = K8sSourceFile::new("inline", json!({}), "");
        assert_eq!(file.namespace, "default");
    }

    #[test]
    fn test_decode_multi_document() {
        let text = r#"apiVersion: v1
kind: ConfigMap
metadata:
  name: first
---
apiVersion: v1
kind: Service
metadata:
  name: second
"#;
        let files = decode_documents("all.yaml", text, "apps").unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].kind(), Some("ConfigMap"));
        assert_eq!(files[1].resource_name(), Some("second"));
        assert!(files.iter().all(|f| f.namespace == "apps" && f.name == "all.yaml"));
    }

    #[test]
    fn test_decode_drops_empty_documents() {
        let text = "---\n# only a comment\n---\nkind: Secret\n---\n{}\n---\n";
        let files = decode_documents("mixed.yaml", text, "default").unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].kind(), Some("Secret"));
    }

    #[test]
    fn test_decode_invalid_yaml() {
        let err = decode_documents("broken.yaml", "kind: [unclosed", "default").unwrap_err();
        assert!(err.to_string().contains("broken.yaml"));
    }

    #[test]
    fn test_to_yaml() {
        let file = K8sSourceFile::new("x", json!({"kind": "Namespace"}), "default");
        assert_eq!(file.to_yaml().unwrap().trim(), "kind: Namespace");
    }
}
