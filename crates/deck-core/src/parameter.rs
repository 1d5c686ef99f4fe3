//! Helm `--set` parameters declared in a Deckfile
//!
//! Parameters are kept as raw YAML values so that a single broken entry does not
//! reject the whole Deckfile. Each entry is checked when the command line is
//! built and malformed entries are reported individually.

use serde_json::Value;
use thiserror::Error;

/// Why a parameter entry cannot become a `--set` flag
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MalformedParameter {
    #[error("parameter entry is not a mapping")]
    NotAMapping,

    #[error("parameter entry has no `name`")]
    MissingName,

    #[error("parameter `{name}` has no `value`")]
    MissingValue { name: String },

    #[error("parameter `{name}` has a {found} value, expected a scalar")]
    UnsupportedValue { name: String, found: &'static str },
}

/// Render a parameter entry as the `name=value` argument of `--set`
///
/// Booleans are lowercased (`true`/`false`), numbers keep their YAML spelling.
pub fn set_argument(entry: &Value) -> Result<String, MalformedParameter> {
    let map = entry.as_object().ok_or(MalformedParameter::NotAMapping)?;

    let name = match map.get("name") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return Err(MalformedParameter::MissingName),
    };

    let value = match map.get("value") {
        None | Some(Value::Null) => return Err(MalformedParameter::MissingValue { name }),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(_)) => {
            return Err(MalformedParameter::UnsupportedValue { name, found: "sequence" });
        }
        Some(Value::Object(_)) => {
            return Err(MalformedParameter::UnsupportedValue { name, found: "mapping" });
        }
    };

    Ok(format!("{}={}", name, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_argument_scalars() {
        assert_eq!(set_argument(&json!({"name": "replicas", "value": 3})).unwrap(), "replicas=3");
        assert_eq!(
            set_argument(&json!({"name": "image.tag", "value": "1.2.3"})).unwrap(),
            "image.tag=1.2.3"
        );
        assert_eq!(set_argument(&json!({"name": "ratio", "value": 0.5})).unwrap(), "ratio=0.5");
    }

    #[test]
    fn test_set_argument_bool_lowercase() {
        assert_eq!(
            set_argument(&json!({"name": "ingress.enabled", "value": true})).unwrap(),
            "ingress.enabled=true"
        );
        assert_eq!(
            set_argument(&json!({"name": "debug", "value": false})).unwrap(),
            "debug=false"
        );
    }

    #[test]
    fn test_set_argument_missing_value() {
        assert_eq!(
            set_argument(&json!({"name": "replicas"})),
            Err(MalformedParameter::MissingValue { name: "replicas".to_string() })
        );
        assert_eq!(
            set_argument(&json!({"name": "replicas", "value": null})),
            Err(MalformedParameter::MissingValue { name: "replicas".to_string() })
        );
    }

    #[test]
    fn test_set_argument_missing_name() {
        assert_eq!(set_argument(&json!({"value": 1})), Err(MalformedParameter::MissingName));
    }

    #[test]
    fn test_set_argument_not_a_mapping() {
        assert_eq!(set_argument(&json!("replicas=3")), Err(MalformedParameter::NotAMapping));
        assert_eq!(set_argument(&json!(null)), Err(MalformedParameter::NotAMapping));
    }

    #[test]
    fn test_set_argument_nested_value() {
        assert!(matches!(
            set_argument(&json!({"name": "list", "value": [1, 2]})),
            Err(MalformedParameter::UnsupportedValue { found: "sequence", .. })
        ));
    }
}
