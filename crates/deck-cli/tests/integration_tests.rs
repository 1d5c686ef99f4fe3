//! Integration tests for CLI commands
//!
//! Only inline and local sources are used so neither helm, git nor a cluster
//! is required.

use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

const DECKFILE: &str = r#"
version: "1"
name: demo
cluster:
  provider: k3d
  name: demo
decks:
  - name: shop
    namespace: shop
    notes: |
      Shop is ready.
    sources:
      - type: inline
        content:
          apiVersion: v1
          kind: Namespace
          metadata:
            name: shop
      - type: local
        ref: ./manifests
  - name: tools
    sources:
      - type: local
        ref: ./manifests/service.yaml
        namespace: tools
"#;

/// Helper to run the deck binary with an isolated config
fn deck(dir: &Path, args: &[&str]) -> std::process::Output {
    let config = dir.join("config.yaml");
    Command::new(env!("CARGO_BIN_EXE_deck"))
        .arg("--config")
        .arg(&config)
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute deck")
}

/// A Deckfile with a local manifest directory
fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let manifests = dir.path().join("manifests");
    fs::create_dir_all(&manifests).unwrap();
    fs::write(
        manifests.join("deployment.yaml"),
        concat!(
            "apiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: shop\n",
            "---\n",
            "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: shop-settings\n",
        ),
    )
    .unwrap();
    fs::write(
        manifests.join("service.yaml"),
        "apiVersion: v1\nkind: Service\nmetadata:\n  name: shop\n",
    )
    .unwrap();
    fs::write(manifests.join("README.md"), "not a manifest").unwrap();
    fs::write(dir.path().join("deck.yaml"), DECKFILE).unwrap();
    fs::write(dir.path().join("config.yaml"), "defaultNamespace: sandbox\n").unwrap();
    dir
}

fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

mod list_command {
    use super::*;

    #[test]
    fn test_list_decks() {
        let dir = project();
        let output = deck(dir.path(), &["list"]);

        assert!(output.status.success(), "stderr: {}", stderr(&output));
        let lines: Vec<_> = stdout(&output).lines().map(str::to_string).collect();
        assert_eq!(lines, vec!["shop", "tools"]);
    }

    #[test]
    fn test_list_explicit_file() {
        let dir = project();
        let path = dir.path().join("deck.yaml");
        let output = deck(dir.path(), &["list", path.to_str().unwrap()]);

        assert!(output.status.success());
        assert!(stdout(&output).contains("shop"));
    }

    #[test]
    fn test_list_missing_deckfile() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.yaml"), "{}\n").unwrap();
        let output = deck(dir.path(), &["list"]);

        assert_eq!(output.status.code(), Some(1));
        assert!(stderr(&output).contains("There was an error running deck:"));
        assert!(stderr(&output).contains("Deckfile not found"));
    }
}

mod template_command {
    use super::*;

    #[test]
    fn test_template_first_deck_to_stdout() {
        let dir = project();
        let output = deck(dir.path(), &["template", "--kube-version", "1.29"]);

        assert!(output.status.success(), "stderr: {}", stderr(&output));
        let out = stdout(&output);

        let namespace = out.find("kind: Namespace").unwrap();
        let deployment = out.find("kind: Deployment").unwrap();
        let config_map = out.find("kind: ConfigMap").unwrap();
        let service = out.find("kind: Service").unwrap();
        assert!(namespace < deployment && deployment < config_map && config_map < service);

        assert_eq!(out.matches("---").count(), 4);
        assert!(out.contains("# Source: shop/inline"));
        assert!(!out.contains("not a manifest"));
    }

    #[test]
    fn test_template_named_deck() {
        let dir = project();
        let output = deck(dir.path(), &["template", "--name", "tools", "--kube-version", "1.29"]);

        assert!(output.status.success(), "stderr: {}", stderr(&output));
        let out = stdout(&output);
        assert!(out.contains("kind: Service"));
        assert!(!out.contains("kind: Deployment"));
    }

    #[test]
    fn test_template_output_dir() {
        let dir = project();
        let out_dir = dir.path().join("rendered");
        let output = deck(
            dir.path(),
            &["template", "--kube-version", "1.29", "--output-dir", out_dir.to_str().unwrap()],
        );

        assert!(output.status.success(), "stderr: {}", stderr(&output));

        let mut names: Vec<_> = fs::read_dir(&out_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "000-namespace-shop.yaml",
                "001-deployment-shop.yaml",
                "002-configmap-shop-settings.yaml",
                "003-service-shop.yaml",
            ]
        );

        let content = fs::read_to_string(out_dir.join("001-deployment-shop.yaml")).unwrap();
        let doc: serde_yaml::Value = serde_yaml::from_str(&content).unwrap();
        assert_eq!(doc["kind"], serde_yaml::Value::from("Deployment"));
        assert!(stdout(&output).contains("wrote"));
    }

    #[test]
    fn test_template_unknown_deck() {
        let dir = project();
        let output = deck(dir.path(), &["template", "--name", "nope", "--kube-version", "1.29"]);

        assert_eq!(output.status.code(), Some(1));
        let err = stderr(&output);
        assert!(err.contains("There was an error running deck:"));
        assert!(err.contains("Deck not found: nope"));
    }

    #[test]
    fn test_template_missing_local_source() {
        let dir = project();
        fs::write(
            dir.path().join("deck.yaml"),
            "decks:\n  - name: broken\n    sources:\n      - type: local\n        ref: ./nowhere\n",
        )
        .unwrap();

        let output = deck(dir.path(), &["template", "--kube-version", "1.29"]);

        assert_eq!(output.status.code(), Some(1));
        let err = stderr(&output);
        assert!(err.contains("source #0 (local) of deck 'broken' failed"));
    }

    #[test]
    fn test_template_rejects_inapplicable_source_keys() {
        let dir = project();
        fs::write(
            dir.path().join("deck.yaml"),
            concat!(
                "decks:\n  - name: bad\n    sources:\n",
                "      - type: inline\n        chart: nginx\n        content: {}\n",
            ),
        )
        .unwrap();

        let output = deck(dir.path(), &["template", "--kube-version", "1.29"]);
        assert_eq!(output.status.code(), Some(1));
    }

    #[test]
    fn test_template_empty_deckfile() {
        let dir = project();
        fs::write(dir.path().join("deck.yaml"), "decks: []\n").unwrap();

        let output = deck(dir.path(), &["template", "--kube-version", "1.29"]);
        assert_eq!(output.status.code(), Some(1));
        assert!(stderr(&output).contains("Deckfile declares no decks"));
    }

    #[test]
    fn test_template_bad_kube_version() {
        let dir = project();
        let output = deck(dir.path(), &["template", "--kube-version", "latest"]);

        assert_eq!(output.status.code(), Some(1));
    }
}

mod get_command {
    use super::*;

    #[test]
    fn test_timeout_must_be_positive() {
        let dir = project();
        let output = deck(dir.path(), &["get", "--wait", "--timeout", "0"]);

        assert!(!output.status.success());
    }

    #[test]
    fn test_current_context_flags_are_accepted() {
        let dir = project();
        // The deck lookup fails before any cluster is contacted
        let output = deck(dir.path(), &["get", "-I", "-y", "--name", "nope"]);

        assert_eq!(output.status.code(), Some(1));
        assert!(stderr(&output).contains("Deck not found: nope"));

        let output = deck(
            dir.path(),
            &["get", "--no-cluster", "--no-input", "--wait", "--name", "nope"],
        );
        assert_eq!(output.status.code(), Some(1));
    }
}

mod remove_command {
    use super::*;

    #[test]
    fn test_no_cluster_flag_is_accepted() {
        let dir = project();
        let output = deck(dir.path(), &["remove", "-I", "--name", "nope"]);

        assert_eq!(output.status.code(), Some(1));
        assert!(stderr(&output).contains("Deck not found: nope"));
    }

    #[test]
    fn test_no_input_is_get_only() {
        let dir = project();
        let output = deck(dir.path(), &["remove", "--no-input"]);

        assert_eq!(output.status.code(), Some(2));
    }
}

mod version_command {
    use super::*;

    #[test]
    fn test_version() {
        let dir = project();
        let output = deck(dir.path(), &["version"]);

        assert!(output.status.success());
        assert!(stdout(&output).starts_with(&format!("deck {}", env!("CARGO_PKG_VERSION"))));
    }
}
