//! Collecting rendered manifests from disk

use deck_core::{K8sSourceFile, decode_documents};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::Result;
use crate::scratch::ScratchDir;

/// Extensions accepted in user-provided manifest trees
const MANIFEST_EXTENSIONS: &[&str] = &["yaml", "yml"];

/// `helm template --output-dir` only ever writes `.yaml`
const HELM_OUTPUT_EXTENSIONS: &[&str] = &["yaml"];

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy().to_lowercase();
            extensions.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Manifest files below `root` in sorted, depth-first order
///
/// A file `root` is returned as-is. `.git` directories are skipped.
pub fn manifest_paths(root: &Path) -> Result<Vec<PathBuf>> {
    paths_with(root, MANIFEST_EXTENSIONS)
}

fn paths_with(root: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.file_name() != ".git");

    for entry in walker {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type().is_file() && has_extension(path, extensions) {
            files.push(path.to_path_buf());
        }
    }

    Ok(files)
}

/// Decode every manifest below `root` into workload files
pub fn collect_manifest_tree(root: &Path, namespace: &str) -> Result<Vec<K8sSourceFile>> {
    decode_tree(root, namespace, MANIFEST_EXTENSIONS)
}

fn decode_tree(root: &Path, namespace: &str, extensions: &[&str]) -> Result<Vec<K8sSourceFile>> {
    let mut files = Vec::new();

    for path in paths_with(root, extensions)? {
        let text = std::fs::read_to_string(&path)?;
        let name = path.display().to_string();
        files.extend(decode_documents(&name, &text, namespace)?);
    }

    Ok(files)
}

/// Drain a helm `--output-dir`, removing it afterwards
///
/// The directory is gone when this returns, whether collection succeeded or
/// not.
pub fn collect_workload_files(scratch: ScratchDir, namespace: &str) -> Result<Vec<K8sSourceFile>> {
    drain(scratch, namespace, HELM_OUTPUT_EXTENSIONS)
}

/// Like [`collect_workload_files`] for an unpacked manifest archive
pub fn collect_unpacked(scratch: ScratchDir, namespace: &str) -> Result<Vec<K8sSourceFile>> {
    drain(scratch, namespace, MANIFEST_EXTENSIONS)
}

fn drain(scratch: ScratchDir, namespace: &str, extensions: &[&str]) -> Result<Vec<K8sSourceFile>> {
    let collected = decode_tree(scratch.path(), namespace, extensions);
    let closed = scratch.close();

    let files = collected?;
    closed?;

    tracing::debug!("Collected {} documents", files.len());
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_manifest_paths_sorted() {
        let dir = tempfile::TempDir::new().unwrap();
        let root = dir.path();
        write(root, "b/templates/service.yaml", "kind: Service");
        write(root, "a/templates/deployment.yaml", "kind: Deployment");
        write(root, "a/templates/configmap.yml", "kind: ConfigMap");
        write(root, "a/NOTES.txt", "hello");
        write(root, ".git/config.yaml", "kind: Ignored");

        let paths: Vec<String> = manifest_paths(root)
            .unwrap()
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().display().to_string())
            .collect();

        assert_eq!(
            paths,
            vec![
                "a/templates/configmap.yml",
                "a/templates/deployment.yaml",
                "b/templates/service.yaml"
            ]
        );
    }

    #[test]
    fn test_collect_single_file() {
        let dir = tempfile::TempDir::new().unwrap();
        write(dir.path(), "app.yaml", "kind: Pod\n---\nkind: Service\n");

        let files = collect_manifest_tree(&dir.path().join("app.yaml"), "web").unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[1].kind(), Some("Service"));
        assert_eq!(files[0].namespace, "web");
    }

    #[test]
    fn test_collect_workload_files_consumes_scratch() {
        let scratch = ScratchDir::new().unwrap();
        let root = scratch.path().to_path_buf();
        write(&root, "app/templates/all.yaml", "kind: ConfigMap\n---\n---\nkind: Secret\n");
        write(&root, "app/templates/empty.yaml", "");

        let files = collect_workload_files(scratch, "default").unwrap();
        assert_eq!(files.len(), 2);
        assert!(!root.exists());
    }

    #[test]
    fn test_helm_output_reads_yaml_only() {
        let scratch = ScratchDir::new().unwrap();
        let root = scratch.path().to_path_buf();
        write(&root, "app/templates/deployment.yaml", "kind: Deployment\n");
        write(&root, "app/templates/stray.yml", "kind: Secret\n");

        let files = collect_workload_files(scratch, "default").unwrap();
        let kinds: Vec<_> = files.iter().filter_map(K8sSourceFile::kind).collect();
        assert_eq!(kinds, vec!["Deployment"]);
    }

    #[test]
    fn test_collect_unpacked_reads_yml() {
        let scratch = ScratchDir::new().unwrap();
        let root = scratch.path().to_path_buf();
        write(&root, "manifests/a.yml", "kind: Secret\n");
        write(&root, "manifests/b.yaml", "kind: Service\n");

        let files = collect_unpacked(scratch, "default").unwrap();
        assert_eq!(files.len(), 2);
        assert!(!root.exists());
    }

    #[test]
    fn test_collect_workload_files_removes_on_error() {
        let scratch = ScratchDir::new().unwrap();
        let root = scratch.path().to_path_buf();
        write(&root, "app/templates/broken.yaml", "kind: [unclosed");

        assert!(collect_workload_files(scratch, "default").is_err());
        assert!(!root.exists());
    }
}
