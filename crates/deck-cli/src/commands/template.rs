//! Template command - render a deck locally

use console::style;
use deck_core::K8sSourceFile;
use deck_engine::{NoCluster, Renderer, StaticVersion};
use deck_kube::Cluster;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

pub fn run(
    deckfile_path: &Path,
    name: Option<&str>,
    kube_version: Option<&str>,
    output_dir: Option<&Path>,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = super::load_config(config_path)?;
    let deckfile = super::load_deckfile(deckfile_path)?;

    let builder = Renderer::builder().config(config);
    let renderer = match kube_version {
        Some(version) => builder.versions(StaticVersion::parse(version)?).build(),
        None => match Cluster::connect() {
            Ok(cluster) => builder.versions(cluster).build(),
            Err(e) => {
                tracing::debug!("No cluster available: {}", e);
                builder.versions(NoCluster).build()
            }
        },
    };

    let rendered = renderer.render(&deckfile, name)?;

    match output_dir {
        Some(dir) => write_files(dir, &rendered.files)?,
        None => print_files(&rendered.files)?,
    }

    Ok(())
}

/// `<index>-<kind>-<name>.yaml`, lowercase
fn file_name(index: usize, file: &K8sSourceFile) -> String {
    let kind = file.kind().unwrap_or("document");
    let name = file.resource_name().unwrap_or("unnamed");
    let slug: String = format!("{}-{}", kind, name)
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '.' { c } else { '-' })
        .collect();
    format!("{:03}-{}.yaml", index, slug)
}

fn write_files(dir: &Path, files: &[K8sSourceFile]) -> Result<()> {
    fs::create_dir_all(dir)?;

    for (index, file) in files.iter().enumerate() {
        let path: PathBuf = dir.join(file_name(index, file));
        fs::write(&path, file.to_yaml()?)?;
        println!("{} {}", style("wrote").green(), path.display());
    }

    Ok(())
}

fn print_files(files: &[K8sSourceFile]) -> Result<()> {
    for file in files {
        println!("---");
        println!("{}", style(format!("# Source: {}", file.name)).dim());
        println!("{}", file.to_yaml()?.trim_end());
    }

    Ok(())
}
