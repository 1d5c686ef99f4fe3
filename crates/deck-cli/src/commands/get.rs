//! Get command - render a deck and apply it to the current cluster

use console::style;
use deck_engine::Renderer;
use deck_kube::{Cluster, OperationSummary};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

use crate::error::{CliError, Result};

/// Flags of `deck get`
#[derive(Debug, Clone)]
pub struct GetOptions {
    pub wait: bool,
    pub timeout: u64,
    /// Deck always targets the current kubectl context; kept for compatibility
    pub no_cluster: bool,
    pub no_input: bool,
}

pub fn run(
    deckfile_path: &Path,
    name: Option<&str>,
    options: &GetOptions,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = super::load_config(config_path)?;
    let deckfile = super::load_deckfile(deckfile_path)?;
    let deck = deckfile.get_deck(name)?;

    let cluster = super::connect(options.no_cluster)?;
    let renderer = Renderer::builder()
        .config(config)
        .versions(cluster.clone())
        .build();

    let rendered = renderer.render(&deckfile, Some(deck.name.as_str()))?;
    println!(
        "{} {} ({} documents)",
        style("Installing deck").cyan().bold(),
        style(&deck.name).bold(),
        rendered.files.len()
    );

    let summary = cluster.apply(&rendered)?;
    check_summary("apply", &summary)?;
    println!("{} {}", style("applied").green(), summary);

    if options.wait {
        let timeout = Duration::from_secs(options.timeout);
        let message = format!(
            "Waiting for pods in {} (timeout {}s)",
            rendered.namespaces.join(", "),
            options.timeout
        );

        let waited = if options.no_input {
            println!("{}", message);
            cluster.wait_for_pods(&rendered.namespaces, timeout)
        } else {
            let spinner = ProgressBar::new_spinner();
            spinner.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.cyan} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            spinner.set_message(message);
            spinner.enable_steady_tick(Duration::from_millis(100));

            let waited = cluster.wait_for_pods(&rendered.namespaces, timeout);
            spinner.finish_and_clear();
            waited
        };
        waited?;

        println!("{} all pods are ready", style("ready").green());
    }

    if let Some(notes) = deck.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        println!();
        println!("{}", style("Notes:").yellow().bold());
        println!("{}", notes.trim_end());
    }

    Ok(())
}

/// Turn per-resource failures into an error
pub fn check_summary(action: &'static str, summary: &OperationSummary) -> Result<()> {
    let failures: Vec<String> = summary
        .failures()
        .map(|(resource, reason)| format!("{}: {}", resource, reason))
        .collect();

    if failures.is_empty() {
        return Ok(());
    }

    Err(CliError::Resources {
        action,
        count: failures.len(),
        details: failures.join("; "),
    })
}
