//! Remove command - delete a deck's resources from the current cluster

use console::style;
use deck_engine::Renderer;
use std::path::Path;

use super::get::check_summary;
use crate::error::Result;

pub fn run(
    deckfile_path: &Path,
    name: Option<&str>,
    no_cluster: bool,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = super::load_config(config_path)?;
    let deckfile = super::load_deckfile(deckfile_path)?;
    let deck = deckfile.get_deck(name)?;

    let cluster = super::connect(no_cluster)?;
    let renderer = Renderer::builder()
        .config(config)
        .versions(cluster.clone())
        .build();

    let rendered = renderer.render(&deckfile, Some(deck.name.as_str()))?;
    println!(
        "{} {}",
        style("Removing deck").cyan().bold(),
        style(&deck.name).bold()
    );

    let summary = cluster.delete(&rendered)?;
    check_summary("delete", &summary)?;

    for resource in summary.not_found() {
        println!("{} {} (not found)", style("skipped").dim(), resource);
    }
    println!("{} {}", style("removed").green(), summary);

    Ok(())
}
