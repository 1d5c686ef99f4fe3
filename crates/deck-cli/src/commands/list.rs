//! List command - list the decks of a Deckfile

use std::path::Path;

use crate::error::Result;

pub fn run(deckfile: &Path) -> Result<()> {
    let deckfile = super::load_deckfile(deckfile)?;

    for name in deckfile.deck_names() {
        println!("{}", name);
    }

    Ok(())
}
