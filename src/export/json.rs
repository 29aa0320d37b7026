//! JSON import/export module for flashcard decks.
//! Saves and loads the portable deck format, review state included.

use crate::models::DeckExport;
use log::info;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Exports a deck to a JSON file at the specified path.
/// Returns an error if file creation or writing fails.
pub fn export_json_to_path(deck: &DeckExport, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let json_string = serde_json::to_string_pretty(deck)?;
    let mut file = File::create(path)?;
    file.write_all(json_string.as_bytes())?;
    info!("Deck '{}' exported to '{}'", deck.name, path.display());
    Ok(())
}

/// Imports a deck from a JSON file.
/// Returns an error if the file doesn't exist or contains invalid JSON.
pub fn import_json(path: &Path) -> Result<DeckExport, Box<dyn std::error::Error>> {
    let mut file = File::open(path)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;

    let deck: DeckExport = serde_json::from_str(&contents)?;
    if deck.name.trim().is_empty() {
        return Err("deck name must not be empty".into());
    }

    info!("Deck '{}' imported from '{}'", deck.name, path.display());
    Ok(deck)
}
