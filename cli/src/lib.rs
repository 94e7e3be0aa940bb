//! File helpers shared by the `roulette-cli` and `simulate-floors` binaries.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use encoding_rs::Encoding;

/// Read a text file, honouring a UTF-8/UTF-16 byte-order mark when present
/// and requiring plain UTF-8 otherwise.
pub fn read_text_auto(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    match Encoding::for_bom(&bytes) {
        Some((encoding, bom_len)) => {
            let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
            Ok(text.into_owned())
        }
        None => String::from_utf8(bytes).with_context(|| format!("{} is not valid UTF-8", path.display())),
    }
}

/// A deck file is a JSON array of unit names.
pub fn read_deck_file(path: &Path) -> Result<Vec<String>> {
    let text = read_text_auto(path)
        .with_context(|| format!("failed to read deck file: {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse deck file: {}", path.display()))
}
