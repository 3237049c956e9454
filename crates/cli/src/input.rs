//! Identifier collection from command line items.
//!
//! An item naming an existing file is read as a batch list; anything else is
//! taken as an identifier.

use std::path::Path;

use tracing::{debug, warn};

/// Expands items into identifiers, preserving order.
///
/// A batch file that cannot be read is logged and skipped like any other
/// unusable item.
pub fn collect_identifiers(items: &[String]) -> Vec<String> {
    let mut identifiers = Vec::new();

    for item in items {
        let path = Path::new(item);
        if path.is_file() {
            let contents = match std::fs::read_to_string(path) {
                Ok(contents) => contents,
                Err(e) => {
                    warn!("Skipping batch file {:?}: {}", path, e);
                    continue;
                }
            };
            let before = identifiers.len();
            identifiers.extend(parse_batch(&contents));
            debug!(
                "Read {} identifiers from {:?}",
                identifiers.len() - before,
                path
            );
        } else {
            identifiers.push(item.trim().to_string());
        }
    }

    identifiers
}

/// Identifiers listed in a batch file, one per line.
///
/// Blank lines and lines starting with `#` or `//` are skipped.
pub fn parse_batch(contents: &str) -> impl Iterator<Item = String> + '_ {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with("//"))
        .map(str::to_string)
}
