//! Output file naming.

use once_cell::sync::Lazy;
use regex_lite::Regex;

/// Maximum output file name length in characters, extension included.
pub const MAX_FILE_NAME_LENGTH: usize = 200;

const FALLBACK_STEM: &str = "untitled";

static DOT_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.{2,}").unwrap());

fn is_removed(c: char) -> bool {
    matches!(c, '"' | '«' | '»')
}

fn is_illegal(c: char) -> bool {
    matches!(c, '<' | '>' | ':' | '/' | '\\' | '|' | '?' | '*') || c.is_control()
}

/// Makes `name` safe to use as a file name component.
///
/// Quotes and guillemets are dropped, runs of dots collapse to one dot,
/// characters illegal on common filesystems become `_`, and leading or
/// trailing spaces and dots are trimmed.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !is_removed(*c))
        .map(|c| if is_illegal(c) { '_' } else { c })
        .collect();

    DOT_RUNS
        .replace_all(&cleaned, ".")
        .trim_matches(|c: char| c == ' ' || c == '.')
        .to_string()
}

/// Builds `{owner} — {title}.{extension}`, sanitized and length limited.
pub fn output_file_name(owner: &str, title: &str, extension: &str) -> String {
    let extension: String = extension
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();

    let mut stem = sanitize_file_name(&format!("{} — {}", owner, title));
    if stem.is_empty() {
        stem = FALLBACK_STEM.to_string();
    }

    if extension.is_empty() {
        return truncate_chars(&stem, MAX_FILE_NAME_LENGTH);
    }

    let budget = MAX_FILE_NAME_LENGTH.saturating_sub(extension.chars().count() + 1);
    let stem = truncate_chars(&stem, budget);
    format!("{}.{}", stem, extension)
}

fn truncate_chars(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }

    value
        .chars()
        .take(max)
        .collect::<String>()
        .trim_end_matches(|c: char| c == ' ' || c == '.')
        .to_string()
}
