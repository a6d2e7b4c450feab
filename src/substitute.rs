//! Placeholder substitution.
//!
//! Tokens look like `{{projectName}}` with optional interior whitespace.
//! Recognized keys are replaced with values from [`TemplateData`]; unknown
//! keys pass through unchanged so framework syntax that happens to use
//! double braces survives, and a misspelled key stays visible in the output.

use std::borrow::Cow;
use std::path::Path;
use std::sync::OnceLock;

use memchr::memchr;
use regex::{Captures, Regex};

use crate::constants::{BINARY_EXTENSIONS, BINARY_SNIFF_LEN};
use crate::context::TemplateData;

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("valid regex")
    })
}

/// Replaces every recognized placeholder in `text`.
pub fn substitute<'a>(text: &'a str, data: &TemplateData) -> Cow<'a, str> {
    placeholder_pattern().replace_all(text, |caps: &Captures| match data.placeholder(&caps[1]) {
        Some(value) => value.to_string(),
        None => caps[0].to_string(),
    })
}

/// Keys of every placeholder token in `text`, recognized or not.
pub fn placeholders(text: &str) -> Vec<String> {
    placeholder_pattern().captures_iter(text).map(|caps| caps[1].to_string()).collect()
}

fn has_binary_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| BINARY_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Decides whether file content must be copied byte-for-byte: known binary
/// extensions, a NUL byte near the start, or content that is not UTF-8.
pub fn is_binary(path: &Path, content: &[u8]) -> bool {
    if has_binary_extension(path) {
        return true;
    }
    let head = &content[..content.len().min(BINARY_SNIFF_LEN)];
    memchr(0u8, head).is_some() || std::str::from_utf8(content).is_err()
}
