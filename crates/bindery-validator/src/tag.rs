//! `validate` tag parsing.
//!
//! A tag is a comma separated list of `name` or `name=param` entries. A
//! literal comma inside a parameter is written `\,`. Names and parameters
//! are trimmed of surrounding spaces.

/// One parsed `name[=param]` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRule {
    /// Rule name, looked up in the registry.
    pub name: String,
    /// Rule parameter, empty when absent.
    pub param: String,
}

/// Parses a tag into its rules, in declaration order.
///
/// Returns `None` if any entry has an empty name.
pub fn parse_tag(tag: &str) -> Option<Vec<TagRule>> {
    if tag.trim().is_empty() {
        return Some(Vec::new());
    }
    split_unescaped_commas(tag)
        .into_iter()
        .map(|entry| {
            let entry = entry.replace("\\,", ",");
            let (name, param) = match entry.split_once('=') {
                Some((name, param)) => (name.trim(), param.trim()),
                None => (entry.trim(), ""),
            };
            if name.is_empty() {
                return None;
            }
            Some(TagRule {
                name: name.to_string(),
                param: param.to_string(),
            })
        })
        .collect()
}

fn split_unescaped_commas(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let bytes = s.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if *b == b',' && (i == 0 || bytes[i - 1] != b'\\') {
            parts.push(&s[start..i]);
            start = i + 1;
        }
    }
    parts.push(&s[start..]);
    parts
}
