use std::sync::OnceLock;

use regex::Regex;

use crate::models::ScannedReference;
use crate::references::classify_reference;

fn url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // Quotes must pair up: a lone quote falls through to the bare alternative.
    PATTERN.get_or_init(|| {
        Regex::new(r#"url\((?:"(?P<double>.*?)"|'(?P<single>.*?)'|(?P<bare>.*?))\)"#)
            .expect("invalid url() regex")
    })
}

/// Extract every `url(...)` reference from compiled content.
///
/// References are returned in the order they occur, duplicates included, each already
/// classified.
pub fn scan_references(content: &str) -> Vec<ScannedReference> {
    url_pattern()
        .captures_iter(content)
        .filter_map(|caps| {
            caps.name("double")
                .or_else(|| caps.name("single"))
                .or_else(|| caps.name("bare"))
        })
        .map(|url| ScannedReference {
            url: url.as_str().to_string(),
            kind: classify_reference(url.as_str()),
        })
        .collect()
}
