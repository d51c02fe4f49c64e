use std::path::{Path, PathBuf};

use crate::models::ReferenceKind;
use crate::references::scan_references;
use crate::report::Diagnostic;

/// Classify a URL as a data URI, a root-relative path or a relative path.
pub fn classify_reference(url: &str) -> ReferenceKind {
    if url.starts_with("data:") {
        ReferenceKind::DataUri
    } else if url.starts_with('/') {
        ReferenceKind::Absolute
    } else {
        ReferenceKind::Relative
    }
}

/// Cut a URL at its first `?` or `#`, dropping query string and fragment together.
pub fn strip_query_and_fragment(url: &str) -> &str {
    match url.find(['?', '#']) {
        Some(index) => &url[..index],
        None => url,
    }
}

/// Check whether a root-relative URL points at an existing file below `output_root`.
pub fn reference_exists(url: &str, output_root: &Path) -> bool {
    resolve_reference(url, output_root).exists()
}

fn resolve_reference(url: &str, output_root: &Path) -> PathBuf {
    let root = output_root.to_string_lossy();
    PathBuf::from(format!(
        "{}{}",
        root.trim_end_matches('/'),
        strip_query_and_fragment(url)
    ))
}

/// Scan `content` and report every reference that is relative or does not resolve.
///
/// `target` is the path of the file the content was written to and is attached to each
/// diagnostic.
pub fn validate_references(content: &str, output_root: &Path, target: &Path) -> Vec<Diagnostic> {
    scan_references(content)
        .into_iter()
        .filter_map(|reference| match reference.kind {
            ReferenceKind::DataUri => None,
            ReferenceKind::Relative => Some(Diagnostic::NonAbsoluteReference {
                url: reference.url,
                target: target.to_path_buf(),
            }),
            ReferenceKind::Absolute => {
                (!reference_exists(&reference.url, output_root)).then(|| {
                    Diagnostic::DanglingReference {
                        url: reference.url,
                        target: target.to_path_buf(),
                    }
                })
            }
        })
        .collect()
}
