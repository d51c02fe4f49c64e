use std::path::PathBuf;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::models::Combination;

/// Path segment marking assets served through a dynamic controller outside of dumps.
pub const DEFAULT_CONTROLLER_MARKER: &str = "_controller/";

/// Errors produced while resolving a templated path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The template references a variable that the combination does not bind.
    #[error("unresolved variable `{variable}` in template `{template}`")]
    UnresolvedVariable {
        /// Template that contained the placeholder.
        template: String,
        /// Name of the placeholder without braces.
        variable: String,
    },
}

/// Resolve an asset's target template into a concrete file-system path.
pub trait TargetResolver {
    /// Resolve `template` with the values bound in `combination`.
    fn resolve(&self, template: &str, combination: &Combination) -> Result<PathBuf, ResolveError>;
}

/// Resolver joining templates onto the output root and substituting `{var}` placeholders.
#[derive(Debug, Clone)]
pub struct VarResolver {
    output_root: PathBuf,
    controller_marker: String,
}

impl VarResolver {
    /// Create a resolver writing below `output_root` with the default controller marker.
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
            controller_marker: DEFAULT_CONTROLLER_MARKER.to_string(),
        }
    }

    /// Replace the controller marker stripped from templates.
    pub fn with_controller_marker(mut self, marker: impl Into<String>) -> Self {
        self.controller_marker = marker.into();
        self
    }
}

impl TargetResolver for VarResolver {
    fn resolve(&self, template: &str, combination: &Combination) -> Result<PathBuf, ResolveError> {
        // The marker is only stripped from the template; the root is used as given.
        let stripped = if self.controller_marker.is_empty() {
            template.to_string()
        } else {
            template.replace(&self.controller_marker, "")
        };

        let relative = substitute_placeholders(&stripped, combination).map_err(|err| match err {
            ResolveError::UnresolvedVariable { variable, .. } => ResolveError::UnresolvedVariable {
                template: template.to_string(),
                variable,
            },
        })?;

        let root = self.output_root.to_string_lossy();
        Ok(PathBuf::from(format!(
            "{}/{}",
            root.trim_end_matches('/'),
            relative
        )))
    }
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{([^{}/\\]+)\}").expect("invalid placeholder regex"))
}

/// Replace every `{name}` placeholder in `template` with its bound value.
///
/// A placeholder whose name is not bound in `combination` is reported as
/// [`ResolveError::UnresolvedVariable`] rather than left in place.
pub fn substitute_placeholders(
    template: &str,
    combination: &Combination,
) -> Result<String, ResolveError> {
    let mut resolved = String::with_capacity(template.len());
    let mut last = 0;

    for caps in placeholder_pattern().captures_iter(template) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };

        let value = combination
            .get(name.as_str())
            .ok_or_else(|| ResolveError::UnresolvedVariable {
                template: template.to_string(),
                variable: name.as_str().to_string(),
            })?;

        resolved.push_str(&template[last..whole.start()]);
        resolved.push_str(value);
        last = whole.end();
    }

    resolved.push_str(&template[last..]);
    Ok(resolved)
}
