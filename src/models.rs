//! Data structures shared across the dump pipeline.

use std::collections::BTreeMap;
use std::fmt;

/// Configured universe of values for each variable name.
///
/// Values keep their configured order, which drives the order combinations are dumped in.
pub type VariableDomain = BTreeMap<String, Vec<String>>;

/// One concrete binding of the variables an asset depends on.
///
/// Bindings keep the order the asset declared its variables in, so the rendered form is
/// stable between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Combination {
  values: Vec<(String, String)>,
}

impl Combination {
  /// Builder-style helper returning the combination with `name` bound to `value`.
  pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
    self.bind(name, value);
    self
  }

  /// Bind `name` to `value`, replacing any earlier binding for the same name.
  pub fn bind(&mut self, name: impl Into<String>, value: impl Into<String>) {
    let name = name.into();
    let value = value.into();
    match self.values.iter_mut().find(|(bound, _)| *bound == name) {
      Some(slot) => slot.1 = value,
      None => self.values.push((name, value)),
    }
  }

  /// Value bound to `name`, if any.
  pub fn get(&self, name: &str) -> Option<&str> {
    self
      .values
      .iter()
      .find(|(bound, _)| bound == name)
      .map(|(_, value)| value.as_str())
  }

  /// Number of bound variables.
  pub fn len(&self) -> usize {
    self.values.len()
  }

  /// Returns `true` when no variable is bound.
  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  /// Iterate over `(name, value)` pairs in binding order.
  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self
      .values
      .iter()
      .map(|(name, value)| (name.as_str(), value.as_str()))
  }
}

impl<K, V> FromIterator<(K, V)> for Combination
where
  K: Into<String>,
  V: Into<String>,
{
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    let mut combination = Combination::default();
    for (name, value) in iter {
      combination.bind(name, value);
    }
    combination
  }
}

impl fmt::Display for Combination {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.values.is_empty() {
      return f.write_str("-");
    }

    for (index, (name, value)) in self.values.iter().enumerate() {
      if index > 0 {
        f.write_str(", ")?;
      }
      write!(f, "{name}={value}")?;
    }
    Ok(())
  }
}

/// Classification of a resource URL found in compiled output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
  /// Inline `data:` URI, always valid.
  DataUri,
  /// Root-relative URL starting with `/`, checked against the output root.
  Absolute,
  /// Any other URL; cannot be resolved without the including file's location.
  Relative,
}

/// Resource URL extracted from compiled content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedReference {
  /// URL exactly as written between the `url(...)` parentheses, minus quotes.
  pub url: String,
  /// Classification of the URL.
  pub kind: ReferenceKind,
}
