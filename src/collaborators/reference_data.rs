//! Translation of stored reference-data codes into full records.
//!
//! Each reference-data name maps to a typed accessor registered up front, so the
//! denormalizer never selects a repository at lookup time.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

type Accessor<R> = Box<dyn Fn(&str) -> Option<R> + Send + Sync>;

/// Errors raised while denormalizing a reference-data code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
  /// The lookup context carries no product value.
  #[error("lookup context does not contain a product value")]
  InvalidLookupInput,
  /// The product value has no attribute to derive the reference-data name from.
  #[error("lookup context expected to have an attribute, none found")]
  MissingAttributeContext,
  /// No accessor is registered for the attribute's reference-data name.
  #[error("no reference data registered under `{0}`")]
  UnknownReferenceData(String),
}

/// Attribute describing which reference data its values point to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeRef {
  /// Attribute code.
  pub code: String,
  /// Name of the reference data the attribute uses.
  pub reference_data_name: String,
}

/// Product value being denormalized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductValueRef {
  /// Attribute owning the value, when known.
  pub attribute: Option<AttributeRef>,
}

/// Contextual data supplied with a lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupContext {
  /// Value the code belongs to.
  pub value: Option<ProductValueRef>,
}

/// Reference-data name to accessor returning the record for a code.
pub struct ReferenceDataRegistry<R> {
  accessors: BTreeMap<String, Accessor<R>>,
}

impl<R> Default for ReferenceDataRegistry<R> {
  fn default() -> Self {
    Self {
      accessors: BTreeMap::new(),
    }
  }
}

impl<R> fmt::Debug for ReferenceDataRegistry<R> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ReferenceDataRegistry")
      .field("names", &self.accessors.keys().collect::<Vec<_>>())
      .finish()
  }
}

impl<R> ReferenceDataRegistry<R> {
  /// Empty registry.
  pub fn new() -> Self {
    Self::default()
  }

  /// Register the accessor used for `name`, replacing any earlier one.
  pub fn register<F>(mut self, name: impl Into<String>, accessor: F) -> Self
  where
    F: Fn(&str) -> Option<R> + Send + Sync + 'static,
  {
    self.accessors.insert(name.into(), Box::new(accessor));
    self
  }

  /// Look up `code` in the reference data registered as `name`.
  pub fn find(&self, name: &str, code: &str) -> Result<Option<R>, LookupError> {
    let accessor = self
      .accessors
      .get(name)
      .ok_or_else(|| LookupError::UnknownReferenceData(name.to_string()))?;
    Ok(accessor(code))
  }
}

/// Resolve stored codes into records using the value's attribute.
#[derive(Debug)]
pub struct ReferenceDataDenormalizer<R> {
  registry: ReferenceDataRegistry<R>,
}

impl<R> ReferenceDataDenormalizer<R> {
  /// Create a denormalizer over a fully registered registry.
  pub fn new(registry: ReferenceDataRegistry<R>) -> Self {
    Self { registry }
  }

  /// Translate `code` into its record. Empty codes yield `Ok(None)`.
  pub fn denormalize(&self, code: &str, context: &LookupContext) -> Result<Option<R>, LookupError> {
    if code.is_empty() {
      return Ok(None);
    }

    let value = context.value.as_ref().ok_or(LookupError::InvalidLookupInput)?;
    let attribute = value
      .attribute
      .as_ref()
      .ok_or(LookupError::MissingAttributeContext)?;

    self.registry.find(&attribute.reference_data_name, code)
  }
}
