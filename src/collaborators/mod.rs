//! Interfaces for collaborators living at the edge of the asset pipeline.

pub mod events;
pub mod reference_data;

pub use events::{NoopProductUpdatedHandler, ProductUpdated, ProductUpdatedHandler};
pub use reference_data::{
  AttributeRef, LookupContext, LookupError, ProductValueRef, ReferenceDataDenormalizer,
  ReferenceDataRegistry,
};
