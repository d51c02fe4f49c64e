//! Hook invoked when a product update event is consumed from the queue.

/// Event published after a product was updated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductUpdated {
  /// Identifier of the updated product.
  pub product_identifier: String,
}

/// Handler for [`ProductUpdated`] events. The default implementation does nothing.
pub trait ProductUpdatedHandler {
  /// React to a product update.
  fn handle(&self, _event: &ProductUpdated) {}
}

/// Handler that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProductUpdatedHandler;

impl ProductUpdatedHandler for NoopProductUpdatedHandler {}
