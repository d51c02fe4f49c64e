//! Variable handling for templated asset targets.
//!
//! Expansion of configured variable domains into concrete combinations and resolution of
//! target path templates live in separate submodules so each can be tested on its own.

mod combinations;
mod resolver;

pub use combinations::expand_combinations;
pub use resolver::{
    DEFAULT_CONTROLLER_MARKER, ResolveError, TargetResolver, VarResolver, substitute_placeholders,
};
