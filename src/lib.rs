#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod collaborators;
pub mod config;
pub mod dump;
pub mod groups;
pub mod logging;
pub mod models;
pub mod references;
pub mod report;
pub mod source;
pub mod variables;

pub use config::AssetConfig;
pub use dump::{AssetDumper, DumpError, DumpSettings};
pub use models::{Combination, ReferenceKind, ScannedReference, VariableDomain};
pub use report::{ConsoleReporter, Diagnostic, DumpReport, DumpReporter};
pub use source::{AssetSource, Bundle, CompressibleAsset, ConfigAssetSource};
