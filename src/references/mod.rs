//! Extraction and validation of resource references embedded in compiled assets.

mod scanner;
mod validator;

pub use scanner::scan_references;
pub use validator::{
    classify_reference, reference_exists, strip_query_and_fragment, validate_references,
};
