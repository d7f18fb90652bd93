//! Deploy directive extraction.
//!
//! - `scanner`: incremental, tolerant decode of the `code` value for live preview
//! - `finalizer`: strict parse of the completed block into a `DeployDirective`

pub mod finalizer;
pub mod scanner;

pub use finalizer::{finalize, parse_directive};
pub use scanner::{DirectiveScanner, extract_partial_code};
