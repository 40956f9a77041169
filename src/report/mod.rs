//! Report rendering
//!
//! Turns analyzer output into documents. The markdown report is the only
//! format written to disk; JSON views are produced by the CLI directly.

mod markdown;

pub use markdown::{MarkdownReport, REPORT_TITLE};
