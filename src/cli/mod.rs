//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Commands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `generate` | Write the markdown dependency report |
//! | `order` | Deployment order grouped by level |
//! | `show <ns/name>` | Dependencies, dependents and chain of one unit |
//! | `missing` | Referenced but undeclared dependencies |
//! | `cycles` | Dependency cycles |
//! | `check` | Non-zero exit on missing dependencies or cycles |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output:
//! ```bash
//! flux-deps --verbose order
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod scan;
mod query;
mod generate;

pub use app::{Cli, Commands, run};
pub use output::{Output, OutputFormat};
pub use query::QueryError;
