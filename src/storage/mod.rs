//! # Storage Layer
//!
//! Everything that touches the filesystem on the way into the graph.
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Kustomizations | Multi-document YAML | `<kubernetes_dir>/**/ks.yaml` |
//! | Project config | TOML | `flux-deps.toml` (nearest ancestor) |
//! | Global config | TOML | `~/.config/flux-deps/config.toml` |
//!
//! ## Key Types
//!
//! - [`ManifestScanner`] - Finds and parses Flux Kustomizations
//! - [`Config`] - Project and global configuration

mod config;
mod manifest;

pub use config::{
    Config, ConfigError, GlobalConfig, OutputFormat as DefaultFormat, ProjectConfig,
    PROJECT_CONFIG_FILE,
};
pub use manifest::{parse_documents, ManifestError, ManifestScanner, ScanIssue, ScanResult};
