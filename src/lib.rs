//! flux-deps - Dependency analysis for Flux Kustomizations
//!
//! Scans a GitOps repository for Flux `Kustomization` manifests, builds the
//! `dependsOn` graph between them, and derives a deployment order,
//! transitive dependency sets, layered dependency chains and a dependency
//! matrix. Dangling references and cycles are reported, never fatal.

pub mod domain;
pub mod storage;
pub mod report;
pub mod cli;

pub use domain::{Analysis, Declaration, DependencyGraph, DependencyRef, NodeKey};
