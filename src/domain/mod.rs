//! Domain models for flux-deps
//!
//! Graph construction and the analyzers built on it, without any I/O
//! concerns.

mod key;
mod declaration;
mod graph;
mod levels;
mod closure;
mod chain;
mod analysis;

pub use key::{NodeKey, KeyError};
pub use declaration::{Declaration, DependencyRef};
pub use graph::{DependencyGraph, Node};
pub use levels::{compute as compute_levels, Levels};
pub use closure::closure_of;
pub use chain::{chain_of, Chain};
pub use analysis::{Analysis, NodeReport};
