//! Common utilities shared across analyzer modules.
//!
//! The class-level and method-level impact analyses walk different graphs
//! the same way; the shared walk lives here.

mod graph_trait;

pub use graph_trait::DependentWalk;
