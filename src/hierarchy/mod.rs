//! Span tree verification.
//!
//! Rebuilds the tree a flat capture describes ([`SpanHierarchy`]) and checks
//! it against a declaratively built expected shape ([`ExpectedSpan`]). Made
//! for integration tests of traced systems, where "the verifier is usable"
//! means a failure message that names the exact node and expectation that
//! diverged.

mod expect;
mod tree;

pub use expect::ExpectedSpan;
pub use tree::{HierarchyError, SpanHierarchy};
