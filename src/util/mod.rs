//! Internal utilities.
//!
//! Kept minimal so the tracer's hot path stays allocation-light and
//! deterministic under the sequential id source.

pub mod ids;

pub use ids::{IdSource, OsIds, SeqIds};
