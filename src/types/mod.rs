//! Core types for the flowtrace tracer.
//!
//! This module contains the fundamental types shared across the crate:
//!
//! - [`id`]: Identifier types (`SpanId`, `ExecutionId`) and the no-parent
//!   sentinel rendering
//! - [`component`]: Component identity, category, and location types
//! - [`outcome`]: Step completion outcomes with failure-wins aggregation

pub mod component;
pub mod id;
pub mod outcome;

pub use component::{ComponentIdentity, ComponentKind, ComponentLocation};
pub use id::{ExecutionId, SpanId};
pub use outcome::{FailureCause, StepOutcome, join_outcomes};
