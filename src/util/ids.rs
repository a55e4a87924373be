//! Identifier generation for spans and executions.
//!
//! The generator is a seam: production draws ids from OS entropy, tests use
//! a sequential source so captured trees are stable across runs.

use crate::types::{ExecutionId, SpanId};
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of fresh span and execution identifiers.
///
/// Ids must be unique within a capture window; sources are shared across
/// executions, so implementations must be thread-safe.
pub trait IdSource: Send + Sync + 'static {
    /// Returns the next span id.
    fn next_span_id(&self) -> SpanId;

    /// Returns the next execution id.
    fn next_execution_id(&self) -> ExecutionId;

    /// Stable identifier for diagnostics.
    fn source_id(&self) -> &'static str;
}

/// OS-entropy-backed id source for production use.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsIds;

impl IdSource for OsIds {
    fn next_span_id(&self) -> SpanId {
        // The zero draw is re-drawn: zero renders as the no-parent sentinel.
        loop {
            if let Some(id) = SpanId::from_u64(next_raw_u64()) {
                return id;
            }
        }
    }

    fn next_execution_id(&self) -> ExecutionId {
        ExecutionId::from_u64(next_raw_u64())
    }

    fn source_id(&self) -> &'static str {
        "os"
    }
}

fn next_raw_u64() -> u64 {
    let mut buf = [0u8; 8];
    getrandom::fill(&mut buf).expect("OS entropy failed");
    u64::from_le_bytes(buf)
}

/// Sequential id source for tests and replayable runs.
///
/// Span ids count up from 1 and execution ids from 1, independently.
#[derive(Debug)]
pub struct SeqIds {
    next_span: AtomicU64,
    next_execution: AtomicU64,
}

impl SeqIds {
    /// Creates a sequential source starting both counters at 1.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next_span: AtomicU64::new(1),
            next_execution: AtomicU64::new(1),
        }
    }
}

impl Default for SeqIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdSource for SeqIds {
    fn next_span_id(&self) -> SpanId {
        loop {
            let raw = self.next_span.fetch_add(1, Ordering::Relaxed);
            if let Some(id) = SpanId::from_u64(raw) {
                return id;
            }
        }
    }

    fn next_execution_id(&self) -> ExecutionId {
        ExecutionId::from_u64(self.next_execution.fetch_add(1, Ordering::Relaxed))
    }

    fn source_id(&self) -> &'static str {
        "sequential"
    }
}
