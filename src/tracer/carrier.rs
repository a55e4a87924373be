//! The span context carrier threaded through one execution path.
//!
//! A carrier is an explicit value, never ambient state: the engine passes it
//! through every continuation boundary, and every parallel dispatch point
//! forks it so branches never see each other's mutations. The carrier holds
//! the stack of currently open span ids; the top of the stack is the parent
//! for the next span opened on this path.

use crate::types::{ExecutionId, SpanId};
use smallvec::SmallVec;

/// Typical open-span nesting depth; deeper stacks spill to the heap.
const INLINE_DEPTH: usize = 8;

/// Per-execution tracing state carried alongside one in-flight message.
///
/// Cloning is always a deep copy; [`fork`](Self::fork) is the named form
/// used at parallel dispatch points.
#[derive(Debug, Clone)]
pub struct SpanCarrier {
    execution_id: ExecutionId,
    stack: SmallVec<[SpanId; INLINE_DEPTH]>,
}

impl SpanCarrier {
    pub(crate) fn new(execution_id: ExecutionId) -> Self {
        Self {
            execution_id,
            stack: SmallVec::new(),
        }
    }

    /// Returns the execution this carrier belongs to.
    ///
    /// Forked carriers report the same execution id as their origin.
    #[inline]
    #[must_use]
    pub const fn execution_id(&self) -> ExecutionId {
        self.execution_id
    }

    /// Returns the innermost open span id, the parent for the next open.
    #[inline]
    #[must_use]
    pub fn current_span(&self) -> Option<SpanId> {
        self.stack.last().copied()
    }

    /// Returns the number of open spans on this path.
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Whether no span is open on this path.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Forks an independent copy for one parallel branch.
    ///
    /// The fork starts with the same open-span stack; from that point on the
    /// two carriers diverge and mutations on one are invisible to the other.
    #[must_use]
    pub fn fork(&self) -> Self {
        self.clone()
    }

    /// Forks `n` independent copies, one per branch of a fan-out dispatch.
    #[must_use]
    pub fn fork_n(&self, n: usize) -> Vec<Self> {
        (0..n).map(|_| self.fork()).collect()
    }

    pub(crate) fn push(&mut self, id: SpanId) {
        self.stack.push(id);
    }

    pub(crate) fn pop(&mut self) -> Option<SpanId> {
        self.stack.pop()
    }
}
