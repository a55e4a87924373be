//! Tracer contract violations.

use crate::types::{ComponentKind, SpanId};
use thiserror::Error;

/// Error raised when the engine drives the tracer outside its contract.
///
/// These are fail-fast errors: the operation leaves the carrier and the sink
/// untouched, so a violation surfaces at the call that caused it instead of
/// as a corrupted tree later.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraceError {
    /// A span was ended while no span was open on the carrier.
    #[error("cannot end span {span}: no span is open on this carrier")]
    EmptyCarrier {
        /// The span being ended.
        span: SpanId,
    },

    /// A span was ended that is not the innermost open span on the carrier.
    #[error("cannot end span {span}: it is not the innermost open span (top is {top})")]
    NotInnermost {
        /// The span being ended.
        span: SpanId,
        /// The innermost open span on the carrier.
        top: SpanId,
    },

    /// A route span was requested for a component category without routes.
    #[error("component {identity} is a {kind} and has no routes")]
    NoRoutes {
        /// The component's namespace-qualified identity.
        identity: String,
        /// The component's category.
        kind: ComponentKind,
    },

    /// An abort found an open span id on the carrier with no matching
    /// active span among those handed in.
    #[error("abort: open span {span} has no matching active span")]
    MissingActiveSpan {
        /// The unmatched id from the carrier stack.
        span: SpanId,
    },

    /// An abort was handed active spans that are not open on the carrier.
    #[error("abort: {count} active span(s) do not belong to this carrier")]
    ForeignOpenSpans {
        /// Number of unmatched active spans.
        count: usize,
    },
}
