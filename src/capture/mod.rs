//! Span export and bounded capture windows.
//!
//! - [`SpanSink`]: the export seam the tracer writes closed spans to
//! - [`NullSink`]: discards everything; the disabled-tracing default
//! - [`CaptureSink`]: fans spans out to live capture windows
//! - [`SpanCapturer`]: one observation window with linearizable append,
//!   insertion-ordered snapshots, and idempotent dispose

mod capturer;
mod sink;

pub use capturer::SpanCapturer;
pub use sink::{CaptureSink, NullSink, SpanSink};
