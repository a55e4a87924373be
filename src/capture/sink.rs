//! Export sinks.
//!
//! The sink is the seam between the tracer and whatever consumes closed
//! spans. Only closed spans cross it; the type system makes exporting an
//! open span unrepresentable.

use super::capturer::{Registry, SpanCapturer};
use crate::tracer::CapturedSpan;
use parking_lot::RwLock;
use std::sync::Arc;

/// Destination for closed spans.
///
/// `export` must tolerate concurrent calls from many executions; it is on
/// every span's close path, so implementations should stay cheap.
pub trait SpanSink: Send + Sync + 'static {
    /// Accepts one closed span.
    fn export(&self, span: CapturedSpan);
}

/// Sink that discards every span.
///
/// The production default when no observation window is configured, and the
/// benchmark baseline for tracer overhead.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl SpanSink for NullSink {
    fn export(&self, _span: CapturedSpan) {}
}

/// Sink that fans exported spans out to live capture windows.
///
/// Spans exported while no window is open are dropped. Multiple windows may
/// be open at once; each receives its own clone of every span.
pub struct CaptureSink {
    registry: Registry,
}

impl CaptureSink {
    /// Creates a sink with no open windows.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Opens a new capture window observing every span exported from now on.
    #[must_use]
    pub fn capture(&self) -> SpanCapturer {
        SpanCapturer::register(&self.registry)
    }

    /// Returns the number of currently open windows.
    #[must_use]
    pub fn live_windows(&self) -> usize {
        self.registry.read().len()
    }
}

impl Default for CaptureSink {
    fn default() -> Self {
        Self::new()
    }
}

impl SpanSink for CaptureSink {
    fn export(&self, span: CapturedSpan) {
        let registry = self.registry.read();
        let Some((last, rest)) = registry.split_last() else {
            #[cfg(feature = "tracing-integration")]
            tracing::trace!(span = %span.id(), "span dropped: no open capture window");
            return;
        };
        for state in rest {
            state.append(span.clone());
        }
        last.append(span);
    }
}

impl core::fmt::Debug for CaptureSink {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CaptureSink")
            .field("live_windows", &self.live_windows())
            .finish()
    }
}
