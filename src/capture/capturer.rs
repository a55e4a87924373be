//! Capture-window handles.
//!
//! A capturer's append path is a lock-free queue so concurrently completing
//! branches never contend or lose a span; consolidation into the ordered
//! snapshot happens on the reader's thread inside `exported_spans`.

use crate::tracer::CapturedSpan;
use crossbeam_queue::SegQueue;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Registry of live capture windows, shared between a sink and its handles.
pub(super) type Registry = Arc<RwLock<Vec<Arc<CapturerState>>>>;

/// State shared between the sink's export path and one capturer handle.
pub(super) struct CapturerState {
    incoming: SegQueue<CapturedSpan>,
    snapshot: Mutex<Vec<CapturedSpan>>,
    disposed: AtomicBool,
}

impl CapturerState {
    pub(super) fn new() -> Self {
        Self {
            incoming: SegQueue::new(),
            snapshot: Mutex::new(Vec::new()),
            disposed: AtomicBool::new(false),
        }
    }

    /// Appends a span, silently dropping it if the window is disposed.
    pub(super) fn append(&self, span: CapturedSpan) {
        if self.disposed.load(Ordering::Acquire) {
            return;
        }
        self.incoming.push(span);
        // A dispose racing the push above would miss the new entry when it
        // drains; the re-check keeps "disposed holds nothing" true.
        if self.disposed.load(Ordering::Acquire) {
            while self.incoming.pop().is_some() {}
        }
    }

    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }
}

/// A bounded observation window over everything a [`CaptureSink`] exports.
///
/// Returned by [`CaptureSink::capture`]; spans exported while the window is
/// live accumulate in insertion order until [`dispose`](Self::dispose) is
/// called (or the handle is dropped).
///
/// [`CaptureSink`]: super::CaptureSink
/// [`CaptureSink::capture`]: super::CaptureSink::capture
pub struct SpanCapturer {
    state: Arc<CapturerState>,
    registry: Registry,
}

impl SpanCapturer {
    pub(super) fn register(registry: &Registry) -> Self {
        let state = Arc::new(CapturerState::new());
        registry.write().push(Arc::clone(&state));
        #[cfg(feature = "tracing-integration")]
        tracing::debug!("capture window opened");
        Self {
            state,
            registry: Arc::clone(registry),
        }
    }

    /// Returns every span exported while this window has been live, in
    /// insertion order. Empty after [`dispose`](Self::dispose).
    ///
    /// Concurrent exports may land while the snapshot is taken; each call
    /// returns at least everything appended before the call began.
    #[must_use]
    pub fn exported_spans(&self) -> Vec<CapturedSpan> {
        if self.state.is_disposed() {
            return Vec::new();
        }
        let mut snapshot = self.state.snapshot.lock();
        while let Some(span) = self.state.incoming.pop() {
            snapshot.push(span);
        }
        snapshot.clone()
    }

    /// Whether this window has been disposed.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.state.is_disposed()
    }

    /// Closes the window: unregisters it from the sink, releases the backing
    /// collections, and makes any late append a silent no-op.
    ///
    /// Idempotent; a second call does nothing.
    pub fn dispose(&self) {
        if self.state.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        while self.state.incoming.pop().is_some() {}
        {
            let mut snapshot = self.state.snapshot.lock();
            drop(core::mem::take(&mut *snapshot));
        }
        self.registry
            .write()
            .retain(|state| !Arc::ptr_eq(state, &self.state));
        #[cfg(feature = "tracing-integration")]
        tracing::debug!("capture window disposed");
    }
}

impl Drop for SpanCapturer {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl core::fmt::Debug for SpanCapturer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SpanCapturer")
            .field("disposed", &self.is_disposed())
            .finish_non_exhaustive()
    }
}
