//! The span factory driven by the flow engine.
//!
//! The engine calls [`FlowTracer::start_span`] at component entry and
//! [`FlowTracer::end_span`] at component exit, threading the
//! [`SpanCarrier`] through its own continuation mechanism. The tracer owns
//! naming, parent linkage, timing, and export; it never sees engine
//! internals beyond the identity, location, and outcome it is handed.

use super::carrier::SpanCarrier;
use super::error::TraceError;
use super::naming;
use super::span::{ActiveSpan, SpanStatus, attribute};
use crate::capture::{NullSink, SpanSink};
use crate::time::{TimeSource, WallClock};
use crate::types::{ComponentIdentity, ComponentLocation, FailureCause, StepOutcome};
use crate::util::{IdSource, OsIds};
use std::sync::Arc;

/// Opens, closes, and exports execution spans for one artifact.
///
/// Cheap to share: one tracer serves every concurrent execution of its
/// artifact. All per-execution state lives in the [`SpanCarrier`].
pub struct FlowTracer {
    sink: Arc<dyn SpanSink>,
    ids: Arc<dyn IdSource>,
    clock: Arc<dyn TimeSource>,
    artifact_id: String,
    artifact_type: String,
}

impl FlowTracer {
    /// Starts building a tracer.
    #[must_use]
    pub fn builder() -> FlowTracerBuilder {
        FlowTracerBuilder::new()
    }

    /// Begins a new execution: a fresh carrier with a new execution id and
    /// no open spans.
    #[must_use]
    pub fn begin_execution(&self) -> SpanCarrier {
        let carrier = SpanCarrier::new(self.ids.next_execution_id());
        #[cfg(feature = "tracing-integration")]
        tracing::trace!(execution = %carrier.execution_id(), "execution began");
        carrier
    }

    /// Opens a span for the component entering execution on this path.
    ///
    /// The new span is parented by the carrier's innermost open span (none
    /// for the first span of an execution), named per the component's
    /// category, stamped with the well-known attributes, and pushed onto the
    /// carrier's stack.
    pub fn start_span(
        &self,
        carrier: &mut SpanCarrier,
        identity: &ComponentIdentity,
        location: &ComponentLocation,
    ) -> ActiveSpan {
        self.open(carrier, naming::span_name(identity), location.path())
    }

    /// Opens the span for one pass through a scope's or router's nested
    /// body.
    ///
    /// Named `<namespace>:<name>:route`; the location gains a trailing
    /// `route/<index>` component so fan-out siblings differ only in the
    /// index. Fails fast for component categories without routes.
    pub fn start_route_span(
        &self,
        carrier: &mut SpanCarrier,
        identity: &ComponentIdentity,
        location: &ComponentLocation,
        index: usize,
    ) -> Result<ActiveSpan, TraceError> {
        if !identity.kind().has_routes() {
            return Err(TraceError::NoRoutes {
                identity: identity.to_string(),
                kind: identity.kind(),
            });
        }
        let route_location = location.clone().route(index);
        Ok(self.open(
            carrier,
            naming::route_span_name(identity),
            route_location.path(),
        ))
    }

    /// Closes a span with the step's outcome and exports it.
    ///
    /// The span must be the carrier's innermost open span; anything else is
    /// a fail-fast contract violation that leaves the carrier and the sink
    /// untouched. On success the span's id is popped, its end time is set
    /// (never before its start time), failures stamp the error attributes,
    /// and the immutable snapshot goes to the sink exactly once.
    pub fn end_span(
        &self,
        carrier: &mut SpanCarrier,
        span: ActiveSpan,
        outcome: StepOutcome,
    ) -> Result<(), TraceError> {
        let Some(top) = carrier.current_span() else {
            return Err(TraceError::EmptyCarrier { span: span.id() });
        };
        if top != span.id() {
            #[cfg(feature = "tracing-integration")]
            tracing::warn!(span = %span.id(), top = %top, "non-innermost span close rejected");
            return Err(TraceError::NotInnermost {
                span: span.id(),
                top,
            });
        }
        let _ = carrier.pop();
        self.close_and_export(span, &outcome);
        Ok(())
    }

    /// Closes every still-open span of an aborted execution, innermost
    /// first, each with `Error` status and the abort's cause.
    ///
    /// `open_spans` may arrive in any order; each carrier stack entry must
    /// have a matching span and vice versa, otherwise the abort fails fast.
    pub fn abort_execution(
        &self,
        carrier: &mut SpanCarrier,
        mut open_spans: Vec<ActiveSpan>,
        cause: FailureCause,
    ) -> Result<(), TraceError> {
        #[cfg(feature = "tracing-integration")]
        tracing::debug!(
            execution = %carrier.execution_id(),
            open = carrier.depth(),
            "execution aborted"
        );
        let outcome = StepOutcome::Failure(cause);
        while let Some(id) = carrier.pop() {
            let Some(at) = open_spans.iter().position(|span| span.id() == id) else {
                return Err(TraceError::MissingActiveSpan { span: id });
            };
            let span = open_spans.swap_remove(at);
            self.close_and_export(span, &outcome);
        }
        if !open_spans.is_empty() {
            return Err(TraceError::ForeignOpenSpans {
                count: open_spans.len(),
            });
        }
        Ok(())
    }

    fn open(&self, carrier: &mut SpanCarrier, name: String, location: &str) -> ActiveSpan {
        let id = self.ids.next_span_id();
        let parent = carrier.current_span();
        let mut span = ActiveSpan::new(id, parent, name, self.clock.now());
        span.set_attribute(attribute::LOCATION, location);
        span.set_attribute(attribute::ARTIFACT_ID, self.artifact_id.as_str());
        span.set_attribute(attribute::ARTIFACT_TYPE, self.artifact_type.as_str());
        span.set_attribute(attribute::EXECUTION_ID, carrier.execution_id().to_hex());
        carrier.push(id);
        #[cfg(feature = "tracing-integration")]
        tracing::trace!(span = %id, name = %span.name(), location = %location, "span opened");
        span
    }

    fn close_and_export(&self, mut span: ActiveSpan, outcome: &StepOutcome) {
        let status = match outcome {
            StepOutcome::Success => SpanStatus::Ok,
            StepOutcome::Failure(cause) => {
                span.set_attribute(attribute::ERROR_TYPE, cause.error_type());
                span.set_attribute(attribute::ERROR_MESSAGE, cause.message());
                SpanStatus::Error
            }
        };
        // A misbehaving clock must not produce end < start.
        let end = self.clock.now().max(span.start_time());
        #[cfg(feature = "tracing-integration")]
        tracing::trace!(span = %span.id(), ?status, "span closed");
        self.sink.export(span.close(end, status));
    }
}

impl core::fmt::Debug for FlowTracer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FlowTracer")
            .field("artifact_id", &self.artifact_id)
            .field("artifact_type", &self.artifact_type)
            .field("ids", &self.ids.source_id())
            .finish_non_exhaustive()
    }
}

/// Builder for [`FlowTracer`].
///
/// Defaults: [`NullSink`], [`OsIds`], [`WallClock`], empty artifact id,
/// artifact type `"application"`.
pub struct FlowTracerBuilder {
    sink: Arc<dyn SpanSink>,
    ids: Arc<dyn IdSource>,
    clock: Arc<dyn TimeSource>,
    artifact_id: String,
    artifact_type: String,
}

impl FlowTracerBuilder {
    fn new() -> Self {
        Self {
            sink: Arc::new(NullSink),
            ids: Arc::new(OsIds),
            clock: Arc::new(WallClock::new()),
            artifact_id: String::new(),
            artifact_type: "application".to_owned(),
        }
    }

    /// Sets the sink closed spans are exported to.
    #[must_use]
    pub fn sink(mut self, sink: Arc<dyn SpanSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Sets the id source.
    #[must_use]
    pub fn id_source(mut self, ids: Arc<dyn IdSource>) -> Self {
        self.ids = ids;
        self
    }

    /// Sets the time source.
    #[must_use]
    pub fn time_source(mut self, clock: Arc<dyn TimeSource>) -> Self {
        self.clock = clock;
        self
    }

    /// Sets the artifact identifier stamped on every span.
    #[must_use]
    pub fn artifact_id(mut self, artifact_id: impl Into<String>) -> Self {
        self.artifact_id = artifact_id.into();
        self
    }

    /// Sets the artifact type stamped on every span.
    #[must_use]
    pub fn artifact_type(mut self, artifact_type: impl Into<String>) -> Self {
        self.artifact_type = artifact_type.into();
        self
    }

    /// Builds the tracer.
    #[must_use]
    pub fn build(self) -> FlowTracer {
        FlowTracer {
            sink: self.sink,
            ids: self.ids,
            clock: self.clock,
            artifact_id: self.artifact_id,
            artifact_type: self.artifact_type,
        }
    }
}

impl core::fmt::Debug for FlowTracerBuilder {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FlowTracerBuilder")
            .field("artifact_id", &self.artifact_id)
            .field("artifact_type", &self.artifact_type)
            .finish_non_exhaustive()
    }
}
