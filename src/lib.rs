//! Flowtrace: execution span tracing for flow-processing runtimes.
//!
//! # Overview
//!
//! For every unit of work performed while processing a message, flowtrace
//! opens a span, links it to its logical parent, propagates context across
//! synchronous and asynchronous execution boundaries, and on completion
//! hands the span to an export sink. The tree shape stays correct under
//! dynamic, branching, error-prone, and partially-concurrent execution, and
//! the tracer stays cheap enough to run on every message.
//!
//! The flow engine is an external collaborator: it calls the tracer at
//! component entry and exit and threads the [`SpanCarrier`] through its own
//! continuation mechanism. Context is always an explicit value, never
//! ambient thread-local state.
//!
//! # Core Guarantees
//!
//! - **Every open span closes exactly once**: closing consumes the span, so
//!   a double close does not compile; aborts close everything still open
//! - **Open spans never reach a sink**: only closing produces the exported
//!   form
//! - **Parents are fixed at open time**: the carrier's open-span stack
//!   decides parentage, and a span that is not the innermost open span
//!   cannot be closed (fail fast, carrier and sink untouched)
//! - **Branches are isolated**: every parallel dispatch forks the carrier,
//!   so one branch's failure never marks a sibling
//! - **Deterministic testing**: sequential ids and a manual clock make
//!   captured trees stable across runs
//!
//! # Module Structure
//!
//! - [`types`]: Identifiers, component identity/location, step outcomes
//! - [`time`](mod@time): Timestamps and time sources (wall clock, manual)
//! - [`util`]: Id generation sources
//! - [`tracer`]: Span lifecycle, carrier, naming rules
//! - [`capture`]: Export sinks and bounded capture windows
//! - [`hierarchy`]: Tree reconstruction and declarative shape assertion
//! - [`stats`]: Payload byte/object statistics keyed by component location
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use flowtrace::{
//!     CaptureSink, ComponentIdentity, ComponentLocation, ExpectedSpan, FlowTracer,
//!     SpanHierarchy, StepOutcome,
//! };
//!
//! let sink = Arc::new(CaptureSink::new());
//! let capturer = sink.capture();
//! let tracer = FlowTracer::builder()
//!     .sink(sink)
//!     .artifact_id("orders-app")
//!     .build();
//!
//! // One execution: a flow root wrapping a single processor.
//! let mut carrier = tracer.begin_execution();
//! let flow = tracer.start_span(
//!     &mut carrier,
//!     &ComponentIdentity::flow_root("core"),
//!     &ComponentLocation::flow("orders"),
//! );
//! let step = tracer.start_span(
//!     &mut carrier,
//!     &ComponentIdentity::operation("demo", "logger"),
//!     &ComponentLocation::flow("orders").processor(0),
//! );
//! tracer.end_span(&mut carrier, step, StepOutcome::Success)?;
//! tracer.end_span(&mut carrier, flow, StepOutcome::Success)?;
//!
//! let hierarchy = SpanHierarchy::from_spans(capturer.exported_spans())?;
//! hierarchy.assert_shape(
//!     &ExpectedSpan::named("core:flow").child(ExpectedSpan::named("demo:logger")),
//! )?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod capture;
pub mod hierarchy;
pub mod stats;
pub mod time;
pub mod tracer;
pub mod types;
pub mod util;

pub use capture::{CaptureSink, NullSink, SpanCapturer, SpanSink};
pub use hierarchy::{ExpectedSpan, HierarchyError, SpanHierarchy};
pub use stats::{
    CountingIter, CountingRead, PayloadDirection, PayloadStatistics, StatisticsRegistry,
};
pub use time::{ManualClock, Time, TimeSource, WallClock};
pub use tracer::{
    ActiveSpan, CapturedSpan, FlowTracer, FlowTracerBuilder, SpanCarrier, SpanStatus, TraceError,
    attribute,
};
pub use types::{
    ComponentIdentity, ComponentKind, ComponentLocation, ExecutionId, FailureCause, SpanId,
    StepOutcome, join_outcomes,
};
pub use util::{IdSource, OsIds, SeqIds};
