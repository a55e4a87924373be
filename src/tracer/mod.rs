//! Span lifecycle: opening, context propagation, closing, export.
//!
//! The engine drives [`FlowTracer`] at every component entry and exit and
//! threads the [`SpanCarrier`] through its continuation boundaries. Parent
//! linkage is the carrier's open-span stack; the naming rules live in
//! [`naming`]; closed spans leave through the sink configured on the tracer.

pub mod naming;

mod carrier;
mod error;
mod flow;
mod span;

pub use carrier::SpanCarrier;
pub use error::TraceError;
pub use flow::{FlowTracer, FlowTracerBuilder};
pub use span::{ActiveSpan, CapturedSpan, SpanStatus, attribute};
