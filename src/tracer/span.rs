//! Span model: the open span owned by an executing path and the immutable
//! snapshot handed to the export sink.
//!
//! The two-type split enforces the export invariant by construction: only
//! closing an [`ActiveSpan`] produces a [`CapturedSpan`], so an open span can
//! never reach a sink.

use crate::time::Time;
use crate::types::SpanId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Well-known attribute keys stamped by the tracer.
///
/// Every span carries at least [`LOCATION`](attribute::LOCATION),
/// [`ARTIFACT_ID`](attribute::ARTIFACT_ID),
/// [`ARTIFACT_TYPE`](attribute::ARTIFACT_TYPE), and
/// [`EXECUTION_ID`](attribute::EXECUTION_ID); the error keys appear only on
/// spans closed with a failure cause.
pub mod attribute {
    /// The component's location path within its flow.
    pub const LOCATION: &str = "location";
    /// Identifier of the deployed artifact the flow belongs to.
    pub const ARTIFACT_ID: &str = "artifact.id";
    /// Type of the deployed artifact (e.g. `"application"`).
    pub const ARTIFACT_TYPE: &str = "artifact.type";
    /// Execution id shared by every span of one run.
    pub const EXECUTION_ID: &str = "execution.id";
    /// Stable error type identifier of the failure that closed the span.
    pub const ERROR_TYPE: &str = "error.type";
    /// Human-readable message of the failure that closed the span.
    pub const ERROR_MESSAGE: &str = "error.message";
}

/// Exported status of a closed span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpanStatus {
    /// The enclosed execution completed without raising.
    Ok,
    /// The enclosed execution raised or propagated a failure while the span
    /// was active, whether or not a handler later recovered.
    Error,
}

/// An open span, exclusively owned by the execution path that opened it.
///
/// `Send` but not `Clone`: the owner may carry it across a continuation
/// boundary, and closing consumes it, so a span cannot be closed twice.
#[derive(Debug)]
pub struct ActiveSpan {
    id: SpanId,
    parent_id: Option<SpanId>,
    name: String,
    start_time: Time,
    attributes: BTreeMap<String, String>,
}

impl ActiveSpan {
    pub(crate) fn new(id: SpanId, parent_id: Option<SpanId>, name: String, start_time: Time) -> Self {
        Self {
            id,
            parent_id,
            name,
            start_time,
            attributes: BTreeMap::new(),
        }
    }

    /// Returns the span's id.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> SpanId {
        self.id
    }

    /// Returns the parent span's id, `None` for a root span.
    ///
    /// The parent is fixed at open time and never changes.
    #[inline]
    #[must_use]
    pub const fn parent_id(&self) -> Option<SpanId> {
        self.parent_id
    }

    /// Returns the derived span name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the instant the span was opened.
    #[inline]
    #[must_use]
    pub const fn start_time(&self) -> Time {
        self.start_time
    }

    /// Sets a string attribute, replacing any previous value for the key.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    /// Returns an attribute value, if present.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Closes the span into its immutable exported form.
    pub(crate) fn close(self, end_time: Time, status: SpanStatus) -> CapturedSpan {
        CapturedSpan {
            id: self.id,
            parent_id: self.parent_id,
            name: self.name,
            start_time: self.start_time,
            end_time,
            status,
            attributes: self.attributes,
        }
    }
}

/// An immutable snapshot of a closed span, as handed to the export sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedSpan {
    id: SpanId,
    #[serde(with = "crate::types::id::hex_parent")]
    parent_id: Option<SpanId>,
    name: String,
    start_time: Time,
    end_time: Time,
    status: SpanStatus,
    attributes: BTreeMap<String, String>,
}

impl CapturedSpan {
    /// Returns the span's id.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> SpanId {
        self.id
    }

    /// Returns the parent span's id, `None` for a root span.
    #[inline]
    #[must_use]
    pub const fn parent_id(&self) -> Option<SpanId> {
        self.parent_id
    }

    /// Renders the parent id as 16 hex characters, the all-zero sentinel for
    /// a root span.
    #[inline]
    #[must_use]
    pub fn parent_hex(&self) -> String {
        SpanId::render_parent(self.parent_id)
    }

    /// Whether this span has no parent.
    #[inline]
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Returns the span name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the instant the span was opened.
    #[inline]
    #[must_use]
    pub const fn start_time(&self) -> Time {
        self.start_time
    }

    /// Returns the instant the span was closed, never before
    /// [`start_time`](Self::start_time).
    #[inline]
    #[must_use]
    pub const fn end_time(&self) -> Time {
        self.end_time
    }

    /// Returns the span's duration in nanoseconds.
    #[inline]
    #[must_use]
    pub const fn duration_nanos(&self) -> u64 {
        self.end_time.duration_since(self.start_time)
    }

    /// Returns the exported status.
    #[inline]
    #[must_use]
    pub const fn status(&self) -> SpanStatus {
        self.status
    }

    /// Returns an attribute value, if present.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Returns all attributes in key order.
    #[inline]
    #[must_use]
    pub const fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }
}
