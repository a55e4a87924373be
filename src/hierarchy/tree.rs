//! Tree reconstruction from a flat capture.
//!
//! Verification rebuilds the span tree once per call: an id-to-span index,
//! parent lookup by map access, and insertion-ordered child lists. Spans
//! whose parent id does not resolve within the capture are an error, not a
//! second root.

use crate::tracer::CapturedSpan;
use crate::types::SpanId;
use std::collections::HashMap;
use thiserror::Error;

/// Errors from tree reconstruction and shape assertion.
///
/// Assertion messages always name the parent span and the expectation that
/// failed, so a diverging tree is diagnosable from the message alone.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HierarchyError {
    /// A span references a parent id that is not in the capture.
    #[error("span {span} ('{name}') has parent {parent} which is not in the capture")]
    DanglingParent {
        /// The referencing span's id.
        span: SpanId,
        /// The referencing span's name.
        name: String,
        /// The unresolved parent id.
        parent: SpanId,
    },

    /// Two spans in the capture share one id.
    #[error("duplicate span id {span} in the capture")]
    DuplicateId {
        /// The duplicated id.
        span: SpanId,
    },

    /// No root span carries the expected name.
    #[error("expected a root span named '{name}'; roots present: {roots:?}")]
    RootNotFound {
        /// The expected root name.
        name: String,
        /// The names of the roots actually present.
        roots: Vec<String>,
    },

    /// An expected child is absent.
    #[error("expected child '{name}' under '{parent}', found none")]
    MissingChild {
        /// The parent span's name.
        parent: String,
        /// The missing child's expected name.
        name: String,
    },

    /// A child is present that the expectation does not allow.
    #[error("unexpected child '{name}' under '{parent}'")]
    ExtraChild {
        /// The parent span's name.
        parent: String,
        /// The unexpected child's name.
        name: String,
    },

    /// In-order matching found the wrong name at a position.
    #[error("expected child #{index} under '{parent}' to be named '{expected}', found '{found}'")]
    ChildNameMismatch {
        /// The parent span's name.
        parent: String,
        /// Zero-based position among the parent's children.
        index: usize,
        /// The expected name at that position.
        expected: String,
        /// The name actually found.
        found: String,
    },

    /// Unordered matching found the wrong number of children with a name.
    #[error("expected {expected} child(ren) named '{name}' under '{parent}', found {found}")]
    ChildNameCountMismatch {
        /// The parent span's name.
        parent: String,
        /// The counted child name.
        name: String,
        /// How many were expected.
        expected: usize,
        /// How many were found.
        found: usize,
    },
}

/// A span tree rebuilt from a flat, insertion-ordered capture.
#[derive(Debug, Clone)]
pub struct SpanHierarchy {
    spans: Vec<CapturedSpan>,
    by_id: HashMap<SpanId, usize>,
    children: HashMap<SpanId, Vec<usize>>,
    roots: Vec<usize>,
}

impl SpanHierarchy {
    /// Reconstructs the tree from a capture.
    ///
    /// Keeps the capture's insertion order for roots and for each span's
    /// children. Fails on duplicate ids and on parent ids that do not
    /// resolve within the capture.
    pub fn from_spans(spans: Vec<CapturedSpan>) -> Result<Self, HierarchyError> {
        let mut by_id = HashMap::with_capacity(spans.len());
        for (at, span) in spans.iter().enumerate() {
            if by_id.insert(span.id(), at).is_some() {
                return Err(HierarchyError::DuplicateId { span: span.id() });
            }
        }

        let mut children: HashMap<SpanId, Vec<usize>> = HashMap::new();
        let mut roots = Vec::new();
        for (at, span) in spans.iter().enumerate() {
            match span.parent_id() {
                None => roots.push(at),
                Some(parent) => {
                    if !by_id.contains_key(&parent) {
                        return Err(HierarchyError::DanglingParent {
                            span: span.id(),
                            name: span.name().to_owned(),
                            parent,
                        });
                    }
                    children.entry(parent).or_default().push(at);
                }
            }
        }

        Ok(Self {
            spans,
            by_id,
            children,
            roots,
        })
    }

    /// Returns the number of spans in the capture.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Whether the capture is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Returns all spans in insertion order.
    #[inline]
    #[must_use]
    pub fn spans(&self) -> &[CapturedSpan] {
        &self.spans
    }

    /// Looks a span up by id.
    #[must_use]
    pub fn get(&self, id: SpanId) -> Option<&CapturedSpan> {
        self.by_id.get(&id).map(|&at| &self.spans[at])
    }

    /// Returns the spans with no parent, in insertion order.
    pub fn roots(&self) -> impl Iterator<Item = &CapturedSpan> + '_ {
        self.roots.iter().map(move |&at| &self.spans[at])
    }

    /// Returns a span's children, in insertion order.
    pub fn children_of(&self, parent: SpanId) -> impl Iterator<Item = &CapturedSpan> + '_ {
        self.children
            .get(&parent)
            .into_iter()
            .flatten()
            .map(move |&at| &self.spans[at])
    }

    /// Returns the first span with the given name, in insertion order.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&CapturedSpan> {
        self.spans.iter().find(|span| span.name() == name)
    }

    /// Returns every span with the given name, in insertion order.
    pub fn spans_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a CapturedSpan> + 'a {
        self.spans.iter().filter(move |span| span.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::Time;
    use crate::tracer::{ActiveSpan, SpanStatus};

    fn captured(raw: u64, parent: Option<u64>, name: &str) -> CapturedSpan {
        ActiveSpan::new(
            SpanId::from_u64(raw).unwrap(),
            parent.and_then(SpanId::from_u64),
            name.to_owned(),
            Time::from_nanos(raw),
        )
        .close(Time::from_nanos(raw + 1), SpanStatus::Ok)
    }

    #[test]
    fn rebuilds_parent_child_links() {
        let hierarchy = SpanHierarchy::from_spans(vec![
            captured(1, None, "core:flow"),
            captured(2, Some(1), "demo:logger"),
            captured(3, Some(1), "http:request"),
        ])
        .unwrap();

        assert_eq!(hierarchy.len(), 3);
        let root_ids: Vec<u64> = hierarchy.roots().map(|s| s.id().as_u64()).collect();
        assert_eq!(root_ids, vec![1]);

        let children: Vec<&str> = hierarchy
            .children_of(SpanId::from_u64(1).unwrap())
            .map(CapturedSpan::name)
            .collect();
        assert_eq!(children, vec!["demo:logger", "http:request"]);
    }

    #[test]
    fn children_keep_insertion_order() {
        let hierarchy = SpanHierarchy::from_spans(vec![
            captured(1, None, "core:flow"),
            captured(5, Some(1), "z"),
            captured(3, Some(1), "a"),
            captured(4, Some(1), "m"),
        ])
        .unwrap();

        let children: Vec<&str> = hierarchy
            .children_of(SpanId::from_u64(1).unwrap())
            .map(CapturedSpan::name)
            .collect();
        assert_eq!(children, vec!["z", "a", "m"]);
    }

    #[test]
    fn dangling_parent_is_an_error() {
        let err = SpanHierarchy::from_spans(vec![
            captured(1, None, "core:flow"),
            captured(2, Some(99), "demo:logger"),
        ])
        .unwrap_err();

        assert_eq!(
            err,
            HierarchyError::DanglingParent {
                span: SpanId::from_u64(2).unwrap(),
                name: "demo:logger".to_owned(),
                parent: SpanId::from_u64(99).unwrap(),
            }
        );
        let msg = err.to_string();
        assert!(msg.contains("demo:logger"), "{msg}");
        assert!(msg.contains("0000000000000063"), "{msg}");
    }

    #[test]
    fn duplicate_id_is_an_error() {
        let err = SpanHierarchy::from_spans(vec![
            captured(1, None, "core:flow"),
            captured(1, None, "core:flow"),
        ])
        .unwrap_err();
        assert!(matches!(err, HierarchyError::DuplicateId { .. }));
    }

    #[test]
    fn multiple_roots_are_allowed() {
        let hierarchy = SpanHierarchy::from_spans(vec![
            captured(1, None, "core:flow"),
            captured(2, None, "core:flow"),
        ])
        .unwrap();
        assert_eq!(hierarchy.roots().count(), 2);
    }

    #[test]
    fn find_by_name_takes_the_first_in_insertion_order() {
        let hierarchy = SpanHierarchy::from_spans(vec![
            captured(1, None, "core:flow"),
            captured(2, Some(1), "demo:step"),
            captured(3, Some(1), "demo:step"),
        ])
        .unwrap();

        assert_eq!(hierarchy.find_by_name("demo:step").unwrap().id().as_u64(), 2);
        assert_eq!(hierarchy.spans_named("demo:step").count(), 2);
        assert!(hierarchy.find_by_name("missing").is_none());
    }

    #[test]
    fn get_looks_up_by_id() {
        let hierarchy =
            SpanHierarchy::from_spans(vec![captured(7, None, "core:flow")]).unwrap();
        assert_eq!(
            hierarchy.get(SpanId::from_u64(7).unwrap()).unwrap().name(),
            "core:flow"
        );
        assert!(hierarchy.get(SpanId::from_u64(8).unwrap()).is_none());
    }

    #[test]
    fn empty_capture_builds_an_empty_hierarchy() {
        let hierarchy = SpanHierarchy::from_spans(Vec::new()).unwrap();
        assert!(hierarchy.is_empty());
        assert_eq!(hierarchy.roots().count(), 0);
    }
}
