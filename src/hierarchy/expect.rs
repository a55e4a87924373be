//! Declarative expected tree shapes.
//!
//! A shape is built top-down with [`ExpectedSpan::named`] and
//! [`ExpectedSpan::child`], then checked against a rebuilt hierarchy with
//! [`SpanHierarchy::assert_shape`]. Matching walks the expectation and
//! reports the first divergence, naming the parent span and the expectation
//! that failed.

use super::tree::{HierarchyError, SpanHierarchy};
use crate::tracer::CapturedSpan;

/// The expected shape of one span and its children.
///
/// Children match in insertion order by default;
/// [`unordered_children`](Self::unordered_children) switches one level to
/// count-checked, order-free matching (for fan-out, where branch completion
/// order is not deterministic). In unordered mode sibling expectations must
/// have distinct names; use [`child_times`](Self::child_times) for repeated
/// names.
#[derive(Debug, Clone)]
pub struct ExpectedSpan {
    name: String,
    children: Vec<(ExpectedSpan, usize)>,
    unordered: bool,
}

impl ExpectedSpan {
    /// Starts a shape for a span with the given name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
            unordered: false,
        }
    }

    /// Adds one expected child subtree.
    #[must_use]
    pub fn child(self, child: Self) -> Self {
        self.child_times(child, 1)
    }

    /// Adds an expected child subtree occurring exactly `times` times at
    /// this level.
    #[must_use]
    pub fn child_times(mut self, child: Self, times: usize) -> Self {
        self.children.push((child, times));
        self
    }

    /// Switches this level to count-checked, order-free child matching.
    #[must_use]
    pub const fn unordered_children(mut self) -> Self {
        self.unordered = true;
        self
    }

    /// Returns the expected span name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl SpanHierarchy {
    /// Checks the capture against an expected shape.
    ///
    /// The expectation's root is matched against the capture's root spans by
    /// name; from there the walk is top-down and stops at the first
    /// divergence.
    pub fn assert_shape(&self, expected: &ExpectedSpan) -> Result<(), HierarchyError> {
        let Some(root) = self.roots().find(|span| span.name() == expected.name) else {
            return Err(HierarchyError::RootNotFound {
                name: expected.name.clone(),
                roots: self.roots().map(|span| span.name().to_owned()).collect(),
            });
        };
        self.check_node(root, expected)
    }

    fn check_node(
        &self,
        span: &CapturedSpan,
        expected: &ExpectedSpan,
    ) -> Result<(), HierarchyError> {
        let actual: Vec<&CapturedSpan> = self.children_of(span.id()).collect();
        if expected.unordered {
            self.check_unordered(span, &actual, expected)
        } else {
            self.check_ordered(span, &actual, expected)
        }
    }

    fn check_ordered(
        &self,
        parent: &CapturedSpan,
        actual: &[&CapturedSpan],
        expected: &ExpectedSpan,
    ) -> Result<(), HierarchyError> {
        let mut slots = expected
            .children
            .iter()
            .flat_map(|(child, times)| std::iter::repeat(child).take(*times));
        let mut at = 0;
        loop {
            match (slots.next(), actual.get(at)) {
                (Some(slot), Some(child)) => {
                    if child.name() != slot.name {
                        return Err(HierarchyError::ChildNameMismatch {
                            parent: parent.name().to_owned(),
                            index: at,
                            expected: slot.name.clone(),
                            found: child.name().to_owned(),
                        });
                    }
                    self.check_node(child, slot)?;
                    at += 1;
                }
                (Some(slot), None) => {
                    return Err(HierarchyError::MissingChild {
                        parent: parent.name().to_owned(),
                        name: slot.name.clone(),
                    });
                }
                (None, Some(child)) => {
                    return Err(HierarchyError::ExtraChild {
                        parent: parent.name().to_owned(),
                        name: child.name().to_owned(),
                    });
                }
                (None, None) => return Ok(()),
            }
        }
    }

    fn check_unordered(
        &self,
        parent: &CapturedSpan,
        actual: &[&CapturedSpan],
        expected: &ExpectedSpan,
    ) -> Result<(), HierarchyError> {
        for (slot, times) in &expected.children {
            let matching: Vec<&CapturedSpan> = actual
                .iter()
                .filter(|child| child.name() == slot.name)
                .copied()
                .collect();
            if matching.is_empty() && *times > 0 {
                return Err(HierarchyError::MissingChild {
                    parent: parent.name().to_owned(),
                    name: slot.name.clone(),
                });
            }
            if matching.len() != *times {
                return Err(HierarchyError::ChildNameCountMismatch {
                    parent: parent.name().to_owned(),
                    name: slot.name.clone(),
                    expected: *times,
                    found: matching.len(),
                });
            }
            for child in matching {
                self.check_node(child, slot)?;
            }
        }
        // Every expected name matched its count, so any surplus child has a
        // name the expectation never mentions.
        let extra = actual
            .iter()
            .find(|child| !expected.children.iter().any(|(slot, _)| slot.name == child.name()));
        if let Some(child) = extra {
            return Err(HierarchyError::ExtraChild {
                parent: parent.name().to_owned(),
                name: child.name().to_owned(),
            });
        }
        Ok(())
    }
}
