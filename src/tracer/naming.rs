//! Span naming rules.
//!
//! Names are an interoperability contract: downstream consumers match on
//! them, so each component category has one explicit rule and nothing is
//! derived from runtime type inspection.
//!
//! - flow root: `<runtime-namespace>:flow`
//! - any other component: `<namespace>:<name>`
//! - one pass through a scope's or router's nested body:
//!   `<namespace>:<name>:route`
//!
//! Error handlers need no dedicated rule; their identity name already is the
//! construct name (e.g. `on-error-propagate`).

use crate::types::{ComponentIdentity, ComponentKind};

/// Suffix naming one pass through a nested execution path.
pub const ROUTE_SUFFIX: &str = "route";

/// Derives the exported span name for a component.
#[must_use]
pub fn span_name(identity: &ComponentIdentity) -> String {
    match identity.kind() {
        ComponentKind::FlowRoot => format!("{}:flow", identity.namespace()),
        ComponentKind::Operation
        | ComponentKind::Scope
        | ComponentKind::Router
        | ComponentKind::ErrorHandler => {
            format!("{}:{}", identity.namespace(), identity.name())
        }
    }
}

/// Derives the span name for one pass through a component's nested route.
#[must_use]
pub fn route_span_name(identity: &ComponentIdentity) -> String {
    format!(
        "{}:{}:{ROUTE_SUFFIX}",
        identity.namespace(),
        identity.name()
    )
}
