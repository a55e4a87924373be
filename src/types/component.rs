//! Component identity and location types.
//!
//! A span is named from the identity of the component that executed, never
//! from runtime type inspection: the set of component categories is closed
//! and each category has an explicit naming rule (see `tracer::naming`).

use core::fmt;
use core::fmt::Write as _;
use serde::{Deserialize, Serialize};

/// The closed set of component categories the tracer derives span names from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    /// An ordinary message processor (an extension operation).
    Operation,
    /// A scope enclosing one nested chain (custom scopes, try, etc.).
    Scope,
    /// A router dispatching over nested routes (for-each, scatter-gather).
    Router,
    /// An error-handling construct that receives propagated failures.
    ErrorHandler,
    /// The root construct of a flow.
    FlowRoot,
}

impl ComponentKind {
    /// Whether this category executes nested bodies that get route spans.
    #[must_use]
    pub const fn has_routes(self) -> bool {
        matches!(self, Self::Scope | Self::Router)
    }

    /// Whether this category declares an error boundary that error-handler
    /// spans attach to.
    #[must_use]
    pub const fn is_error_boundary(self) -> bool {
        matches!(self, Self::FlowRoot)
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Operation => write!(f, "operation"),
            Self::Scope => write!(f, "scope"),
            Self::Router => write!(f, "router"),
            Self::ErrorHandler => write!(f, "error-handler"),
            Self::FlowRoot => write!(f, "flow-root"),
        }
    }
}

/// The namespace-qualified identity of an executing component.
///
/// Identity is declarative data supplied by the engine; the tracer never
/// inspects the component itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentIdentity {
    namespace: String,
    name: String,
    kind: ComponentKind,
}

impl ComponentIdentity {
    /// Creates an identity for an ordinary processor operation.
    #[must_use]
    pub fn operation(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            kind: ComponentKind::Operation,
        }
    }

    /// Creates an identity for a scope.
    #[must_use]
    pub fn scope(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            kind: ComponentKind::Scope,
        }
    }

    /// Creates an identity for a router.
    #[must_use]
    pub fn router(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            kind: ComponentKind::Router,
        }
    }

    /// Creates an identity for an error-handling construct.
    #[must_use]
    pub fn error_handler(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            kind: ComponentKind::ErrorHandler,
        }
    }

    /// Creates the identity of a flow root in the given runtime namespace.
    ///
    /// The flow root's name is fixed: its span is always `<namespace>:flow`.
    #[must_use]
    pub fn flow_root(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: "flow".to_owned(),
            kind: ComponentKind::FlowRoot,
        }
    }

    /// Returns the component's namespace.
    #[inline]
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the component's name within its namespace.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the component's category.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> ComponentKind {
        self.kind
    }
}

impl fmt::Display for ComponentIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.name)
    }
}

/// The slash-separated location path of a component within its flow.
///
/// Examples: `"orders"` (the flow itself), `"orders/processors/2"`,
/// `"orders/processors/1/processors/0"` (nested inside a scope). Route
/// passes append a `route/<index>` component so fan-out siblings differ
/// only in the numeric index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentLocation {
    path: String,
}

impl ComponentLocation {
    /// Starts a location path at the named flow.
    #[must_use]
    pub fn flow(name: impl Into<String>) -> Self {
        Self { path: name.into() }
    }

    /// Appends a processor index: `<path>/processors/<index>`.
    #[must_use]
    pub fn processor(mut self, index: usize) -> Self {
        let _ = write!(self.path, "/processors/{index}");
        self
    }

    /// Appends a route index: `<path>/route/<index>`.
    #[must_use]
    pub fn route(mut self, index: usize) -> Self {
        let _ = write!(self.path, "/route/{index}");
        self
    }

    /// Returns the full path.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for ComponentLocation {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---- ComponentKind ----

    #[test]
    fn only_scopes_and_routers_have_routes() {
        assert!(ComponentKind::Scope.has_routes());
        assert!(ComponentKind::Router.has_routes());
        assert!(!ComponentKind::Operation.has_routes());
        assert!(!ComponentKind::ErrorHandler.has_routes());
        assert!(!ComponentKind::FlowRoot.has_routes());
    }

    #[test]
    fn flow_root_is_the_error_boundary() {
        assert!(ComponentKind::FlowRoot.is_error_boundary());
        assert!(!ComponentKind::Scope.is_error_boundary());
        assert!(!ComponentKind::Router.is_error_boundary());
    }

    #[test]
    fn kind_display_is_lowercase_hyphenated() {
        assert_eq!(ComponentKind::Operation.to_string(), "operation");
        assert_eq!(ComponentKind::ErrorHandler.to_string(), "error-handler");
        assert_eq!(ComponentKind::FlowRoot.to_string(), "flow-root");
    }

    // ---- ComponentIdentity ----

    #[test]
    fn operation_identity_fields() {
        let id = ComponentIdentity::operation("http", "request");
        assert_eq!(id.namespace(), "http");
        assert_eq!(id.name(), "request");
        assert_eq!(id.kind(), ComponentKind::Operation);
    }

    #[test]
    fn flow_root_identity_has_fixed_name() {
        let id = ComponentIdentity::flow_root("core");
        assert_eq!(id.name(), "flow");
        assert_eq!(id.kind(), ComponentKind::FlowRoot);
    }

    #[test]
    fn identity_display_is_namespace_qualified() {
        let id = ComponentIdentity::scope("demo", "custom-scope");
        assert_eq!(id.to_string(), "demo:custom-scope");
    }

    // ---- ComponentLocation ----

    #[test]
    fn flow_location_is_the_bare_name() {
        let loc = ComponentLocation::flow("orders");
        assert_eq!(loc.path(), "orders");
    }

    #[test]
    fn processor_segments_accumulate() {
        let loc = ComponentLocation::flow("orders").processor(1).processor(0);
        assert_eq!(loc.path(), "orders/processors/1/processors/0");
    }

    #[test]
    fn route_segment_carries_the_index() {
        let loc = ComponentLocation::flow("orders").processor(2).route(7);
        assert_eq!(loc.path(), "orders/processors/2/route/7");
    }

    #[test]
    fn location_display_matches_path() {
        let loc = ComponentLocation::flow("f").processor(0);
        assert_eq!(loc.to_string(), "f/processors/0");
    }

    #[test]
    fn location_serde_is_transparent() {
        let loc = ComponentLocation::flow("f").processor(3);
        let json = serde_json::to_string(&loc).expect("serialize");
        assert_eq!(json, "\"f/processors/3\"");
        let back: ComponentLocation = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(loc, back);
    }
}
