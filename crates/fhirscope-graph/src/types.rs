//! Graph node and edge types.

use std::collections::HashMap;

use serde_json::Value;

use crate::style::NodeStyle;

/// Depth assigned to nodes discovered only through reverse references.
/// They sit outside the forward traversal's depth counting.
pub const REVERSE_DEPTH: i32 = -1;

/// One FHIR resource instance in the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    /// Canonical `Type/id` key, unique across the graph
    pub id: String,
    pub resource_type: String,
    pub resource_id: String,
    /// Human-readable display string derived from the resource content
    pub label: String,
    /// Distance from the root along forward edges; root is 0,
    /// reverse-only nodes carry [`REVERSE_DEPTH`]
    pub depth: i32,
    /// True only for the node the graph was built from. Depth 0 is not a
    /// root marker: expanding a reverse-discovered node creates ordinary
    /// children at depth 0.
    pub is_root: bool,
    /// Whether this node's own outbound references have been added
    pub expanded: bool,
    /// The fetched resource body, kept for detail display
    pub resource: Option<Value>,
    /// Set when the referenced resource could not be fetched.
    /// Error nodes are terminal and never expanded.
    pub error: bool,
    pub error_message: Option<String>,
    pub style: NodeStyle,
}

/// A directed reference between two graph nodes.
///
/// Forward edges use the id `"{from}->{to}"`, reverse edges
/// `"{from}->{to}[rev]"`. The id doubles as the deduplication key, so a
/// second property-based reference between an already-connected pair in the
/// same direction is collapsed into the existing edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphEdge {
    pub id: String,
    pub from: String,
    pub to: String,
    /// The referencing property name, or the search parameter for reverse edges
    pub label: String,
    /// Full property path of the reference in the source resource body
    pub property_path: Option<String>,
    pub is_reverse: bool,
}

impl GraphEdge {
    /// An edge discovered by following a reference embedded in `from`.
    pub fn forward(
        from: impl Into<String>,
        to: impl Into<String>,
        label: impl Into<String>,
        property_path: impl Into<String>,
    ) -> Self {
        let from = from.into();
        let to = to.into();
        Self {
            id: format!("{from}->{to}"),
            from,
            to,
            label: label.into(),
            property_path: Some(property_path.into()),
            is_reverse: false,
        }
    }

    /// An edge discovered by a reverse search: `from` is the referencing
    /// resource, `to` the search target.
    pub fn reverse(from: impl Into<String>, to: impl Into<String>, label: impl Into<String>) -> Self {
        let from = from.into();
        let to = to.into();
        Self {
            id: format!("{from}->{to}[rev]"),
            from,
            to,
            label: label.into(),
            property_path: None,
            is_reverse: true,
        }
    }
}

/// Everything a build or expand operation produces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphResult {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    /// Snapshot of the fetched-resource cache after the operation
    pub fetched_resources: HashMap<String, Value>,
}
