//! Conversion into the vis-network input format.
//!
//! Pure presentation mapping. Traversal state never depends on anything in
//! this module; a different rendering surface can swap it out wholesale.

use serde::Serialize;

use crate::types::{GraphEdge, GraphNode};

const FORWARD_EDGE_COLOR: &str = "#90a4ae";
const REVERSE_EDGE_COLOR: &str = "#b39ddb";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualNode {
    pub id: String,
    pub label: String,
    /// Tooltip text: the canonical key, or the failure message for error nodes
    pub title: String,
    pub shape: &'static str,
    pub color: VisualNodeColor,
    #[serde(rename = "borderWidth")]
    pub border_width: u32,
    pub font: VisualFont,
    #[serde(rename = "shapeProperties")]
    pub shape_properties: VisualShapeProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualNodeColor {
    pub background: &'static str,
    pub border: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualFont {
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualShapeProperties {
    #[serde(rename = "borderDashes")]
    pub border_dashes: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualEdge {
    pub id: String,
    pub from: String,
    pub to: String,
    pub label: String,
    pub arrows: &'static str,
    pub dashes: bool,
    pub color: VisualEdgeColor,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualEdgeColor {
    pub color: &'static str,
}

/// Maps graph nodes into renderable form. The root and error nodes get a
/// dashed border; error nodes carry their failure message as the tooltip.
pub fn to_visual_nodes(nodes: &[GraphNode]) -> Vec<VisualNode> {
    nodes
        .iter()
        .map(|node| VisualNode {
            id: node.id.clone(),
            label: node.label.clone(),
            title: node
                .error_message
                .clone()
                .unwrap_or_else(|| node.id.clone()),
            shape: "box",
            color: VisualNodeColor {
                background: node.style.color,
                border: node.style.border,
            },
            border_width: if node.is_root { 3 } else { 1 },
            font: VisualFont {
                color: node.style.font_color,
            },
            shape_properties: VisualShapeProperties {
                border_dashes: node.error || node.is_root,
            },
        })
        .collect()
}

/// Maps graph edges into renderable form. Reverse edges render dashed in a
/// distinguishing color.
pub fn to_visual_edges(edges: &[GraphEdge]) -> Vec<VisualEdge> {
    edges
        .iter()
        .map(|edge| VisualEdge {
            id: edge.id.clone(),
            from: edge.from.clone(),
            to: edge.to.clone(),
            label: edge.label.clone(),
            arrows: "to",
            dashes: edge.is_reverse,
            color: VisualEdgeColor {
                color: if edge.is_reverse {
                    REVERSE_EDGE_COLOR
                } else {
                    FORWARD_EDGE_COLOR
                },
            },
        })
        .collect()
}
