pub mod builder;
pub mod label;
pub mod style;
pub mod types;
pub mod visual;

pub use builder::GraphBuilder;
pub use label::derive_label;
pub use style::{NodeStyle, style_for};
pub use types::{GraphEdge, GraphNode, GraphResult, REVERSE_DEPTH};
pub use visual::{VisualEdge, VisualNode, to_visual_edges, to_visual_nodes};

// Re-exported so a consumer of the graph layer gets the pure utilities
// without depending on the core crate directly.
pub use fhirscope_core::extract::{ReferenceInfo, extract_references};
pub use fhirscope_core::reference::{ParsedReference, UnresolvableReference, parse_reference};
