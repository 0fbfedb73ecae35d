//! Per-resource-type node styling.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Presentation attributes of a graph node, derived from its resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeStyle {
    pub color: &'static str,
    pub border: &'static str,
    pub font_color: &'static str,
}

const fn style(color: &'static str, border: &'static str, font_color: &'static str) -> NodeStyle {
    NodeStyle {
        color,
        border,
        font_color,
    }
}

/// Neutral gray for resource types without an entry of their own.
pub const DEFAULT_STYLE: NodeStyle = style("#eceff1", "#90a4ae", "#37474f");

/// Fixed styling for nodes whose resource could not be fetched.
pub const ERROR_STYLE: NodeStyle = style("#ececec", "#9e9e9e", "#616161");

static STYLES: LazyLock<HashMap<&'static str, NodeStyle>> = LazyLock::new(|| {
    HashMap::from([
        ("Patient", style("#c8e6c9", "#4caf50", "#1b5e20")),
        ("Practitioner", style("#ffe0b2", "#ff9800", "#e65100")),
        ("PractitionerRole", style("#ffecb3", "#ffc107", "#ff6f00")),
        ("Organization", style("#d1c4e9", "#673ab7", "#311b92")),
        ("Observation", style("#bbdefb", "#2196f3", "#0d47a1")),
        ("Condition", style("#f8bbd0", "#e91e63", "#880e4f")),
        ("Encounter", style("#ffccbc", "#ff5722", "#bf360c")),
        ("Procedure", style("#b2dfdb", "#009688", "#004d40")),
        ("MedicationRequest", style("#dcedc8", "#8bc34a", "#33691e")),
        ("Medication", style("#f0f4c3", "#cddc39", "#827717")),
        ("AllergyIntolerance", style("#ffcdd2", "#f44336", "#b71c1c")),
        ("DiagnosticReport", style("#b3e5fc", "#03a9f4", "#01579b")),
        ("Immunization", style("#c5cae9", "#3f51b5", "#1a237e")),
        ("Device", style("#cfd8dc", "#607d8b", "#263238")),
        ("Location", style("#d7ccc8", "#795548", "#3e2723")),
        ("CarePlan", style("#e1bee7", "#9c27b0", "#4a148c")),
        ("DocumentReference", style("#fff9c4", "#fbc02d", "#f57f17")),
    ])
});

/// Looks up the style for a resource type, falling back to neutral gray.
pub fn style_for(resource_type: &str) -> NodeStyle {
    STYLES.get(resource_type).copied().unwrap_or(DEFAULT_STYLE)
}
