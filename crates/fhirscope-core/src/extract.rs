//! Outbound reference extraction from FHIR resource bodies.
//!
//! Walks an arbitrary resource JSON tree and collects every resolvable
//! `reference` field it contains, together with the property path it was
//! found under. Resources are trees at the JSON level, so the walk needs no
//! cycle detection and no depth limit.

use serde_json::Value;

use crate::reference::parse_reference;

/// One outbound reference discovered in a resource body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceInfo {
    /// Canonical `Type/id` key of the referenced resource
    pub reference: String,
    /// Last segment of the property path, used for edge labeling
    pub property_name: String,
    /// Full dotted/indexed path from the resource root
    /// (e.g. `Observation.subject`, `Observation.performer[2]`)
    pub property_path: String,
    /// Sibling `display` value, when the reference element carries one
    pub display: Option<String>,
}

/// Extract every resolvable outbound reference from a resource body.
///
/// Returns an empty list for `null` and non-object input; never panics.
/// Output order follows traversal order. That order is stable for a given
/// input but is an implementation detail, not a contract.
pub fn extract_references(resource: &Value) -> Vec<ReferenceInfo> {
    let mut found = Vec::new();
    let root = resource
        .get("resourceType")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();
    walk(resource, &root, &mut found);
    found
}

fn walk(value: &Value, path: &str, found: &mut Vec<ReferenceInfo>) {
    match value {
        Value::Object(map) => {
            if let Some(reference) = map.get("reference").and_then(Value::as_str)
                && let Ok(parsed) = parse_reference(reference)
            {
                found.push(ReferenceInfo {
                    reference: parsed.canonical_key(),
                    property_name: last_segment(path),
                    property_path: path.to_string(),
                    display: map
                        .get("display")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                });
            }
            for (key, child) in map {
                // `reference` is a terminal string, not a nested structure
                if key == "reference" {
                    continue;
                }
                let child_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                walk(child, &child_path, found);
            }
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                walk(item, &format!("{path}[{index}]"), found);
            }
        }
        _ => {}
    }
}

fn last_segment(path: &str) -> String {
    let segment = path.rsplit('.').next().unwrap_or(path);
    // strip an array index so `performer[2]` labels as `performer`
    match segment.find('[') {
        Some(bracket) => segment[..bracket].to_string(),
        None => segment.to_string(),
    }
}
