//! Node label derivation.
//!
//! FHIR resource types carry their "identifying" content under different
//! fields. Rather than switching on the type, the label is derived by an
//! ordered list of shape probes, first match wins, with a generic `Type/id`
//! fallback for shapes none of the probes recognize.

use serde_json::Value;

type Probe = fn(&Value) -> Option<String>;

const PROBES: &[Probe] = &[
    human_name,
    string_name,
    code_label,
    encounter_class,
    device_name,
];

/// Derives a human-readable display string for a fetched resource.
pub fn derive_label(resource: &Value, resource_type: &str, id: &str) -> String {
    PROBES
        .iter()
        .find_map(|probe| probe(resource))
        .unwrap_or_else(|| {
            let id = if id.is_empty() { "unknown" } else { id };
            format!("{resource_type}/{id}")
        })
}

/// `name[0]` as a HumanName: given names + family, or its `text`.
fn human_name(resource: &Value) -> Option<String> {
    let name = resource.get("name")?.as_array()?.first()?;
    let family = name.get("family").and_then(Value::as_str);
    let given: Vec<&str> = name
        .get("given")
        .and_then(Value::as_array)
        .map(|parts| parts.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    if family.is_some() || !given.is_empty() {
        let mut parts = given;
        if let Some(family) = family {
            parts.push(family);
        }
        return Some(parts.join(" "));
    }
    name.get("text").and_then(Value::as_str).map(str::to_string)
}

/// `name` as a plain string (Organization, Location, ...).
fn string_name(resource: &Value) -> Option<String> {
    resource.get("name")?.as_str().map(str::to_string)
}

/// `code.text` or the first coding's display (Observation, Condition, ...).
fn code_label(resource: &Value) -> Option<String> {
    let code = resource.get("code")?;
    if let Some(text) = code.get("text").and_then(Value::as_str) {
        return Some(text.to_string());
    }
    code.get("coding")?
        .as_array()?
        .first()?
        .get("display")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Encounter `class` display or code.
fn encounter_class(resource: &Value) -> Option<String> {
    let class = resource.get("class")?;
    class
        .get("display")
        .or_else(|| class.get("code"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// `deviceName[0].name`.
fn device_name(resource: &Value) -> Option<String> {
    resource
        .get("deviceName")?
        .as_array()?
        .first()?
        .get("name")
        .and_then(Value::as_str)
        .map(str::to_string)
}
