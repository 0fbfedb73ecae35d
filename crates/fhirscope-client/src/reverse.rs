//! Reverse-reference lookup configuration.
//!
//! Maps a resource type to the (resource type, search parameter) pairs known
//! to commonly reference it. This is declarative seed data, not an exhaustive
//! catalog: deployments covering more resource types extend it via a TOML
//! config rather than code changes.

use std::collections::HashMap;

use serde::Deserialize;

/// One way a resource type can be referenced: which type references it,
/// and under which search parameter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReverseSearchParam {
    /// Resource type that holds the forward reference
    pub resource_type: String,
    /// Search parameter addressing that reference
    pub search_param: String,
}

impl ReverseSearchParam {
    pub fn new(resource_type: impl Into<String>, search_param: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            search_param: search_param.into(),
        }
    }
}

/// Immutable lookup from a target resource type to its known referrers.
#[derive(Debug, Clone)]
pub struct ReverseReferenceRegistry {
    by_target: HashMap<String, Vec<ReverseSearchParam>>,
}

impl ReverseReferenceRegistry {
    /// Creates an empty registry. Reverse lookups will find nothing.
    pub fn empty() -> Self {
        Self {
            by_target: HashMap::new(),
        }
    }

    /// Builds a registry from explicit entries.
    pub fn from_entries(
        entries: impl IntoIterator<Item = (String, Vec<ReverseSearchParam>)>,
    ) -> Self {
        Self {
            by_target: entries.into_iter().collect(),
        }
    }

    /// Loads a registry from a TOML document of the form:
    ///
    /// ```toml
    /// [[Patient]]
    /// resource_type = "Observation"
    /// search_param = "subject"
    ///
    /// [[Patient]]
    /// resource_type = "Condition"
    /// search_param = "subject"
    /// ```
    pub fn from_toml_str(toml_str: &str) -> Result<Self, toml::de::Error> {
        let by_target: HashMap<String, Vec<ReverseSearchParam>> = toml::from_str(toml_str)?;
        Ok(Self { by_target })
    }

    /// Returns the configured referrer pairs for a target type, or an empty
    /// slice when the type has no reverse-reference configuration.
    pub fn get(&self, resource_type: &str) -> &[ReverseSearchParam] {
        self.by_target
            .get(resource_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl Default for ReverseReferenceRegistry {
    /// Seeds the registry with the common R4 referrer pairs.
    fn default() -> Self {
        let pair = ReverseSearchParam::new;
        Self::from_entries([
            (
                "Patient".to_string(),
                vec![
                    pair("Observation", "subject"),
                    pair("Condition", "subject"),
                    pair("AllergyIntolerance", "patient"),
                    pair("MedicationRequest", "subject"),
                    pair("Encounter", "subject"),
                    pair("Procedure", "subject"),
                    pair("DiagnosticReport", "subject"),
                    pair("Immunization", "patient"),
                    pair("CarePlan", "subject"),
                    pair("DocumentReference", "subject"),
                ],
            ),
            (
                "Practitioner".to_string(),
                vec![
                    pair("Observation", "performer"),
                    pair("MedicationRequest", "requester"),
                    pair("Encounter", "participant"),
                    pair("Procedure", "performer"),
                    pair("PractitionerRole", "practitioner"),
                ],
            ),
            (
                "Organization".to_string(),
                vec![
                    pair("Patient", "organization"),
                    pair("Practitioner", "organization"),
                    pair("PractitionerRole", "organization"),
                    pair("Encounter", "service-provider"),
                    pair("Location", "organization"),
                ],
            ),
            (
                "Encounter".to_string(),
                vec![
                    pair("Observation", "encounter"),
                    pair("Condition", "encounter"),
                    pair("Procedure", "encounter"),
                    pair("MedicationRequest", "encounter"),
                    pair("DiagnosticReport", "encounter"),
                ],
            ),
            (
                "Medication".to_string(),
                vec![
                    pair("MedicationRequest", "medication"),
                    pair("MedicationAdministration", "medication"),
                    pair("MedicationStatement", "medication"),
                ],
            ),
            (
                "Location".to_string(),
                vec![
                    pair("Encounter", "location"),
                    pair("PractitionerRole", "location"),
                ],
            ),
        ])
    }
}
