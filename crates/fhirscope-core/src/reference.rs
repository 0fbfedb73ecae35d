//! FHIR reference string parsing.
//!
//! Decodes reference strings into their component parts (resource type and ID).
//!
//! # Reference Formats
//!
//! FHIR references can appear in several formats:
//! - Relative: `Patient/123` (optionally with a leading slash)
//! - Absolute URL: `http://example.org/fhir/Patient/123`
//! - Contained: `#contained-id` (cannot be resolved externally)
//! - URN: `urn:uuid:xxx` or `urn:oid:xxx` (cannot be resolved externally)
//!
//! # Example
//!
//! ```
//! use fhirscope_core::reference::parse_reference;
//!
//! let reference = parse_reference("Patient/123").unwrap();
//! assert_eq!(reference.resource_type, "Patient");
//! assert_eq!(reference.id, "123");
//! assert_eq!(reference.canonical_key(), "Patient/123");
//! ```

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static RELATIVE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/?([A-Z][A-Za-z]*)/([A-Za-z0-9.\-]+)$").expect("Invalid relative reference regex")
});

static ABSOLUTE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://[^\s]+/([A-Z][A-Za-z]*)/([A-Za-z0-9.\-]+)$")
        .expect("Invalid absolute reference regex")
});

/// A successfully parsed FHIR reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParsedReference {
    /// The resource type (e.g., "Patient", "Observation")
    pub resource_type: String,
    /// The resource ID
    pub id: String,
}

impl ParsedReference {
    /// Creates a new ParsedReference.
    pub fn new(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }

    /// Returns the canonical `Type/id` key identifying this resource in a graph.
    pub fn canonical_key(&self) -> String {
        format!("{}/{}", self.resource_type, self.id)
    }
}

impl fmt::Display for ParsedReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.resource_type, self.id)
    }
}

/// Represents a reference that cannot be resolved against a server.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnresolvableReference {
    /// A contained reference (starts with `#`)
    #[error("contained reference: #{0}")]
    Contained(String),
    /// A URN reference (`urn:uuid:xxx` or `urn:oid:xxx`)
    #[error("URN reference: {0}")]
    Urn(String),
    /// A malformed or unrecognized reference
    #[error("invalid reference: {0}")]
    Invalid(String),
}

/// Parse a FHIR reference string into its components.
///
/// Accepts relative references (`Patient/123`, `/Patient/123`) and absolute
/// `http`/`https` URLs whose path ends in `Type/id`. Contained references and
/// URNs are intentionally unresolvable and come back as errors, never panics.
/// Parsing is deterministic: any input yields exactly one result.
///
/// # Examples
///
/// ```
/// use fhirscope_core::reference::{parse_reference, UnresolvableReference};
///
/// let r = parse_reference("http://example.org/fhir/Patient/123").unwrap();
/// assert_eq!(r.resource_type, "Patient");
/// assert_eq!(r.id, "123");
///
/// let err = parse_reference("#contained").unwrap_err();
/// assert!(matches!(err, UnresolvableReference::Contained(_)));
/// ```
pub fn parse_reference(reference: &str) -> Result<ParsedReference, UnresolvableReference> {
    let reference = reference.trim();
    if reference.is_empty() {
        return Err(UnresolvableReference::Invalid(
            "empty reference".to_string(),
        ));
    }

    // Contained resources (#id) live inside their parent and have no server address
    if let Some(contained_id) = reference.strip_prefix('#') {
        return Err(UnresolvableReference::Contained(contained_id.to_string()));
    }

    // URN references (urn:uuid:xxx, urn:oid:xxx)
    if reference.starts_with("urn:") {
        return Err(UnresolvableReference::Urn(reference.to_string()));
    }

    if let Some(captures) = RELATIVE_REGEX.captures(reference) {
        return Ok(ParsedReference::new(&captures[1], &captures[2]));
    }

    if let Some(captures) = ABSOLUTE_REGEX.captures(reference) {
        return Ok(ParsedReference::new(&captures[1], &captures[2]));
    }

    Err(UnresolvableReference::Invalid(reference.to_string()))
}

/// Check if a reference string can be resolved into a `Type/id` pair.
///
/// Returns `true` for relative references and absolute URLs ending in `Type/id`.
/// Returns `false` for contained references, URNs, and malformed strings.
pub fn is_resolvable(reference: &str) -> bool {
    parse_reference(reference).is_ok()
}
