//! The resource access contract consumed by the graph layer.

use async_trait::async_trait;
use serde_json::Value;

/// Errors surfaced by a [`ResourceSource`] implementation.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Resource not found: {resource_type}/{id}")]
    NotFound { resource_type: String, id: String },

    #[error("Access denied: {resource_type}/{id}")]
    AccessDenied { resource_type: String, id: String },

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid base URL: {0}")]
    BaseUrl(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SourceError {
    /// Create a new NotFound error.
    pub fn not_found(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }

    /// Create a new AccessDenied error.
    pub fn access_denied(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::AccessDenied {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }
}

/// A capability that can read and search FHIR resources.
///
/// This is the only interface the graph builder sees. Whether calls route
/// through a plain channel or a client-certificate-authenticated one is an
/// implementation concern of the source.
///
/// # Example
///
/// ```ignore
/// use fhirscope_client::{ResourceSource, SourceError};
///
/// async fn load_patient(source: &dyn ResourceSource, id: &str) -> Result<serde_json::Value, SourceError> {
///     source.read("Patient", id).await
/// }
/// ```
#[async_trait]
pub trait ResourceSource: Send + Sync {
    /// Reads a resource by type and ID.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::NotFound` or `SourceError::AccessDenied` for the
    /// corresponding server responses, and a transport-level error otherwise.
    async fn read(&self, resource_type: &str, id: &str) -> Result<Value, SourceError>;

    /// Searches for resources of a given type, returning the result bundle.
    ///
    /// # Errors
    ///
    /// Returns an error for rejected queries (including unsupported search
    /// parameters) and for transport failures.
    async fn search(
        &self,
        resource_type: &str,
        params: &[(String, String)],
    ) -> Result<Value, SourceError>;
}
