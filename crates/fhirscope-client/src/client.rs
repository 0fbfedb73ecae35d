//! HTTP-backed [`ResourceSource`] implementation.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::source::{ResourceSource, SourceError};

/// Configuration for a [`FhirClient`].
#[derive(Debug, Clone, Default)]
pub struct FhirClientConfig {
    /// Base URL of the FHIR endpoint, e.g. `https://fhir.example.org/baseR4`
    pub base_url: String,
    /// Optional PEM-encoded client certificate + key for mutual TLS.
    /// When set, every request authenticates with this identity.
    pub client_identity_pem: Option<Vec<u8>>,
}

impl FhirClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client_identity_pem: None,
        }
    }

    pub fn with_client_identity(mut self, pem: Vec<u8>) -> Self {
        self.client_identity_pem = Some(pem);
        self
    }
}

/// A FHIR REST client speaking `application/fhir+json`.
pub struct FhirClient {
    http: reqwest::Client,
    base_url: String,
}

impl FhirClient {
    /// Builds a client from configuration.
    ///
    /// # Errors
    ///
    /// Fails when the base URL does not parse or the client identity PEM is
    /// rejected by the TLS backend.
    pub fn new(config: FhirClientConfig) -> Result<Self, SourceError> {
        url::Url::parse(&config.base_url)?;
        let base_url = config.base_url.trim_end_matches('/').to_string();

        let mut builder = reqwest::Client::builder();
        if let Some(pem) = &config.client_identity_pem {
            builder = builder.identity(reqwest::Identity::from_pem(pem)?);
        }

        Ok(Self {
            http: builder.build()?,
            base_url,
        })
    }

    fn fhir_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn request(&self, url: &str) -> reqwest::RequestBuilder {
        self.http
            .get(url)
            .header("Accept", "application/fhir+json")
    }
}

#[async_trait]
impl ResourceSource for FhirClient {
    async fn read(&self, resource_type: &str, id: &str) -> Result<Value, SourceError> {
        let url = self.fhir_url(&format!("{resource_type}/{id}"));
        debug!(resource_type, id, "reading resource");
        let resp = self.request(&url).send().await?;
        match resp.status().as_u16() {
            404 | 410 => Err(SourceError::not_found(resource_type, id)),
            401 | 403 => Err(SourceError::access_denied(resource_type, id)),
            _ => handle_response(resp).await,
        }
    }

    async fn search(
        &self,
        resource_type: &str,
        params: &[(String, String)],
    ) -> Result<Value, SourceError> {
        let url = self.fhir_url(resource_type);
        debug!(resource_type, ?params, "searching resources");
        let resp = self.request(&url).query(params).send().await?;
        handle_response(resp).await
    }
}

async fn handle_response(resp: reqwest::Response) -> Result<Value, SourceError> {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();

    if !status.is_success() {
        return Err(SourceError::Status {
            status: status.as_u16(),
            message: operation_outcome_message(&body).unwrap_or(body),
        });
    }

    if body.is_empty() {
        return Ok(Value::Null);
    }

    Ok(serde_json::from_str(&body)?)
}

/// Pulls the diagnostics out of an OperationOutcome body, when there is one.
fn operation_outcome_message(body: &str) -> Option<String> {
    let json = serde_json::from_str::<Value>(body).ok()?;
    if json.get("resourceType").and_then(Value::as_str) != Some("OperationOutcome") {
        return None;
    }
    let issues = json.get("issue").and_then(Value::as_array)?;
    let msgs: Vec<&str> = issues
        .iter()
        .filter_map(|i| i.get("diagnostics").and_then(Value::as_str))
        .collect();
    if msgs.is_empty() {
        None
    } else {
        Some(msgs.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_normalized() {
        let client = FhirClient::new(FhirClientConfig::new("http://localhost:8888/fhir/")).unwrap();
        assert_eq!(client.fhir_url("Patient/123"), "http://localhost:8888/fhir/Patient/123");
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let result = FhirClient::new(FhirClientConfig::new("not a url"));
        assert!(matches!(result, Err(SourceError::BaseUrl(_))));
    }

    #[test]
    fn test_operation_outcome_message_extracted() {
        let body = r#"{
            "resourceType": "OperationOutcome",
            "issue": [
                { "severity": "error", "diagnostics": "Unknown search parameter" },
                { "severity": "warning", "diagnostics": "Deprecated endpoint" }
            ]
        }"#;
        assert_eq!(
            operation_outcome_message(body).as_deref(),
            Some("Unknown search parameter; Deprecated endpoint")
        );
    }

    #[test]
    fn test_operation_outcome_message_non_outcome_body() {
        assert_eq!(operation_outcome_message("{\"resourceType\":\"Patient\"}"), None);
        assert_eq!(operation_outcome_message("plain text error"), None);
    }
}
