//! HTTP-level tests for `FhirClient` against a mock FHIR server.

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fhirscope_client::{FhirClient, FhirClientConfig, ResourceSource, SourceError};

async fn client_for(server: &MockServer) -> FhirClient {
    FhirClient::new(FhirClientConfig::new(server.uri())).unwrap()
}

#[tokio::test]
async fn read_returns_resource_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/Patient/123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resourceType": "Patient",
            "id": "123"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let resource = client.read("Patient", "123").await.unwrap();
    assert_eq!(resource["resourceType"], "Patient");
    assert_eq!(resource["id"], "123");
}

#[tokio::test]
async fn read_maps_404_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/Patient/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client.read("Patient", "missing").await.unwrap_err();
    assert!(matches!(err, SourceError::NotFound { .. }));
}

#[tokio::test]
async fn read_maps_403_to_access_denied() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/Patient/secret"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client.read("Patient", "secret").await.unwrap_err();
    assert!(matches!(err, SourceError::AccessDenied { .. }));
}

#[tokio::test]
async fn search_sends_query_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/Observation"))
        .and(query_param("subject", "Patient/123"))
        .and(query_param("_count", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resourceType": "Bundle",
            "type": "searchset",
            "entry": [
                { "resource": { "resourceType": "Observation", "id": "obs-1" } }
            ]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let bundle = client
        .search(
            "Observation",
            &[
                ("subject".to_string(), "Patient/123".to_string()),
                ("_count".to_string(), "10".to_string()),
            ],
        )
        .await
        .unwrap();
    assert_eq!(bundle["entry"][0]["resource"]["id"], "obs-1");
}

#[tokio::test]
async fn search_failure_surfaces_operation_outcome_diagnostics() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/Observation"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "resourceType": "OperationOutcome",
            "issue": [
                { "severity": "error", "diagnostics": "Unknown search parameter 'bogus'" }
            ]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client
        .search("Observation", &[("bogus".to_string(), "x".to_string())])
        .await
        .unwrap_err();
    match err {
        SourceError::Status { status, message } => {
            assert_eq!(status, 400);
            assert!(message.contains("Unknown search parameter"));
        }
        other => panic!("expected Status error, got {other:?}"),
    }
}
