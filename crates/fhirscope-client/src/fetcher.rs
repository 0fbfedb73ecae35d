//! Failure-agnostic fetch adapter.
//!
//! Converts every fetch or search failure into "resource absent" so the graph
//! layer never needs an error path of its own. A missing resource, a denied
//! read, and a dropped connection all look the same to a traversal: the node
//! simply could not be loaded.

use std::sync::Arc;

use futures_util::future::join_all;
use serde_json::Value;
use tracing::{debug, warn};

use fhirscope_core::reference::parse_reference;

use crate::reverse::ReverseReferenceRegistry;
use crate::source::ResourceSource;

/// Resources found by one configured reverse-search pair.
#[derive(Debug)]
pub struct ReverseMatches {
    /// Resource type that was searched
    pub resource_type: String,
    /// Search parameter the target key was matched against
    pub search_param: String,
    /// Resources whose `search_param` points at the target
    pub resources: Vec<Value>,
}

/// Wraps a [`ResourceSource`] with absence-instead-of-error semantics.
#[derive(Clone)]
pub struct ResourceFetcher {
    source: Arc<dyn ResourceSource>,
    reverse_registry: Arc<ReverseReferenceRegistry>,
}

impl ResourceFetcher {
    pub fn new(source: Arc<dyn ResourceSource>, reverse_registry: ReverseReferenceRegistry) -> Self {
        Self {
            source,
            reverse_registry: Arc::new(reverse_registry),
        }
    }

    /// Fetches the resource behind a canonical `Type/id` key.
    ///
    /// Returns `None` for unparseable keys and for any source failure
    /// (not found, access denied, transport).
    pub async fn fetch_by_reference(&self, key: &str) -> Option<Value> {
        let parsed = match parse_reference(key) {
            Ok(parsed) => parsed,
            Err(err) => {
                debug!(key, %err, "reference not fetchable");
                return None;
            }
        };
        match self.source.read(&parsed.resource_type, &parsed.id).await {
            Ok(resource) => Some(resource),
            Err(err) => {
                debug!(key, %err, "fetch failed, treating as absent");
                None
            }
        }
    }

    /// Finds resources that reference the target key, one search per
    /// configured (resource type, search parameter) pair.
    ///
    /// A pair whose search fails (e.g. the server rejects the parameter)
    /// degrades to zero matches; the other pairs are unaffected. A target
    /// type with no configuration returns an empty list without any I/O.
    pub async fn search_reverse(&self, key: &str, max_per_type: u32) -> Vec<ReverseMatches> {
        let Ok(parsed) = parse_reference(key) else {
            return Vec::new();
        };
        let pairs = self.reverse_registry.get(&parsed.resource_type);
        if pairs.is_empty() {
            return Vec::new();
        }

        let searches = pairs.iter().map(|pair| async move {
            let params = vec![
                (pair.search_param.clone(), key.to_string()),
                ("_count".to_string(), max_per_type.to_string()),
            ];
            let resources = match self.source.search(&pair.resource_type, &params).await {
                Ok(bundle) => bundle_resources(&bundle),
                Err(err) => {
                    warn!(
                        key,
                        resource_type = %pair.resource_type,
                        search_param = %pair.search_param,
                        %err,
                        "reverse search failed, treating as empty"
                    );
                    Vec::new()
                }
            };
            ReverseMatches {
                resource_type: pair.resource_type.clone(),
                search_param: pair.search_param.clone(),
                resources,
            }
        });

        join_all(searches).await
    }
}

/// Unwraps the resources out of a searchset bundle. Malformed bundles yield
/// an empty list.
fn bundle_resources(bundle: &Value) -> Vec<Value> {
    bundle
        .get("entry")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| entry.get("resource"))
                .cloned()
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{ResourceSource, SourceError};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;

    struct MapSource {
        resources: HashMap<String, Value>,
        bundles: HashMap<String, Value>,
    }

    #[async_trait]
    impl ResourceSource for MapSource {
        async fn read(&self, resource_type: &str, id: &str) -> Result<Value, SourceError> {
            self.resources
                .get(&format!("{resource_type}/{id}"))
                .cloned()
                .ok_or_else(|| SourceError::not_found(resource_type, id))
        }

        async fn search(
            &self,
            resource_type: &str,
            params: &[(String, String)],
        ) -> Result<Value, SourceError> {
            let param = &params[0].0;
            self.bundles
                .get(&format!("{resource_type}?{param}"))
                .cloned()
                .ok_or(SourceError::Status {
                    status: 400,
                    message: format!("unsupported search parameter {param}"),
                })
        }
    }

    fn fetcher(source: MapSource, registry: ReverseReferenceRegistry) -> ResourceFetcher {
        ResourceFetcher::new(Arc::new(source), registry)
    }

    #[tokio::test]
    async fn test_fetch_by_reference_success() {
        let patient = json!({ "resourceType": "Patient", "id": "123" });
        let source = MapSource {
            resources: HashMap::from([("Patient/123".to_string(), patient.clone())]),
            bundles: HashMap::new(),
        };
        let fetcher = fetcher(source, ReverseReferenceRegistry::empty());
        assert_eq!(fetcher.fetch_by_reference("Patient/123").await, Some(patient));
    }

    #[tokio::test]
    async fn test_fetch_by_reference_absent_on_error() {
        let source = MapSource {
            resources: HashMap::new(),
            bundles: HashMap::new(),
        };
        let fetcher = fetcher(source, ReverseReferenceRegistry::empty());
        assert_eq!(fetcher.fetch_by_reference("Patient/missing").await, None);
        assert_eq!(fetcher.fetch_by_reference("#contained").await, None);
        assert_eq!(fetcher.fetch_by_reference("urn:uuid:abc").await, None);
    }

    #[tokio::test]
    async fn test_search_reverse_unconfigured_type() {
        let source = MapSource {
            resources: HashMap::new(),
            bundles: HashMap::new(),
        };
        let fetcher = fetcher(source, ReverseReferenceRegistry::empty());
        assert!(fetcher.search_reverse("Patient/123", 10).await.is_empty());
    }

    #[tokio::test]
    async fn test_search_reverse_mixes_hits_and_failures() {
        let bundle = json!({
            "resourceType": "Bundle",
            "entry": [
                { "resource": { "resourceType": "Observation", "id": "obs-1" } },
                { "resource": { "resourceType": "Observation", "id": "obs-2" } }
            ]
        });
        let source = MapSource {
            resources: HashMap::new(),
            bundles: HashMap::from([("Observation?subject".to_string(), bundle)]),
        };
        let registry = ReverseReferenceRegistry::from_entries([(
            "Patient".to_string(),
            vec![
                crate::reverse::ReverseSearchParam::new("Observation", "subject"),
                crate::reverse::ReverseSearchParam::new("Condition", "subject"),
            ],
        )]);
        let fetcher = fetcher(source, registry);

        let matches = fetcher.search_reverse("Patient/123", 10).await;
        assert_eq!(matches.len(), 2);
        let observation = matches.iter().find(|m| m.resource_type == "Observation").unwrap();
        assert_eq!(observation.resources.len(), 2);
        // the Condition search fails server-side and degrades to empty
        let condition = matches.iter().find(|m| m.resource_type == "Condition").unwrap();
        assert!(condition.resources.is_empty());
    }

    #[test]
    fn test_bundle_resources_malformed() {
        assert!(bundle_resources(&json!(null)).is_empty());
        assert!(bundle_resources(&json!({ "resourceType": "Bundle" })).is_empty());
        assert!(bundle_resources(&json!({ "entry": "oops" })).is_empty());
        assert!(bundle_resources(&json!({ "entry": [{ "fullUrl": "x" }] })).is_empty());
    }
}
