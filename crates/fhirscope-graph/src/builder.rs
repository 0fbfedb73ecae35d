//! Reference graph construction.
//!
//! Grows a bounded-depth graph of FHIR resources from a root reference by
//! alternating extraction and fetching. Each recursion level resolves its
//! newly discovered references as one concurrent wave, joins the whole wave,
//! then recurses into the children, so graph state is only ever touched
//! between waves. Fetch failures become error nodes instead of aborting the
//! build; no public operation here returns an error.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;

use futures_util::future::join_all;
use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use fhirscope_client::ResourceFetcher;
use fhirscope_core::extract::extract_references;
use fhirscope_core::reference::parse_reference;

use crate::label::derive_label;
use crate::style::{ERROR_STYLE, style_for};
use crate::types::{GraphEdge, GraphNode, GraphResult, REVERSE_DEPTH};

const ERROR_NODE_MESSAGE: &str = "Resource not found or access denied";

/// How many matches a reverse search requests per configured referrer type.
const DEFAULT_REVERSE_LIMIT: u32 = 10;

type NodeMap = IndexMap<String, GraphNode>;
type EdgeMap = IndexMap<String, GraphEdge>;

/// Builds and incrementally expands reference graphs.
///
/// The fetched-resource cache is owned by the caller and threaded through
/// every operation, so a UI can keep growing one graph across interactions
/// without re-fetching. Concurrent build/expand calls against the same cache
/// are not supported; callers serialize operations.
pub struct GraphBuilder {
    fetcher: ResourceFetcher,
    reverse_limit: u32,
}

impl GraphBuilder {
    pub fn new(fetcher: ResourceFetcher) -> Self {
        Self {
            fetcher,
            reverse_limit: DEFAULT_REVERSE_LIMIT,
        }
    }

    /// Overrides how many resources each reverse-search pair may return.
    pub fn with_reverse_limit(mut self, limit: u32) -> Self {
        self.reverse_limit = limit;
        self
    }

    /// Builds a graph from `root_reference` up to `max_depth` forward levels.
    ///
    /// An unparseable root or a root that cannot be fetched yields an empty
    /// result: there is nothing to show without a root, and unlike a broken
    /// reference deeper in the traversal it gets no error node.
    ///
    /// With `include_reverse`, one level of reverse-reference lookup runs
    /// across all nodes after forward expansion completes.
    pub async fn build_graph(
        &self,
        root_reference: &str,
        max_depth: i32,
        cache: &mut HashMap<String, Value>,
        include_reverse: bool,
    ) -> GraphResult {
        let Ok(root) = parse_reference(root_reference) else {
            debug!(root_reference, "root reference not parseable, returning empty graph");
            return GraphResult::default();
        };
        let root_key = root.canonical_key();

        let Some(resource) = self.fetcher.fetch_by_reference(&root_key).await else {
            debug!(%root_key, "root resource absent, returning empty graph");
            return GraphResult::default();
        };

        let mut nodes = NodeMap::new();
        let mut edges = EdgeMap::new();
        let mut pending = HashSet::new();

        let mut root_node = resolved_node(&root_key, &resource, 0, true);
        root_node.is_root = true;
        nodes.insert(root_key.clone(), root_node);
        cache.insert(root_key.clone(), resource.clone());

        self.expand(&resource, &root_key, 0, max_depth, &mut nodes, &mut edges, cache, &mut pending)
            .await;

        if include_reverse {
            self.add_reverse_references(&mut nodes, &mut edges, cache).await;
        }

        result(nodes, edges, cache)
    }

    /// Expands one collapsed node by `additional_depth` forward levels.
    ///
    /// Returns the inputs unchanged when the node does not exist, is already
    /// expanded, is an error node, or has no cached resource body.
    pub async fn expand_node(
        &self,
        node_id: &str,
        nodes: Vec<GraphNode>,
        edges: Vec<GraphEdge>,
        cache: &mut HashMap<String, Value>,
        additional_depth: i32,
    ) -> GraphResult {
        let expandable = nodes
            .iter()
            .find(|node| node.id == node_id)
            .is_some_and(|node| !node.expanded && !node.error);
        let resource = cache.get(node_id).cloned();
        let (Some(resource), true) = (resource, expandable) else {
            return GraphResult {
                nodes,
                edges,
                fetched_resources: cache.clone(),
            };
        };

        let mut node_map: NodeMap = nodes.into_iter().map(|n| (n.id.clone(), n)).collect();
        let mut edge_map: EdgeMap = edges.into_iter().map(|e| (e.id.clone(), e)).collect();
        let mut pending = HashSet::new();

        let depth = node_map[node_id].depth;
        node_map[node_id].expanded = true;

        self.expand(
            &resource,
            node_id,
            depth,
            depth + additional_depth,
            &mut node_map,
            &mut edge_map,
            cache,
            &mut pending,
        )
        .await;

        result(node_map, edge_map, cache)
    }

    /// One level of reverse-reference lookup across every node in the graph.
    ///
    /// The node list is snapshotted up front; nodes added by this pass are
    /// not themselves reverse-augmented. Re-running against the same graph is
    /// idempotent because reverse edge ids collide and are skipped.
    async fn add_reverse_references(
        &self,
        nodes: &mut NodeMap,
        edges: &mut EdgeMap,
        cache: &mut HashMap<String, Value>,
    ) {
        let targets: Vec<String> = nodes.keys().cloned().collect();
        let lookups = join_all(targets.iter().map(|target| async move {
            (
                target.clone(),
                self.fetcher.search_reverse(target, self.reverse_limit).await,
            )
        }))
        .await;

        for (target_key, matches) in lookups {
            for found in matches {
                for resource in found.resources {
                    let Some(id) = resource.get("id").and_then(Value::as_str) else {
                        continue;
                    };
                    let resource_type = resource
                        .get("resourceType")
                        .and_then(Value::as_str)
                        .unwrap_or(&found.resource_type);
                    let key = format!("{resource_type}/{id}");

                    if !nodes.contains_key(&key) {
                        nodes.insert(
                            key.clone(),
                            resolved_node(&key, &resource, REVERSE_DEPTH, false),
                        );
                        cache.insert(key.clone(), resource.clone());
                    }

                    let edge = GraphEdge::reverse(&key, &target_key, &found.search_param);
                    if !edges.contains_key(&edge.id) {
                        edges.insert(edge.id.clone(), edge);
                    }
                }
            }
        }
    }

    /// Recursive expansion engine: extract, fetch one wave concurrently,
    /// fold the results in, recurse into the new children.
    #[allow(clippy::too_many_arguments)]
    fn expand<'a>(
        &'a self,
        resource: &'a Value,
        resource_key: &'a str,
        current_depth: i32,
        max_depth: i32,
        nodes: &'a mut NodeMap,
        edges: &'a mut EdgeMap,
        cache: &'a mut HashMap<String, Value>,
        pending: &'a mut HashSet<String>,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(async move {
            // strict depth bound: a node at max_depth is never expanded
            if current_depth >= max_depth {
                return;
            }

            let references = extract_references(resource);
            debug!(
                resource_key,
                current_depth,
                count = references.len(),
                "expanding outbound references"
            );

            // Keys already cached or in flight are not fetched again. A
            // cached body with no node in this build (the cache outlived an
            // earlier build) is revived as a node below; in-flight keys
            // still get an edge.
            let mut wave: Vec<String> = Vec::new();
            let mut revived: Vec<(String, Value)> = Vec::new();
            for info in &references {
                if pending.contains(&info.reference) {
                    continue;
                }
                if let Some(body) = cache.get(&info.reference) {
                    if !nodes.contains_key(&info.reference)
                        && revived.iter().all(|(key, _)| key != &info.reference)
                    {
                        revived.push((info.reference.clone(), body.clone()));
                    }
                    continue;
                }
                pending.insert(info.reference.clone());
                wave.push(info.reference.clone());
            }

            // Fan out the whole wave, join before touching graph state.
            let fetched = join_all(wave.iter().map(|key| async move {
                (key.clone(), self.fetcher.fetch_by_reference(key).await)
            }))
            .await;

            let child_depth = current_depth + 1;
            let mut children: Vec<(String, Value)> = Vec::new();

            for (key, body) in revived {
                nodes.insert(
                    key.clone(),
                    resolved_node(&key, &body, child_depth, child_depth < max_depth),
                );
                if child_depth < max_depth {
                    children.push((key, body));
                }
            }

            for (key, outcome) in fetched {
                pending.remove(&key);
                match outcome {
                    Some(resource) => {
                        if !nodes.contains_key(&key) {
                            nodes.insert(
                                key.clone(),
                                resolved_node(&key, &resource, child_depth, child_depth < max_depth),
                            );
                            if child_depth < max_depth {
                                children.push((key.clone(), resource.clone()));
                            }
                        }
                        cache.insert(key, resource);
                    }
                    None => {
                        if !nodes.contains_key(&key) {
                            nodes.insert(key.clone(), error_node(&key, child_depth));
                        }
                    }
                }
            }

            // Edges are recorded for every discovered reference, resolved or
            // not, so a broken reference still shows up in the graph. The
            // from->to id collapses repeat references between one pair.
            for info in &references {
                let edge = GraphEdge::forward(
                    resource_key,
                    &info.reference,
                    &info.property_name,
                    &info.property_path,
                );
                edges.entry(edge.id.clone()).or_insert(edge);
            }

            for (key, resource) in &children {
                self.expand(resource, key, child_depth, max_depth, nodes, edges, cache, pending)
                    .await;
            }
        })
    }
}

fn resolved_node(key: &str, resource: &Value, depth: i32, expanded: bool) -> GraphNode {
    let (resource_type, resource_id) = split_key(key);
    GraphNode {
        id: key.to_string(),
        label: derive_label(resource, &resource_type, &resource_id),
        style: style_for(&resource_type),
        resource_type,
        resource_id,
        depth,
        is_root: false,
        expanded,
        resource: Some(resource.clone()),
        error: false,
        error_message: None,
    }
}

fn error_node(key: &str, depth: i32) -> GraphNode {
    let (resource_type, resource_id) = split_key(key);
    GraphNode {
        id: key.to_string(),
        label: key.to_string(),
        style: ERROR_STYLE,
        resource_type,
        resource_id,
        depth,
        is_root: false,
        expanded: false,
        resource: None,
        error: true,
        error_message: Some(ERROR_NODE_MESSAGE.to_string()),
    }
}

fn split_key(key: &str) -> (String, String) {
    match key.split_once('/') {
        Some((resource_type, id)) => (resource_type.to_string(), id.to_string()),
        None => (key.to_string(), String::new()),
    }
}

fn result(nodes: NodeMap, edges: EdgeMap, cache: &HashMap<String, Value>) -> GraphResult {
    GraphResult {
        nodes: nodes.into_values().collect(),
        edges: edges.into_values().collect(),
        fetched_resources: cache.clone(),
    }
}
