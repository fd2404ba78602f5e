//! Graphs whose nodes can be dereferenced on demand.
//!
//! A [`LiveGraph`] wraps a [`Graph`] parsed from a response and keeps a weak
//! link to the transport it came from. When a caller needs something the
//! graph does not know about a node yet, [`LiveGraph::ensure_loaded`] fetches
//! the node's identifier and merges what the server says about it.
//!
//! # Loading protocol
//!
//! Each node is dereferenced at most once. The node's loaded flag is set
//! under the graph's write lock *before* the fetch is issued, so a failed or
//! cancelled fetch still counts as the attempt. Concurrent callers for the
//! same node wait on a per-node [`OnceCell`] and observe the merged result
//! once the first caller finishes. Failures are logged and absorbed: a node
//! that could not be loaded simply keeps its properties unresolved.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use hydralink::vocab::hydra;
use hydralink::{
    iri, resolve_operations, ApiDocumentation, Args, DuplicatePolicy, Graph, NodeId, Operation,
    Value,
};
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::transport::{fetch_document, Transport};

/// A graph bound to the transport that can load more of it.
pub struct LiveGraph {
    graph: RwLock<Graph>,
    loads: Mutex<HashMap<NodeId, Arc<OnceCell<()>>>>,
    transport: Weak<dyn Transport>,
    api_doc: Option<Arc<ApiDocumentation>>,
    policy: DuplicatePolicy,
}

impl LiveGraph {
    /// Bind `graph` to `transport`. The transport is held weakly: once the
    /// owning client is dropped, loading becomes a no-op.
    pub fn new(
        graph: Graph,
        transport: Weak<dyn Transport>,
        api_doc: Option<Arc<ApiDocumentation>>,
        policy: DuplicatePolicy,
    ) -> Self {
        Self {
            graph: RwLock::new(graph),
            loads: Mutex::new(HashMap::new()),
            transport,
            api_doc,
            policy,
        }
    }

    /// A graph that never loads anything.
    pub fn detached(graph: Graph) -> Self {
        let transport: Weak<dyn Transport> = Weak::<crate::transport::HttpTransport>::new();
        Self::new(graph, transport, None, DuplicatePolicy::Keep)
    }

    /// Read access to the underlying graph.
    ///
    /// Do not hold the guard across an `.await`.
    pub fn read(&self) -> RwLockReadGuard<'_, Graph> {
        self.graph.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Graph> {
        self.graph.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// A copy of the graph as it stands.
    pub fn snapshot(&self) -> Graph {
        self.read().clone()
    }

    /// Look up a node by identifier, resolved against the graph's base.
    pub fn node_id(&self, id: &str) -> Option<NodeId> {
        let graph = self.read();
        graph.get_node(&graph.resolve_iri(id))
    }

    /// The single node of type `type_iri`, e.g. a response's primary node.
    pub fn node_by_type(&self, type_iri: &str) -> Option<NodeId> {
        self.read().node_by_type(type_iri)
    }

    /// The node's own properties plus its identifier, as command arguments.
    pub fn args_for(&self, node: NodeId) -> Args {
        Args::from_node(self.read().node(node))
    }

    /// Dereference `node` unless that has already been attempted.
    pub async fn ensure_loaded(&self, node: NodeId) {
        let Some(transport) = self.transport.upgrade() else {
            return;
        };
        let cell = {
            let mut loads = self.loads.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(loads.entry(node).or_default())
        };
        cell.get_or_init(|| self.load(node, transport)).await;
    }

    async fn load(&self, node: NodeId, transport: Arc<dyn Transport>) {
        let id = {
            let mut graph = self.write();
            if !graph.begin_load(node) {
                return;
            }
            graph.node(node).id().to_string()
        };
        if iri::is_blank(&id) {
            return;
        }

        let url = iri::without_fragment(&id);
        debug!("live: loading {id}");
        let fetched = match fetch_document(transport.as_ref(), url).await {
            Ok(doc) => doc.into_graph(),
            Err(e) => {
                warn!("live: failed to load {id}: {e}");
                return;
            }
        };
        match fetched.get_node(&id) {
            Some(source) => self.write().merge_node_from(node, &fetched, source),
            None => warn!("live: {url} says nothing about {id}"),
        }
    }

    /// Values of `property` on `node`.
    ///
    /// When the property is missing and `allow_load` is set, the node is
    /// loaded (once) and the lookup retried. Never fails: an unloadable node
    /// yields `None`.
    pub async fn property(&self, node: NodeId, property: &str, allow_load: bool) -> Option<Vec<Value>> {
        if let Some(values) = self.read().node(node).property(property) {
            return Some(values.to_vec());
        }
        if !allow_load {
            return None;
        }
        self.ensure_loaded(node).await;
        self.read().node(node).property(property).map(<[Value]>::to_vec)
    }

    /// Declared types of `node`, loading it first when it declares none and
    /// `allow_load` is set.
    pub async fn types(&self, node: NodeId, allow_load: bool) -> Vec<String> {
        let types = self.read().node(node).types().to_vec();
        if !types.is_empty() || !allow_load {
            return types;
        }
        self.ensure_loaded(node).await;
        self.read().node(node).types().to_vec()
    }

    /// Operations applicable to `node`: direct, then by type, then by the
    /// properties pointing at it.
    ///
    /// With `load_nodes`, the node, its type nodes, and the property nodes
    /// pointing at it are dereferenced first when they carry no operations.
    /// Documentation nodes are never loaded.
    pub async fn operations(&self, node: NodeId, load_nodes: bool) -> Vec<Operation> {
        if load_nodes {
            self.load_if_lacking_operations(node).await;
            let related: Vec<NodeId> = {
                let graph = self.read();
                let n = graph.node(node);
                n.types()
                    .iter()
                    .chain(n.reverse_properties().keys())
                    .filter_map(|iri| graph.get_node(iri))
                    .collect()
            };
            for related in related {
                self.load_if_lacking_operations(related).await;
            }
        }

        let graph = self.read();
        resolve_operations(&graph, node, self.api_doc.as_deref(), self.policy)
    }

    /// Operations applicable to `node` that declare `type_iri`, using only
    /// what is already loaded.
    pub async fn operations_by_type(&self, node: NodeId, type_iri: &str) -> Vec<Operation> {
        hydralink::operations_by_type(self.operations(node, false).await, type_iri)
    }

    async fn load_if_lacking_operations(&self, node: NodeId) {
        let lacking = {
            let graph = self.read();
            let n = graph.node(node);
            hydra::OPERATION_PROPERTIES
                .iter()
                .all(|p| n.property(p).is_none())
        };
        if lacking {
            self.ensure_loaded(node).await;
        }
    }
}

impl std::fmt::Debug for LiveGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveGraph")
            .field("nodes", &self.read().len())
            .field("bound", &(self.transport.strong_count() > 0))
            .finish()
    }
}

// --- tests -------------------------------------------------------------------
