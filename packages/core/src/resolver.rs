//! Enumerates the operations applicable to a node.
//!
//! Operations are gathered from five sources and concatenated in a fixed
//! order:
//!
//! 1. attached directly to the node,
//! 2. attached to each of the node's types in the local graph,
//! 3. attached to the same type in the API documentation,
//! 4. attached to each property that points at the node, in the local graph,
//! 5. attached to the same property in the API documentation.
//!
//! Local and documentation lookups are independent: a type known to both
//! contributes the operations of both.

use serde::{Deserialize, Serialize};

use crate::api_doc::ApiDocumentation;
use crate::graph::{Graph, NodeId, Value};
use crate::operation::Operation;
use crate::vocab::hydra;

/// What to do with an operation reachable through more than one source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Report every occurrence, in resolution order.
    #[default]
    Keep,
    /// Report only the first occurrence of each operation identifier.
    Suppress,
}

impl DuplicatePolicy {
    fn apply(self, operations: Vec<Operation>) -> Vec<Operation> {
        match self {
            DuplicatePolicy::Keep => operations,
            DuplicatePolicy::Suppress => {
                let mut seen = std::collections::HashSet::new();
                operations
                    .into_iter()
                    .filter(|op| seen.insert(op.id().to_string()))
                    .collect()
            }
        }
    }
}

/// All operations applicable to `node` of `local`.
///
/// Operations found for a named node are bound to it as their target.
pub fn resolve_operations(
    local: &Graph,
    node: NodeId,
    api_doc: Option<&ApiDocumentation>,
    policy: DuplicatePolicy,
) -> Vec<Operation> {
    let fallback = api_doc.map(ApiDocumentation::graph);
    let n = local.node(node);

    let mut operations = attached_operations(local, n.id(), fallback);
    for type_iri in n.types() {
        operations.extend(operations_for_type(type_iri, local, api_doc));
    }
    for property in n.reverse_properties().keys() {
        operations.extend(operations_for_property(property, local, api_doc));
    }

    let operations = policy.apply(operations);
    if n.is_blank() {
        operations
    } else {
        operations
            .into_iter()
            .map(|op| op.with_target(n.id()))
            .collect()
    }
}

/// Operations attached to `type_iri`: first in `local`, then in the
/// documentation.
pub fn operations_for_type(
    type_iri: &str,
    local: &Graph,
    api_doc: Option<&ApiDocumentation>,
) -> Vec<Operation> {
    two_source_lookup(type_iri, local, api_doc)
}

/// Operations attached to the property `property_iri`: first in `local`,
/// then in the documentation.
pub fn operations_for_property(
    property_iri: &str,
    local: &Graph,
    api_doc: Option<&ApiDocumentation>,
) -> Vec<Operation> {
    two_source_lookup(property_iri, local, api_doc)
}

/// Keep the operations declaring `type_iri` among their types.
pub fn operations_by_type(operations: Vec<Operation>, type_iri: &str) -> Vec<Operation> {
    operations
        .into_iter()
        .filter(|op| op.is_type(type_iri))
        .collect()
}

/// Operations attached to the node `subject` of `graph` through
/// `hydra:operation` or `hydra:supportedOperation`.
///
/// An operation known to `graph` only by reference is read from `fallback`
/// when that graph describes it.
pub fn attached_operations(graph: &Graph, subject: &str, fallback: Option<&Graph>) -> Vec<Operation> {
    let Some(node) = graph.find(subject) else {
        return Vec::new();
    };
    hydra::OPERATION_PROPERTIES
        .iter()
        .filter_map(|p| node.property(p))
        .flatten()
        .filter_map(Value::as_ref_iri)
        .filter_map(|op_iri| describe(graph, op_iri, fallback))
        .collect()
}

fn two_source_lookup(
    subject: &str,
    local: &Graph,
    api_doc: Option<&ApiDocumentation>,
) -> Vec<Operation> {
    let fallback = api_doc.map(ApiDocumentation::graph);
    let mut operations = attached_operations(local, subject, fallback);
    if let Some(doc) = api_doc {
        operations.extend(doc.operations_attached_to(subject));
    }
    operations
}

fn describe(graph: &Graph, op_iri: &str, fallback: Option<&Graph>) -> Option<Operation> {
    let local = graph.get_node(op_iri)?;
    if graph.node(local).is_stub() {
        if let Some(doc) = fallback {
            if let Some(documented) = doc.get_node(op_iri) {
                return Some(Operation::from_node(doc, documented));
            }
        }
    }
    Some(Operation::from_node(graph, local))
}

// --- tests -------------------------------------------------------------------
