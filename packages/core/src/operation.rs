//! Read-only view of a `hydra:Operation` node.

use crate::graph::{Graph, NodeId, Value};
use crate::iri_template::IriTemplate;
use crate::vocab::hydra;

/// A documented status code an operation may return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusCodeDescription {
    pub code: u16,
    pub description: Option<String>,
}

/// Snapshot of an operation node, taken from the graph it was found in.
///
/// Holds no reference into that graph, so operations found in response data
/// and in the API documentation can be mixed freely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    id: String,
    types: Vec<String>,
    method: Option<String>,
    name: Option<String>,
    description: Option<String>,
    expects: Option<String>,
    returns: Option<String>,
    status_codes: Vec<StatusCodeDescription>,
    iri_template: Option<IriTemplate>,
    target: Option<String>,
}

impl Operation {
    pub fn from_node(graph: &Graph, id: NodeId) -> Self {
        let node = graph.node(id);
        let text = |prop: &str| node.first_str(prop).map(str::to_string);
        let reference = |prop: &str| {
            node.first(prop)
                .and_then(|v| v.as_ref_iri().or_else(|| v.as_str()))
                .map(str::to_string)
        };

        let status_codes = node
            .property(hydra::POSSIBLE_STATUS)
            .unwrap_or_default()
            .iter()
            .filter_map(Value::as_ref_iri)
            .filter_map(|id| graph.find(id))
            .filter_map(|status| {
                let code = status.first(hydra::STATUS_CODE)?.lexical().parse().ok()?;
                Some(StatusCodeDescription {
                    code,
                    description: status.first_str(hydra::DESCRIPTION).map(str::to_string),
                })
            })
            .collect();

        let iri_template = node.first(hydra::TEMPLATE).and_then(|v| match v {
            Value::Ref(iri) => graph
                .get_node(iri)
                .and_then(|t| IriTemplate::from_node(graph, t)),
            Value::Literal(lit) => Some(IriTemplate::new(lit.lexical(), Vec::new())),
        });

        Self {
            id: node.id().to_string(),
            types: node.types().to_vec(),
            method: text(hydra::METHOD),
            name: text(hydra::TITLE),
            description: text(hydra::DESCRIPTION),
            expects: reference(hydra::EXPECTS),
            returns: reference(hydra::RETURNS),
            status_codes,
            iri_template,
            target: None,
        }
    }

    /// Bind the operation to a known target IRI.
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn types(&self) -> &[String] {
        &self.types
    }

    pub fn is_type(&self, type_iri: &str) -> bool {
        self.types.iter().any(|t| t == type_iri)
    }

    /// `hydra:title`.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// HTTP method, as documented. `None` when the operation names none.
    pub fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    /// IRI of the type a request payload must contain.
    pub fn expects(&self) -> Option<&str> {
        self.expects.as_deref()
    }

    /// IRI of the type of the primary node in the response.
    pub fn returns(&self) -> Option<&str> {
        self.returns.as_deref()
    }

    pub fn status_codes(&self) -> &[StatusCodeDescription] {
        &self.status_codes
    }

    pub fn iri_template(&self) -> Option<&IriTemplate> {
        self.iri_template.as_ref()
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }
}

// --- tests -------------------------------------------------------------------
