//! Turns an operation plus caller arguments into a ready-to-execute request.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::api_doc::ApiDocumentation;
use crate::args::{Args, ID_KEY};
use crate::error::HydraError;
use crate::graph::{Graph, Value};
use crate::iri;
use crate::jsonld;
use crate::operation::Operation;

/// How a command's response is handed back to the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseMode {
    /// The transport response, untouched.
    Raw,
    /// The response body parsed into a graph.
    #[default]
    Parsed,
}

/// A fully resolved request derived from an operation.
#[derive(Debug, Clone)]
pub struct Command {
    operation: Operation,
    payload: Option<Graph>,
    target: String,
    args: Args,
    response_mode: ResponseMode,
}

impl Command {
    pub fn new(operation: Operation, payload: Option<Graph>, target: impl Into<String>, args: Args) -> Self {
        Self {
            operation,
            payload,
            target: target.into(),
            args,
            response_mode: ResponseMode::default(),
        }
    }

    /// Replace the payload with a caller-built graph.
    pub fn with_payload(mut self, payload: Graph) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn with_response_mode(mut self, mode: ResponseMode) -> Self {
        self.response_mode = mode;
        self
    }

    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    pub fn payload(&self) -> Option<&Graph> {
        self.payload.as_ref()
    }

    /// Target URL, possibly relative to the API entry point.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Arguments the command was built from, minus the explicit target id.
    pub fn args(&self) -> &Args {
        &self.args
    }

    pub fn response_mode(&self) -> ResponseMode {
        self.response_mode
    }

    /// HTTP method; `GET` when the operation documents none.
    pub fn method(&self) -> &str {
        self.operation.method().unwrap_or("GET")
    }

    /// Check that the payload carries a node of the operation's expected
    /// type.
    pub fn validate_payload(&self) -> Result<(), HydraError> {
        let Some(expected) = self.operation.expects() else {
            return Ok(());
        };
        let satisfied = self
            .payload
            .as_ref()
            .is_some_and(|g| !g.nodes_by_type(expected).is_empty());
        if satisfied {
            Ok(())
        } else {
            Err(HydraError::MissingExpectedType {
                expected: expected.to_string(),
            })
        }
    }

    /// The payload serialized as JSON-LD, if there is one.
    pub fn body(&self, pretty: bool) -> Option<String> {
        self.payload.as_ref().map(|g| jsonld::serialize(g, pretty))
    }
}

/// Builds [`Command`]s against one API documentation.
#[derive(Debug, Clone, Copy)]
pub struct CommandBuilder<'a> {
    api_doc: &'a ApiDocumentation,
    strict_templates: bool,
}

impl<'a> CommandBuilder<'a> {
    pub fn new(api_doc: &'a ApiDocumentation) -> Self {
        Self {
            api_doc,
            strict_templates: false,
        }
    }

    /// Fail template expansion when a required variable is unbound.
    pub fn strict_templates(mut self, strict: bool) -> Self {
        self.strict_templates = strict;
        self
    }

    /// Build a command for `operation`.
    ///
    /// The target is the explicit `@id` argument when given, else the
    /// operation's IRI template expanded against `args`, else its known
    /// target. When the operation expects a type, the payload is a fresh
    /// graph holding one node of that type, populated from the arguments
    /// keyed by the type's properties.
    pub fn build(&self, operation: &Operation, mut args: Args) -> Result<Command, HydraError> {
        let explicit_id = args.id();
        args.remove(ID_KEY);

        let target = match (&explicit_id, operation.iri_template(), operation.target()) {
            (Some(id), _, _) => id.clone(),
            (None, Some(template), _) if self.strict_templates => template.expand_strict(&args)?,
            (None, Some(template), _) => template.expand(&args)?,
            (None, None, Some(known)) => known.to_string(),
            (None, None, None) => {
                return Err(HydraError::MissingTemplate(operation.id().to_string()))
            }
        };

        let payload = operation
            .expects()
            .map(|expected| self.payload(expected, explicit_id.as_deref(), &args));

        Ok(Command::new(operation.clone(), payload, target, args))
    }

    // Blank links in the arguments are relabelled so they cannot collide
    // with the payload node's own blank identifier.
    fn payload(&self, expected: &str, id: Option<&str>, args: &Args) -> Graph {
        let mut graph = Graph::new();
        let node = graph.create_node(id);
        graph.add_type(node, expected);
        let mut relabelled: HashMap<String, String> = HashMap::new();
        for property in self.api_doc.properties_of(expected) {
            let Some(values) = args.get(&property) else {
                continue;
            };
            let values = values
                .iter()
                .map(|value| match value {
                    Value::Ref(link) if iri::is_blank(link) => {
                        let fresh = relabelled.entry(link.clone()).or_insert_with(|| {
                            let blank = graph.create_node(None);
                            graph.node(blank).id().to_string()
                        });
                        Value::Ref(fresh.clone())
                    }
                    other => other.clone(),
                })
                .collect();
            graph.set_property(node, &property, values);
        }
        graph
    }
}

// --- tests -------------------------------------------------------------------
