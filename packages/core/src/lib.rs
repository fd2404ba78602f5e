//! Hypermedia-driven operation resolution for Hydra-described Web APIs.
//!
//! Given a graph of linked-data nodes (API documentation and/or response
//! data) and a node in it, this crate finds the operations that apply to the
//! node, expands IRI templates into target URLs, and maps caller arguments
//! onto the properties of an expected type to build a request payload. It
//! performs no I/O; `hydralink-client` executes the resulting commands.
//!
//! # Crate layout
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`graph`] | [`Graph`], [`Node`] and [`Value`]: nodes keyed by identifier with a reverse-property index |
//! | [`jsonld`] | JSON-LD parsing into a [`Document`] and serialization back to text |
//! | [`iri_template`] | [`IriTemplate`] mappings and RFC 6570 expansion |
//! | [`operation`] | [`Operation`]: read-only view of an operation node |
//! | [`resolver`] | Enumerating the operations applicable to a node |
//! | [`api_doc`] | [`ApiDocumentation`]: lookups over the API documentation graph |
//! | [`command`] | [`CommandBuilder`] and [`Command`] |
//! | [`args`] | [`Args`]: caller arguments keyed by property IRI |
//! | [`vocab`] | Hydra, RDF and RDFS identifiers |
//!
//! # Quick start
//!
//! ```rust,ignore
//! use hydralink::{jsonld, ApiDocumentation, Args, CommandBuilder};
//!
//! let graph = jsonld::parse(doc_body, Some(doc_url))?.into_graph();
//! let api_doc = ApiDocumentation::new(doc_url, graph);
//!
//! let op = api_doc.get_operation("https://api.example/vocab#createEvent")
//!     .ok_or_else(|| HydraError::OperationNotFound("createEvent".into()))?;
//! let cmd = CommandBuilder::new(&api_doc).build(
//!     &op,
//!     Args::new()
//!         .with_id("https://api.example/events/new")
//!         .with("https://api.example/vocab#title", "Launch"),
//! )?;
//! assert_eq!(cmd.method(), "POST");
//! ```

pub mod api_doc;
pub mod args;
pub mod command;
pub mod error;
pub mod graph;
pub mod iri;
pub mod iri_template;
pub mod jsonld;
pub mod operation;
pub mod resolver;
pub mod vocab;

pub use api_doc::ApiDocumentation;
pub use args::{Args, ID_KEY};
pub use command::{Command, CommandBuilder, ResponseMode};
pub use error::HydraError;
pub use graph::{Graph, Literal, Node, NodeId, Value};
pub use iri_template::{IriTemplate, IriTemplateMapping};
pub use jsonld::{Document, ParseError, Parser};
pub use operation::{Operation, StatusCodeDescription};
pub use resolver::{
    operations_by_type, operations_for_property, operations_for_type, resolve_operations,
    DuplicatePolicy,
};
