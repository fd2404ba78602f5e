//! Well-known vocabulary identifiers.
//!
//! The engine treats these as opaque strings; nothing here carries logic.

/// Hydra core vocabulary (`http://www.w3.org/ns/hydra/core#`).
pub mod hydra {
    pub const NS: &str = "http://www.w3.org/ns/hydra/core#";

    // Classes
    pub const RESOURCE: &str = "http://www.w3.org/ns/hydra/core#Resource";
    pub const CLASS: &str = "http://www.w3.org/ns/hydra/core#Class";
    pub const API_DOCUMENTATION: &str = "http://www.w3.org/ns/hydra/core#ApiDocumentation";
    pub const COLLECTION: &str = "http://www.w3.org/ns/hydra/core#Collection";
    pub const PARTIAL_COLLECTION_VIEW: &str =
        "http://www.w3.org/ns/hydra/core#PartialCollectionView";
    pub const OPERATION: &str = "http://www.w3.org/ns/hydra/core#Operation";
    pub const IRI_TEMPLATE: &str = "http://www.w3.org/ns/hydra/core#IriTemplate";
    pub const IRI_TEMPLATE_MAPPING: &str = "http://www.w3.org/ns/hydra/core#IriTemplateMapping";
    pub const STATUS: &str = "http://www.w3.org/ns/hydra/core#Status";
    pub const ERROR: &str = "http://www.w3.org/ns/hydra/core#Error";

    // Properties
    pub const API_DOCUMENTATION_LINK: &str = "http://www.w3.org/ns/hydra/core#apiDocumentation";
    pub const ENTRYPOINT: &str = "http://www.w3.org/ns/hydra/core#entrypoint";
    pub const SUPPORTED_CLASS: &str = "http://www.w3.org/ns/hydra/core#supportedClass";
    pub const SUPPORTED_PROPERTY: &str = "http://www.w3.org/ns/hydra/core#supportedProperty";
    pub const PROPERTY: &str = "http://www.w3.org/ns/hydra/core#property";
    pub const TITLE: &str = "http://www.w3.org/ns/hydra/core#title";
    pub const DESCRIPTION: &str = "http://www.w3.org/ns/hydra/core#description";
    pub const OPERATION_PROP: &str = "http://www.w3.org/ns/hydra/core#operation";
    pub const SUPPORTED_OPERATION: &str = "http://www.w3.org/ns/hydra/core#supportedOperation";
    pub const METHOD: &str = "http://www.w3.org/ns/hydra/core#method";
    pub const EXPECTS: &str = "http://www.w3.org/ns/hydra/core#expects";
    pub const RETURNS: &str = "http://www.w3.org/ns/hydra/core#returns";
    pub const POSSIBLE_STATUS: &str = "http://www.w3.org/ns/hydra/core#possibleStatus";
    pub const STATUS_CODE: &str = "http://www.w3.org/ns/hydra/core#statusCode";
    pub const TEMPLATE: &str = "http://www.w3.org/ns/hydra/core#template";
    pub const MAPPING: &str = "http://www.w3.org/ns/hydra/core#mapping";
    pub const VARIABLE: &str = "http://www.w3.org/ns/hydra/core#variable";
    pub const REQUIRED: &str = "http://www.w3.org/ns/hydra/core#required";
    pub const SEARCH: &str = "http://www.w3.org/ns/hydra/core#search";
    pub const FREETEXT_QUERY: &str = "http://www.w3.org/ns/hydra/core#freetextQuery";

    // Paging
    pub const MEMBER: &str = "http://www.w3.org/ns/hydra/core#member";
    pub const TOTAL_ITEMS: &str = "http://www.w3.org/ns/hydra/core#totalItems";
    pub const VIEW: &str = "http://www.w3.org/ns/hydra/core#view";
    pub const FIRST: &str = "http://www.w3.org/ns/hydra/core#first";
    pub const NEXT: &str = "http://www.w3.org/ns/hydra/core#next";
    pub const PREVIOUS: &str = "http://www.w3.org/ns/hydra/core#previous";
    pub const LAST: &str = "http://www.w3.org/ns/hydra/core#last";

    /// Properties through which a node, class, or property carries operations,
    /// in the order they are read.
    pub const OPERATION_PROPERTIES: [&str; 2] = [OPERATION_PROP, SUPPORTED_OPERATION];
}

/// RDF and RDFS terms used by the engine.
pub mod rdf {
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
    pub const PROPERTY: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#Property";
    pub const LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";
    pub const DOMAIN: &str = "http://www.w3.org/2000/01/rdf-schema#domain";
    pub const RANGE: &str = "http://www.w3.org/2000/01/rdf-schema#range";
    pub const LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
}

/// Media type of JSON-LD payloads.
pub const JSON_LD: &str = "application/ld+json";
