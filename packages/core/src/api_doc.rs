//! The fetched API documentation and lookups over it.

use crate::graph::{Graph, Node, Value};
use crate::operation::Operation;
use crate::resolver::attached_operations;
use crate::vocab::{hydra, rdf};

/// An API documentation graph together with the URL it was fetched from.
///
/// Read-mostly: built once when a client connects, then only queried.
#[derive(Debug, Clone)]
pub struct ApiDocumentation {
    url: String,
    graph: Graph,
}

impl ApiDocumentation {
    pub fn new(url: impl Into<String>, graph: Graph) -> Self {
        Self {
            url: url.into(),
            graph,
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// The operation described by the node `id`, if the documentation has
    /// such a node.
    pub fn get_operation(&self, id: &str) -> Option<Operation> {
        self.graph
            .get_node(id)
            .map(|n| Operation::from_node(&self.graph, n))
    }

    /// Every node typed `hydra:Operation`, in document order.
    pub fn operations(&self) -> Vec<Operation> {
        self.graph
            .nodes_by_type(hydra::OPERATION)
            .into_iter()
            .map(|n| Operation::from_node(&self.graph, n))
            .collect()
    }

    pub fn get_class(&self, id: &str) -> Option<&Node> {
        self.graph.find(id)
    }

    /// Classes listed through `hydra:supportedClass`, followed by any other
    /// node typed `hydra:Class`.
    pub fn supported_classes(&self) -> Vec<&Node> {
        let mut classes: Vec<&Node> = Vec::new();
        let listed = self
            .graph
            .nodes()
            .filter_map(|(_, n)| n.property(hydra::SUPPORTED_CLASS))
            .flatten()
            .filter_map(Value::as_ref_iri)
            .filter_map(|iri| self.graph.find(iri));
        let typed = self
            .graph
            .nodes_by_type(hydra::CLASS)
            .into_iter()
            .map(|n| self.graph.node(n));
        for class in listed.chain(typed) {
            if !classes.iter().any(|c| c.id() == class.id()) {
                classes.push(class);
            }
        }
        classes
    }

    /// IRIs of the properties that apply to instances of `type_iri`.
    ///
    /// Properties whose `rdfs:domain` is the type come first, then the
    /// properties the class lists through `hydra:supportedProperty`.
    pub fn properties_of(&self, type_iri: &str) -> Vec<String> {
        let Some(class) = self.graph.find(type_iri) else {
            return Vec::new();
        };

        let by_domain = class
            .reverse_property(rdf::DOMAIN)
            .iter()
            .map(|p| self.graph.node(*p).id().to_string());
        let supported = class
            .property(hydra::SUPPORTED_PROPERTY)
            .unwrap_or_default()
            .iter()
            .filter_map(Value::as_ref_iri)
            .filter_map(|sp| self.graph.find(sp))
            .filter_map(|sp| sp.first_ref(hydra::PROPERTY))
            .map(str::to_string);

        let mut properties: Vec<String> = Vec::new();
        for property in by_domain.chain(supported) {
            if !properties.contains(&property) {
                properties.push(property);
            }
        }
        properties
    }

    /// Operations attached to the documented node `id` (a class or a
    /// property).
    pub fn operations_attached_to(&self, id: &str) -> Vec<Operation> {
        attached_operations(&self.graph, id, None)
    }
}

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jsonld;

    const DOC: &str = r#"{
        "@context": {
            "hydra": "http://www.w3.org/ns/hydra/core#",
            "rdfs": "http://www.w3.org/2000/01/rdf-schema#",
            "vocab": "https://api.example/vocab#",
            "supportedClass": { "@id": "hydra:supportedClass", "@type": "@id" },
            "supportedProperty": "hydra:supportedProperty",
            "supportedOperation": { "@id": "hydra:supportedOperation", "@type": "@id" },
            "property": { "@id": "hydra:property", "@type": "@id" },
            "domain": { "@id": "rdfs:domain", "@type": "@id" },
            "method": "hydra:method",
            "expects": { "@id": "hydra:expects", "@type": "@id" }
        },
        "@graph": [
            {
                "@id": "https://api.example/doc",
                "@type": "hydra:ApiDocumentation",
                "supportedClass": ["vocab:Event", "vocab:Person"]
            },
            {
                "@id": "vocab:Event",
                "@type": "hydra:Class",
                "supportedProperty": [{ "property": "vocab:location" }],
                "supportedOperation": ["vocab:createEvent"]
            },
            { "@id": "vocab:Person", "@type": "hydra:Class" },
            { "@id": "vocab:Venue", "@type": "hydra:Class" },
            { "@id": "vocab:title", "domain": "vocab:Event" },
            { "@id": "vocab:startDate", "domain": "vocab:Event" },
            {
                "@id": "vocab:createEvent",
                "@type": "hydra:Operation",
                "method": "POST",
                "expects": "vocab:Event"
            }
        ]
    }"#;

    fn doc() -> ApiDocumentation {
        let graph = jsonld::parse(DOC, Some("https://api.example/doc"))
            .unwrap()
            .into_graph();
        ApiDocumentation::new("https://api.example/doc", graph)
    }

    #[test]
    fn looks_up_operations() {
        let doc = doc();
        let ops = doc.operations();
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].id(), "https://api.example/vocab#createEvent");

        let op = doc
            .get_operation("https://api.example/vocab#createEvent")
            .unwrap();
        assert_eq!(op.method(), Some("POST"));
        assert_eq!(op.expects(), Some("https://api.example/vocab#Event"));
        assert!(doc.get_operation("https://api.example/vocab#nope").is_none());

        let attached = doc.operations_attached_to("https://api.example/vocab#Event");
        assert_eq!(attached, vec![op]);
    }

    #[test]
    fn lists_classes_once() {
        let doc = doc();
        let ids: Vec<&str> = doc.supported_classes().iter().map(|c| c.id()).collect();
        assert_eq!(
            ids,
            [
                "https://api.example/vocab#Event",
                "https://api.example/vocab#Person",
                "https://api.example/vocab#Venue",
            ]
        );
        assert!(doc.get_class("https://api.example/vocab#Venue").is_some());
    }

    #[test]
    fn properties_by_domain_then_supported_property() {
        let doc = doc();
        assert_eq!(
            doc.properties_of("https://api.example/vocab#Event"),
            [
                "https://api.example/vocab#title",
                "https://api.example/vocab#startDate",
                "https://api.example/vocab#location",
            ]
        );
        assert!(doc.properties_of("https://api.example/vocab#Unknown").is_empty());
    }
}
