//! Identity-preserving, in-memory store of linked-data nodes.
//!
//! A [`Graph`] owns its [`Node`]s in an arena and hands out copyable
//! [`NodeId`] handles. Nodes refer to one another by identifier through
//! [`Value::Ref`], so a value may point at a node in this graph or at a node
//! described somewhere else entirely (the API documentation, for instance).
//!
//! Every mutation goes through the graph so that the reverse-property index
//! (who points at a node, and through which property) stays consistent with
//! the forward properties.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;

use crate::iri::{self, BLANK_PREFIX};

/// Handle to a node inside one particular [`Graph`].
///
/// Handles are only meaningful for the graph that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// A literal property value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// A plain string.
    String(String),
    /// A JSON number.
    Number(serde_json::Number),
    /// A boolean.
    Bool(bool),
    /// A lexical value with an explicit datatype IRI.
    Typed { value: String, datatype: String },
    /// A language-tagged string.
    LangString { value: String, language: String },
}

impl Literal {
    /// The lexical form, as it would appear in a URL or a text field.
    pub fn lexical(&self) -> String {
        match self {
            Literal::String(s) => s.clone(),
            Literal::Number(n) => n.to_string(),
            Literal::Bool(b) => b.to_string(),
            Literal::Typed { value, .. } | Literal::LangString { value, .. } => value.clone(),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lexical())
    }
}

/// A single property value: a link to another node, or a literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Ownership-free link to the node with this identifier.
    Ref(String),
    Literal(Literal),
}

impl Value {
    /// A link to the node identified by `iri`.
    pub fn reference(iri: impl Into<String>) -> Self {
        Value::Ref(iri.into())
    }

    /// The target identifier if this value is a link.
    pub fn as_ref_iri(&self) -> Option<&str> {
        match self {
            Value::Ref(iri) => Some(iri),
            Value::Literal(_) => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Value::Literal(lit) => Some(lit),
            Value::Ref(_) => None,
        }
    }

    /// The string content of a plain, typed, or language-tagged string literal.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Literal(Literal::String(s))
            | Value::Literal(Literal::Typed { value: s, .. })
            | Value::Literal(Literal::LangString { value: s, .. }) => Some(s),
            _ => None,
        }
    }

    /// Interpret the value as a boolean flag (`true`, or the string `"true"`).
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Literal(Literal::Bool(b)) => Some(*b),
            other => other.as_str().and_then(|s| s.parse().ok()),
        }
    }

    /// The lexical form of a literal, or the identifier of a link.
    pub fn lexical(&self) -> String {
        match self {
            Value::Ref(iri) => iri.clone(),
            Value::Literal(lit) => lit.lexical(),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Literal(Literal::String(s.to_string()))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Literal(Literal::String(s))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Literal(Literal::Bool(b))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Literal(Literal::Number(n.into()))
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Literal(Literal::Number(n.into()))
    }
}

impl From<Literal> for Value {
    fn from(lit: Literal) -> Self {
        Value::Literal(lit)
    }
}

/// A single entity in a [`Graph`].
#[derive(Debug, Clone)]
pub struct Node {
    id: String,
    types: Vec<String>,
    properties: BTreeMap<String, Vec<Value>>,
    reverse: BTreeMap<String, Vec<NodeId>>,
    loaded_from_id: bool,
}

impl Node {
    fn new(id: String, loaded_from_id: bool) -> Self {
        Self {
            id,
            types: Vec::new(),
            properties: BTreeMap::new(),
            reverse: BTreeMap::new(),
            loaded_from_id,
        }
    }

    /// The node's identifier. Never changes once assigned.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_blank(&self) -> bool {
        iri::is_blank(&self.id)
    }

    /// Declared types, in the order they were added.
    pub fn types(&self) -> &[String] {
        &self.types
    }

    pub fn has_type(&self, type_iri: &str) -> bool {
        self.types.iter().any(|t| t == type_iri)
    }

    /// All values of `property`, or `None` when the property is absent.
    pub fn property(&self, property: &str) -> Option<&[Value]> {
        self.properties.get(property).map(Vec::as_slice)
    }

    /// The first value of `property`.
    pub fn first(&self, property: &str) -> Option<&Value> {
        self.properties.get(property).and_then(|v| v.first())
    }

    /// The first value of `property` that is a link.
    pub fn first_ref(&self, property: &str) -> Option<&str> {
        self.property(property)?.iter().find_map(Value::as_ref_iri)
    }

    /// The first value of `property` that is a string literal.
    pub fn first_str(&self, property: &str) -> Option<&str> {
        self.property(property)?.iter().find_map(Value::as_str)
    }

    pub fn properties(&self) -> &BTreeMap<String, Vec<Value>> {
        &self.properties
    }

    /// Property IRI → nodes that point at this node through that property.
    pub fn reverse_properties(&self) -> &BTreeMap<String, Vec<NodeId>> {
        &self.reverse
    }

    /// Nodes pointing at this node through `property`.
    pub fn reverse_property(&self, property: &str) -> &[NodeId] {
        self.reverse.get(property).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether a dereference of this node's identifier has been attempted
    /// (or was unnecessary because the node is its document's root).
    pub fn is_loaded(&self) -> bool {
        self.loaded_from_id
    }

    /// A node with neither types nor properties: known only by reference.
    pub fn is_stub(&self) -> bool {
        self.types.is_empty() && self.properties.is_empty()
    }
}

/// A collection of [`Node`]s keyed by identifier.
///
/// Identifiers are unique within a graph: asking for the same identifier twice
/// yields the same [`NodeId`].
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    index: HashMap<String, NodeId>,
    base: Option<String>,
    document_iri: Option<String>,
    next_blank: u64,
}

impl Graph {
    /// Create an empty graph with no base IRI.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty graph resolving relative identifiers against `base`.
    pub fn with_base(base: impl Into<String>) -> Self {
        Self {
            base: Some(base.into()),
            ..Self::default()
        }
    }

    /// Create the graph of the document retrieved from `iri`.
    ///
    /// The document IRI doubles as the base, and the node identified by it is
    /// considered already loaded.
    pub fn for_document(iri: impl Into<String>) -> Self {
        let iri = iri.into();
        Self {
            base: Some(iri.clone()),
            document_iri: Some(iri),
            ..Self::default()
        }
    }

    pub fn base(&self) -> Option<&str> {
        self.base.as_deref()
    }

    pub fn document_iri(&self) -> Option<&str> {
        self.document_iri.as_deref()
    }

    /// Resolve `id` against the graph base.
    pub fn resolve_iri(&self, id: &str) -> String {
        iri::resolve(self.base.as_deref(), id)
    }

    /// Create a node, or return the existing one with the same identifier.
    ///
    /// An absent identifier, or one in blank-node form, always yields a fresh
    /// blank node. Anything else is resolved against the base first.
    pub fn create_node(&mut self, id: Option<&str>) -> NodeId {
        match id {
            Some(id) if !iri::is_blank(id) => {
                let resolved = self.resolve_iri(id);
                self.insert(resolved)
            }
            _ => {
                let blank = self.fresh_blank_id();
                self.insert(blank)
            }
        }
    }

    /// Exact lookup by identifier.
    pub fn get_node(&self, id: &str) -> Option<NodeId> {
        self.index.get(id).copied()
    }

    /// The node behind a handle.
    ///
    /// # Panics
    ///
    /// Panics if `id` was issued by a different graph and is out of range.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Lookup by identifier, returning the node itself.
    pub fn find(&self, id: &str) -> Option<&Node> {
        self.get_node(id).map(|n| self.node(n))
    }

    /// All nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes declaring `type_iri`, in creation order.
    pub fn nodes_by_type(&self, type_iri: &str) -> Vec<NodeId> {
        self.nodes()
            .filter(|(_, n)| n.has_type(type_iri))
            .map(|(id, _)| id)
            .collect()
    }

    /// The node declaring `type_iri`, when exactly one does.
    pub fn node_by_type(&self, type_iri: &str) -> Option<NodeId> {
        match self.nodes_by_type(type_iri).as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }

    /// Add `type_iri` to the node's types. The type gets a node of its own so
    /// that it can be described (and carry operations) like any other node.
    pub fn add_type(&mut self, node: NodeId, type_iri: &str) {
        let type_iri = self.resolve_iri(type_iri);
        self.insert(type_iri.clone());
        let types = &mut self.nodes[node.0].types;
        if !types.contains(&type_iri) {
            types.push(type_iri);
        }
    }

    /// Append a value to `property` unless an equal value is already present.
    ///
    /// Links are resolved against the base and the target node is created as
    /// a stub if it does not exist yet.
    pub fn add_value(&mut self, node: NodeId, property: &str, value: impl Into<Value>) {
        let value = match value.into() {
            Value::Ref(target) => {
                let target = self.resolve_iri(&target);
                let target_id = self.insert(target.clone());
                let reverse = self.nodes[target_id.0]
                    .reverse
                    .entry(property.to_string())
                    .or_default();
                if !reverse.contains(&node) {
                    reverse.push(node);
                }
                Value::Ref(target)
            }
            literal => literal,
        };
        let values = self.nodes[node.0]
            .properties
            .entry(property.to_string())
            .or_default();
        if !values.contains(&value) {
            values.push(value);
        }
    }

    /// Replace all values of `property`.
    pub fn set_property(&mut self, node: NodeId, property: &str, values: Vec<Value>) {
        self.remove_property(node, property);
        for value in values {
            self.add_value(node, property, value);
        }
    }

    /// Remove `property` from the node, returning its former values.
    pub fn remove_property(&mut self, node: NodeId, property: &str) -> Vec<Value> {
        let removed = self.nodes[node.0]
            .properties
            .remove(property)
            .unwrap_or_default();
        for target in removed.iter().filter_map(Value::as_ref_iri) {
            if let Some(target_id) = self.get_node(target) {
                let reverse = &mut self.nodes[target_id.0].reverse;
                if let Some(subjects) = reverse.get_mut(property) {
                    subjects.retain(|s| *s != node);
                    if subjects.is_empty() {
                        reverse.remove(property);
                    }
                }
            }
        }
        removed
    }

    /// Check-and-set of the node's loaded flag.
    ///
    /// Returns `true` exactly once per node: for the caller that should go on
    /// and dereference it.
    pub fn begin_load(&mut self, node: NodeId) -> bool {
        let n = &mut self.nodes[node.0];
        if n.loaded_from_id {
            return false;
        }
        n.loaded_from_id = true;
        true
    }

    /// Merge what `source` knows about `source_node` into `target`.
    ///
    /// Types and property values are added to the target. Blank nodes reached
    /// from the source node are copied under fresh identifiers; named nodes
    /// are copied only when this graph knows nothing about them yet.
    pub fn merge_node_from(&mut self, target: NodeId, source: &Graph, source_node: NodeId) {
        let mut imported: HashMap<NodeId, NodeId> = HashMap::from([(source_node, target)]);
        let mut queue: VecDeque<NodeId> = VecDeque::from([source_node]);

        while let Some(src) = queue.pop_front() {
            let dst = imported[&src];
            let node = source.node(src);
            for t in &node.types {
                self.add_type(dst, t);
            }
            for (property, values) in &node.properties {
                for value in values {
                    let value = match value {
                        Value::Ref(link) => match source.get_node(link) {
                            Some(src_ref) => {
                                let dst_ref = match imported.get(&src_ref) {
                                    Some(d) => *d,
                                    None => {
                                        let blank = iri::is_blank(link);
                                        let d = self.create_node((!blank).then_some(link.as_str()));
                                        if blank || self.node(d).is_stub() {
                                            queue.push_back(src_ref);
                                        }
                                        imported.insert(src_ref, d);
                                        d
                                    }
                                };
                                Value::Ref(self.node(dst_ref).id.clone())
                            }
                            None => Value::Ref(link.clone()),
                        },
                        literal => literal.clone(),
                    };
                    self.add_value(dst, property, value);
                }
            }
        }
    }

    // Register `id` if unseen; identifiers are taken verbatim.
    fn insert(&mut self, id: String) -> NodeId {
        if let Some(existing) = self.index.get(&id) {
            return *existing;
        }
        let loaded = self.document_iri.as_deref() == Some(id.as_str());
        let handle = NodeId(self.nodes.len());
        self.nodes.push(Node::new(id.clone(), loaded));
        self.index.insert(id, handle);
        handle
    }

    fn fresh_blank_id(&mut self) -> String {
        loop {
            let candidate = format!("{BLANK_PREFIX}b{}", self.next_blank);
            self.next_blank += 1;
            if !self.index.contains_key(&candidate) {
                return candidate;
            }
        }
    }
}

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const EVENT: &str = "https://api.example/vocab#Event";
    const TITLE: &str = "https://api.example/vocab#title";
    const ORGANIZER: &str = "https://api.example/vocab#organizer";

    #[test]
    fn create_node_is_idempotent() {
        let mut g = Graph::with_base("https://api.example/");
        let a = g.create_node(Some("events/1"));
        let b = g.create_node(Some("https://api.example/events/1"));
        assert_eq!(a, b);
        assert_eq!(g.node(a).id(), "https://api.example/events/1");
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn blank_ids_are_always_fresh() {
        let mut g = Graph::new();
        let a = g.create_node(None);
        let b = g.create_node(Some("_:b0"));
        let c = g.create_node(Some("_:whatever"));
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert!(g.node(a).is_blank());
        assert!(g.node(c).is_blank());
        assert_eq!(g.len(), 3);
    }

    #[test]
    fn get_node_is_exact() {
        let mut g = Graph::with_base("https://api.example/");
        g.create_node(Some("events/1"));
        assert!(g.get_node("events/1").is_none());
        assert!(g.get_node("https://api.example/events/1").is_some());
    }

    #[test]
    fn nodes_by_type_in_creation_order() {
        let mut g = Graph::new();
        let a = g.create_node(Some("https://api.example/a"));
        let _other = g.create_node(Some("https://api.example/other"));
        let b = g.create_node(Some("https://api.example/b"));
        g.add_type(b, EVENT);
        g.add_type(a, EVENT);
        assert_eq!(g.nodes_by_type(EVENT), vec![a, b]);
        assert_eq!(g.node_by_type(EVENT), None);
        assert!(g.nodes_by_type("https://api.example/vocab#Nope").is_empty());
    }

    #[test]
    fn types_get_nodes_of_their_own() {
        let mut g = Graph::new();
        let a = g.create_node(Some("https://api.example/a"));
        g.add_type(a, EVENT);
        g.add_type(a, EVENT);
        assert_eq!(g.node(a).types(), &[EVENT.to_string()]);
        assert!(g.get_node(EVENT).is_some());
    }

    #[test]
    fn reverse_index_follows_mutations() {
        let mut g = Graph::new();
        let event = g.create_node(Some("https://api.example/events/1"));
        let person = g.create_node(Some("https://api.example/people/ada"));
        g.add_value(event, ORGANIZER, Value::reference("https://api.example/people/ada"));

        assert_eq!(g.node(person).reverse_property(ORGANIZER), &[event]);
        assert_eq!(
            g.node(person).reverse_properties().keys().collect::<Vec<_>>(),
            vec![ORGANIZER]
        );

        g.remove_property(event, ORGANIZER);
        assert!(g.node(person).reverse_properties().is_empty());
    }

    #[test]
    fn links_create_stub_targets() {
        let mut g = Graph::with_base("https://api.example/");
        let event = g.create_node(Some("events/1"));
        g.add_value(event, ORGANIZER, Value::reference("people/bob"));
        let bob = g.get_node("https://api.example/people/bob").unwrap();
        assert!(g.node(bob).is_stub());
        assert_eq!(
            g.node(event).first_ref(ORGANIZER),
            Some("https://api.example/people/bob")
        );
    }

    #[test]
    fn set_property_replaces_values() {
        let mut g = Graph::new();
        let n = g.create_node(None);
        g.add_value(n, TITLE, "one");
        g.add_value(n, TITLE, "one");
        g.add_value(n, TITLE, "two");
        assert_eq!(g.node(n).property(TITLE).unwrap().len(), 2);
        g.set_property(n, TITLE, vec!["three".into()]);
        assert_eq!(g.node(n).first_str(TITLE), Some("three"));
        assert_eq!(g.node(n).property(TITLE).unwrap().len(), 1);
    }

    #[test]
    fn document_root_starts_loaded() {
        let mut g = Graph::for_document("https://api.example/events/1");
        let root = g.create_node(Some("https://api.example/events/1"));
        let other = g.create_node(Some("/events/2"));
        assert!(g.node(root).is_loaded());
        assert!(!g.node(other).is_loaded());
    }

    #[test]
    fn begin_load_fires_once() {
        let mut g = Graph::new();
        let n = g.create_node(Some("https://api.example/events/1"));
        assert!(g.begin_load(n));
        assert!(!g.begin_load(n));
        assert!(g.node(n).is_loaded());
    }

    #[test]
    fn merge_copies_properties_and_blank_nodes() {
        let mut source = Graph::new();
        let src = source.create_node(Some("https://api.example/events/1"));
        source.add_type(src, EVENT);
        source.add_value(src, TITLE, "Launch");
        let op = source.create_node(None);
        source.add_value(op, "https://api.example/vocab#method", "DELETE");
        let op_id = source.node(op).id().to_string();
        source.add_value(src, "https://api.example/vocab#op", Value::reference(op_id));

        let mut local = Graph::new();
        local.create_node(None); // occupies _:b0 so the copied blank must be renamed
        let dst = local.create_node(Some("https://api.example/events/1"));
        local.add_value(dst, TITLE, "Launch");
        local.merge_node_from(dst, &source, src);

        let node = local.node(dst);
        assert!(node.has_type(EVENT));
        assert_eq!(node.property(TITLE).unwrap().len(), 1);
        let copied = node.first_ref("https://api.example/vocab#op").unwrap();
        assert_ne!(copied, "_:b0");
        assert_eq!(
            local.find(copied).unwrap().first_str("https://api.example/vocab#method"),
            Some("DELETE")
        );
    }

    #[test]
    fn merge_leaves_described_named_nodes_alone() {
        let mut source = Graph::new();
        let src = source.create_node(Some("https://api.example/events/1"));
        source.add_value(src, ORGANIZER, Value::reference("https://api.example/people/ada"));
        let ada = source.create_node(Some("https://api.example/people/ada"));
        source.add_value(ada, TITLE, "from source");

        let mut local = Graph::new();
        let local_ada = local.create_node(Some("https://api.example/people/ada"));
        local.add_value(local_ada, TITLE, "local");
        let dst = local.create_node(Some("https://api.example/events/1"));
        local.merge_node_from(dst, &source, src);

        assert_eq!(local.node(local_ada).property(TITLE).unwrap().len(), 1);
        assert_eq!(local.node(local_ada).reverse_property(ORGANIZER), &[dst]);
    }
}
