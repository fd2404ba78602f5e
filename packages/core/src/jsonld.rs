//! JSON-LD document store: parse documents into [`Graph`]s and serialize
//! graphs back to JSON-LD text.
//!
//! The supported subset covers what Hydra API descriptions and responses use
//! in practice:
//!
//! | Feature | Support |
//! |---------|---------|
//! | Inline `@context` (terms, prefixes, `@vocab`, `@base`) | yes |
//! | Term type coercion (`@id`, `@vocab`, datatype IRIs) | yes |
//! | Remote contexts | only when pre-loaded via [`Parser::with_remote_context`] |
//! | `@graph`, named graphs, `@included`, `@reverse` | yes |
//! | Value objects (`@value` with `@type` / `@language`) | yes |
//! | `@list` / `@set` | flattened into multi-valued properties |
//!
//! Serialization emits flattened, expanded-key JSON-LD that needs no context
//! to be read back.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde_json::{Map, Value as Json};
use thiserror::Error;

use crate::graph::{Graph, Literal, NodeId, Value};
use crate::iri;

/// Errors returned when a document body cannot be turned into a graph.
#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("invalid JSON: {0}")]
    Json(String),

    #[error("invalid JSON-LD document: {0}")]
    InvalidDocument(String),

    #[error("remote context {0:?} is not available")]
    UnsupportedRemoteContext(String),
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// A parsed JSON-LD document: a default graph plus any named graphs.
#[derive(Debug, Clone, Default)]
pub struct Document {
    iri: Option<String>,
    default_graph: Graph,
    named_graphs: BTreeMap<String, Graph>,
}

impl Document {
    /// An empty document retrieved from `iri` (if known).
    pub fn new(iri: Option<&str>) -> Self {
        let default_graph = iri.map_or_else(Graph::new, |i| Graph::for_document(i));
        Self {
            iri: iri.map(str::to_string),
            default_graph,
            named_graphs: BTreeMap::new(),
        }
    }

    pub fn iri(&self) -> Option<&str> {
        self.iri.as_deref()
    }

    /// The default graph when `name` is `None`, otherwise the named graph.
    pub fn graph(&self, name: Option<&str>) -> Option<&Graph> {
        match name {
            None => Some(&self.default_graph),
            Some(n) => self.named_graphs.get(n),
        }
    }

    pub fn default_graph(&self) -> &Graph {
        &self.default_graph
    }

    pub fn default_graph_mut(&mut self) -> &mut Graph {
        &mut self.default_graph
    }

    pub fn named_graphs(&self) -> impl Iterator<Item = (&str, &Graph)> {
        self.named_graphs.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn into_graph(self) -> Graph {
        self.default_graph
    }
}

/// Parse `body` as a JSON-LD document anchored at `base`.
pub fn parse(body: &str, base: Option<&str>) -> Result<Document, ParseError> {
    Parser::new(base).parse(body)
}

/// Serialize `graph` as JSON-LD text.
///
/// Nodes known only by reference (no types, no properties) are left out.
pub fn serialize(graph: &Graph, pretty: bool) -> String {
    let objects: Vec<Json> = graph
        .nodes()
        .filter(|(_, node)| !node.is_stub())
        .map(|(id, _)| node_to_json(graph, id))
        .collect();

    let doc = match <[Json; 1]>::try_from(objects) {
        Ok([single]) => single,
        Err(objects) => {
            let mut top = Map::new();
            top.insert("@graph".into(), Json::Array(objects));
            Json::Object(top)
        }
    };

    if pretty {
        format!("{doc:#}")
    } else {
        doc.to_string()
    }
}

/// String-valued `@context` entries at the top of `doc`, i.e. the remote
/// contexts a caller would have to fetch before parsing.
pub fn remote_context_urls(doc: &Json) -> Vec<String> {
    fn collect(ctx: &Json, out: &mut Vec<String>) {
        match ctx {
            Json::String(url) => out.push(url.clone()),
            Json::Array(items) => items.iter().for_each(|i| collect(i, out)),
            _ => {}
        }
    }

    let mut out = Vec::new();
    let tops: Vec<&Json> = match doc {
        Json::Array(items) => items.iter().collect(),
        other => vec![other],
    };
    for top in tops {
        if let Some(ctx) = top.get("@context") {
            collect(ctx, &mut out);
        }
    }
    out.dedup();
    out
}

fn node_to_json(graph: &Graph, id: NodeId) -> Json {
    let node = graph.node(id);
    let mut obj = Map::new();
    obj.insert("@id".into(), Json::String(node.id().to_string()));
    if !node.types().is_empty() {
        obj.insert(
            "@type".into(),
            Json::Array(node.types().iter().cloned().map(Json::String).collect()),
        );
    }
    for (property, values) in node.properties() {
        let values: Vec<Json> = values.iter().map(value_to_json).collect();
        obj.insert(property.clone(), Json::Array(values));
    }
    Json::Object(obj)
}

fn value_to_json(value: &Value) -> Json {
    let object = |pairs: [(&str, String); 2]| {
        Json::Object(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), Json::String(v)))
                .collect(),
        )
    };
    match value {
        Value::Ref(target) => {
            let mut obj = Map::new();
            obj.insert("@id".into(), Json::String(target.clone()));
            Json::Object(obj)
        }
        Value::Literal(Literal::String(s)) => Json::String(s.clone()),
        Value::Literal(Literal::Number(n)) => Json::Number(n.clone()),
        Value::Literal(Literal::Bool(b)) => Json::Bool(*b),
        Value::Literal(Literal::Typed { value, datatype }) => {
            object([("@value", value.clone()), ("@type", datatype.clone())])
        }
        Value::Literal(Literal::LangString { value, language }) => {
            object([("@value", value.clone()), ("@language", language.clone())])
        }
    }
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Coercion {
    Id,
    Vocab,
    Datatype(String),
}

#[derive(Debug, Clone)]
struct Term {
    iri: String,
    coercion: Option<Coercion>,
}

#[derive(Debug, Clone, Default)]
struct Context {
    base: Option<String>,
    vocab: Option<String>,
    terms: HashMap<String, Term>,
}

impl Context {
    /// IRI expansion as used for keys, types and identifiers.
    fn expand(&self, value: &str, vocab: bool, document_relative: bool) -> String {
        if value.starts_with('@') || iri::is_blank(value) {
            return value.to_string();
        }
        if vocab {
            if let Some(term) = self.terms.get(value) {
                return term.iri.clone();
            }
        }
        if let Some((prefix, suffix)) = value.split_once(':') {
            if !suffix.starts_with("//") {
                if let Some(term) = self.terms.get(prefix) {
                    return format!("{}{suffix}", term.iri);
                }
            }
            if iri::is_absolute(value) {
                return value.to_string();
            }
        }
        if vocab {
            if let Some(v) = &self.vocab {
                return format!("{v}{value}");
            }
        }
        if document_relative {
            return iri::resolve(self.base.as_deref(), value);
        }
        value.to_string()
    }

    fn coercion(&self, key: &str) -> Option<&Coercion> {
        self.terms.get(key).and_then(|t| t.coercion.as_ref())
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Configurable JSON-LD parser.
#[derive(Debug, Clone, Default)]
pub struct Parser {
    base: Option<String>,
    remote_contexts: HashMap<String, Json>,
}

impl Parser {
    /// A parser resolving relative references against `base`.
    pub fn new(base: Option<&str>) -> Self {
        Self {
            base: base.map(str::to_string),
            remote_contexts: HashMap::new(),
        }
    }

    /// Make the remote context at `url` available to documents that
    /// reference it. `url` is resolved against the parser's base.
    pub fn with_remote_context(mut self, url: &str, context: Json) -> Self {
        let url = iri::resolve(self.base.as_deref(), url);
        self.remote_contexts.insert(url, context);
        self
    }

    /// Parse a document from text.
    pub fn parse(&self, body: &str) -> Result<Document, ParseError> {
        let json: Json =
            serde_json::from_str(body).map_err(|e| ParseError::Json(e.to_string()))?;
        self.parse_json(&json)
    }

    /// Parse an already decoded JSON value.
    pub fn parse_json(&self, json: &Json) -> Result<Document, ParseError> {
        let mut state = ParseState {
            parser: self,
            document: Document::new(self.base.as_deref()),
            labels: HashMap::new(),
        };
        let ctx = Context {
            base: self.base.clone(),
            ..Context::default()
        };

        match json {
            Json::Array(items) => {
                for item in items {
                    state.top_level(&ctx, item)?;
                }
            }
            other => state.top_level(&ctx, other)?,
        }
        Ok(state.document)
    }
}

/// Which graph a node object is being written into.
#[derive(Debug, Clone)]
enum Target {
    Default,
    Named(String),
}

struct ParseState<'p> {
    parser: &'p Parser,
    document: Document,
    /// Blank-node label (per graph) → generated identifier.
    labels: HashMap<(Option<String>, String), String>,
}

impl ParseState<'_> {
    fn top_level(&mut self, ctx: &Context, json: &Json) -> Result<(), ParseError> {
        let Json::Object(obj) = json else {
            return Err(ParseError::InvalidDocument(
                "top-level items must be objects".into(),
            ));
        };
        let ctx = match obj.get("@context") {
            Some(local) => self.process_context(ctx, local, &mut HashSet::new())?,
            None => ctx.clone(),
        };

        let bare_graph = obj.contains_key("@graph")
            && obj.keys().all(|k| k == "@graph" || k == "@context");
        if bare_graph {
            for item in as_array(&obj["@graph"]) {
                let Json::Object(node) = item else {
                    return Err(ParseError::InvalidDocument(
                        "@graph entries must be objects".into(),
                    ));
                };
                self.node_object(&ctx, node, &Target::Default)?;
            }
            return Ok(());
        }
        self.node_object(&ctx, obj, &Target::Default)?;
        Ok(())
    }

    fn graph_mut(&mut self, target: &Target) -> &mut Graph {
        match target {
            Target::Default => &mut self.document.default_graph,
            Target::Named(name) => {
                let base = self.parser.base.clone();
                self.document
                    .named_graphs
                    .entry(name.clone())
                    .or_insert_with(|| base.map_or_else(Graph::new, |b| Graph::with_base(b)))
            }
        }
    }

    fn target_key(target: &Target) -> Option<String> {
        match target {
            Target::Default => None,
            Target::Named(n) => Some(n.clone()),
        }
    }

    /// The node for `id` (already expanded) in `target`, honouring blank labels.
    fn node_for(&mut self, target: &Target, id: Option<&str>) -> NodeId {
        match id {
            Some(label) if iri::is_blank(label) => {
                let key = (Self::target_key(target), label.to_string());
                if let Some(existing) = self.labels.get(&key).cloned() {
                    if let Some(node) = self.graph_mut(target).get_node(&existing) {
                        return node;
                    }
                }
                let graph = self.graph_mut(target);
                let node = graph.create_node(None);
                let generated = graph.node(node).id().to_string();
                self.labels.insert(key, generated);
                node
            }
            other => self.graph_mut(target).create_node(other),
        }
    }

    fn node_object(
        &mut self,
        ctx: &Context,
        obj: &Map<String, Json>,
        target: &Target,
    ) -> Result<NodeId, ParseError> {
        let scoped;
        let ctx = match obj.get("@context") {
            Some(local) => {
                scoped = self.process_context(ctx, local, &mut HashSet::new())?;
                &scoped
            }
            None => ctx,
        };

        let id = match keyword(ctx, obj, "@id") {
            Some(Json::String(raw)) => Some(ctx.expand(raw, false, true)),
            Some(other) => {
                return Err(ParseError::InvalidDocument(format!(
                    "@id must be a string, got {other}"
                )))
            }
            None => None,
        };
        let node = self.node_for(target, id.as_deref());

        if let Some(types) = keyword(ctx, obj, "@type") {
            for t in as_array(types) {
                let Json::String(t) = t else {
                    return Err(ParseError::InvalidDocument("@type values must be strings".into()));
                };
                let t = ctx.expand(t, true, true);
                self.graph_mut(target).add_type(node, &t);
            }
        }

        for (key, value) in obj {
            if key == "@context" {
                continue;
            }
            let expanded = ctx.expand(key, true, false);
            match expanded.as_str() {
                "@graph" => {
                    let name = self.graph_mut(target).node(node).id().to_string();
                    let inner = Target::Named(name);
                    for item in as_array(value) {
                        if let Json::Object(child) = item {
                            self.node_object(ctx, child, &inner)?;
                        }
                    }
                }
                "@included" => {
                    for item in as_array(value) {
                        if let Json::Object(child) = item {
                            self.node_object(ctx, child, target)?;
                        }
                    }
                }
                "@reverse" => {
                    let Json::Object(reverse) = value else {
                        return Err(ParseError::InvalidDocument("@reverse must be an object".into()));
                    };
                    let this = self.graph_mut(target).node(node).id().to_string();
                    for (rkey, rvalue) in reverse {
                        let property = ctx.expand(rkey, true, false);
                        if !is_property_iri(&property) {
                            continue;
                        }
                        for item in as_array(rvalue) {
                            if let Json::Object(child) = item {
                                let subject = self.node_object(ctx, child, target)?;
                                self.graph_mut(target).add_value(
                                    subject,
                                    &property,
                                    Value::Ref(this.clone()),
                                );
                            }
                        }
                    }
                }
                k if k.starts_with('@') => {}
                property => {
                    if !is_property_iri(property) {
                        continue;
                    }
                    let coercion = ctx.coercion(key).cloned();
                    let values = self.values(ctx, value, coercion.as_ref(), target)?;
                    let graph = self.graph_mut(target);
                    for v in values {
                        graph.add_value(node, property, v);
                    }
                }
            }
        }
        Ok(node)
    }

    fn values(
        &mut self,
        ctx: &Context,
        json: &Json,
        coercion: Option<&Coercion>,
        target: &Target,
    ) -> Result<Vec<Value>, ParseError> {
        let mut out = Vec::new();
        match json {
            Json::Null => {}
            Json::Array(items) => {
                for item in items {
                    out.extend(self.values(ctx, item, coercion, target)?);
                }
            }
            Json::String(s) => out.push(match coercion {
                Some(Coercion::Id) => self.reference(ctx, s, false, target),
                Some(Coercion::Vocab) => self.reference(ctx, s, true, target),
                Some(Coercion::Datatype(dt)) => Value::Literal(Literal::Typed {
                    value: s.clone(),
                    datatype: dt.clone(),
                }),
                None => Value::Literal(Literal::String(s.clone())),
            }),
            Json::Number(n) => out.push(match coercion {
                Some(Coercion::Datatype(dt)) => Value::Literal(Literal::Typed {
                    value: n.to_string(),
                    datatype: dt.clone(),
                }),
                _ => Value::Literal(Literal::Number(n.clone())),
            }),
            Json::Bool(b) => out.push(match coercion {
                Some(Coercion::Datatype(dt)) => Value::Literal(Literal::Typed {
                    value: b.to_string(),
                    datatype: dt.clone(),
                }),
                _ => Value::Literal(Literal::Bool(*b)),
            }),
            Json::Object(obj) => {
                if let Some(v) = keyword(ctx, obj, "@value") {
                    out.extend(value_object(ctx, obj, v)?);
                } else if let Some(list) =
                    keyword(ctx, obj, "@list").or_else(|| keyword(ctx, obj, "@set"))
                {
                    out.extend(self.values(ctx, list, coercion, target)?);
                } else {
                    let node = self.node_object(ctx, obj, target)?;
                    let id = self.graph_mut(target).node(node).id().to_string();
                    out.push(Value::Ref(id));
                }
            }
        }
        Ok(out)
    }

    fn reference(&mut self, ctx: &Context, raw: &str, vocab: bool, target: &Target) -> Value {
        let expanded = ctx.expand(raw, vocab, true);
        let node = self.node_for(target, Some(&expanded));
        Value::Ref(self.graph_mut(target).node(node).id().to_string())
    }

    fn process_context(
        &self,
        active: &Context,
        local: &Json,
        remote_seen: &mut HashSet<String>,
    ) -> Result<Context, ParseError> {
        match local {
            Json::Null => Ok(Context {
                base: self.parser.base.clone(),
                ..Context::default()
            }),
            Json::String(url) => {
                let url = iri::resolve(self.parser.base.as_deref(), url);
                if !remote_seen.insert(url.clone()) {
                    return Err(ParseError::InvalidDocument(format!(
                        "recursive context inclusion of {url:?}"
                    )));
                }
                let remote = self
                    .parser
                    .remote_contexts
                    .get(&url)
                    .ok_or_else(|| ParseError::UnsupportedRemoteContext(url.clone()))?;
                let inner = remote.get("@context").unwrap_or(remote);
                self.process_context(active, inner, remote_seen)
            }
            Json::Array(items) => {
                let mut ctx = active.clone();
                for item in items {
                    ctx = self.process_context(&ctx, item, remote_seen)?;
                }
                Ok(ctx)
            }
            Json::Object(defs) => {
                let mut ctx = active.clone();
                match defs.get("@base") {
                    Some(Json::String(b)) => ctx.base = Some(iri::resolve(ctx.base.as_deref(), b)),
                    Some(Json::Null) => ctx.base = None,
                    _ => {}
                }
                match defs.get("@vocab") {
                    Some(Json::String(v)) => ctx.vocab = Some(ctx.expand(v, true, true)),
                    Some(Json::Null) => ctx.vocab = None,
                    _ => {}
                }
                let mut defining = HashSet::new();
                for key in defs.keys().filter(|k| !k.starts_with('@')) {
                    define_term(&mut ctx, defs, key, &mut defining)?;
                }
                Ok(ctx)
            }
            other => Err(ParseError::InvalidDocument(format!(
                "invalid @context value {other}"
            ))),
        }
    }
}

/// Create the term definition for `key`, first defining any term its IRI
/// depends on (e.g. a prefix declared later in the same object).
fn define_term(
    ctx: &mut Context,
    defs: &Map<String, Json>,
    key: &str,
    defining: &mut HashSet<String>,
) -> Result<(), ParseError> {
    if !defining.insert(key.to_string()) {
        return Ok(());
    }
    let Some(def) = defs.get(key) else {
        return Ok(());
    };

    let (raw_iri, raw_type) = match def {
        Json::Null => {
            ctx.terms.remove(key);
            return Ok(());
        }
        Json::String(s) => (Some(s.as_str()), None),
        Json::Object(o) => (
            o.get("@id").and_then(Json::as_str),
            o.get("@type").and_then(Json::as_str),
        ),
        other => {
            return Err(ParseError::InvalidDocument(format!(
                "invalid definition for term {key:?}: {other}"
            )))
        }
    };

    for dependency in [raw_iri, raw_type].into_iter().flatten() {
        if let Some((prefix, _)) = dependency.split_once(':') {
            if prefix != key && defs.contains_key(prefix) {
                define_term(ctx, defs, prefix, defining)?;
            }
        }
    }

    let iri = match raw_iri {
        Some(raw) => ctx.expand(raw, true, false),
        None => ctx.expand(key, true, false),
    };
    if !is_property_iri(&iri) && !iri.starts_with('@') {
        return Err(ParseError::InvalidDocument(format!(
            "term {key:?} does not expand to an absolute IRI"
        )));
    }
    let coercion = match raw_type {
        Some("@id") => Some(Coercion::Id),
        Some("@vocab") => Some(Coercion::Vocab),
        Some(dt) => Some(Coercion::Datatype(ctx.expand(dt, true, false))),
        None => None,
    };
    ctx.terms.insert(key.to_string(), Term { iri, coercion });
    Ok(())
}

fn value_object(ctx: &Context, obj: &Map<String, Json>, v: &Json) -> Result<Vec<Value>, ParseError> {
    let datatype = keyword(ctx, obj, "@type")
        .and_then(Json::as_str)
        .map(|t| ctx.expand(t, true, true));
    let language = keyword(ctx, obj, "@language").and_then(Json::as_str);

    let literal = match (v, datatype, language) {
        (Json::Null, _, _) => return Ok(Vec::new()),
        (_, Some(datatype), _) => Literal::Typed {
            value: json_lexical(v)?,
            datatype,
        },
        (Json::String(s), None, Some(lang)) => Literal::LangString {
            value: s.clone(),
            language: lang.to_string(),
        },
        (Json::String(s), None, None) => Literal::String(s.clone()),
        (Json::Number(n), None, _) => Literal::Number(n.clone()),
        (Json::Bool(b), None, _) => Literal::Bool(*b),
        (other, _, _) => {
            return Err(ParseError::InvalidDocument(format!(
                "@value must be a scalar, got {other}"
            )))
        }
    };
    Ok(vec![Value::Literal(literal)])
}

fn json_lexical(v: &Json) -> Result<String, ParseError> {
    match v {
        Json::String(s) => Ok(s.clone()),
        Json::Number(n) => Ok(n.to_string()),
        Json::Bool(b) => Ok(b.to_string()),
        other => Err(ParseError::InvalidDocument(format!(
            "@value must be a scalar, got {other}"
        ))),
    }
}

/// `obj[keyword]`, also honouring terms the context aliases to `keyword`.
fn keyword<'j>(ctx: &Context, obj: &'j Map<String, Json>, keyword: &str) -> Option<&'j Json> {
    obj.get(keyword).or_else(|| {
        obj.iter()
            .find(|(k, _)| ctx.terms.get(k.as_str()).is_some_and(|t| t.iri == keyword))
            .map(|(_, v)| v)
    })
}

fn is_property_iri(iri: &str) -> bool {
    iri::is_absolute(iri) || iri::is_blank(iri)
}

fn as_array(json: &Json) -> &[Json] {
    match json {
        Json::Array(items) => items,
        other => std::slice::from_ref(other),
    }
}

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::hydra;
    use serde_json::json;

    const DOC: &str = r#"{
        "@context": {
            "hydra": "http://www.w3.org/ns/hydra/core#",
            "vocab": "https://api.example/vocab#",
            "Event": "vocab:Event",
            "title": "vocab:title",
            "organizer": { "@id": "vocab:organizer", "@type": "@id" },
            "startDate": { "@id": "vocab:startDate", "@type": "http://www.w3.org/2001/XMLSchema#dateTime" },
            "operation": "hydra:operation",
            "method": "hydra:method"
        },
        "@id": "/events/1",
        "@type": "Event",
        "title": "Launch",
        "organizer": "/people/ada",
        "startDate": "2026-03-01T10:00:00Z",
        "operation": [
            { "@type": "hydra:Operation", "method": "DELETE" }
        ]
    }"#;

    #[test]
    fn parses_terms_prefixes_and_coercion() {
        let doc = parse(DOC, Some("https://api.example/events/1")).unwrap();
        let g = doc.default_graph();
        let event = g.find("https://api.example/events/1").unwrap();

        assert!(event.has_type("https://api.example/vocab#Event"));
        assert!(event.is_loaded());
        assert_eq!(event.first_str("https://api.example/vocab#title"), Some("Launch"));
        assert_eq!(
            event.first_ref("https://api.example/vocab#organizer"),
            Some("https://api.example/people/ada")
        );
        assert_eq!(
            event.first("https://api.example/vocab#startDate"),
            Some(&Value::Literal(Literal::Typed {
                value: "2026-03-01T10:00:00Z".into(),
                datatype: "http://www.w3.org/2001/XMLSchema#dateTime".into(),
            }))
        );

        let op = event.first_ref(hydra::OPERATION_PROP).unwrap();
        let op = g.find(op).unwrap();
        assert!(op.is_blank());
        assert!(op.has_type(hydra::OPERATION));
        assert_eq!(op.first_str(hydra::METHOD), Some("DELETE"));
    }

    #[test]
    fn vocab_and_base_from_context() {
        let body = json!({
            "@context": { "@vocab": "https://schema.example/", "@base": "https://api.example/v2/" },
            "@id": "things/1",
            "@type": "Thing",
            "name": "widget"
        });
        let doc = Parser::new(None).parse_json(&body).unwrap();
        let thing = doc.default_graph().find("https://api.example/v2/things/1").unwrap();
        assert!(thing.has_type("https://schema.example/Thing"));
        assert_eq!(thing.first_str("https://schema.example/name"), Some("widget"));
    }

    #[test]
    fn keyword_aliases() {
        let body = json!({
            "@context": { "id": "@id", "type": "@type", "ex": "https://api.example/vocab#" },
            "id": "https://api.example/x",
            "type": "ex:Thing",
            "ex:size": 4
        });
        let doc = Parser::new(None).parse_json(&body).unwrap();
        let x = doc.default_graph().find("https://api.example/x").unwrap();
        assert!(x.has_type("https://api.example/vocab#Thing"));
        assert_eq!(x.properties().len(), 1);
    }

    #[test]
    fn keys_without_mapping_are_dropped() {
        let body = json!({ "@id": "https://api.example/x", "loose": 1, "https://api.example/p": 2 });
        let doc = Parser::new(None).parse_json(&body).unwrap();
        let node = doc.default_graph().find("https://api.example/x").unwrap();
        assert_eq!(node.properties().len(), 1);
    }

    #[test]
    fn blank_labels_are_stable_within_a_document() {
        let body = json!({
            "@graph": [
                { "@id": "_:a", "https://api.example/p": { "@id": "_:b" } },
                { "@id": "_:b", "https://api.example/q": "hello" }
            ]
        });
        let doc = Parser::new(None).parse_json(&body).unwrap();
        let g = doc.default_graph();
        assert_eq!(g.len(), 2);
        let (_, a) = g.nodes().next().unwrap();
        let b = g.find(a.first_ref("https://api.example/p").unwrap()).unwrap();
        assert_eq!(b.first_str("https://api.example/q"), Some("hello"));
    }

    #[test]
    fn lists_values_and_languages() {
        let body = json!({
            "@id": "https://api.example/x",
            "https://api.example/tags": { "@list": ["a", "b"] },
            "https://api.example/label": { "@value": "Hallo", "@language": "de" },
            "https://api.example/count": 3,
            "https://api.example/open": true
        });
        let doc = Parser::new(None).parse_json(&body).unwrap();
        let x = doc.default_graph().find("https://api.example/x").unwrap();
        assert_eq!(x.property("https://api.example/tags").unwrap().len(), 2);
        assert_eq!(
            x.first("https://api.example/label"),
            Some(&Value::Literal(Literal::LangString {
                value: "Hallo".into(),
                language: "de".into()
            }))
        );
        assert_eq!(x.first("https://api.example/count"), Some(&Value::from(3i64)));
        assert_eq!(x.first("https://api.example/open").and_then(Value::as_bool), Some(true));
    }

    #[test]
    fn reverse_properties_link_back() {
        let body = json!({
            "@id": "https://api.example/people/ada",
            "@reverse": {
                "https://api.example/vocab#organizer": { "@id": "https://api.example/events/1" }
            }
        });
        let doc = Parser::new(None).parse_json(&body).unwrap();
        let g = doc.default_graph();
        let event = g.find("https://api.example/events/1").unwrap();
        assert_eq!(
            event.first_ref("https://api.example/vocab#organizer"),
            Some("https://api.example/people/ada")
        );
    }

    #[test]
    fn named_graphs_are_kept_apart() {
        let body = json!({
            "@id": "https://api.example/g1",
            "@graph": [ { "@id": "https://api.example/inner", "https://api.example/p": "v" } ]
        });
        let doc = Parser::new(None).parse_json(&body).unwrap();
        assert!(doc.default_graph().find("https://api.example/inner").is_none());
        let named = doc.graph(Some("https://api.example/g1")).unwrap();
        assert!(named.find("https://api.example/inner").is_some());
    }

    #[test]
    fn remote_context_must_be_preloaded() {
        let body = json!({ "@context": "/contexts/Event.jsonld", "title": "x" });
        let err = Parser::new(Some("https://api.example/events/1"))
            .parse_json(&body)
            .unwrap_err();
        assert_eq!(
            err,
            ParseError::UnsupportedRemoteContext("https://api.example/contexts/Event.jsonld".into())
        );

        let doc = Parser::new(Some("https://api.example/events/1"))
            .with_remote_context(
                "https://api.example/contexts/Event.jsonld",
                json!({ "@context": { "title": "https://api.example/vocab#title" } }),
            )
            .parse_json(&json!({ "@context": "/contexts/Event.jsonld", "@id": "", "title": "x" }))
            .unwrap();
        let root = doc.default_graph().find("https://api.example/events/1").unwrap();
        assert_eq!(root.first_str("https://api.example/vocab#title"), Some("x"));
    }

    #[test]
    fn finds_remote_context_urls() {
        let body = json!({ "@context": ["/ctx/a", { "x": "https://e.example/x" }, "/ctx/b"] });
        assert_eq!(remote_context_urls(&body), vec!["/ctx/a", "/ctx/b"]);
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(matches!(parse("{ nope", None), Err(ParseError::Json(_))));
        assert!(matches!(parse("[1, 2]", None), Err(ParseError::InvalidDocument(_))));
        assert!(matches!(
            parse(r#"{ "@id": 5 }"#, None),
            Err(ParseError::InvalidDocument(_))
        ));
    }

    #[test]
    fn serialized_graph_reads_back() {
        let mut g = Graph::new();
        let event = g.create_node(Some("https://api.example/events/1"));
        g.add_type(event, "https://api.example/vocab#Event");
        g.add_value(event, "https://api.example/vocab#title", "Launch");
        g.add_value(event, "https://api.example/vocab#seats", 120i64);
        g.add_value(
            event,
            "https://api.example/vocab#organizer",
            Value::reference("https://api.example/people/ada"),
        );

        let text = serialize(&g, true);
        let back = parse(&text, None).unwrap();
        let node = back.default_graph().find("https://api.example/events/1").unwrap();
        assert!(node.has_type("https://api.example/vocab#Event"));
        assert_eq!(node.first_str("https://api.example/vocab#title"), Some("Launch"));
        assert_eq!(node.first("https://api.example/vocab#seats"), Some(&Value::from(120i64)));
        assert_eq!(
            node.first_ref("https://api.example/vocab#organizer"),
            Some("https://api.example/people/ada")
        );
    }
}
