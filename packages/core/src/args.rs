//! Caller-supplied arguments for command construction.

use std::collections::btree_map::{self, BTreeMap};

use crate::graph::{Node, Value};

/// Reserved key carrying an explicit target node identifier.
pub const ID_KEY: &str = "@id";

/// Ordered mapping from argument key to one or more values.
///
/// Keys are property IRIs (matched against IRI template mappings and the
/// properties of an expected type) or [`ID_KEY`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args(BTreeMap<String, Vec<Value>>);

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Args::push`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(key, value);
        self
    }

    /// Builder form that sets the explicit target identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.insert(ID_KEY, vec![Value::Ref(id.into())]);
        self
    }

    /// Append a value under `key`.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.entry(key.into()).or_default().push(value.into());
    }

    /// Replace all values under `key`.
    pub fn insert(&mut self, key: impl Into<String>, values: Vec<Value>) -> Option<Vec<Value>> {
        self.0.insert(key.into(), values)
    }

    pub fn get(&self, key: &str) -> Option<&[Value]> {
        self.0.get(key).map(Vec::as_slice)
    }

    pub fn remove(&mut self, key: &str) -> Option<Vec<Value>> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// The explicit target identifier, if one was given.
    pub fn id(&self) -> Option<String> {
        self.get(ID_KEY)?.first().map(Value::lexical)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Vec<Value>> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// A node's own properties, with its identifier under [`ID_KEY`].
    pub fn from_node(node: &Node) -> Self {
        let mut args: Self = node
            .properties()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        args.insert(ID_KEY, vec![Value::Ref(node.id().to_string())]);
        args
    }

    /// Overlay `self` on `base`: keys present in both take `self`'s values.
    pub fn merged_over(self, mut base: Args) -> Self {
        base.0.extend(self.0);
        base
    }
}

impl FromIterator<(String, Vec<Value>)> for Args {
    fn from_iter<I: IntoIterator<Item = (String, Vec<Value>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Args {
    type Item = (&'a String, &'a Vec<Value>);
    type IntoIter = btree_map::Iter<'a, String, Vec<Value>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;

    #[test]
    fn caller_args_win_over_node_properties() {
        let mut g = Graph::new();
        let n = g.create_node(Some("https://api.example/events/1"));
        g.add_value(n, "https://api.example/vocab#title", "Old");
        g.add_value(n, "https://api.example/vocab#venue", "Hall A");

        let merged = Args::new()
            .with("https://api.example/vocab#title", "New")
            .merged_over(Args::from_node(g.node(n)));

        assert_eq!(merged.id().as_deref(), Some("https://api.example/events/1"));
        assert_eq!(
            merged.get("https://api.example/vocab#title"),
            Some(&[Value::from("New")][..])
        );
        assert_eq!(merged.get("https://api.example/vocab#venue").map(<[_]>::len), Some(1));
    }
}
