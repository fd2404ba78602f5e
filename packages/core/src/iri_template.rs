//! IRI templates: variable-to-property mappings and RFC 6570 expansion.

use std::collections::BTreeMap;

use crate::args::Args;
use crate::error::HydraError;
use crate::graph::{Graph, Node, NodeId, Value};
use crate::vocab::hydra;

/// One `hydra:mapping` entry of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IriTemplateMapping {
    /// Template variable name.
    pub variable: String,
    /// IRI of the property the variable stands for.
    pub property: String,
    /// Whether the variable must be bound for the expansion to be meaningful.
    pub required: bool,
}

/// A `hydra:IriTemplate`, read once from its node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IriTemplate {
    template: String,
    mappings: Vec<IriTemplateMapping>,
}

impl IriTemplate {
    pub fn new(template: impl Into<String>, mappings: Vec<IriTemplateMapping>) -> Self {
        Self {
            template: template.into(),
            mappings,
        }
    }

    /// Read the template at `node`. Returns `None` if the node carries no
    /// template string. Mapping entries lacking a variable or a property are
    /// skipped.
    pub fn from_node(graph: &Graph, node: NodeId) -> Option<Self> {
        let node = graph.node(node);
        let template = node.first_str(hydra::TEMPLATE)?.to_string();

        let mappings = node
            .property(hydra::MAPPING)
            .unwrap_or_default()
            .iter()
            .filter_map(Value::as_ref_iri)
            .filter_map(|id| graph.find(id))
            .filter_map(mapping_from_node)
            .collect();

        Some(Self { template, mappings })
    }

    /// The raw template string.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Mapping entries in declaration order, optionally only required ones.
    pub fn variable_mappings(&self, only_required: bool) -> Vec<&IriTemplateMapping> {
        self.mappings
            .iter()
            .filter(|m| !only_required || m.required)
            .collect()
    }

    /// Variable name → property IRI.
    pub fn variable_properties(&self, only_required: bool) -> BTreeMap<&str, &str> {
        self.variable_mappings(only_required)
            .into_iter()
            .map(|m| (m.variable.as_str(), m.property.as_str()))
            .collect()
    }

    /// Variable name → property node, for properties described in `graph`.
    pub fn variable_nodes<'g>(
        &self,
        graph: &'g Graph,
        only_required: bool,
    ) -> BTreeMap<&str, &'g Node> {
        self.variable_mappings(only_required)
            .into_iter()
            .filter_map(|m| graph.find(&m.property).map(|n| (m.variable.as_str(), n)))
            .collect()
    }

    /// Expand the template with values taken from `args`, keyed by the
    /// mapped property IRIs. Variables without a matching argument are left
    /// unbound and drop out of the result.
    pub fn expand(&self, args: &Args) -> Result<String, HydraError> {
        let vars: BTreeMap<&str, Binding> = self
            .mappings
            .iter()
            .filter_map(|m| {
                let values = args.get(&m.property)?;
                let binding = match values {
                    [] => return None,
                    [single] => Binding::Scalar(single.lexical()),
                    many => Binding::List(many.iter().map(Value::lexical).collect()),
                };
                Some((m.variable.as_str(), binding))
            })
            .collect();
        expand_template(&self.template, &vars)
    }

    /// Like [`IriTemplate::expand`], but fails if any required variable is
    /// unbound.
    pub fn expand_strict(&self, args: &Args) -> Result<String, HydraError> {
        if let Some(missing) = self
            .mappings
            .iter()
            .find(|m| m.required && args.get(&m.property).map_or(true, <[Value]>::is_empty))
        {
            return Err(HydraError::MissingRequiredVariable {
                variable: missing.variable.clone(),
                property: missing.property.clone(),
            });
        }
        self.expand(args)
    }
}

fn mapping_from_node(node: &Node) -> Option<IriTemplateMapping> {
    let variable = node.first_str(hydra::VARIABLE)?.to_string();
    let property = node
        .first_ref(hydra::PROPERTY)
        .or_else(|| node.first_str(hydra::PROPERTY))?
        .to_string();
    let required = node
        .first(hydra::REQUIRED)
        .and_then(Value::as_bool)
        .unwrap_or(false);
    Some(IriTemplateMapping {
        variable,
        property,
        required,
    })
}

// ---------------------------------------------------------------------------
// RFC 6570 expansion
// ---------------------------------------------------------------------------

/// A value bound to a template variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    Scalar(String),
    List(Vec<String>),
}

struct Operator {
    first: &'static str,
    separator: &'static str,
    named: bool,
    if_empty: &'static str,
    allow_reserved: bool,
}

impl Operator {
    fn parse(c: char) -> Option<Self> {
        let (first, separator, named, if_empty, allow_reserved) = match c {
            '+' => ("", ",", false, "", true),
            '#' => ("#", ",", false, "", true),
            '.' => (".", ".", false, "", false),
            '/' => ("/", "/", false, "", false),
            ';' => (";", ";", true, "", false),
            '?' => ("?", "&", true, "=", false),
            '&' => ("&", "&", true, "=", false),
            _ => return None,
        };
        Some(Self {
            first,
            separator,
            named,
            if_empty,
            allow_reserved,
        })
    }

    const SIMPLE: Operator = Operator {
        first: "",
        separator: ",",
        named: false,
        if_empty: "",
        allow_reserved: false,
    };
}

/// Expand an RFC 6570 (level 4) URI template.
///
/// Unbound variables are skipped; an expression whose variables are all
/// unbound expands to nothing.
pub fn expand_template(
    template: &str,
    vars: &BTreeMap<&str, Binding>,
) -> Result<String, HydraError> {
    let invalid = |reason: &str| HydraError::InvalidTemplate {
        template: template.to_string(),
        reason: reason.to_string(),
    };

    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        if rest[..open].contains('}') {
            return Err(invalid("unmatched '}'"));
        }
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = after.find('}').ok_or_else(|| invalid("unclosed expression"))?;
        expand_expression(&after[..close], vars, &mut out).map_err(|r| invalid(&r))?;
        rest = &after[close + 1..];
    }
    if rest.contains('}') {
        return Err(invalid("unmatched '}'"));
    }
    out.push_str(rest);
    Ok(out)
}

fn expand_expression(
    expr: &str,
    vars: &BTreeMap<&str, Binding>,
    out: &mut String,
) -> Result<(), String> {
    let mut chars = expr.chars();
    let (op, varlist) = match chars.next() {
        Some(c) if "=,!@|".contains(c) => return Err(format!("reserved operator {c:?}")),
        Some(c) => match Operator::parse(c) {
            Some(op) => (op, chars.as_str()),
            None => (Operator::SIMPLE, expr),
        },
        None => return Err("empty expression".into()),
    };

    let mut emitted = false;
    for varspec in varlist.split(',') {
        let (name, explode, prefix) = parse_varspec(varspec)?;
        let Some(binding) = vars.get(name) else {
            continue;
        };
        if matches!(binding, Binding::List(items) if items.is_empty()) {
            continue;
        }
        out.push_str(if emitted { op.separator } else { op.first });
        emitted = true;

        match binding {
            Binding::Scalar(value) => {
                let value = match prefix {
                    Some(n) => value.chars().take(n).collect(),
                    None => value.clone(),
                };
                if op.named {
                    out.push_str(name);
                    out.push_str(if value.is_empty() { op.if_empty } else { "=" });
                }
                out.push_str(&encode(&value, op.allow_reserved));
            }
            Binding::List(items) if explode => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(op.separator);
                    }
                    if op.named {
                        out.push_str(name);
                        out.push_str(if item.is_empty() { op.if_empty } else { "=" });
                    }
                    out.push_str(&encode(item, op.allow_reserved));
                }
            }
            Binding::List(items) => {
                if op.named {
                    out.push_str(name);
                    out.push('=');
                }
                let joined: Vec<String> =
                    items.iter().map(|i| encode(i, op.allow_reserved)).collect();
                out.push_str(&joined.join(","));
            }
        }
    }
    Ok(())
}

fn parse_varspec(varspec: &str) -> Result<(&str, bool, Option<usize>), String> {
    if let Some(name) = varspec.strip_suffix('*') {
        return valid_name(name).map(|n| (n, true, None));
    }
    if let Some((name, len)) = varspec.split_once(':') {
        let len: usize = len
            .parse()
            .ok()
            .filter(|l| (1..10_000).contains(l))
            .ok_or_else(|| format!("invalid prefix length in {varspec:?}"))?;
        return valid_name(name).map(|n| (n, false, Some(len)));
    }
    valid_name(varspec).map(|n| (n, false, None))
}

fn valid_name(name: &str) -> Result<&str, String> {
    let ok = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '%');
    if ok {
        Ok(name)
    } else {
        Err(format!("invalid variable name {name:?}"))
    }
}

/// Percent-encode `value`, keeping unreserved characters and, when
/// `allow_reserved` is set, reserved characters and existing escapes.
fn encode(value: &str, allow_reserved: bool) -> String {
    if !allow_reserved {
        return urlencoding::encode(value).into_owned();
    }
    const RESERVED: &str = ":/?#[]@!$&'()*+,;=";
    let bytes = value.as_bytes();
    let mut out = String::with_capacity(value.len());
    for (i, c) in value.char_indices() {
        let is_escape = c == '%'
            && bytes.get(i + 1).is_some_and(u8::is_ascii_hexdigit)
            && bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit);
        if c.is_ascii_alphanumeric() || "-._~".contains(c) || RESERVED.contains(c) || is_escape {
            out.push(c);
        } else {
            let mut buf = [0u8; 4];
            out.push_str(&urlencoding::encode(c.encode_utf8(&mut buf)));
        }
    }
    out
}

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const TITLE: &str = "http://example.com/title";

    fn vars(pairs: &[(&'static str, Binding)]) -> BTreeMap<&'static str, Binding> {
        pairs.iter().cloned().collect()
    }

    fn scalar(s: &str) -> Binding {
        Binding::Scalar(s.into())
    }

    fn list(items: &[&str]) -> Binding {
        Binding::List(items.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn expands_query_variable_from_property_args() {
        let t = IriTemplate::new(
            "/events{?title}",
            vec![IriTemplateMapping {
                variable: "title".into(),
                property: TITLE.into(),
                required: false,
            }],
        );
        let args = Args::new().with(TITLE, "Launch");
        assert_eq!(t.expand(&args).unwrap(), "/events?title=Launch");
    }

    #[test]
    fn unbound_variables_drop_out() {
        let t = IriTemplate::new(
            "/events{?title,page}",
            vec![IriTemplateMapping {
                variable: "title".into(),
                property: TITLE.into(),
                required: true,
            }],
        );
        assert_eq!(t.expand(&Args::new()).unwrap(), "/events");
        assert_eq!(
            t.expand_strict(&Args::new()),
            Err(HydraError::MissingRequiredVariable {
                variable: "title".into(),
                property: TITLE.into(),
            })
        );
    }

    #[test]
    fn rfc6570_operators() {
        let v = vars(&[
            ("var", scalar("value")),
            ("hello", scalar("Hello World!")),
            ("path", scalar("/foo/bar")),
            ("empty", scalar("")),
            ("list", list(&["red", "green", "blue"])),
            ("x", scalar("1024")),
            ("y", scalar("768")),
        ]);
        let cases = [
            ("{var}", "value"),
            ("{hello}", "Hello%20World%21"),
            ("{+hello}", "Hello%20World!"),
            ("{+path}/here", "/foo/bar/here"),
            ("{#path}", "#/foo/bar"),
            ("X{.var}", "X.value"),
            ("{/var,x}/here", "/value/1024/here"),
            ("{;x,y,empty}", ";x=1024;y=768;empty"),
            ("{?x,y,empty}", "?x=1024&y=768&empty="),
            ("?fixed=yes{&x}", "?fixed=yes&x=1024"),
            ("{var:3}", "val"),
            ("{list}", "red,green,blue"),
            ("{list*}", "red,green,blue"),
            ("{/list*}", "/red/green/blue"),
            ("{?list}", "?list=red,green,blue"),
            ("{?list*}", "?list=red&list=green&list=blue"),
            ("{?undef}", ""),
        ];
        for (template, expected) in cases {
            assert_eq!(expand_template(template, &v).unwrap(), expected, "{template}");
        }
    }

    #[test]
    fn reserved_expansion_keeps_escapes() {
        let v = vars(&[("p", scalar("a%20b c"))]);
        assert_eq!(expand_template("{+p}", &v).unwrap(), "a%20b%20c");
        assert_eq!(expand_template("{p}", &v).unwrap(), "a%2520b%20c");
    }

    #[test]
    fn rejects_malformed_templates() {
        let v = BTreeMap::new();
        assert!(expand_template("/events{?title", &v).is_err());
        assert!(expand_template("/events}", &v).is_err());
        assert!(expand_template("/{=x}", &v).is_err());
        assert!(expand_template("/{x:0}", &v).is_err());
    }

    #[test]
    fn reads_template_node() {
        let mut g = Graph::new();
        let tpl = g.create_node(None);
        g.add_type(tpl, hydra::IRI_TEMPLATE);
        g.add_value(tpl, hydra::TEMPLATE, "/events{?title,from}");

        for (var, prop, required) in [("title", TITLE, true), ("from", "http://example.com/from", false)] {
            let m = g.create_node(None);
            g.add_value(m, hydra::VARIABLE, var);
            g.add_value(m, hydra::PROPERTY, Value::reference(prop));
            g.add_value(m, hydra::REQUIRED, required);
            let m_id = g.node(m).id().to_string();
            g.add_value(tpl, hydra::MAPPING, Value::reference(m_id));
        }
        let title_node = g.get_node(TITLE).unwrap();
        g.add_value(title_node, "http://www.w3.org/2000/01/rdf-schema#label", "Title");

        let t = IriTemplate::from_node(&g, tpl).unwrap();
        assert_eq!(t.template(), "/events{?title,from}");
        assert_eq!(t.variable_mappings(false).len(), 2);
        assert_eq!(
            t.variable_properties(true),
            BTreeMap::from([("title", TITLE)])
        );
        assert_eq!(t.variable_nodes(&g, false).len(), 2);
        assert_eq!(t.variable_nodes(&g, false)["title"].id(), TITLE);
    }

    #[test]
    fn template_without_mappings() {
        let mut g = Graph::new();
        let tpl = g.create_node(None);
        g.add_value(tpl, hydra::TEMPLATE, "/static");
        let t = IriTemplate::from_node(&g, tpl).unwrap();
        assert!(t.variable_mappings(false).is_empty());
        assert_eq!(t.expand(&Args::new()).unwrap(), "/static");

        let bare = g.create_node(None);
        assert!(IriTemplate::from_node(&g, bare).is_none());
    }
}
