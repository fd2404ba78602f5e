//! IRI classification and reference resolution.

use url::Url;

/// Prefix that marks a blank-node identifier.
pub const BLANK_PREFIX: &str = "_:";

/// Whether `id` denotes a blank node (`_:label`).
pub fn is_blank(id: &str) -> bool {
    id.starts_with(BLANK_PREFIX)
}

/// Whether `iri` is absolute, i.e. starts with an RFC 3986 scheme.
pub fn is_absolute(iri: &str) -> bool {
    let Some(colon) = iri.find(':') else {
        return false;
    };
    let scheme = &iri[..colon];
    !scheme.is_empty()
        && scheme.as_bytes()[0].is_ascii_alphabetic()
        && scheme
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'-' || b == b'.')
}

/// Resolve `reference` against `base`.
///
/// Absolute references and blank-node identifiers are returned unchanged. When
/// there is no base, or the base cannot act as one (e.g. a URN), the reference
/// is returned as given.
pub fn resolve(base: Option<&str>, reference: &str) -> String {
    if is_blank(reference) || is_absolute(reference) {
        return reference.to_string();
    }
    let Some(base) = base else {
        return reference.to_string();
    };
    match Url::parse(base).and_then(|b| b.join(reference)) {
        Ok(joined) => joined.to_string(),
        Err(_) => reference.to_string(),
    }
}

/// The IRI without its fragment, used to compare a node id with a document IRI.
pub fn without_fragment(iri: &str) -> &str {
    iri.split_once('#').map_or(iri, |(head, _)| head)
}
