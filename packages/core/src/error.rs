//! Errors raised while resolving operations and constructing commands.

use thiserror::Error;

use crate::jsonld::ParseError;

/// Errors surfaced by explicit command construction and execution.
///
/// Lazy loading never produces these: a failed dereference only leaves the
/// node's properties unresolved.
#[derive(Debug, Error, PartialEq)]
pub enum HydraError {
    #[error("operation {0:?} not found in the API documentation")]
    OperationNotFound(String),

    #[error("operation {0:?} has no IRI template and no target identifier was given")]
    MissingTemplate(String),

    #[error("operation expects {expected:?} but the payload contains no node of that type")]
    MissingExpectedType { expected: String },

    #[error("required template variable {variable:?} (property {property:?}) is not bound")]
    MissingRequiredVariable { variable: String, property: String },

    #[error("invalid IRI template {template:?}: {reason}")]
    InvalidTemplate { template: String, reason: String },

    #[error("failed to parse document: {0}")]
    Parse(#[from] ParseError),
}
