//! Client configuration, populated from environment variables.

use std::time::Duration;

use hydralink::{iri, DuplicatePolicy};

/// Errors raised while reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("{0} must be set")]
    Missing(&'static str),

    /// A variable is set to a value that cannot be used.
    #[error("{var}={value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Runtime configuration for a [`Client`](crate::Client).
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | `HYDRA_ENTRYPOINT` | (required) | Absolute URL of the API entry point |
/// | `HYDRA_DOCUMENTATION` | entry point | URL of the API documentation |
/// | `HYDRA_TIMEOUT_SECS` | `30` | Per-request HTTP timeout |
/// | `HYDRA_USER_AGENT` | `hydralink/<version>` | `User-Agent` header value |
/// | `HYDRA_STRICT_TEMPLATES` | `false` | Fail when a required template variable is unbound |
/// | `HYDRA_DEDUPLICATE_OPERATIONS` | `false` | Report each operation once per node |
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Absolute URL of the API entry point. Relative command targets are
    /// resolved against it.
    pub entrypoint: String,

    /// Where to fetch the API documentation from.
    /// `None` means the entry point itself carries it.
    pub documentation: Option<String>,

    pub timeout: Duration,

    pub user_agent: String,

    /// Reject commands whose IRI template leaves a required variable unbound.
    pub strict_templates: bool,

    /// How operations reachable through several sources are reported.
    pub duplicate_policy: DuplicatePolicy,
}

impl ClientConfig {
    /// A configuration for `entrypoint` with every other setting defaulted.
    pub fn new(entrypoint: impl Into<String>) -> Self {
        Self {
            entrypoint: entrypoint.into(),
            documentation: None,
            timeout: Duration::from_secs(30),
            user_agent: default_user_agent(),
            strict_templates: false,
            duplicate_policy: DuplicatePolicy::Keep,
        }
    }

    /// Populate config from environment variables, applying defaults where absent.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Populate config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let entrypoint = lookup("HYDRA_ENTRYPOINT").ok_or(ConfigError::Missing("HYDRA_ENTRYPOINT"))?;
        if !iri::is_absolute(&entrypoint) {
            return Err(ConfigError::Invalid {
                var: "HYDRA_ENTRYPOINT",
                value: entrypoint,
                reason: "must be an absolute URL",
            });
        }

        let timeout_secs = match lookup("HYDRA_TIMEOUT_SECS") {
            Some(v) => v.parse::<u64>().map_err(|_| ConfigError::Invalid {
                var: "HYDRA_TIMEOUT_SECS",
                value: v.clone(),
                reason: "must be a whole number of seconds",
            })?,
            None => 30,
        };

        let documentation = lookup("HYDRA_DOCUMENTATION")
            .map(|doc| iri::resolve(Some(&entrypoint), &doc));

        Ok(Self {
            documentation,
            timeout: Duration::from_secs(timeout_secs),
            user_agent: lookup("HYDRA_USER_AGENT").unwrap_or_else(default_user_agent),
            strict_templates: flag(&lookup, "HYDRA_STRICT_TEMPLATES")?,
            duplicate_policy: if flag(&lookup, "HYDRA_DEDUPLICATE_OPERATIONS")? {
                DuplicatePolicy::Suppress
            } else {
                DuplicatePolicy::Keep
            },
            entrypoint,
        })
    }

    /// The URL the API documentation is fetched from.
    pub fn documentation_url(&self) -> &str {
        self.documentation.as_deref().unwrap_or(&self.entrypoint)
    }
}

/// `hydralink/<crate version>`.
pub fn default_user_agent() -> String {
    format!("hydralink/{}", env!("CARGO_PKG_VERSION"))
}

fn flag(lookup: &impl Fn(&str) -> Option<String>, var: &'static str) -> Result<bool, ConfigError> {
    match lookup(var).as_deref().map(str::to_ascii_lowercase).as_deref() {
        None | Some("") | Some("0") | Some("false") | Some("no") => Ok(false),
        Some("1") | Some("true") | Some("yes") => Ok(true),
        Some(other) => Err(ConfigError::Invalid {
            var,
            value: other.to_string(),
            reason: "expected true or false",
        }),
    }
}

// --- tests -------------------------------------------------------------------
