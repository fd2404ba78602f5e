//! Async client for Hydra-described Web APIs.
//!
//! Builds on the I/O-free `hydralink` engine: this crate fetches the API
//! documentation, executes commands over HTTP, turns responses into graphs,
//! and loads nodes lazily when a caller needs more than a response carried.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`client`] | [`Client`]: connect, build, execute, process |
//! | [`live`] | [`LiveGraph`]: at-most-once lazy node loading |
//! | [`transport`] | [`Transport`] trait and the `reqwest` implementation |
//! | [`config`] | [`ClientConfig`] from environment variables |
//! | [`error`] | [`ClientError`] |

pub mod client;
pub mod config;
pub mod error;
pub mod live;
pub mod transport;

pub use client::{Client, Processed};
pub use config::{ClientConfig, ConfigError};
pub use error::ClientError;
pub use live::LiveGraph;
pub use transport::{HttpTransport, Response, Transport};
