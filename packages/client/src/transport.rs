//! HTTP transport abstraction.
//!
//! The [`Transport`] trait is the seam between the client and the network.
//! [`HttpTransport`] is the `reqwest` implementation used in production;
//! tests may substitute their own.

use async_trait::async_trait;
use hydralink::{iri, jsonld, Document, Parser};
use reqwest::header::{HeaderName, LOCATION};
use reqwest::Method;
use serde_json::Value as Json;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::ClientError;

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// A transport response with its body read to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    /// The URL that was requested.
    pub url: String,
    /// Value of the `Location` header, if any.
    pub location: Option<String>,
    pub body: String,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// Issues HTTP requests on behalf of the client and of lazily loaded nodes.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(
        &self,
        method: &str,
        url: &str,
        headers: &[(&str, &str)],
        body: Option<String>,
    ) -> Result<Response, ClientError>;
}

/// [`Transport`] over a pooled [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// A transport with the timeout and user agent from `config`.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(
        &self,
        method: &str,
        url: &str,
        headers: &[(&str, &str)],
        body: Option<String>,
    ) -> Result<Response, ClientError> {
        let method = Method::from_bytes(method.as_bytes())
            .map_err(|_| ClientError::InvalidMethod(method.to_string()))?;
        let parsed = reqwest::Url::parse(url).map_err(|_| ClientError::InvalidUrl(url.to_string()))?;

        let mut req = self.client.request(method.clone(), parsed);
        for (name, value) in headers {
            req = req.header(*name, *value);
        }
        if let Some(body) = body {
            req = req.body(body);
        }

        debug!("transport: {method} {url}");
        let response = req.send().await?;
        let status = response.status().as_u16();
        let header = |name: HeaderName| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let location = header(LOCATION);
        let body = response.text().await?;

        Ok(Response {
            status,
            url: url.to_string(),
            location,
            body,
        })
    }
}

// ---------------------------------------------------------------------------
// Document fetching
// ---------------------------------------------------------------------------

/// `GET` a JSON-LD document and parse it with `url` as its base.
///
/// Top-level remote contexts are fetched first so the parser can expand
/// terms they define. Non-2xx responses fail with
/// [`ClientError::BadStatus`].
pub async fn fetch_document(transport: &dyn Transport, url: &str) -> Result<Document, ClientError> {
    fetch_document_at(transport, url, url).await
}

/// Like [`fetch_document`], but resolving relative references against
/// `base` instead of the URL fetched.
pub async fn fetch_document_at(
    transport: &dyn Transport,
    url: &str,
    base: &str,
) -> Result<Document, ClientError> {
    let response = get_json_ld(transport, url).await?;
    parse_response_body(transport, &response.body, base).await
}

/// Parse `body` as a document based at `base`, pre-fetching any top-level
/// remote contexts it references.
pub async fn parse_response_body(
    transport: &dyn Transport,
    body: &str,
    base: &str,
) -> Result<Document, ClientError> {
    let json: Json =
        serde_json::from_str(body).map_err(|e| jsonld::ParseError::Json(e.to_string()))?;

    let mut parser = Parser::new(Some(base));
    for context_url in jsonld::remote_context_urls(&json) {
        let context_url = iri::resolve(Some(base), &context_url);
        let response = get_json_ld(transport, &context_url).await?;
        let context: Json = serde_json::from_str(&response.body)
            .map_err(|e| jsonld::ParseError::Json(e.to_string()))?;
        parser = parser.with_remote_context(&context_url, context);
    }

    Ok(parser.parse_json(&json)?)
}

async fn get_json_ld(transport: &dyn Transport, url: &str) -> Result<Response, ClientError> {
    let response = transport
        .request("GET", url, &[("Accept", hydralink::vocab::JSON_LD)], None)
        .await?;
    if !response.is_success() {
        return Err(ClientError::BadStatus(response.status));
    }
    Ok(response)
}
