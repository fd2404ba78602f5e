//! The client: API documentation, command construction, execution, and
//! response processing.
//!
//! # Design
//!
//! [`Client`] owns the transport behind an [`Arc`] and the API documentation
//! fetched at [`Client::connect`]. Graphs it hands out ([`LiveGraph`]) hold
//! the transport only weakly, so dropping the client stops any further lazy
//! loading without invalidating the graphs themselves.
//!
//! A single invocation is sequential: build a [`Command`], [`Client::execute`]
//! it, then [`Client::process_response`]. Independent commands may run
//! concurrently; the client is `Send + Sync`.

use std::sync::Arc;

use hydralink::vocab::JSON_LD;
use hydralink::{
    iri, ApiDocumentation, Args, Command, CommandBuilder, Graph, HydraError, NodeId, Operation,
    ResponseMode,
};
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::live::LiveGraph;
use crate::transport::{fetch_document, fetch_document_at, parse_response_body, HttpTransport, Response, Transport};

// ---------------------------------------------------------------------------
// Processed
// ---------------------------------------------------------------------------

/// Outcome of [`Client::process_response`], per the command's
/// [`ResponseMode`].
#[derive(Debug)]
pub enum Processed {
    Raw(Response),
    Parsed(LiveGraph),
}

impl Processed {
    pub fn into_graph(self) -> Option<LiveGraph> {
        match self {
            Processed::Parsed(graph) => Some(graph),
            Processed::Raw(_) => None,
        }
    }

    pub fn into_response(self) -> Option<Response> {
        match self {
            Processed::Raw(response) => Some(response),
            Processed::Parsed(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Entry point for talking to one Hydra API.
pub struct Client {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    api_doc: Arc<ApiDocumentation>,
}

impl Client {
    /// Connect over HTTP using `config`, fetching the API documentation.
    pub async fn connect(config: ClientConfig) -> Result<Self, ClientError> {
        let transport = HttpTransport::from_config(&config)?;
        Self::with_transport(config, Arc::new(transport)).await
    }

    /// Connect over a caller-provided transport.
    ///
    /// The documentation is fetched from the configured documentation URL,
    /// or from the entry point when none is configured, and is parsed with
    /// the entry point as its base.
    pub async fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ClientError> {
        if !iri::is_absolute(&config.entrypoint) {
            return Err(ClientError::InvalidUrl(config.entrypoint.clone()));
        }
        let doc_url = config.documentation_url().to_string();
        let doc = fetch_document_at(transport.as_ref(), &doc_url, &config.entrypoint).await?;
        let graph = doc.into_graph();
        info!(
            "client: loaded API documentation from {doc_url} ({} nodes)",
            graph.len()
        );

        Ok(Self {
            api_doc: Arc::new(ApiDocumentation::new(doc_url, graph)),
            config,
            transport,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn api_documentation(&self) -> &ApiDocumentation {
        &self.api_doc
    }

    /// The documented operation `id`. Relative identifiers are resolved
    /// against the documentation URL.
    pub fn get_operation(&self, id: &str) -> Option<Operation> {
        self.api_doc.get_operation(id).or_else(|| {
            self.api_doc
                .get_operation(&iri::resolve(Some(self.api_doc.url()), id))
        })
    }

    /// Every operation the documentation describes.
    pub fn get_operations(&self) -> Vec<Operation> {
        self.api_doc.operations()
    }

    pub fn command_builder(&self) -> CommandBuilder<'_> {
        CommandBuilder::new(&self.api_doc).strict_templates(self.config.strict_templates)
    }

    /// Build a command for the documented operation `operation_id`.
    pub fn get_command(&self, operation_id: &str, args: Args) -> Result<Command, ClientError> {
        let operation = self
            .get_operation(operation_id)
            .ok_or_else(|| HydraError::OperationNotFound(operation_id.to_string()))?;
        Ok(self.command_builder().build(&operation, args)?)
    }

    /// Build a command for `operation_id` on `node`: the node's properties
    /// and identifier serve as arguments, overridden by `args`.
    pub fn node_command(
        &self,
        graph: &LiveGraph,
        node: NodeId,
        operation_id: &str,
        args: Args,
    ) -> Result<Command, ClientError> {
        self.get_command(operation_id, args.merged_over(graph.args_for(node)))
    }

    /// Wrap `graph` so its nodes can be loaded through this client.
    pub fn bind(&self, graph: Graph) -> LiveGraph {
        LiveGraph::new(
            graph,
            Arc::downgrade(&self.transport),
            Some(Arc::clone(&self.api_doc)),
            self.config.duplicate_policy,
        )
    }

    /// `GET` the resource at `url` (resolved against the entry point).
    pub async fn get_resource(&self, url: &str) -> Result<LiveGraph, ClientError> {
        let url = self.resolve(url)?;
        let doc = fetch_document(self.transport.as_ref(), &url).await?;
        Ok(self.bind(doc.into_graph()))
    }

    /// Send `command` and return the transport response.
    ///
    /// Fails before any request is made if the operation expects a type the
    /// payload does not contain.
    pub async fn execute(&self, command: &Command) -> Result<Response, ClientError> {
        command.validate_payload()?;
        let url = self.resolve(command.target())?;
        let body = command.body(false);

        let mut headers = vec![("Accept", JSON_LD)];
        if body.is_some() {
            headers.push(("Content-Type", JSON_LD));
        }

        info!("client: {} {url} ({})", command.method(), command.operation().id());
        let response = self
            .transport
            .request(command.method(), &url, &headers, body)
            .await?;
        debug!("client: {} {url} -> {}", command.method(), response.status);
        Ok(response)
    }

    /// Interpret `response` according to the command's response mode.
    ///
    /// Parsed responses are based at the `Location` header when present,
    /// else at the requested URL.
    pub async fn process_response(
        &self,
        command: &Command,
        response: Response,
    ) -> Result<Processed, ClientError> {
        if command.response_mode() == ResponseMode::Raw {
            return Ok(Processed::Raw(response));
        }

        let base = match &response.location {
            Some(location) => iri::resolve(Some(&response.url), location),
            None => response.url.clone(),
        };
        let graph = if response.body.trim().is_empty() {
            Graph::for_document(base)
        } else {
            parse_response_body(self.transport.as_ref(), &response.body, &base)
                .await?
                .into_graph()
        };
        Ok(Processed::Parsed(self.bind(graph)))
    }

    /// [`execute`](Self::execute) followed by
    /// [`process_response`](Self::process_response).
    pub async fn invoke(&self, command: &Command) -> Result<Processed, ClientError> {
        let response = self.execute(command).await?;
        self.process_response(command, response).await
    }

    fn resolve(&self, target: &str) -> Result<String, ClientError> {
        let url = iri::resolve(Some(&self.config.entrypoint), target);
        if iri::is_absolute(&url) {
            Ok(url)
        } else {
            Err(ClientError::InvalidUrl(target.to_string()))
        }
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("entrypoint", &self.config.entrypoint)
            .field("documentation", &self.api_doc.url())
            .finish()
    }
}

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use axum::extract::{RawQuery, State};
    use axum::http::{header, HeaderMap, StatusCode};
    use axum::response::IntoResponse;
    use axum::routing::{get, post};
    use axum::Router;
    use hydralink::vocab::hydra;
    use hydralink::Value;
    use tokio::net::TcpListener;

    const CREATE_EVENT: &str = "https://api.example/vocab#createEvent";
    const SEARCH_EVENTS: &str = "https://api.example/vocab#searchEvents";
    const EVENT: &str = "https://api.example/vocab#Event";
    const TITLE: &str = "https://api.example/vocab#title";

    const DOC: &str = r#"{
        "@context": {
            "hydra": "http://www.w3.org/ns/hydra/core#",
            "vocab": "https://api.example/vocab#",
            "rdfs": "http://www.w3.org/2000/01/rdf-schema#"
        },
        "@graph": [
            {
                "@id": "vocab:createEvent",
                "@type": "hydra:Operation",
                "hydra:method": "POST",
                "hydra:expects": { "@id": "vocab:Event" }
            },
            {
                "@id": "vocab:searchEvents",
                "@type": "hydra:Operation",
                "hydra:method": "GET",
                "hydra:template": {
                    "hydra:template": "/events{?title}",
                    "hydra:mapping": {
                        "hydra:variable": "title",
                        "hydra:property": { "@id": "vocab:title" },
                        "hydra:required": true
                    }
                }
            },
            { "@id": "vocab:title", "rdfs:domain": { "@id": "vocab:Event" } }
        ]
    }"#;

    /// Requests the mock API received: method, content type, body.
    type Seen = Arc<Mutex<Vec<(String, Option<String>, String)>>>;

    async fn doc_handler() -> impl IntoResponse {
        ([(header::CONTENT_TYPE, JSON_LD)], DOC)
    }

    async fn create_handler(State(seen): State<Seen>, headers: HeaderMap, body: String) -> impl IntoResponse {
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        seen.lock().unwrap().push(("POST".into(), content_type, body));
        (
            StatusCode::CREATED,
            [(header::LOCATION, "/events/1")],
            format!(r#"{{ "@id": "", "{TITLE}": "Launch" }}"#),
        )
    }

    async fn search_handler(State(seen): State<Seen>, RawQuery(query): RawQuery) -> impl IntoResponse {
        seen.lock()
            .unwrap()
            .push(("GET".into(), None, query.unwrap_or_default()));
        r#"{ "@id": "", "http://www.w3.org/ns/hydra/core#totalItems": 0 }"#
    }

    async fn event_handler() -> impl IntoResponse {
        format!(r#"{{ "@id": "", "@type": "{EVENT}", "{TITLE}": "Old" }}"#)
    }

    /// Spawn a loopback axum server and return its base URL.
    async fn spawn_mock_api(seen: Seen) -> String {
        let app = Router::new()
            .route("/doc", get(doc_handler))
            .route("/events", get(search_handler))
            .route("/events/1", get(event_handler).post(create_handler))
            .route("/events/new-uri", post(create_handler))
            .with_state(seen);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn connect() -> (Client, String, Seen) {
        let seen: Seen = Arc::default();
        let base = spawn_mock_api(Arc::clone(&seen)).await;
        let mut config = ClientConfig::new(format!("{base}/"));
        config.documentation = Some(format!("{base}/doc"));
        let client = Client::connect(config).await.unwrap();
        (client, base, seen)
    }

    #[tokio::test]
    async fn connect_reads_documentation() {
        let (client, base, _) = connect().await;
        assert_eq!(client.api_documentation().url(), format!("{base}/doc"));

        let ids: Vec<String> = client
            .get_operations()
            .iter()
            .map(|op| op.id().to_string())
            .collect();
        assert_eq!(ids, [CREATE_EVENT, SEARCH_EVENTS]);
        assert_eq!(
            client.get_operation(CREATE_EVENT).unwrap().method(),
            Some("POST")
        );
    }

    #[tokio::test]
    async fn unknown_operation_is_reported() {
        let (client, _, _) = connect().await;
        let err = client
            .get_command("https://api.example/vocab#nope", Args::new())
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Hydra(HydraError::OperationNotFound(ref id)) if id == "https://api.example/vocab#nope"
        ));
    }

    #[tokio::test]
    async fn post_command_sends_payload_and_parses_response() {
        let (client, base, seen) = connect().await;
        let target = format!("{base}/events/new-uri");
        let cmd = client
            .get_command(
                CREATE_EVENT,
                Args::new().with_id(target.clone()).with(TITLE, "Launch"),
            )
            .unwrap();
        assert_eq!(cmd.target(), target);
        assert_eq!(cmd.method(), "POST");

        let graph = client.invoke(&cmd).await.unwrap().into_graph().unwrap();
        let created = graph.node_id(&format!("{base}/events/1")).unwrap();
        assert_eq!(
            graph.property(created, TITLE, false).await,
            Some(vec![Value::from("Launch")])
        );

        let seen = seen.lock().unwrap();
        let (method, content_type, body) = &seen[0];
        assert_eq!(method, "POST");
        assert_eq!(content_type.as_deref(), Some(JSON_LD));
        assert!(body.contains(EVENT));
        assert!(body.contains("Launch"));
    }

    #[tokio::test]
    async fn raw_mode_returns_response_untouched() {
        let (client, base, _) = connect().await;
        let cmd = client
            .get_command(
                CREATE_EVENT,
                Args::new()
                    .with_id(format!("{base}/events/new-uri"))
                    .with(TITLE, "Launch"),
            )
            .unwrap()
            .with_response_mode(ResponseMode::Raw);

        let response = client.invoke(&cmd).await.unwrap().into_response().unwrap();
        assert_eq!(response.status, 201);
        assert_eq!(response.location.as_deref(), Some("/events/1"));
        assert!(response.body.contains("Launch"));
    }

    #[tokio::test]
    async fn template_target_resolves_against_entrypoint() {
        let (client, base, seen) = connect().await;
        let cmd = client
            .get_command(SEARCH_EVENTS, Args::new().with(TITLE, "Launch"))
            .unwrap();
        assert_eq!(cmd.target(), "/events?title=Launch");
        assert!(cmd.payload().is_none());

        let response = client.execute(&cmd).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.url, format!("{base}/events?title=Launch"));
        assert_eq!(seen.lock().unwrap()[0].2, "title=Launch");
    }

    #[tokio::test]
    async fn parsed_response_without_location_is_based_at_request_url() {
        let (client, base, _) = connect().await;
        let cmd = client
            .get_command(SEARCH_EVENTS, Args::new().with(TITLE, "Launch"))
            .unwrap();
        assert_eq!(cmd.response_mode(), ResponseMode::Parsed);

        let graph = client.invoke(&cmd).await.unwrap().into_graph().unwrap();
        let request_url = format!("{base}/events?title=Launch");
        let root = graph.node_id(&request_url).unwrap();
        assert!(graph.read().node(root).is_loaded());
        assert_eq!(
            graph.property(root, hydra::TOTAL_ITEMS, false).await,
            Some(vec![Value::from(0u64)])
        );
    }

    #[tokio::test]
    async fn node_command_overlays_args_on_node_properties() {
        let (client, base, seen) = connect().await;
        let event_url = format!("{base}/events/1");
        let graph = client.get_resource("/events/1").await.unwrap();
        let event = graph.node_by_type(EVENT).unwrap();

        let cmd = client
            .node_command(&graph, event, CREATE_EVENT, Args::new().with(TITLE, "New"))
            .unwrap();
        assert_eq!(cmd.target(), event_url);
        let payload = cmd.payload().unwrap();
        let node = payload.node(payload.node_by_type(EVENT).unwrap());
        assert_eq!(node.id(), event_url);
        assert_eq!(node.first_str(TITLE), Some("New"));

        client.execute(&cmd).await.unwrap();
        assert!(seen.lock().unwrap()[0].2.contains("New"));
    }

    #[tokio::test]
    async fn mismatched_payload_is_rejected_before_sending() {
        let (client, base, seen) = connect().await;
        let cmd = client
            .get_command(CREATE_EVENT, Args::new().with_id(format!("{base}/events/1")))
            .unwrap()
            .with_payload(Graph::new());
        assert!(matches!(
            client.execute(&cmd).await,
            Err(ClientError::Hydra(HydraError::MissingExpectedType { .. }))
        ));
        assert!(seen.lock().unwrap().is_empty());
    }
}
