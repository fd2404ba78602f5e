//! `hlink`: command-line client for Hydra-described Web APIs.
//!
//! Three subcommands:
//!
//! - **`docs`**: list the classes and operations the API documents.
//! - **`inspect`**: fetch a resource and list the operations applicable to it.
//! - **`invoke`**: build a command for a documented operation and execute it.
//!
//! The API is configured with `--entrypoint` (or `HYDRA_ENTRYPOINT`); see
//! `hydralink_client::ClientConfig` for the other variables.

use std::process;

use clap::{Parser, Subcommand};
use hydralink::{jsonld, Args, DuplicatePolicy, Operation, ResponseMode, Value};
use hydralink_client::{Client, ClientConfig, LiveGraph, Processed};

/// hlink: Hydra hypermedia API client
#[derive(Parser)]
#[command(name = "hlink", version, about, long_about = None)]
struct Cli {
    /// Absolute URL of the API entry point.
    #[arg(long, env = "HYDRA_ENTRYPOINT", value_name = "URL", global = true)]
    entrypoint: Option<String>,

    /// URL of the API documentation (defaults to the entry point).
    #[arg(long, env = "HYDRA_DOCUMENTATION", value_name = "URL", global = true)]
    documentation: Option<String>,

    /// HTTP timeout in seconds.
    #[arg(long, env = "HYDRA_TIMEOUT_SECS", value_name = "SECS", global = true)]
    timeout: Option<u64>,

    /// Value of the User-Agent header.
    #[arg(long, env = "HYDRA_USER_AGENT", global = true)]
    user_agent: Option<String>,

    /// Fail when an IRI template leaves a required variable unbound.
    #[arg(long, global = true)]
    strict_templates: bool,

    /// Report each operation once even when several sources attach it.
    #[arg(long, global = true)]
    dedupe: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the classes and operations described by the API documentation.
    Docs,

    /// Fetch a resource and list the operations applicable to it.
    ///
    /// Operations come from the resource itself, from its types, and from
    /// the properties that link to it, in that order.
    Inspect {
        /// Resource URL, absolute or relative to the entry point.
        url: String,

        /// Dereference the resource's type and property nodes when they
        /// carry no operations.
        #[arg(long)]
        load: bool,
    },

    /// Invoke a documented operation and print the response.
    ///
    /// Examples:
    ///   hlink invoke https://api.example/vocab#createEvent \
    ///     --id https://api.example/events/new \
    ///     --arg https://api.example/vocab#title=Launch
    ///   hlink invoke https://api.example/vocab#searchEvents \
    ///     --arg https://api.example/vocab#title=Launch --raw
    Invoke {
        /// IRI of the operation in the API documentation.
        operation: String,

        /// Explicit target (and payload node) identifier.
        #[arg(long, value_name = "IRI")]
        id: Option<String>,

        /// An argument: PROPERTY=VALUE. Wrap VALUE in <...> to pass a link,
        /// and PROPERTY in <...> when its IRI contains '='. Repeat for
        /// multiple arguments.
        #[arg(long = "arg", value_name = "PROPERTY=VALUE")]
        args: Vec<String>,

        /// Print the response body as received instead of the parsed graph.
        #[arg(long)]
        raw: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hydralink_client=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let client = Client::connect(config_from(&cli))
        .await
        .unwrap_or_else(|e| fatal(&format!("failed to connect: {e}")));

    match cli.command {
        Command::Docs => print_docs(&client),

        Command::Inspect { url, load } => {
            let graph = client
                .get_resource(&url)
                .await
                .unwrap_or_else(|e| fatal(&format!("failed to fetch {url}: {e}")));
            inspect(&graph, &url, load).await;
        }

        Command::Invoke {
            operation,
            id,
            args,
            raw,
        } => {
            let mut parsed = Args::new();
            if let Some(id) = id {
                parsed = parsed.with_id(id);
            }
            for raw_arg in &args {
                let (property, value) = parse_arg(raw_arg);
                parsed.push(property, value);
            }

            let mode = if raw { ResponseMode::Raw } else { ResponseMode::Parsed };
            let command = client
                .get_command(&operation, parsed)
                .unwrap_or_else(|e| fatal(&e.to_string()))
                .with_response_mode(mode);

            match client.invoke(&command).await {
                Ok(Processed::Raw(response)) => {
                    eprintln!("{} {}", response.status, response.url);
                    println!("{}", pretty_json(&response.body));
                }
                Ok(Processed::Parsed(graph)) => {
                    println!("{}", jsonld::serialize(&graph.snapshot(), true));
                }
                Err(e) => fatal(&e.to_string()),
            }
        }
    }
}

/// Client configuration: command-line flags first, then the environment.
fn config_from(cli: &Cli) -> ClientConfig {
    let lookup = |var: &str| match var {
        "HYDRA_ENTRYPOINT" => cli.entrypoint.clone(),
        "HYDRA_DOCUMENTATION" => cli.documentation.clone(),
        "HYDRA_TIMEOUT_SECS" => cli.timeout.map(|t| t.to_string()),
        "HYDRA_USER_AGENT" => cli.user_agent.clone(),
        other => std::env::var(other).ok(),
    };
    let mut config = ClientConfig::from_lookup(lookup).unwrap_or_else(|e| fatal(&e.to_string()));
    if cli.strict_templates {
        config.strict_templates = true;
    }
    if cli.dedupe {
        config.duplicate_policy = DuplicatePolicy::Suppress;
    }
    config
}

fn print_docs(client: &Client) {
    let doc = client.api_documentation();
    println!("documentation: {}", doc.url());

    let classes = doc.supported_classes();
    if !classes.is_empty() {
        println!("\nclasses:");
    }
    for class in classes {
        println!("  {}", class.id());
        for property in doc.properties_of(class.id()) {
            println!("    - {property}");
        }
    }

    let operations = client.get_operations();
    if !operations.is_empty() {
        println!("\noperations:");
    }
    for op in &operations {
        println!("  {}", describe(op));
    }
}

async fn inspect(graph: &LiveGraph, url: &str, load: bool) {
    let Some(root) = graph.node_id(url).or_else(|| {
        let snapshot = graph.read();
        let first = snapshot.nodes().next().map(|(id, _)| id);
        first
    }) else {
        fatal(&format!("{url} contains no nodes"));
    };

    {
        let snapshot = graph.read();
        let node = snapshot.node(root);
        println!("{}", node.id());
        for t in node.types() {
            println!("  a {t}");
        }
    }

    let operations = graph.operations(root, load).await;
    if operations.is_empty() {
        println!("  (no operations)");
    }
    for op in &operations {
        println!("  {}", describe(op));
    }
}

/// One line per operation: method, identifier, title, and payload types.
fn describe(op: &Operation) -> String {
    let mut line = format!("{:<7} {}", op.method().unwrap_or("GET"), op.id());
    if let Some(name) = op.name() {
        line.push_str(&format!(" \"{name}\""));
    }
    if let Some(expects) = op.expects() {
        line.push_str(&format!(" expects {expects}"));
    }
    if let Some(returns) = op.returns() {
        line.push_str(&format!(" returns {returns}"));
    }
    if let Some(template) = op.iri_template() {
        line.push_str(&format!(" template {}", template.template()));
    }
    line
}

/// Split `PROPERTY=VALUE`; a `<...>` value becomes a link.
fn parse_arg(raw: &str) -> (String, Value) {
    split_arg(raw).unwrap_or_else(|| {
        fatal(&format!(
            "invalid --arg {raw:?}: expected format PROPERTY=VALUE or <PROPERTY>=VALUE"
        ))
    })
}

// A property IRI containing `=` must be written as `<IRI>=VALUE`.
fn split_arg(raw: &str) -> Option<(String, Value)> {
    let (property, value) = match raw.strip_prefix('<') {
        Some(rest) => rest.split_once(">=")?,
        None => raw.split_once('=')?,
    };
    if property.is_empty() {
        return None;
    }
    let value = match value.strip_prefix('<').and_then(|v| v.strip_suffix('>')) {
        Some(link) => Value::reference(link),
        None => Value::from(value),
    };
    Some((property.to_string(), value))
}

/// Pretty-print `body` when it is JSON, else return it unchanged.
fn pretty_json(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| serde_json::to_string_pretty(&json).ok())
        .unwrap_or_else(|| body.to_string())
}

/// Print an error message to stderr and exit with code 2.
fn fatal(msg: &str) -> ! {
    eprintln!("hlink: {msg}");
    process::exit(2);
}

// --- tests -------------------------------------------------------------------
