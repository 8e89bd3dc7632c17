//! # jrpc CLI Entry Point
//!
//! Main binary for jrpc. Runs a demo JSON-RPC server and makes calls or
//! sends notifications from the command line.
//!
//! ## Usage
//!
//! ```bash
//! # Start the demo server
//! jrpc serve -b 127.0.0.1:8080
//!
//! # Mount it under a path and accept zero-valued params
//! jrpc serve -b 127.0.0.1:8080 --path /rpc --params-policy decode-only
//!
//! # Make a call (outputs raw JSON)
//! jrpc call add -a '{"a": 1, "b": 2}' -u http://127.0.0.1:8080
//!
//! # Send a notification
//! JRPC_URL=http://127.0.0.1:8080 jrpc notify echo -a '"hello"'
//! ```
//!
//! ## URL Format
//!
//! URLs must include the `http://` prefix; TLS is not supported. When `--url` is not
//! given, `JRPC_URL` is used, then `http://127.0.0.1:8080`.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use argh::FromArgs;
use jrpc_client::Client;
use jrpc_common::CallContext;
use jrpc_server::config::DEFAULT_MAX_BODY_BYTES;
use jrpc_server::{Dispatcher, HttpServer, ParamsPolicy, Registry, ServerConfig};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Environment variable consulted when `--url` is absent.
const URL_ENV: &str = "JRPC_URL";

const DEFAULT_URL: &str = "http://127.0.0.1:8080";

/// Validates that a URL string starts with http://
///
/// # Arguments
///
/// * `url` - The URL string to validate
/// * `description` - Human-readable description of what the URL is for (e.g., "server URL")
///
/// # Errors
///
/// Returns an error if the URL doesn't start with http://, including for
/// https:// URLs, which the client transport cannot serve
fn validate_http_url(url: &str, description: &str) -> Result<()> {
    if url.starts_with("http://") {
        Ok(())
    } else if url.starts_with("https://") {
        Err(anyhow::anyhow!(
            "Invalid {}: '{}' uses https://, which is not supported",
            description,
            url
        ))
    } else {
        Err(anyhow::anyhow!(
            "Invalid {}: '{}' must start with http://",
            description,
            url
        ))
    }
}

/// Picks the server URL: the flag, then the environment, then the default.
fn resolve_url(flag: Option<String>, env: Option<String>) -> Result<String> {
    let url = flag.or(env).unwrap_or_else(|| DEFAULT_URL.to_owned());
    validate_http_url(&url, "server URL")?;
    Ok(url)
}

/// Parses the `--args` JSON. Absent args mean the request carries no params.
fn parse_params(args: Option<&str>) -> Result<Option<Value>> {
    args.map(|raw| {
        serde_json::from_str(raw).map_err(|e| anyhow::anyhow!("Invalid JSON in args: {}", e))
    })
    .transpose()
}

fn call_context(timeout_ms: Option<u64>) -> CallContext {
    let ctx = CallContext::background();
    match timeout_ms {
        Some(ms) => ctx.with_timeout(Duration::from_millis(ms)),
        None => ctx,
    }
}

/// Main CLI structure parsed from command-line arguments.
#[derive(FromArgs)]
/// jrpc - JSON-RPC 2.0 over HTTP
struct Cli {
    #[argh(subcommand)]
    command: Commands,
}

/// Available CLI subcommands.
///
/// - **Serve**: Start the demo server
/// - **Call**: Make a single call (unix-friendly JSON output)
/// - **Notify**: Send a notification
#[derive(FromArgs)]
#[argh(subcommand)]
enum Commands {
    Serve(ServeArgs),
    Call(CallArgs),
    Notify(NotifyArgs),
}

/// Arguments for the demo server.
///
/// The server registers `echo`, `add`, `sleep` and `version`.
#[derive(FromArgs)]
#[argh(subcommand, name = "serve")]
/// start a demo JSON-RPC server
struct ServeArgs {
    /// address to bind the HTTP server to
    #[argh(option, short = 'b', default = "\"127.0.0.1:8080\".into()")]
    bind: String,

    /// HTTP path to mount the endpoint at
    ///
    /// Requests to any other path get a 404. By default every path is served.
    #[argh(option, long = "path")]
    path: Option<String>,

    /// how zero-valued params are treated: reject-zero or decode-only
    #[argh(option, long = "params-policy", default = "ParamsPolicy::RejectZero")]
    params_policy: ParamsPolicy,

    /// largest accepted request body in bytes
    #[argh(option, long = "max-body-bytes", default = "DEFAULT_MAX_BODY_BYTES")]
    max_body_bytes: usize,
}

/// Arguments for making a single call.
///
/// Outputs the raw JSON result to stdout. Error replies are reported to
/// stderr with a non-zero exit code.
///
/// # Examples
///
/// ```bash
/// jrpc call version
/// jrpc call add -a '{"a": 2, "b": 3}' | jq .
/// ```
#[derive(FromArgs)]
#[argh(subcommand, name = "call")]
/// call a method and print its result
struct CallArgs {
    /// name of the method to call
    #[argh(positional)]
    method: String,

    /// JSON params for the method; omitted when not given
    #[argh(option, short = 'a', long = "args")]
    args: Option<String>,

    /// server URL (falls back to JRPC_URL, then http://127.0.0.1:8080)
    #[argh(option, short = 'u', long = "url")]
    url: Option<String>,

    /// give up after this many milliseconds
    #[argh(option, long = "timeout-ms")]
    timeout_ms: Option<u64>,
}

/// Arguments for sending a notification.
#[derive(FromArgs)]
#[argh(subcommand, name = "notify")]
/// send a notification; no result is returned
struct NotifyArgs {
    /// name of the method to notify
    #[argh(positional)]
    method: String,

    /// JSON params for the method; omitted when not given
    #[argh(option, short = 'a', long = "args")]
    args: Option<String>,

    /// server URL (falls back to JRPC_URL, then http://127.0.0.1:8080)
    #[argh(option, short = 'u', long = "url")]
    url: Option<String>,

    /// give up after this many milliseconds
    #[argh(option, long = "timeout-ms")]
    timeout_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli: Cli = argh::from_env();

    // call and notify keep stdout clean for piping
    if matches!(cli.command, Commands::Serve(_)) {
        // Set default log level to INFO, but allow RUST_LOG env var to override
        let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    match cli.command {
        Commands::Serve(args) => run_serve(args).await,
        Commands::Call(args) => run_call(args).await,
        Commands::Notify(args) => run_notify(args).await,
    }
}

// ============================================================================
// Demo methods
// ============================================================================

#[derive(Serialize, Deserialize)]
struct Operands {
    a: f64,
    b: f64,
}

async fn echo(_ctx: CallContext, value: Value) -> Result<Value> {
    Ok(value)
}

async fn add(_ctx: CallContext, operands: Operands) -> Result<f64> {
    Ok(operands.a + operands.b)
}

/// Sleeps for the given number of milliseconds unless the call is cancelled first.
async fn sleep(ctx: CallContext, millis: u64) -> Result<u64> {
    tokio::select! {
        _ = tokio::time::sleep(Duration::from_millis(millis)) => Ok(millis),
        err = ctx.done() => Err(err.into()),
    }
}

async fn version(_ctx: CallContext) -> Result<&'static str> {
    Ok(env!("CARGO_PKG_VERSION"))
}

fn demo_registry() -> Result<Registry> {
    let registry = Registry::new();
    registry.register("echo", echo)?;
    registry.register("add", add)?;
    registry.register("sleep", sleep)?;
    registry.register("version", version)?;
    Ok(registry)
}

/// Executes the `serve` subcommand. Runs until Ctrl-C.
async fn run_serve(args: ServeArgs) -> Result<()> {
    let addr: SocketAddr = args
        .bind
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid bind address {}: {}", args.bind, e))?;

    let mut config = ServerConfig::new()
        .with_max_body_bytes(args.max_body_bytes)
        .with_params_policy(args.params_policy);
    if let Some(path) = args.path {
        config = config.with_path(path);
    }

    let registry = Arc::new(demo_registry()?);
    tracing::info!("Methods: {}", registry.methods().join(", "));
    tracing::info!("Params policy: {}", config.params_policy);
    tracing::info!("Maximum body size: {} bytes", config.max_body_bytes);
    if let Some(path) = &config.path {
        tracing::info!("Mounted at {}", path);
    }

    let dispatcher = Arc::new(Dispatcher::with_config(registry, config));
    let shutdown = dispatcher.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => shutdown.shutdown(),
            Err(e) => tracing::error!("Failed to listen for Ctrl-C: {}", e),
        }
    });

    HttpServer::new(dispatcher).run(addr).await?;
    Ok(())
}

/// Executes the `call` subcommand.
///
/// No tracing is initialized for this command so the output can be piped
/// to tools such as `jq`.
///
/// # Errors
///
/// Returns an error if:
/// - The URL or the args string is invalid
/// - The server cannot be reached or the timeout passes
/// - The server replies with an error object
async fn run_call(args: CallArgs) -> Result<()> {
    let url = resolve_url(args.url, std::env::var(URL_ENV).ok())?;
    let params = parse_params(args.args.as_deref())?;

    let client = Client::new(&url)?;
    let ctx = call_context(args.timeout_ms);
    let result: Value = client.request(&ctx, &args.method, params).await?;

    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}

/// Executes the `notify` subcommand. Prints nothing on success.
async fn run_notify(args: NotifyArgs) -> Result<()> {
    let url = resolve_url(args.url, std::env::var(URL_ENV).ok())?;
    let params = parse_params(args.args.as_deref())?;

    let client = Client::new(&url)?;
    let ctx = call_context(args.timeout_ms);
    client.notify(&ctx, &args.method, params).await?;
    Ok(())
}
