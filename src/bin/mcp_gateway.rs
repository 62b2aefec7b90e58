//! mcp-gateway — 网关服务、本地调用与部署对比的命令行入口
//!
//! Usage:
//!   mcp-gateway serve [--config <path>] [--bind <addr>]
//!   mcp-gateway list
//!   mcp-gateway invoke <tool> [--params <json>] [--request-id <id>]
//!   mcp-gateway compare --a-url <url> --b-url <url> [options]
//!   mcp-gateway version

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use mcp_gateway::compare::{self, CompareOptions, ComparisonEngine, HttpEndpoint};
use mcp_gateway::{server, tools, Dispatcher, GatewayConfig, ToolRequest};

#[derive(Parser)]
#[command(name = "mcp-gateway")]
#[command(about = "Schema-validated tool gateway and deployment comparison", long_about = None)]
struct Cli {
    /// YAML configuration file (falls back to MCP_GATEWAY_CONFIG)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP binding
    Serve {
        /// Bind address, overrides server.bind
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Print the registered tools as JSON
    List,
    /// Dispatch one request locally and print the envelope
    Invoke {
        /// Tool name
        tool: String,
        /// Parameters as a JSON object
        #[arg(short, long, default_value = "{}")]
        params: String,
        /// Correlation id; generated when omitted
        #[arg(long)]
        request_id: Option<String>,
    },
    /// Compare two deployed gateways
    Compare {
        /// Base URL of the first gateway
        #[arg(long)]
        a_url: String,
        /// Base URL of the second gateway
        #[arg(long)]
        b_url: String,
        #[arg(long)]
        a_label: Option<String>,
        #[arg(long)]
        b_label: Option<String>,
        /// Requests per endpoint
        #[arg(short = 'n', long)]
        requests: Option<usize>,
        /// In-flight requests per endpoint
        #[arg(long)]
        concurrency: Option<usize>,
        /// Per-request timeout in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
        /// Where to save the JSON report
        #[arg(short, long, default_value = "comparison_report.json")]
        output: PathBuf,
    },
    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = GatewayConfig::load(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Commands::Serve { bind } => cmd_serve(&config, bind).await,
        Commands::List => cmd_list(&config).await,
        Commands::Invoke {
            tool,
            params,
            request_id,
        } => cmd_invoke(&config, tool, &params, request_id).await,
        Commands::Compare {
            a_url,
            b_url,
            a_label,
            b_label,
            requests,
            concurrency,
            timeout_ms,
            output,
        } => {
            let compare_config = config
                .with_compare_overrides(requests, concurrency, timeout_ms)
                .context("invalid compare options")?
                .compare;
            let [default_a, default_b] = compare_config.labels.clone();
            let a = HttpEndpoint::new(a_label.unwrap_or(default_a), &a_url)?;
            let b = HttpEndpoint::new(b_label.unwrap_or(default_b), &b_url)?;
            cmd_compare(CompareOptions::from(&compare_config), a, b, output).await
        }
        Commands::Version => {
            println!("mcp-gateway {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn dispatcher(config: &GatewayConfig) -> Result<Arc<Dispatcher>> {
    let registry = tools::default_registry().context("registering built-in tools")?;
    Ok(Arc::new(Dispatcher::from_config(
        Arc::new(registry),
        &config.dispatch,
    )))
}

async fn cmd_serve(config: &GatewayConfig, bind: Option<String>) -> Result<()> {
    let bind = bind.unwrap_or_else(|| config.server.bind.clone());
    let addr: SocketAddr = bind
        .parse()
        .with_context(|| format!("invalid bind address '{}'", bind))?;
    server::serve(addr, dispatcher(config)?).await?;
    Ok(())
}

async fn cmd_list(config: &GatewayConfig) -> Result<()> {
    let tools = dispatcher(config)?.list_tools().await;
    println!("{}", serde_json::to_string_pretty(&tools)?);
    Ok(())
}

async fn cmd_invoke(
    config: &GatewayConfig,
    tool: String,
    params: &str,
    request_id: Option<String>,
) -> Result<()> {
    let params: serde_json::Value =
        serde_json::from_str(params).context("--params must be a JSON object")?;
    if !params.is_object() {
        anyhow::bail!("--params must be a JSON object");
    }
    let request = match request_id {
        Some(id) => ToolRequest::new(tool, id),
        None => ToolRequest::with_generated_id(tool),
    }
    .with_parameters(params);

    let response = dispatcher(config)?.handle(&request).await;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

async fn cmd_compare(
    options: CompareOptions,
    a: HttpEndpoint,
    b: HttpEndpoint,
    output: PathBuf,
) -> Result<()> {
    let engine = ComparisonEngine::new(options)?;

    let token = CancellationToken::new();
    let on_ctrl_c = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_ctrl_c.cancel();
        }
    });

    let report = engine.compare_with_cancel(&a, &b, token).await;
    println!("{}", compare::render_text(&report));

    compare::save_json(&report, &output)
        .with_context(|| format!("saving report to {}", output.display()))?;
    println!("Detailed report saved to: {}", output.display());
    Ok(())
}
