//! Bedrock Investment Advisor MCP Server
//!
//! A Model Context Protocol (MCP) server exposing investment-advisory tools
//! backed by Amazon Bedrock models.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::Value;

use bedrock_advisor_mcp::bedrock::client::{BackendAdapter, BedrockClient};
use bedrock_advisor_mcp::catalog::registry::Registry;
use bedrock_advisor_mcp::config::Config;
use bedrock_advisor_mcp::error::{McpError, Result};
use bedrock_advisor_mcp::mcp::server::McpServer;
use bedrock_advisor_mcp::mcp::tools::Dispatcher;
use bedrock_advisor_mcp::mcp::types::{InvocationRequest, ListToolsResult};

/// Bedrock Investment Advisor MCP Server
#[derive(Parser)]
#[command(name = "bedrock-advisor-mcp")]
#[command(author, version, about = "Investment advisor MCP server backed by Amazon Bedrock")]
struct Cli {
    /// Config file (defaults to ~/.bedrock-advisor-mcp/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the MCP server on stdio (default)
    Serve,

    /// Print the advertised tool catalog
    Tools,

    /// Run a single tool call and print its result
    Invoke {
        /// Operation name, e.g. analyze-investment
        operation: String,

        /// Arguments as a JSON object
        #[arg(long, default_value = "{}")]
        arguments: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging; stdout carries protocol frames
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config)?;
    let registry = Arc::new(Registry::builtin()?);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let dispatcher = build_dispatcher(&config, registry)?;
            tracing::info!(
                region = %config.region,
                config_file = ?config.config_path,
                endpoint = %config.endpoint_url,
                timeout = ?config.request_timeout,
                "Starting MCP server on stdio"
            );
            let server = McpServer::new(Arc::new(dispatcher));
            server.run_stdio().await?;
        }
        Commands::Tools => {
            let dispatcher = build_dispatcher(&config, registry)?;
            let catalog = ListToolsResult {
                tools: dispatcher.list_tools(),
            };
            println!("{}", serde_json::to_string_pretty(&catalog)?);
        }
        Commands::Invoke {
            operation,
            arguments,
        } => {
            let arguments: Value = serde_json::from_str(&arguments).map_err(|e| {
                McpError::InvalidArguments {
                    message: format!("--arguments is not valid JSON: {}", e),
                }
            })?;
            let dispatcher = build_dispatcher(&config, registry)?;
            let result = dispatcher
                .invoke(InvocationRequest::new(operation, arguments))
                .await;
            println!("{}", result.text);
            if !result.succeeded {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn build_dispatcher(config: &Config, registry: Arc<Registry>) -> Result<Dispatcher> {
    let client = BedrockClient::new(config)?;
    let backend = BackendAdapter::new(Arc::new(client), config);
    Ok(Dispatcher::new(registry, backend))
}
