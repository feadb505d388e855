//! CLI entry point: run the HTTP API, or ingest and query from the shell.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use secondbrain_agents::{IngestInput, RootAgent};
use secondbrain_api::{serve, AppState};
use secondbrain_core::config::DEFAULT_CONFIG_PREFIX;
use secondbrain_core::BrainConfig;

#[derive(Parser)]
#[command(name = "secondbrain")]
#[command(about = "Personal memory service: ingest notes and documents, ask questions")]
struct Cli {
    /// Config file prefix (default: adk_config).
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PREFIX)]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API.
    Serve {
        /// Bind host (overrides server.host).
        #[arg(long)]
        host: Option<String>,

        /// Bind port (overrides server.port).
        #[arg(long)]
        port: Option<u16>,
    },

    /// Ingest a file or a piece of text.
    Ingest {
        #[arg(long, conflicts_with = "text", required_unless_present = "text")]
        file: Option<PathBuf>,

        #[arg(long)]
        text: Option<String>,
    },

    /// Ask a question against everything ingested so far.
    Query {
        text: String,

        #[arg(long)]
        top_k: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).json().init();

    let cli = Cli::parse();
    let config = BrainConfig::load(&cli.config)?;
    let agent = RootAgent::from_config(&config).await?;

    match cli.command {
        Command::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            serve(AppState::new(agent), &host, port).await?;
        }
        Command::Ingest { file, text } => {
            let input = match (file, text) {
                (Some(path), _) => {
                    let bytes = tokio::fs::read(&path).await?;
                    let filename = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    IngestInput::File { bytes, filename }
                }
                (None, Some(content)) => IngestInput::Text { content },
                (None, None) => anyhow::bail!("Specify --file or --text"),
            };
            let report = agent.handle_ingest(input).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Query { text, top_k } => {
            let answer = agent.handle_query(&text, top_k).await?;
            println!("{}", serde_json::to_string_pretty(&answer)?);
        }
    }

    Ok(())
}
