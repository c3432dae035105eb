//! Loom CLI entry point

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "loom")]
#[command(about = "Source-code knowledge-graph extraction and resolution pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Project root path (defaults to current directory)
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// Load pipeline configuration from a loom.json-shaped file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run parseProject once and exit with a summary
    Parse,
    /// Start the HTTP/RPC server, indexing the project first
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "7890")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Watch the project root and push incremental reparses
        #[arg(short, long)]
        watch: bool,
    },
    /// Drop and recreate the graph store
    Clear,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!("loom={}", log_level)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Loom v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Project root: {}", cli.root.display());

    match cli.command {
        Commands::Parse => commands::parse(cli.root, cli.config).await,
        Commands::Serve { port, host, watch } => commands::serve(cli.root, cli.config, host, port, watch).await,
        Commands::Clear => commands::clear(cli.root),
        Commands::Version => {
            println!("Loom v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
