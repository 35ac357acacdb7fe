//! MCP stdio server - main entry point.
//!
//! Opens (and seeds, on first run) the SQLite store, registers the database
//! tools, and serves a single MCP session over stdin/stdout. Diagnostics go
//! to stderr; stdout carries only the protocol stream.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use sqlite_mcp::db::SqliteBackend;
use sqlite_mcp::rpc::McpServer;
use sqlite_mcp::tools::database_tools;
use sqlite_mcp::{Config, Result};

#[derive(Parser, Debug)]
#[command(
    name = "sqlite-mcp-server",
    about = "MCP stdio server exposing a local SQLite database as callable tools",
    version
)]
struct Cli {
    /// Path to the SQLite database file (created and seeded on first run).
    #[arg(long, env = "SQLITE_MCP_DB_PATH", default_value = "sqlite_mcp.db")]
    db_path: PathBuf,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    sqlite_mcp::observability::init_tracing();

    let mut config = Config::default();
    config.database.path = cli.db_path;

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server terminated with unrecoverable error");
        std::process::exit(1);
    }
    tracing::info!("Server process exiting");
}

async fn run(config: Config) -> Result<()> {
    let backend = Arc::new(SqliteBackend::open(&config.database.path)?);
    let registry = Arc::new(database_tools(backend)?);
    tracing::info!(
        tools = registry.len(),
        db = %config.database.path.display(),
        "Launching SQLite DB MCP server via stdio"
    );

    let server = McpServer::new(registry, config);

    // Interrupt signal ends the session cleanly (exit 0).
    let cancel = server.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, stopping server");
            cancel.cancel();
        }
    });

    server
        .serve(tokio::io::stdin(), tokio::io::stdout())
        .await
}
