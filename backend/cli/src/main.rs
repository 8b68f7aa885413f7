mod chat_cmd;
mod config_cmd;
mod runtime;
mod status_cmd;
mod terminal_output;
mod tools_cmd;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use lexdesk_config::{LexDeskConfig, config_dir, config_file_path};
use lexdesk_gateway::{GatewayState, start_server};

use terminal_output::{note_error, note_warn};

#[derive(Parser)]
#[command(name = "lexdesk")]
#[command(about = "LexDesk: AI front desk for law firms")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ~/.lexdesk/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Send one message through the dispatch loop and print the events
    Chat {
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },
    /// List the registered tools
    Tools {
        /// Print the catalog as JSON
        #[arg(long)]
        json: bool,
    },
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Query a running server's health endpoint
    Status,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective config with secrets masked
    Show,
    /// Print the config file location
    Path,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run(Cli::parse()).await {
        note_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let path = cli
        .config
        .clone()
        .unwrap_or_else(|| config_file_path(&config_dir()));

    if let Commands::Config {
        action: ConfigAction::Path,
    } = cli.command
    {
        config_cmd::path(&path);
        return Ok(());
    }

    let config = load_with_logging(&path, matches!(cli.command, Commands::Serve { .. })).await?;

    match cli.command {
        Commands::Serve { port } => serve(config, port).await,
        Commands::Chat { message } => {
            let runner = runtime::build_runner(&config)?;
            chat_cmd::run(runner, config.firm_name(), message.join(" ")).await
        }
        Commands::Tools { json } => tools_cmd::run(&config, json),
        Commands::Config { .. } => config_cmd::show(&config),
        Commands::Status => status_cmd::run(config.bind(), config.port()).await,
    }
}

/// Load the config, install the logger it describes, then validate.
async fn load_with_logging(path: &Path, serving: bool) -> Result<LexDeskConfig> {
    let config = lexdesk_config::load(path).await?;
    // Only the server logs at the configured level; one-shot commands keep the console quiet.
    let level = if serving { config.log_level() } else { "warn" };
    lexdesk_logging::init_logger(config.log_dir(), level, config.log_json())?;
    lexdesk_config::check(&config)?;
    Ok(config)
}

async fn serve(config: LexDeskConfig, port: Option<u16>) -> Result<()> {
    let port = port.unwrap_or(config.port());
    let addr: SocketAddr = format!("{}:{port}", config.bind())
        .parse()
        .with_context(|| format!("invalid bind address {}:{port}", config.bind()))?;

    let runner = runtime::build_runner(&config)?;
    if config.provider() == "scripted" {
        note_warn("Scripted model provider in use; the assistant will only return a canned reply");
    }
    info!(
        %addr,
        firm = config.firm_name(),
        strict_reschedule = config.strict_reschedule(),
        "Starting LexDesk"
    );
    start_server(addr, GatewayState::new(Arc::new(runner), config.firm_name())).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn config_warnings_reach_the_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("logs");
        let path = config_file_path(dir.path());
        std::fs::write(
            &path,
            format!(
                "model:\n  provider: scripted\nfirm:\n  timezone: Pacific\nlogging:\n  dir: {}\n",
                log_dir.display()
            ),
        )
        .unwrap();

        let config = load_with_logging(&path, false).await.unwrap();
        assert_eq!(config.timezone(), "Pacific");

        let logged: String = std::fs::read_dir(&log_dir)
            .unwrap()
            .filter_map(|entry| std::fs::read_to_string(entry.ok()?.path()).ok())
            .collect();
        assert!(logged.contains("firm.timezone"), "log was: {logged}");
    }
}
