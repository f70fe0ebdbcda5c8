use crate::app::{build_service, default_store};
use crate::config::AppConfig;
use crate::logging::init_logging;
use crate::router::todo_routes;
use crate::runtime_config::RuntimeConfig;
use crate::server::HttpServer;
use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

/// Command-line interface for the to-do API
#[derive(Debug, Parser)]
#[command(name = "todolist-api", version)]
#[command(about = "In-memory to-do list HTTP API", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the HTTP server
    Serve(ServeArgs),
    /// Print the routing table
    Routes,
}

#[derive(Debug, Clone, Default, Args)]
pub struct ServeArgs {
    /// Address to listen on (overrides `server.addr`)
    #[arg(long, env = "TODO_ADDR")]
    pub addr: Option<String>,

    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory served as the browser UI (overrides `server.static_dir`)
    #[arg(long)]
    pub static_dir: Option<PathBuf>,

    /// Start with an empty store
    #[arg(long, default_value_t = false)]
    pub no_seed: bool,
}

impl ServeArgs {
    /// Configuration file (or defaults) with the command-line overrides applied.
    ///
    /// # Errors
    ///
    /// Fails when the configuration file cannot be read or parsed.
    pub fn resolve_config(&self) -> Result<AppConfig> {
        let mut config = AppConfig::load_or_default(self.config.as_deref())?;
        if let Some(addr) = &self.addr {
            config.server.addr = addr.clone();
        }
        if let Some(dir) = &self.static_dir {
            config.server.static_dir = Some(dir.clone());
        }
        if self.no_seed {
            config.store.seed_samples = false;
        }
        Ok(config)
    }
}

/// Parse the process arguments and run the selected command.
///
/// # Errors
///
/// See [`run`].
pub fn run_cli() -> Result<()> {
    run(Cli::parse())
}

/// Run a parsed command.
///
/// # Errors
///
/// Fails on an unreadable configuration, a logging setup failure, or when
/// the server cannot bind its address.
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Serve(args) => serve(&args),
        Commands::Routes => {
            for route in todo_routes() {
                println!(
                    "{:<7} {:<26} {}",
                    route.method.as_str(),
                    route.path_pattern,
                    route.handler_name
                );
            }
            Ok(())
        }
    }
}

fn serve(args: &ServeArgs) -> Result<()> {
    init_logging()?;
    let config = args.resolve_config()?;

    let runtime = RuntimeConfig::from_env();
    runtime.apply();
    info!(stack_size = runtime.stack_size, "Coroutine runtime configured");

    let store = default_store(&config);
    let service = build_service(&config, store)?;
    let handle = HttpServer(service)
        .start(config.server.addr.as_str())
        .with_context(|| format!("Failed to bind {}", config.server.addr))?;
    handle
        .join()
        .map_err(|e| anyhow!("Server coroutine panicked: {e:?}"))?;
    Ok(())
}
