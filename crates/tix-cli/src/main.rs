#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use output::OutputMode;
use std::env;
use tix_sync::api::HttpApi;
use tix_sync::config::ApiConfig;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "tix: realtime support-ticket dashboard",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Backend base URL (overrides TIX_API_URL).
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Derive the output mode from flags and environment.
    fn output_mode(&self) -> OutputMode {
        output::resolve_output_mode(self.json)
    }

    /// Resolve the backend location: flag, then `TIX_API_URL`, then default.
    fn api_config(&self) -> ApiConfig {
        self.api_url
            .as_deref()
            .map_or_else(ApiConfig::from_env, ApiConfig::with_base_url)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "List tickets",
        long_about = "Fetch a snapshot of all tickets, then filter and paginate locally.",
        after_help = "EXAMPLES:\n    # First page, newest first\n    tix list\n\n    # Search description and category\n    tix list --search factura\n\n    # Emit machine-readable output\n    tix list --json"
    )]
    List(cmd::list::ListArgs),

    #[command(
        about = "Create a new ticket",
        long_about = "Submit a ticket description; the backend assigns category and sentiment.",
        after_help = "EXAMPLES:\n    # Create a ticket\n    tix create \"No puedo acceder a mi cuenta\"\n\n    # Emit machine-readable output\n    tix create \"No puedo acceder a mi cuenta\" --json"
    )]
    Create(cmd::create::CreateArgs),

    #[command(
        about = "Edit a ticket's description",
        long_about = "Replace a ticket's description; the backend re-runs classification.",
        after_help = "EXAMPLES:\n    # Update the text\n    tix edit 3f2a91cc \"Texto corregido\"\n\n    # Emit machine-readable output\n    tix edit 3f2a91cc \"Texto corregido\" --json"
    )]
    Edit(cmd::edit::EditArgs),

    #[command(
        about = "Delete a ticket",
        after_help = "EXAMPLES:\n    # Delete by id\n    tix delete 3f2a91cc\n\n    # Emit machine-readable output\n    tix delete 3f2a91cc --json"
    )]
    Delete(cmd::delete::DeleteArgs),

    #[command(
        about = "Follow the live change stream",
        long_about = "Subscribe to the change stream and print status transitions, applied events, and notifications as they happen.",
        after_help = "EXAMPLES:\n    # Watch until interrupted\n    tix watch\n\n    # Stop after ten applied events\n    tix watch --max-events 10\n\n    # NDJSON for machine consumption\n    tix watch --json"
    )]
    Watch(cmd::watch::WatchArgs),

    #[command(
        about = "Check backend reachability",
        after_help = "EXAMPLES:\n    # Ping the configured backend\n    tix health\n\n    # Against an explicit backend\n    tix health --api-url http://localhost:8001"
    )]
    Health(cmd::health::HealthArgs),

    #[command(
        about = "Generate shell completion scripts",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    tix completions bash\n\n    # Generate zsh completions\n    tix completions zsh"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("TIX_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "tix=debug,info"
        } else {
            "tix=info,warn"
        })
    });

    let format = env::var("TIX_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry.with(fmt::layer().json().with_ansi(false)).init();
        }
        _ => {
            registry.with(fmt::layer().compact()).init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    if cli.verbose {
        info!("verbose mode enabled");
    }

    let output = cli.output_mode();
    let config = cli.api_config();

    match cli.command {
        Commands::List(ref args) => cmd::list::run_list(args, &HttpApi::new(config), output),
        Commands::Create(ref args) => cmd::create::run_create(args, HttpApi::new(config), output),
        Commands::Edit(ref args) => cmd::edit::run_edit(args, HttpApi::new(config), output),
        Commands::Delete(ref args) => cmd::delete::run_delete(args, HttpApi::new(config), output),
        Commands::Watch(ref args) => cmd::watch::run_watch(args, &config, output),
        Commands::Health(ref args) => cmd::health::run_health(args, &HttpApi::new(config), output),
        Commands::Completions(args) => {
            cmd::completions::run_completions(args.shell, &mut Cli::command())
        }
    }
}
