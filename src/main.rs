//! Feedback Desk - AI-enriched customer feedback service
//!
//! Entry point for the HTTP service and the command-line admin tools.

use clap::{Parser, Subcommand};
use feedback_desk_core::{error::Result, AppConfig};
use std::path::PathBuf;
use tracing::{debug, Level};
use tracing_subscriber::{self, EnvFilter};

mod cli;

use cli::helpers::{FilterArgs, LoginArgs};

#[derive(Parser)]
#[command(name = "feedback-desk")]
#[command(about = "Collect customer feedback and enrich it with AI-generated replies", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Set log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long, env = "FEEDBACK_CONFIG")]
    config: Option<PathBuf>,

    /// Feedback CSV file (overrides configuration)
    #[arg(long)]
    data_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Address to bind (overrides configuration)
        #[arg(long)]
        addr: Option<String>,
    },

    /// Submit one rating and review
    Submit {
        /// Star rating, 1 to 5
        #[arg(short, long)]
        rating: i64,

        /// Review text
        #[arg(short = 'm', long)]
        review: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// List stored feedback (admin)
    List {
        #[command(flatten)]
        login: LoginArgs,

        #[command(flatten)]
        filters: FilterArgs,

        /// Only show low-rated feedback
        #[arg(long)]
        attention: bool,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show aggregate statistics (admin)
    Stats {
        #[command(flatten)]
        login: LoginArgs,

        #[command(flatten)]
        filters: FilterArgs,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Export filtered feedback as CSV (admin)
    Export {
        #[command(flatten)]
        login: LoginArgs,

        #[command(flatten)]
        filters: FilterArgs,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Our crates at the requested level, HTTP client internals at WARN
    let level = level.as_str().to_lowercase();
    let filter = EnvFilter::new(format!(
        "feedback_desk={level},feedback_desk_core={level},tower_http={level},hyper=warn,reqwest=warn"
    ));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr) // Write logs to stderr, not stdout
        .init();

    debug!("Feedback Desk v{} starting...", env!("CARGO_PKG_VERSION"));

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(data_file) = cli.data_file {
        config.data_file = data_file;
    }

    match cli.command {
        Commands::Serve { addr } => cli::serve::handle(&config, addr).await,
        Commands::Submit {
            rating,
            review,
            format,
        } => cli::submit::handle(&config, rating, review, format).await,
        Commands::List {
            login,
            filters,
            attention,
            format,
        } => cli::list::handle(&config, login, filters, attention, format).await,
        Commands::Stats {
            login,
            filters,
            format,
        } => cli::stats::handle(&config, login, filters, format).await,
        Commands::Export {
            login,
            filters,
            output,
        } => cli::export::handle(&config, login, filters, output).await,
    }
}
