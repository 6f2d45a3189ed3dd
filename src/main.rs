//! google-cpi-client
//!
//! Builds the Google service clients from a TOML config and issues read-only
//! calls through the full stack.
//!
//! ```text
//! ApiService ─▶ User-Agent ─▶ RetryTransport ─▶ Authorization ─▶ hyper-util pool ─▶ Google API
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use google_cpi_client::config::load_config;
use google_cpi_client::observability::init_logging;
use google_cpi_client::GoogleClient;

#[derive(Parser)]
#[command(name = "google-cpi-client")]
#[command(about = "Retrying Google Compute and Storage client", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long)]
    config: PathBuf,

    /// Overrides observability.log_level
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the project and provisioning defaults
    Info,
    /// GET a resource path and print the JSON answer
    Get {
        #[arg(short, long, value_enum, default_value_t = ServiceKind::Compute)]
        service: ServiceKind,
        /// Path relative to the service endpoint, e.g. projects/p/zones
        path: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ServiceKind {
    Compute,
    ComputeBeta,
    Storage,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_config(&cli.config)?;
    if let Some(level) = cli.log_level {
        config.observability.log_level = level;
    }
    init_logging(&config.observability);

    tracing::info!(
        config = %cli.config.display(),
        version = env!("CARGO_PKG_VERSION"),
        "google-cpi-client starting"
    );

    let client = GoogleClient::new(config)?;

    match cli.command {
        Commands::Info => {
            println!("project:         {}", client.project());
            println!("root disk size:  {} GB", client.default_root_disk_size_gb());
            println!("root disk type:  {}", client.default_root_disk_type());
            println!("user agent:      {}", client.config().user_agent());
        }
        Commands::Get { service, path } => {
            let service = match service {
                ServiceKind::Compute => client.compute_service(),
                ServiceKind::ComputeBeta => client.compute_beta_service(),
                ServiceKind::Storage => client.storage_service(),
            };
            let value: serde_json::Value = service.get_json(&path).await?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }

    Ok(())
}
