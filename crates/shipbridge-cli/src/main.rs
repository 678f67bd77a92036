use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "shipbridge-cli")]
#[command(about = "Courier booking and tracking for LCS shipments")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Book orders with the courier
    Push {
        /// Order ids to book, in processing order
        #[arg(long = "order-ids", required = true, num_args = 1..)]
        order_ids: Vec<Uuid>,
        /// Re-book orders that already carry a booking
        #[arg(long)]
        force_rebook: bool,
    },
    /// Look up tracking events for a consignment number
    Track {
        /// Consignment / tracking number
        cn: String,
    },
    /// Print the courier city directory
    Cities {
        /// Bypass the cache and refetch
        #[arg(long)]
        refresh: bool,
    },
    /// Score directory entries against a free-text city name
    Suggest {
        /// City name to score against
        name: String,
        /// Maximum suggestions to print
        #[arg(long, default_value = "5")]
        limit: usize,
    },
    /// Pin an order's destination city by hand
    ResolveCity {
        #[arg(long)]
        order_id: Uuid,
        /// Courier city id to pin
        #[arg(long)]
        city_id: i64,
        /// Display name recorded alongside the id
        #[arg(long)]
        city_name: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = shipbridge_core::load_app_config()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Push {
            order_ids,
            force_rebook,
        } => commands::run_push(&config, &order_ids, force_rebook).await,
        Commands::Track { cn } => commands::run_track(&config, &cn).await,
        Commands::Cities { refresh } => commands::run_cities(&config, refresh).await,
        Commands::Suggest { name, limit } => commands::run_suggest(&config, &name, limit).await,
        Commands::ResolveCity {
            order_id,
            city_id,
            city_name,
        } => commands::run_resolve_city(&config, order_id, city_id, city_name).await,
    }
}
