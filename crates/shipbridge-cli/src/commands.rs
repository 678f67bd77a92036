//! Command handlers for the CLI.
//!
//! These are called from `main` after config and logging are established.
//! `push` and `resolve-city` need the database; the rest talk to the courier
//! API or the cached city directory only.

use anyhow::Context;
use tracing::info;
use uuid::Uuid;

use shipbridge_booking::{
    BookingError, BookingOutcome, CityDirectory, CityResolver, Dispatcher, PushOptions,
};
use shipbridge_core::{AppConfig, BookingStore, CityResolution};
use shipbridge_db::{connect_pool, run_migrations, PgStore, PoolConfig};
use shipbridge_lcs::LcsClient;

async fn open_store(config: &AppConfig) -> anyhow::Result<PgStore> {
    let pool = connect_pool(&config.database_url, PoolConfig::from_app_config(config))
        .await
        .context("connecting to database")?;
    run_migrations(&pool).await.context("running migrations")?;
    Ok(PgStore::new(pool))
}

fn lcs_client(config: &AppConfig) -> anyhow::Result<LcsClient> {
    LcsClient::new(
        &config.lcs_base_url,
        &config.lcs_api_key,
        &config.lcs_api_password,
        config.lcs_request_timeout_secs,
        config.allow_live_booking,
    )
    .context("constructing LCS client")
}

/// Books the given orders and prints one line per order.
pub(crate) async fn run_push(
    config: &AppConfig,
    order_ids: &[Uuid],
    force_rebook: bool,
) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    let dispatcher = Dispatcher::from_app_config(config)?;

    let results = dispatcher
        .push_batch(&store, order_ids, PushOptions { force_rebook })
        .await?;

    let mut booked = 0usize;
    let mut failed = 0usize;
    for result in &results {
        match &result.outcome {
            BookingOutcome::Booked(provider) => {
                booked += 1;
                println!(
                    "{}  booked  tracking={}",
                    result.order_id,
                    provider.tracking_ref().unwrap_or("-")
                );
            }
            BookingOutcome::AlreadyBooked(provider) => {
                println!(
                    "{}  already booked  tracking={}",
                    result.order_id,
                    provider.tracking_ref().unwrap_or("-")
                );
            }
            BookingOutcome::Failed(error) => {
                failed += 1;
                println!("{}  failed  {error}", result.order_id);
                if let BookingError::AmbiguousCity { suggestions, .. } = error {
                    for s in suggestions {
                        println!("    candidate: {} (id {}, score {:.2})", s.city_name, s.city_id, s.score);
                    }
                }
            }
        }
    }

    info!(total = results.len(), booked, failed, "push finished");
    Ok(())
}

/// Prints the tracking timeline for a consignment number.
pub(crate) async fn run_track(config: &AppConfig, cn: &str) -> anyhow::Result<()> {
    let client = lcs_client(config)?;
    let result = client.track(cn).await?;

    if result.events.is_empty() {
        println!("{cn}: no tracking events reported");
        return Ok(());
    }

    println!("{cn}:");
    for event in &result.events {
        println!(
            "  {}  {}  {} -> {}  {}",
            event.date.as_deref().unwrap_or("-"),
            event.status.as_deref().unwrap_or("-"),
            event.origin.as_deref().unwrap_or("?"),
            event.destination.as_deref().unwrap_or("?"),
            event.remarks.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

/// Prints the city directory, optionally forcing a refetch.
pub(crate) async fn run_cities(config: &AppConfig, refresh: bool) -> anyhow::Result<()> {
    let directory = CityDirectory::from_app_config(config)?;
    let cities = directory.get_cities(refresh).await;

    if cities.is_empty() {
        println!("no cities available from any source");
        return Ok(());
    }
    for city in &cities {
        println!("{:>8}  {}", city.id, city.name);
    }
    println!("{} cities", cities.len());
    Ok(())
}

/// Scores directory entries against a free-text name.
pub(crate) async fn run_suggest(
    config: &AppConfig,
    name: &str,
    limit: usize,
) -> anyhow::Result<()> {
    let directory = CityDirectory::from_app_config(config)?;
    let cities = directory.get_cities(false).await;
    let resolver = CityResolver::from_app_config(config);

    let suggestions = resolver.suggest(name, &cities, limit);
    if suggestions.is_empty() {
        println!("no matches for '{name}'");
        return Ok(());
    }
    for s in &suggestions {
        println!("{:>6.2}  {:>8}  {}", s.score, s.city_id, s.city_name);
    }
    Ok(())
}

/// Writes a manual city resolution onto an order.
pub(crate) async fn run_resolve_city(
    config: &AppConfig,
    order_id: Uuid,
    city_id: i64,
    city_name: Option<String>,
) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    let order = store
        .load_order(order_id)
        .await?
        .with_context(|| format!("order {order_id} not found"))?;

    let resolution =
        CityResolution::manual(order.shipping_address.city.clone(), city_id, city_name);
    store.save_city_resolution(order_id, &resolution).await?;

    println!(
        "{order_id}: city pinned to {} ({})",
        city_id,
        resolution.city_name.as_deref().unwrap_or("unnamed")
    );
    Ok(())
}
