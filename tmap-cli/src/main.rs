//! tmap CLI
//!
//! Command-line tools for exercising and inspecting the expiring map.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tmap_cache::TimeoutMap;
use tmap_core::{ManualClock, TimeoutMapConfig};

/// tmap - lazily expiring key/value map
#[derive(Parser)]
#[command(name = "tmap")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the batch-insert / sleep / re-insert expiry scenario on the real clock
    Scenario {
        /// Entry timeout in milliseconds
        #[arg(short, long, default_value = "500")]
        timeout_ms: u64,
        /// How long to sleep before re-inserting
        #[arg(short, long, default_value = "600")]
        sleep_ms: u64,
    },

    /// Print the effective configuration (defaults overridden by TMAP_* env vars)
    Config,

    /// Measure put/get/expiry throughput against a manual clock
    Bench {
        /// Number of keys to insert
        #[arg(short, long, default_value = "100000")]
        count: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "tmap=debug,tmap_cache=debug,info"
    } else {
        "tmap=info,warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Scenario { timeout_ms, sleep_ms } => cmd_scenario(timeout_ms, sleep_ms),
        Commands::Config => cmd_config(),
        Commands::Bench { count } => cmd_bench(count),
    }
}

/// Insert 1..=99, wait past the timeout, insert 100, and check only 100 survives.
fn cmd_scenario(timeout_ms: u64, sleep_ms: u64) -> Result<()> {
    println!(
        "{} timeout={}ms sleep={}ms",
        "⏱  Running expiry scenario:".cyan().bold(),
        timeout_ms,
        sleep_ms
    );

    let mut map = TimeoutMap::new(timeout_ms).context("Failed to create map")?;

    let batch: HashMap<u32, String> = (1..50).map(|i| (i, format!("value{i}"))).collect();
    map.put_all(batch);
    for i in 50..100 {
        map.put(i, format!("value{i}"));
    }

    let mut failures = Vec::new();
    if map.len() != 99 {
        failures.push(format!("expected 99 entries before sleep, found {}", map.len()));
    }
    failures.extend(
        (1..100)
            .filter(|i| !map.contains_key(i))
            .map(|i| format!("key {i} missing before sleep")),
    );
    if map.contains_key(&100) {
        failures.push("key 100 present before insertion".into());
    }
    println!("   {} {} live entries", "Before sleep:".dimmed(), map.len());

    std::thread::sleep(Duration::from_millis(sleep_ms));
    map.put(100, "value100".into());

    if map.len() != 1 {
        failures.push(format!("expected 1 entry after sleep, found {}", map.len()));
    }
    failures.extend(
        (1..100)
            .filter(|i| map.contains_key(i))
            .map(|i| format!("key {i} survived the timeout")),
    );
    if map.get(&100).map(String::as_str) != Some("value100") {
        failures.push("key 100 missing after re-insertion".into());
    }
    println!("   {} {} live entries", "After sleep:".dimmed(), map.len());

    if failures.is_empty() {
        println!("\n{}", "✅ Scenario passed".green().bold());
        return Ok(());
    }

    println!("\n{}", "❌ Scenario failed:".red().bold());
    for failure in &failures {
        println!("   {failure}");
    }
    bail!("{} scenario check(s) failed", failures.len())
}

/// Print the effective configuration
fn cmd_config() -> Result<()> {
    let config = TimeoutMapConfig::from_env().context("Invalid TMAP_* environment")?;
    println!("{}", config.to_json()?);
    Ok(())
}

/// Run a throughput benchmark
fn cmd_bench(count: u64) -> Result<()> {
    if count == 0 {
        bail!("count must be positive");
    }
    println!("{} {} keys", "📊 Benchmarking with".cyan().bold(), count);

    let clock = ManualClock::new();
    let timeout = Duration::from_secs(60);
    let mut map = TimeoutMap::with_clock(timeout, clock.clone())?;

    println!("\n{}", "1. Inserting...".dimmed());
    let start = Instant::now();
    for i in 0..count {
        map.put(i, i);
    }
    let put_time = start.elapsed();
    println!("   ✓ Inserted {} keys: {:?}", count, put_time);

    println!("\n{}", "2. Reading...".dimmed());
    let start = Instant::now();
    let hits = (0..count).filter(|i| map.get(i).is_some()).count();
    let get_time = start.elapsed();
    println!("   ✓ {} hits: {:?}", hits, get_time);

    println!("\n{}", "3. Expiring...".dimmed());
    clock.advance(timeout);
    let start = Instant::now();
    let live = map.len();
    let purged = map.purge_expired();
    let expire_time = start.elapsed();
    println!("   ✓ {} live, {} purged: {:?}", live, purged, expire_time);
    info!(count, hits, purged, "Benchmark finished");

    println!("\n{}", "📈 Results:".green().bold());
    println!("   Put rate: {:.0} ops/sec", count as f64 / put_time.as_secs_f64());
    println!("   Get rate: {:.0} ops/sec", count as f64 / get_time.as_secs_f64());
    println!("   Sweep rate: {:.0} entries/sec", purged as f64 / expire_time.as_secs_f64());

    if hits as u64 != count || live != 0 || purged as u64 != count {
        bail!("Unexpected map state after benchmark");
    }

    Ok(())
}
