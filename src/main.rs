mod classify;
mod error;
mod fetch;
mod filter;
mod pipeline;
mod report;
mod settings;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::info;

use fetch::{CachedFetcher, Fetcher, HttpFetcher};
use filter::Filter;
use settings::Settings;

#[derive(Parser)]
#[command(
    name = "pokefilter",
    about = "Group PokeAPI pokemon by type, filtered on type, height and XP"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (default: ./pokefilter.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// JSON file holding the whole filter:
    /// {"types": [..], "height_range": [lo, hi], "xp_range": [lo, hi]}
    #[arg(long, global = true)]
    filter_file: Option<PathBuf>,

    /// Wanted type (repeat or comma-separate)
    #[arg(short = 't', long = "type", value_delimiter = ',', global = true)]
    types: Vec<String>,

    /// Inclusive height range as LOW,HIGH
    #[arg(long, value_delimiter = ',', global = true)]
    height: Option<Vec<i64>>,

    /// Inclusive base experience range as LOW,HIGH
    #[arg(long, value_delimiter = ',', global = true)]
    xp: Option<Vec<i64>>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every pokemon and print the matches grouped by type
    Run {
        /// Print the grouping as JSON
        #[arg(long)]
        json: bool,
        /// Skip the on-disk response cache
        #[arg(long)]
        no_cache: bool,
    },
    /// Print the resolved filter and exit
    Filter,
    /// Delete the on-disk response cache
    ClearCache,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    init_tracing();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;
    info!(settings_loaded = ?settings, msg = "Starting pokefilter");

    match cli.command {
        Commands::Run { json, no_cache } => {
            let filter = resolve_filter(&cli, &settings)?;
            info!(%filter, "Filter");

            let http = HttpFetcher::new(&settings.user_agent, settings.timeout())?;
            let fetcher: Box<dyn Fetcher> = if settings.cache && !no_cache {
                Box::new(CachedFetcher::new(http, &settings.cache_dir))
            } else {
                Box::new(http)
            };

            let agg = pipeline::run(&filter, fetcher.as_ref(), &settings.listing_url)?;
            if json {
                println!("{}", report::render_json(&agg)?);
            } else {
                print!("{}", report::render_text(&agg));
            }
        }
        Commands::Filter => {
            let filter = resolve_filter(&cli, &settings)?;
            println!("{}", filter);
            println!("{}", serde_json::to_string_pretty(&filter)?);
        }
        Commands::ClearCache => {
            if fetch::cache::clear(&settings.cache_dir)? {
                println!("Removed {}", settings.cache_dir.display());
            } else {
                println!("No cache at {}", settings.cache_dir.display());
            }
        }
    }

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("\nDone in {}", format_duration(elapsed));
    }
    Ok(())
}

/// Filter precedence: `--filter-file`, else the config `[filter]` table over
/// the built-in default; then `--type`/`--height`/`--xp` on top.
fn resolve_filter(cli: &Cli, settings: &Settings) -> Result<Filter> {
    let base: Value = match &cli.filter_file {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read filter file {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Filter file {} is not valid JSON", path.display()))?
        }
        None => match &settings.filter {
            Some(table) => settings::merge_filter(settings::default_filter(), table.clone()),
            None => settings::default_filter(),
        },
    };

    let overrides = settings::cli_overrides(&cli.types, cli.height.as_deref(), cli.xp.as_deref());
    let doc = settings::merge_filter(base, overrides);
    Filter::from_json(&doc).map_err(error::Error::from).context("Invalid filter criteria")
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}
