//! idxbars CLI: list index constituents and build extended price tables.
//!
//! Commands:
//! - `indices`: print the supported index registry
//! - `list`: print an index's constituents (symbol and company name)
//! - `fetch`: list, fetch 10y of daily bars, extend, and print a summary
//!
//! Nothing is written to disk.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use idxbars_core::data::{
    fetch_prices, ConstituentSource, HttpPageFetcher, IndexName, StdoutProgress, Window,
    YahooProvider, INDEX_REGISTRY,
};
use idxbars_core::{extend, FetchConfig};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "idxbars",
    about = "idxbars: index constituents and daily price tables"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the supported indices and where their constituents come from.
    Indices,
    /// Print an index's constituents.
    List {
        /// Index name: CAC40, SP500 or FTSE100.
        index: String,

        /// Optional TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Fetch daily bars for an index's constituents and print the extended table.
    Fetch {
        /// Index name: CAC40, SP500 or FTSE100.
        index: String,

        /// History window (1y, 2y, 5y, 10y, ytd, max). Overrides the config file.
        #[arg(long)]
        window: Option<String>,

        /// Only fetch the first N constituents.
        #[arg(long)]
        limit: Option<usize>,

        /// Number of trailing rows to print.
        #[arg(long, default_value_t = 5)]
        rows: usize,

        /// Optional TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Indices => run_indices(),
        Commands::List { index, config } => run_list(&index, config),
        Commands::Fetch {
            index,
            window,
            limit,
            rows,
            config,
        } => run_fetch(&index, window, limit, rows, config),
    }
}

fn load_config(path: Option<PathBuf>) -> Result<FetchConfig> {
    Ok(match path {
        Some(path) => FetchConfig::from_file(&path)?,
        None => FetchConfig::default(),
    })
}

fn run_indices() -> Result<()> {
    println!(
        "{:<8} {:<6} {:<8} {:<9} {:<7} URL",
        "Index", "Table", "Symbol", "Name", "Suffix"
    );
    println!("{}", "-".repeat(90));
    for spec in INDEX_REGISTRY.iter() {
        println!(
            "{:<8} {:<6} {:<8} {:<9} {:<7} {}",
            spec.key,
            spec.table_position,
            spec.symbol_column,
            spec.name_column,
            spec.symbol_suffix.unwrap_or("-"),
            spec.url
        );
    }
    Ok(())
}

fn run_list(index: &str, config: Option<PathBuf>) -> Result<()> {
    let index: IndexName = index.parse()?;
    let config = load_config(config)?;
    let pages = HttpPageFetcher::new(&config)?;

    let source = index.source();
    let constituents = source.list(&pages)?;
    println!("{} constituents\n", source.index());
    for instrument in constituents.instruments() {
        println!("{:<10} {}", instrument.symbol, instrument.name);
    }
    println!("\n{} listed", constituents.len());
    Ok(())
}

fn run_fetch(
    index: &str,
    window: Option<String>,
    limit: Option<usize>,
    rows: usize,
    config: Option<PathBuf>,
) -> Result<()> {
    let index: IndexName = index.parse()?;
    let mut config = load_config(config)?;
    if let Some(window) = window {
        config.window = window.parse::<Window>()?;
    }
    if limit == Some(0) {
        bail!("--limit must be at least 1");
    }

    let pages = HttpPageFetcher::new(&config)?;
    let provider = YahooProvider::new(&config)?;

    let (mut symbols, mut names) = index.source().list(&pages)?.into_parts();
    if let Some(limit) = limit {
        symbols.truncate(limit);
        names.truncate(limit);
    }
    info!(%index, symbols = symbols.len(), window = %config.window, "fetching prices");

    let fetched = fetch_prices(&provider, &symbols, &names, config.window, &StdoutProgress)?;
    let table = extend(&fetched.instruments, &fetched.merged)?;

    println!();
    println!(
        "{index}: {} instruments, {} rows x {} columns",
        fetched.instruments.len(),
        table.height(),
        table.width()
    );
    println!("{}", table.tail(Some(rows)));
    Ok(())
}
