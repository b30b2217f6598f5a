mod export;
mod parse;
mod scrape;
mod search;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pmdb_core::{AppConfig, ConfigError};
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

use crate::export::JsonlExporter;
use crate::scrape::ScrapeOptions;

#[derive(Debug, Parser)]
#[command(name = "pmdb-cli")]
#[command(about = "Penguin Magic catalog scraper and product database")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract a product from a saved HTML page and print it as JSON
    Parse {
        /// Path to the saved product page
        file: PathBuf,

        /// URL the page was fetched from
        #[arg(long)]
        url: String,
    },
    /// Crawl a range of catalog product ids
    Scrape {
        /// First product id (inclusive)
        #[arg(long)]
        start: u64,

        /// Last product id (inclusive)
        #[arg(long)]
        end: u64,

        /// Extract without writing to the database
        #[arg(long)]
        dry_run: bool,

        /// Also append records to this JSON-lines file
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Search stored products
    Search {
        /// Case-insensitive substring of the product name
        #[arg(long)]
        name: Option<String>,

        /// Case-insensitive substring of the author
        #[arg(long)]
        author: Option<String>,

        /// Exact tag
        #[arg(long)]
        tag: Option<String>,

        /// Minimum list price
        #[arg(long)]
        min_price: Option<Decimal>,

        /// Maximum list price
        #[arg(long)]
        max_price: Option<Decimal>,

        #[arg(long, default_value_t = pmdb_db::products::DEFAULT_SEARCH_LIMIT)]
        limit: i64,

        #[arg(long, default_value_t = 0)]
        offset: i64,
    },
    /// Database administration
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Apply pending migrations
    Migrate,
    /// Check database connectivity
    Ping,
    /// Print the number of stored products
    Count,
}

/// Log level used when the configuration could not be loaded.
const FALLBACK_LOG_LEVEL: &str = "info";

fn log_level(config: &Result<AppConfig, ConfigError>) -> &str {
    config
        .as_ref()
        .map_or(FALLBACK_LOG_LEVEL, |c| c.log_level.as_str())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = pmdb_core::load_app_config();
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level(&config)))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Some(Commands::Parse { file, url }) => {
            if let Err(e) = &config {
                tracing::debug!(error = %e, "configuration not loaded; parse does not need it");
            }
            parse::run_parse(&file, &url)?;
        }
        Some(Commands::Scrape {
            start,
            end,
            dry_run,
            export,
        }) => {
            let config = config?;
            let pool = if dry_run {
                None
            } else {
                Some(pmdb_db::connect_pool_from_config(&config).await?)
            };
            let options = ScrapeOptions {
                start,
                end,
                export: export.map(JsonlExporter::new),
            };
            let totals = scrape::run_scrape(pool.as_ref(), &config, &options).await?;
            println!(
                "extracted {} products ({} saved, {} exported, {} missing, {} failed)",
                totals.extracted, totals.saved, totals.exported, totals.missing, totals.failed
            );
        }
        Some(Commands::Search {
            name,
            author,
            tag,
            min_price,
            max_price,
            limit,
            offset,
        }) => {
            let pool = pmdb_db::connect_pool_from_config(&config?).await?;
            let filters = pmdb_db::ProductSearch {
                name: name.as_deref(),
                author: author.as_deref(),
                tag: tag.as_deref(),
                min_price,
                max_price,
                limit,
                offset,
            };
            search::run_search(&pool, &filters).await?;
        }
        Some(Commands::Db { command }) => run_db(&config?, command).await?,
        None => println!("pmdb-cli: try `pmdb-cli --help`"),
    }

    Ok(())
}

async fn run_db(config: &AppConfig, command: DbCommands) -> anyhow::Result<()> {
    let pool = pmdb_db::connect_pool_from_config(config).await?;
    match command {
        DbCommands::Migrate => {
            let applied = pmdb_db::run_migrations(&pool).await?;
            tracing::info!(applied, "migrations complete");
            println!("applied {applied} migrations");
        }
        DbCommands::Ping => {
            pmdb_db::health_check(&pool).await?;
            println!("database ok");
        }
        DbCommands::Count => {
            let count = pmdb_db::count_products(&pool).await?;
            println!("{count}");
        }
    }
    Ok(())
}
