mod output;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bookshelf_core::{
    load_config, load_default_config, metrics, validate_config, CatalogPage, CatalogSession,
    Config, SanitizedConfig,
};

/// Browse the book catalog and manage favorites.
#[derive(Parser)]
#[command(name = "bookshelf", version)]
struct Cli {
    /// Path to the TOML config file. Defaults and BOOKSHELF_* variables
    /// are used when omitted.
    #[arg(long, short, env = "BOOKSHELF_CONFIG")]
    config: Option<PathBuf>,

    /// Print JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List one page of the catalog
    List {
        /// Case-insensitive search on title or author
        #[arg(long, short, default_value = "")]
        query: String,
        /// 1-based page number
        #[arg(long, short, default_value_t = 1)]
        page: usize,
    },
    /// Show one book
    Show { id: String },
    /// List favorites
    Favorites,
    /// Add a catalog book to favorites
    Add { id: String },
    /// Remove a book from favorites
    Remove { id: String },
    /// Add or remove a catalog book from favorites
    Toggle { id: String },
    /// Print the effective configuration
    Config,
    /// Load the catalog and print Prometheus metrics
    Metrics,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Logs go to stderr so stdout stays parseable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = load(cli.config.as_deref())?;

    if let Command::Config = cli.command {
        let sanitized = SanitizedConfig::from(&config);
        println!("{}", serde_json::to_string_pretty(&sanitized)?);
        return Ok(());
    }

    let registry = prometheus::Registry::new();
    metrics::register_metrics(&registry).context("Failed to register metrics")?;

    let session = CatalogSession::from_config(&config).context("Failed to open session")?;
    debug!(startup = ?session.favorites().startup(), "Favorites opened");

    match cli.command {
        Command::List { query, page } => {
            session.view().set_query(query);
            session.view().set_page(page);
            match session.browse().await {
                CatalogPage::Results(view) if cli.json => {
                    println!("{}", serde_json::to_string_pretty(&view)?)
                }
                CatalogPage::Results(view) => print!("{}", output::page(&view)),
                CatalogPage::Unavailable => bail!(unavailable(&session)),
            }
        }
        Command::Show { id } => {
            let detail = match session.book_detail(&id).await {
                Ok(detail) => detail,
                Err(e) => match session.cache().state().error() {
                    Some(fetch) => bail!("{}: catalog unavailable: {}", e, fetch),
                    None => bail!(e),
                },
            };
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&detail)?);
            } else {
                print!("{}", output::detail(&detail));
            }
        }
        Command::Favorites => {
            let favorites = session.favorites().list();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&favorites)?);
            } else {
                print!("{}", output::favorites(&favorites));
            }
        }
        Command::Add { id } => {
            let book = session.add_favorite(&id).await?;
            println!("Added \"{}\" to favorites", book.title);
        }
        Command::Remove { id } => {
            if session.remove_favorite(&id)? {
                println!("Removed {} from favorites", id);
            } else {
                println!("{} is not a favorite", id);
            }
        }
        Command::Toggle { id } => {
            if session.toggle_favorite(&id).await? {
                println!("Added {} to favorites", id);
            } else {
                println!("Removed {} from favorites", id);
            }
        }
        Command::Metrics => {
            if session.cache().load().await.is_err() {
                info!("Catalog load failed; metrics still reported");
            }
            print!("{}", metrics::gather_text(&registry)?);
        }
        // Printed before the session was opened
        Command::Config => {}
    }

    Ok(())
}

fn load(path: Option<&std::path::Path>) -> Result<Config> {
    let config = match path {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            load_config(path).with_context(|| format!("Failed to load config from {:?}", path))?
        }
        None => load_default_config().context("Failed to load default configuration")?,
    };

    validate_config(&config).context("Configuration validation failed")?;
    debug!(host = ?config.catalog.host(), db = ?config.storage.path, "Configuration loaded");
    Ok(config)
}

/// Why the catalog cannot be shown.
fn unavailable(session: &CatalogSession) -> String {
    match session.cache().state().error() {
        Some(e) => format!("catalog unavailable: {}", e),
        None => "catalog unavailable".to_string(),
    }
}
