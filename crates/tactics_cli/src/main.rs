//! FM26 Tactics CLI
//!
//! Loads the catalog (cache first, then remote with local fallback) and
//! prints library, detail, glossary, patch, comparison and recommendation
//! screens.

mod views;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use tactics_core::models::{PatchStatus, Tactic};
use tactics_core::recommend::Preferences;
use tactics_core::search::{filter_tactics, sort_tactics, SortKey, TacticCriteria};
use tactics_core::{CatalogConfig, CatalogStore};

#[derive(Parser)]
#[command(name = "fm26-tactics")]
#[command(about = "Browse the FM26 tactics catalog", long_about = None)]
struct Cli {
    /// YAML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Remote data base URL
    #[arg(long, global = true)]
    data_url: Option<String>,

    /// Local data directory (also the fallback)
    #[arg(long, global = true)]
    data_dir: Option<String>,

    /// Snapshot cache directory
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Only read the local data directory
    #[arg(long, global = true)]
    offline: bool,

    /// More logging (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List tactics with filters
    List {
        #[arg(long, default_value = "")]
        query: String,

        #[arg(long, default_value = "")]
        formation: String,

        /// Style tag; repeat to match any of several
        #[arg(long = "style")]
        styles: Vec<String>,

        #[arg(long, default_value = "")]
        intensity: String,

        #[arg(long, default_value = "")]
        mentality: String,

        #[arg(long, default_value = "")]
        budget: String,

        #[arg(long, default_value = "")]
        status: String,

        /// Only tactics with a version for this patch
        #[arg(long)]
        patch: Option<String>,

        /// verified, outdated or untested (needs --patch)
        #[arg(long)]
        patch_status: Option<String>,

        /// newest, oldest, name-asc, name-desc, ppg, win-rate
        #[arg(long, default_value = "newest")]
        sort: String,

        /// Print matching tactics as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Show one tactic
    Show {
        slug: String,

        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Search the glossary
    Glossary {
        #[arg(long, default_value = "")]
        query: String,

        #[arg(long, default_value = "All")]
        category: String,
    },

    /// Patch notes and affected tactics
    Patches,

    /// Compare two tactics side by side
    Compare { a: String, b: String },

    /// Recommend tactics for your preferences
    Recommend {
        #[arg(long, default_value = "")]
        formation: String,

        #[arg(long, default_value = "")]
        style: String,

        #[arg(long, default_value = "")]
        intensity: String,

        #[arg(long, default_value = "")]
        budget: String,
    },

    /// Render the screen behind a navigation token, e.g. `#tactic/<slug>`
    Route { token: String },

    /// Facet value counts
    Counts,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(cli: &Cli) -> Result<CatalogConfig> {
    let config = match &cli.config {
        Some(path) => CatalogConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => CatalogConfig::default(),
    };
    let mut config = config.with_env();

    if let Some(url) = &cli.data_url {
        config.data_url = Some(url.clone());
    }
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(dir) = &cli.cache_dir {
        config.cache_dir = Some(dir.clone());
    }
    if cli.offline {
        config.offline = true;
    }
    Ok(config)
}

fn find_tactic<'a>(store: &'a CatalogStore, slug: &str) -> Result<&'a Tactic> {
    match store.tactic(slug) {
        Some(tactic) => Ok(tactic),
        None => bail!("No tactic with slug '{}'", slug),
    }
}

fn parse_patch_status(value: Option<&str>) -> Result<Option<PatchStatus>> {
    value
        .map(|v| {
            PatchStatus::parse(v).with_context(|| format!("Unknown patch status '{}'", v))
        })
        .transpose()
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(&cli)?;
    log::debug!("Using data base {} (fallback {})", config.primary_base(), config.fallback_base());

    let mut store =
        CatalogStore::from_config(&config).context("Failed to set up document retrieval")?;
    store.load_all().await.context("Failed to load the tactics catalog")?;

    let output = match cli.command {
        Commands::List {
            query,
            formation,
            styles,
            intensity,
            mentality,
            budget,
            status,
            patch,
            patch_status,
            sort,
            json,
        } => {
            let criteria = TacticCriteria {
                query,
                formation,
                style_tags: styles,
                intensity,
                mentality,
                budget_tier: budget,
                status,
                patch_version: patch,
                patch_status: parse_patch_status(patch_status.as_deref())?,
            };
            let key: SortKey = sort.parse()?;
            let matches = filter_tactics(store.tactics(), &criteria);
            let sorted = sort_tactics(&matches, &key, store.current_patch());

            if json {
                serde_json::to_string_pretty(&sorted)?
            } else {
                views::tactic_rows(&sorted, store.current_patch())
            }
        }

        Commands::Show { slug, json } => {
            let tactic = find_tactic(&store, &slug)?;
            if json {
                serde_json::to_string_pretty(tactic)?
            } else {
                views::tactic_detail(&store, tactic)
            }
        }

        Commands::Glossary { query, category } => views::glossary(&store, &query, &category),

        Commands::Patches => views::patches(&store),

        Commands::Compare { a, b } => {
            let a = find_tactic(&store, &a)?;
            let b = find_tactic(&store, &b)?;
            views::comparison(&store, a, b)
        }

        Commands::Recommend { formation, style, intensity, budget } => {
            let prefs = Preferences { formation, style, intensity, budget };
            views::recommendations(&store, &prefs)
        }

        Commands::Route { token } => {
            let mut router = views::app_router().context("Failed to register routes")?;
            let mut screen = views::Screen::new(&store);
            router.dispatch(&token, &mut screen);
            screen.out
        }

        Commands::Counts => views::counts(&store),
    };

    println!("{}", output.trim_end());
    Ok(())
}
