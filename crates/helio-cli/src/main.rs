use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Result, WrapErr};
use helio_core::graph::{open_store, retry, GraphStore, Layout, NeighborhoodFilters};
use helio_core::{Config, GraphLoader, QueryEngine, StorageEngine, Vocabulary};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "helio")]
#[command(version, about = "Load a biomedical knowledge graph and query disease neighborhoods", long_about = None)]
struct Cli {
    /// Config file (defaults to ./helio.toml, then ~/.config/helio/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the entity and relationship tables
    Load {
        /// Entity table (id, name, kind)
        #[arg(long)]
        nodes: Option<PathBuf>,
        /// Relationship table (source, metaedge, target)
        #[arg(long)]
        edges: Option<PathBuf>,
        /// Storage layout to write
        #[arg(long)]
        layout: Option<Layout>,
        /// Delete existing records first
        #[arg(long)]
        clear: bool,
        /// Documents per bulk insert
        #[arg(long)]
        batch_size: Option<usize>,
    },
    /// Show the neighborhood of an entity
    Query {
        /// Anchor entity id, e.g. Disease::DOID:2841
        anchor: String,
        #[arg(long)]
        layout: Option<Layout>,
        /// Which relationships to follow
        #[arg(long, value_enum, default_value_t = FilterPreset::Disease)]
        filters: FilterPreset,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Delete loaded records
    Clear {
        #[arg(long)]
        layout: Option<Layout>,
        /// Only this collection
        #[arg(long)]
        collection: Option<String>,
    },
    /// Show record counts
    Stats {
        #[arg(long)]
        layout: Option<Layout>,
    },
    /// Check that the database opens and answers
    Ping {
        #[arg(long)]
        layout: Option<Layout>,
    },
    /// List metaedge codes and verbs
    Vocab,
}

#[derive(Clone, Copy, ValueEnum)]
enum FilterPreset {
    /// Compounds treating or palliating, associated genes, localized anatomy
    Disease,
    /// Every code with the anchor as source
    Outgoing,
    /// Every code with the anchor as target
    Incoming,
}

impl FilterPreset {
    fn filters(self, vocabulary: &Vocabulary) -> NeighborhoodFilters {
        match self {
            Self::Disease => NeighborhoodFilters::disease(),
            Self::Outgoing => NeighborhoodFilters::all_outgoing(vocabulary),
            Self::Incoming => NeighborhoodFilters::all_incoming(vocabulary),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::from_file(path)
            .wrap_err_with(|| format!("loading config from {}", path.display()))?,
        None => Config::load().wrap_err("loading config")?,
    };
    let vocabulary = Arc::new(Vocabulary::default().with_overrides(&config.vocabulary));

    match cli.command {
        Commands::Load {
            nodes,
            edges,
            layout,
            clear,
            batch_size,
        } => {
            let layout = layout.unwrap_or(config.loader.layout);
            let nodes = nodes.unwrap_or_else(|| PathBuf::from(&config.loader.nodes_file));
            let edges = edges.unwrap_or_else(|| PathBuf::from(&config.loader.edges_file));
            let store = open(&config, layout).await?;

            let loader = GraphLoader::new(vocabulary)
                .with_batch_size(batch_size.unwrap_or(config.loader.batch_size))
                .with_timeout(config.loader.timeout());

            let spinner = spinner(format!("Loading {} layout...", layout));
            let result = loader
                .load_tables_with_retry(store.as_ref(), &nodes, &edges, &config.retry, clear)
                .await;
            spinner.finish_and_clear();

            let report = result.wrap_err("load failed")?;
            println!("{}", report);
        }
        Commands::Query {
            anchor,
            layout,
            filters,
            json,
        } => {
            let layout = layout.unwrap_or(config.loader.layout);
            let store = open(&config, layout).await?;
            let engine = QueryEngine::new(store, vocabulary.clone())
                .with_timeout(config.query.timeout());
            let filters = filters.filters(&vocabulary);

            let (engine, filters) = (&engine, &filters);
            let hood = retry(&config.retry, || engine.neighborhood(&anchor, filters))
                .await
                .wrap_err_with(|| format!("querying neighborhood of {}", anchor))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&hood.to_json())?);
            } else {
                print!("{}", hood);
            }
        }
        Commands::Clear { layout, collection } => {
            let layout = layout.unwrap_or(config.loader.layout);
            let store = open(&config, layout).await?;
            match collection {
                Some(name) => {
                    store.clear_collection(&name).await?;
                    println!("Cleared {} ({} layout)", name, layout);
                }
                None => {
                    store.clear().await?;
                    println!("Cleared {} layout", layout);
                }
            }
        }
        Commands::Stats { layout } => {
            let layout = layout.unwrap_or(config.loader.layout);
            let store = open(&config, layout).await?;
            let stats = store.stats().await?;
            println!("Layout:        {}", layout);
            println!("Entities:      {}", stats.entities);
            println!("Relationships: {}", stats.relationships);
        }
        Commands::Ping { layout } => {
            let layout = layout.unwrap_or(config.loader.layout);
            let store = open(&config, layout).await?;
            store.ping().await?;
            println!("OK ({} layout at {})", layout, describe_storage(&config));
        }
        Commands::Vocab => {
            for meta in vocabulary.iter() {
                println!("{:<6} {}", meta.code, meta.verb);
            }
        }
    }

    Ok(())
}

async fn open(config: &Config, layout: Layout) -> Result<Arc<dyn GraphStore>> {
    info!(%layout, storage = %describe_storage(config), "opening graph store");
    let store = open_store(&config.storage, layout)
        .await
        .wrap_err_with(|| format!("opening {}", describe_storage(config)))?;
    Ok(store)
}

fn describe_storage(config: &Config) -> String {
    if config.storage.engine == StorageEngine::Memory {
        "memory".to_string()
    } else {
        config.storage.db_path().display().to_string()
    }
}

fn spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
