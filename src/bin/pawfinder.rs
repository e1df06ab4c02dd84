use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pawfinder::core::cache::TtlCache;
use pawfinder::search::SearchResponse;
use pawfinder::{
    GazetteerGeocoder, Geocoder, HttpGeocoder, InMemoryStore, LocalSearch, PawfinderConfig, UserLocation,
};


/// Free-text search over a local directory of pet services and products
#[derive(Parser, Debug)]
#[command(name = "pawfinder")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
struct Cli {
    /// Config file (TOML/JSON/YAML); PAWFINDER_* env vars override it
    #[arg(short, long, global = true, env = "PAWFINDER_CONFIG")]
    config: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}


#[derive(Subcommand, Debug)]
enum Command {
    /// Run a query against a listing catalog
    Search(SearchArgs),

    /// Show how a query is interpreted without searching
    Interpret(UserArgs),
}


#[derive(Args, Debug)]
struct UserArgs {
    /// Query text, e.g. "dog parks near me"
    query: String,

    #[arg(long, allow_hyphen_values = true)]
    lat: f64,

    #[arg(long, allow_hyphen_values = true)]
    lng: f64,

    #[arg(long)]
    zip: Option<String>,

    #[arg(long)]
    city: Option<String>,

    #[arg(long)]
    state: Option<String>,
}

impl UserArgs {
    fn location(&self) -> UserLocation {
        UserLocation {
            lat: self.lat,
            lng: self.lng,
            zip: self.zip.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
        }
    }
}


#[derive(Args, Debug)]
struct SearchArgs {
    #[command(flatten)]
    user: UserArgs,

    /// JSON array of listings
    #[arg(long, env = "PAWFINDER_CATALOG")]
    catalog: PathBuf,

    #[arg(long, default_value_t = 1)]
    page: u32,
}


fn geocoder_for(config: &PawfinderConfig) -> anyhow::Result<Arc<dyn Geocoder>> {
    Ok(match &config.geocoder_url {
        Some(url) => Arc::new(HttpGeocoder::new(url, config.geocode_timeout())?),
        None => Arc::new(GazetteerGeocoder::new()),
    })
}


fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", out);
    Ok(())
}


#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("pawfinder=info".parse()?))
        .init();

    let cli = Cli::parse();
    let config = match cli.config.as_deref() {
        Some(path) => PawfinderConfig::load(Some(path)),
        None => PawfinderConfig::from_env(),
    }
    .context("loading configuration")?;
    let geocoder = geocoder_for(&config)?;

    match cli.command {
        Command::Interpret(user) => {
            let store = Arc::new(InMemoryStore::default());
            let search = LocalSearch::new(store, geocoder, &config).without_cache();
            let processed = search.interpret(&user.query, &user.location()).await;
            print_json(&processed, cli.pretty)?;
        }
        Command::Search(args) => {
            let store = InMemoryStore::from_json_file(&args.catalog)
                .with_context(|| format!("loading catalog {}", args.catalog.display()))?;
            let mut search = LocalSearch::new(Arc::new(store), geocoder, &config);

            if config.cache_enabled {
                let cache: Arc<TtlCache<SearchResponse>> =
                    Arc::new(TtlCache::new(config.cache_capacity, config.cache_ttl_secs));
                let _eviction = cache.spawn_eviction(Duration::from_secs(config.cache_eviction_interval_secs.max(1)));
                search = search.with_cache(cache);
            }

            let results = search
                .search_page(&args.user.query, &args.user.location(), args.page)
                .await?;
            info!(
                "{} of {} results",
                results.results.len(),
                results.metadata.total_results
            );
            print_json(&results, cli.pretty)?;
        }
    }

    Ok(())
}
