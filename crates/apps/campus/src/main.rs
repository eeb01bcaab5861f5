use std::path::PathBuf;
use std::time::{Duration, Instant};

use campus::{
    AppConfig, AppContext, DatasetSource, FilesystemSource, HeadlessViewer, HttpSource,
    LoadSession, StaticSource, UiController,
};
use catalog::{BUILDINGS_CACHE_KEY, FileRowCache, InMemoryRowCache, RowCache};
use clap::Parser;
use foundation::time::Millis;
use scene::entity::EntityKind;
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless campus map: load datasets, search, report")]
struct Args {
    /// Directory holding the dataset CSV files
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Base URL to fetch dataset CSV files from (overrides --data-dir)
    #[arg(long)]
    data_url: Option<String>,

    /// Directory for the building-row cache
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Use the built-in campus buildings instead of any data source
    #[arg(long)]
    demo: bool,

    /// Search for this text once loading finishes
    #[arg(long)]
    query: Option<String>,

    /// Delete the cached building rows and exit
    #[arg(long)]
    clear_cache: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let mut config = AppConfig::from_env()?;
    if let Some(dir) = args.data_dir {
        if std::env::var_os(campus::ENV_CACHE_DIR).is_none() && args.cache_dir.is_none() {
            config.cache_dir = dir.join(".cache");
        }
        config.data_dir = dir;
    }
    if let Some(url) = args.data_url {
        config.data_url = Some(url.trim_end_matches('/').to_string());
    }
    if let Some(dir) = args.cache_dir {
        config.cache_dir = dir;
    }

    if args.clear_cache {
        let mut cache = FileRowCache::new(&config.cache_dir)?;
        let existed = cache.clear(BUILDINGS_CACHE_KEY)?;
        info!(dir = %config.cache_dir.display(), existed, "building cache cleared");
        return Ok(());
    }

    let started = Instant::now();
    let clock = move || Millis(started.elapsed().as_millis() as u64);

    let source: Box<dyn DatasetSource> = if args.demo {
        Box::new(StaticSource::seeded())
    } else if let Some(url) = &config.data_url {
        Box::new(HttpSource::new(url.clone()))
    } else {
        Box::new(FilesystemSource::new(&config.data_dir))
    };

    let mut file_cache;
    let mut memory_cache;
    let cache: &mut dyn RowCache = match FileRowCache::new(&config.cache_dir) {
        Ok(c) if !args.demo => {
            file_cache = c;
            &mut file_cache
        }
        Ok(_) => {
            memory_cache = InMemoryRowCache::new();
            &mut memory_cache
        }
        Err(e) => {
            warn!(error = %e, "cache directory unusable; caching in memory");
            memory_cache = InMemoryRowCache::new();
            &mut memory_cache
        }
    };

    let mut ctx = AppContext::start(clock(), &config, Ok(Box::new(HeadlessViewer::new())));
    let mut ui = UiController::new(config.search_debounce_ms);

    let report = LoadSession::new(source.as_ref(), cache, &clock)
        .run(&mut ctx)
        .await;

    while !ctx.progression().is_ready() {
        let now = clock();
        ui.tick(&mut ctx, now);
        let Some(next) = ui.next_deadline(&ctx) else {
            break;
        };
        let wait = next.0.saturating_sub(clock().0).max(1);
        tokio::time::sleep(Duration::from_millis(wait)).await;
    }
    ui.camera_moved(&mut ctx);

    let results = match args.query.as_deref() {
        Some(q) => {
            ui.search_input(clock(), q);
            ui.search_button(&mut ctx, clock());
            ui.search().results().to_vec()
        }
        None => Vec::new(),
    };

    let out = json!({
        "source": source.name(),
        "terrain": format!("{:?}", ctx.terrain()),
        "datasets": report.datasets,
        "loaded": report.total_loaded(),
        "entities": ctx.world.len(),
        "layers": EntityKind::ALL.iter().map(|&kind| json!({
            "name": kind.display_name(),
            "visible": ctx.layers.is_visible(kind),
            "count": ctx.world.count(kind),
        })).collect::<Vec<_>>(),
        "progress": ctx.progression().progress(),
        "ready": ctx.progression().ready_at().map(|(at, reason)| json!({
            "atMs": at.0,
            "reason": format!("{reason:?}"),
        })),
        "highlighted": ctx.highlighted().map(|id| json!({
            "id": id.to_string(),
            "source": ctx.highlight_source().map(|s| format!("{s:?}")),
        })),
        "results": results,
        "events": ctx.events.events().iter().map(|e| json!({
            "atMs": e.at.0,
            "kind": e.kind,
            "message": e.message,
        })).collect::<Vec<_>>(),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
