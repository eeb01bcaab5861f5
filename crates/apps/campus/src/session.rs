use catalog::{BUILDINGS_CACHE_KEY, CacheEntry, RowCache};
use formats::{DatasetError, Row, adapt_rows, parse_rows, spec_for};
use foundation::time::Millis;
use runtime::kinds;
use scene::entity::EntityKind;
use serde::Serialize;

use crate::context::AppContext;
use crate::sources::DatasetSource;

/// Datasets in load order. Buildings come first and are the only one whose
/// failure is shown to the user.
pub const LOAD_ORDER: [EntityKind; 4] = EntityKind::ALL;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetOutcome {
    pub kind: EntityKind,
    pub loaded: usize,
    pub skipped: usize,
    pub from_cache: bool,
    /// Dataset-level failure; the dataset is simply absent.
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadReport {
    pub datasets: Vec<DatasetOutcome>,
}

impl LoadReport {
    pub fn outcome(&self, kind: EntityKind) -> Option<&DatasetOutcome> {
        self.datasets.iter().find(|d| d.kind == kind)
    }

    pub fn total_loaded(&self) -> usize {
        self.datasets.iter().map(|d| d.loaded).sum()
    }
}

/// One pass over every dataset, in [`LOAD_ORDER`].
///
/// Never fails as a whole: each dataset either installs or degrades to
/// absent. `clock` is read at each stage boundary.
pub struct LoadSession<'a> {
    source: &'a dyn DatasetSource,
    cache: &'a mut dyn RowCache,
    clock: &'a dyn Fn() -> Millis,
}

impl<'a> LoadSession<'a> {
    pub fn new(
        source: &'a dyn DatasetSource,
        cache: &'a mut dyn RowCache,
        clock: &'a dyn Fn() -> Millis,
    ) -> Self {
        Self {
            source,
            cache,
            clock,
        }
    }

    pub async fn run(mut self, ctx: &mut AppContext) -> LoadReport {
        let mut report = LoadReport::default();
        ctx.begin_data_loading((self.clock)());
        tracing::info!(source = self.source.name(), "loading campus datasets");

        for (i, kind) in LOAD_ORDER.into_iter().enumerate() {
            let outcome = self.load_one(ctx, kind).await;
            report.datasets.push(outcome);
            ctx.dataset_loaded(i + 1, LOAD_ORDER.len());
            if kind == EntityKind::Building {
                ctx.fly_home();
            }
            ctx.tick((self.clock)());
        }

        ctx.begin_quality_wait((self.clock)());
        tracing::info!(loaded = report.total_loaded(), "campus datasets installed");
        report
    }

    async fn load_one(&mut self, ctx: &mut AppContext, kind: EntityKind) -> DatasetOutcome {
        let (rows, from_cache) = match self.rows_for(kind).await {
            Ok(found) => found,
            Err(e) => {
                let now = (self.clock)();
                if kind == EntityKind::Building {
                    tracing::error!(%kind, error = %e, "primary dataset failed");
                    ctx.events
                        .emit(now, kinds::OVERLAY, format!("Error loading building data: {e}"));
                } else {
                    tracing::warn!(%kind, error = %e, "dataset unavailable; continuing without it");
                }
                return DatasetOutcome {
                    kind,
                    loaded: 0,
                    skipped: 0,
                    from_cache: false,
                    error: Some(e.to_string()),
                };
            }
        };

        let adapted = adapt_rows(spec_for(kind), &rows);
        let skipped = adapted.skipped.len();
        let loaded = ctx.install(kind, adapted.entities);
        DatasetOutcome {
            kind,
            loaded,
            skipped,
            from_cache,
            error: None,
        }
    }

    /// Building rows come from the cache when present; fresh ones are
    /// stored back. Cache trouble only costs a refetch.
    async fn rows_for(&mut self, kind: EntityKind) -> Result<(Vec<Row>, bool), DatasetError> {
        if kind == EntityKind::Building {
            match self.cache.load(BUILDINGS_CACHE_KEY) {
                Ok(Some(entry)) if !entry.rows.is_empty() => {
                    tracing::info!(rows = entry.rows.len(), "building rows served from cache");
                    return Ok((entry.rows, true));
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "building cache unreadable; refetching"),
            }
        }

        let text = self.source.fetch(kind).await?;
        let rows = parse_rows(&text)?;

        if kind == EntityKind::Building {
            let entry = CacheEntry {
                rows: rows.clone(),
                stored_at_ms: (self.clock)().0,
            };
            if let Err(e) = self.cache.store(BUILDINGS_CACHE_KEY, &entry) {
                tracing::warn!(error = %e, "failed to cache building rows");
            }
        }
        Ok((rows, false))
    }
}
