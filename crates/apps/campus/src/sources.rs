//! Where dataset CSV text comes from.
//!
//! Every source maps an [`EntityKind`] to one CSV document:
//! - [`FilesystemSource`]: `<root>/<file>`
//! - [`HttpSource`]: `<base_url>/<file>`
//! - [`StaticSource`]: in-memory text, for demos and tests

use std::collections::BTreeMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use formats::DatasetError;
use formats::seed::SEED_BUILDINGS_CSV;
use scene::entity::EntityKind;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// File name of each dataset, relative to the source root.
pub fn dataset_file(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Building => "buildings.csv",
        EntityKind::ParkingLot => "parking_lots.csv",
        EntityKind::BusStop => "bus_stops.csv",
        EntityKind::Service => "student_services.csv",
    }
}

/// Async dataset fetcher.
///
/// Methods return boxed futures for dyn-compatibility.
pub trait DatasetSource: Send + Sync {
    fn name(&self) -> &str;

    /// Fetches the raw CSV text for `kind`.
    fn fetch(&self, kind: EntityKind) -> BoxFuture<'_, Result<String, DatasetError>>;
}

pub struct FilesystemSource {
    root: PathBuf,
}

impl FilesystemSource {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl DatasetSource for FilesystemSource {
    fn name(&self) -> &str {
        "filesystem"
    }

    fn fetch(&self, kind: EntityKind) -> BoxFuture<'_, Result<String, DatasetError>> {
        let path = self.root.join(dataset_file(kind));
        Box::pin(async move {
            match tokio::fs::read_to_string(&path).await {
                Ok(text) => Ok(text),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(DatasetError::Fetch(
                    format!("{} not found", path.display()),
                )),
                Err(e) => Err(DatasetError::Fetch(format!(
                    "failed to read {}: {e}",
                    path.display()
                ))),
            }
        })
    }
}

pub struct HttpSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn url_for(&self, kind: EntityKind) -> String {
        format!("{}/{}", self.base_url, dataset_file(kind))
    }
}

impl DatasetSource for HttpSource {
    fn name(&self) -> &str {
        "http"
    }

    fn fetch(&self, kind: EntityKind) -> BoxFuture<'_, Result<String, DatasetError>> {
        let url = self.url_for(kind);
        Box::pin(async move {
            let resp = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| DatasetError::Fetch(format!("GET {url}: {e}")))?;
            let status = resp.status();
            if !status.is_success() {
                return Err(DatasetError::Fetch(format!("GET {url}: HTTP {status}")));
            }
            resp.text()
                .await
                .map_err(|e| DatasetError::Fetch(format!("GET {url}: {e}")))
        })
    }
}

/// In-memory datasets. Kinds without text fail like a missing file.
#[derive(Debug, Default, Clone)]
pub struct StaticSource {
    texts: BTreeMap<EntityKind, String>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in campus buildings, and nothing else.
    pub fn seeded() -> Self {
        Self::new().with(EntityKind::Building, SEED_BUILDINGS_CSV)
    }

    pub fn with(mut self, kind: EntityKind, text: impl Into<String>) -> Self {
        self.texts.insert(kind, text.into());
        self
    }
}

impl DatasetSource for StaticSource {
    fn name(&self) -> &str {
        "static"
    }

    fn fetch(&self, kind: EntityKind) -> BoxFuture<'_, Result<String, DatasetError>> {
        let result = self
            .texts
            .get(&kind)
            .cloned()
            .ok_or_else(|| DatasetError::Fetch(format!("no {} dataset", dataset_file(kind))));
        Box::pin(async move { result })
    }
}
