/// Terrain chosen for the viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerrainProvider {
    /// Hosted global terrain asset; needs an access token.
    WorldTerrain { asset_id: u64 },
    /// Self-hosted quantized-mesh terrain.
    Url { url: String },
    /// Smooth WGS84 ellipsoid; always available.
    Ellipsoid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerrainError {
    MissingToken,
    NotConfigured,
    Unavailable(String),
}

impl std::fmt::Display for TerrainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TerrainError::MissingToken => write!(f, "no access token configured"),
            TerrainError::NotConfigured => write!(f, "terrain source not configured"),
            TerrainError::Unavailable(msg) => write!(f, "terrain unavailable: {msg}"),
        }
    }
}

impl std::error::Error for TerrainError {}

pub trait TerrainFactory {
    fn name(&self) -> &str;
    fn create(&self) -> Result<TerrainProvider, TerrainError>;
}

pub const WORLD_TERRAIN_ASSET_ID: u64 = 1;

#[derive(Debug, Clone)]
pub struct WorldTerrainFactory {
    pub access_token: Option<String>,
    pub asset_id: u64,
}

impl TerrainFactory for WorldTerrainFactory {
    fn name(&self) -> &str {
        "world-terrain"
    }

    fn create(&self) -> Result<TerrainProvider, TerrainError> {
        match self.access_token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => Ok(TerrainProvider::WorldTerrain {
                asset_id: self.asset_id,
            }),
            _ => Err(TerrainError::MissingToken),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UrlTerrainFactory {
    pub url: Option<String>,
}

impl TerrainFactory for UrlTerrainFactory {
    fn name(&self) -> &str {
        "url-terrain"
    }

    fn create(&self) -> Result<TerrainProvider, TerrainError> {
        let Some(url) = self.url.as_deref().map(str::trim) else {
            return Err(TerrainError::NotConfigured);
        };
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(TerrainError::Unavailable(format!("unsupported url {url:?}")));
        }
        Ok(TerrainProvider::Url {
            url: url.to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EllipsoidFactory;

impl TerrainFactory for EllipsoidFactory {
    fn name(&self) -> &str {
        "ellipsoid"
    }

    fn create(&self) -> Result<TerrainProvider, TerrainError> {
        Ok(TerrainProvider::Ellipsoid)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerrainSelection {
    pub provider: TerrainProvider,
    pub factory: String,
    /// Factories tried before the winner, with their failures.
    pub failures: Vec<(String, TerrainError)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerrainChainExhausted {
    pub failures: Vec<(String, TerrainError)>,
}

impl std::fmt::Display for TerrainChainExhausted {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "no terrain provider available ({} tried)", self.failures.len())
    }
}

impl std::error::Error for TerrainChainExhausted {}

/// Tries each factory in order and stops at the first success.
pub fn select_terrain(
    factories: &[Box<dyn TerrainFactory>],
) -> Result<TerrainSelection, TerrainChainExhausted> {
    let mut failures = Vec::new();
    for factory in factories {
        match factory.create() {
            Ok(provider) => {
                tracing::info!(factory = factory.name(), "terrain provider selected");
                return Ok(TerrainSelection {
                    provider,
                    factory: factory.name().to_string(),
                    failures,
                });
            }
            Err(e) => {
                tracing::warn!(factory = factory.name(), error = %e, "terrain provider failed");
                failures.push((factory.name().to_string(), e));
            }
        }
    }
    Err(TerrainChainExhausted { failures })
}

/// World terrain, then a self-hosted URL, then the ellipsoid.
pub fn default_chain(
    access_token: Option<String>,
    terrain_url: Option<String>,
) -> Vec<Box<dyn TerrainFactory>> {
    vec![
        Box::new(WorldTerrainFactory {
            access_token,
            asset_id: WORLD_TERRAIN_ASSET_ID,
        }),
        Box::new(UrlTerrainFactory { url: terrain_url }),
        Box::new(EllipsoidFactory),
    ]
}

#[cfg(test)]
mod tests {
    use super::{
        TerrainError, TerrainFactory, TerrainProvider, UrlTerrainFactory, default_chain,
        select_terrain,
    };

    #[test]
    fn token_selects_world_terrain() {
        let sel = select_terrain(&default_chain(Some("tok".into()), None)).unwrap();
        assert_eq!(sel.provider, TerrainProvider::WorldTerrain { asset_id: 1 });
        assert!(sel.failures.is_empty());
    }

    #[test]
    fn falls_through_to_url_then_ellipsoid() {
        let sel = select_terrain(&default_chain(
            Some("  ".into()),
            Some("https://tiles.example/terrain".into()),
        ))
        .unwrap();
        assert_eq!(sel.factory, "url-terrain");
        assert_eq!(sel.failures[0].1, TerrainError::MissingToken);

        let sel = select_terrain(&default_chain(None, None)).unwrap();
        assert_eq!(sel.provider, TerrainProvider::Ellipsoid);
        assert_eq!(sel.failures.len(), 2);
    }

    #[test]
    fn exhausted_chain_reports_all_failures() {
        let chain: Vec<Box<dyn TerrainFactory>> =
            vec![Box::new(UrlTerrainFactory { url: Some("ftp://x".into()) })];
        let err = select_terrain(&chain).unwrap_err();
        assert_eq!(err.failures.len(), 1);
    }
}
