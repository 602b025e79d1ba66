//! Shared command context: resolved paths, store, and engine wiring.

use std::path::PathBuf;
use std::sync::Arc;

use tanktrack_core::engine::{HttpEngine, RecommendationEngine};
use tanktrack_core::store::JsonFileStore;
use tanktrack_core::{KvStore, ProjectRepository};

use crate::config::{self, TankConfig};

pub struct AppContext {
    pub data_dir: PathBuf,
    pub quiet: bool,
}

impl AppContext {
    pub fn new(data_dir: Option<String>, quiet: bool) -> anyhow::Result<Self> {
        let data_dir = match data_dir {
            Some(dir) => PathBuf::from(dir),
            None => config::default_data_dir()?,
        };
        Ok(Self { data_dir, quiet })
    }

    pub fn open_store(&self) -> anyhow::Result<Arc<dyn KvStore>> {
        tracing::debug!(dir = %self.data_dir.display(), "opening data store");
        let store = JsonFileStore::open(self.data_dir.join("store"))?;
        Ok(Arc::new(store))
    }

    pub fn open_repository(&self) -> anyhow::Result<ProjectRepository> {
        Ok(ProjectRepository::load(self.open_store()?)?)
    }

    pub fn read_config(&self) -> anyhow::Result<TankConfig> {
        config::read_config(&self.data_dir)
    }

    /// Build the engine client. The URL is taken from the `--endpoint`
    /// flag, then `TANKTRACK_ENGINE_URL`, then the config file.
    pub fn open_engine(
        &self,
        endpoint: Option<String>,
    ) -> anyhow::Result<Box<dyn RecommendationEngine>> {
        let config = self.read_config()?;
        let url = endpoint
            .or_else(|| std::env::var("TANKTRACK_ENGINE_URL").ok())
            .or(config.engine.url)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "No engine URL configured; pass --endpoint, set TANKTRACK_ENGINE_URL, \
                     or run `tanktrack config set-engine-url <url>`"
                )
            })?;
        let mut engine = HttpEngine::new(url)?;
        if let Some(token) = config.engine.bearer_token {
            engine = engine.with_bearer_token(token);
        }
        Ok(Box::new(engine))
    }
}
