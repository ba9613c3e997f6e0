//! Application context shared by every route handler via Axum state.

use std::sync::Arc;

use sc_av::{ArtifactStore, ToolRegistry};
use sc_core::config::Config;
use sc_core::events::EventBus;
use sc_pipeline::{default_engines, Engines, JobManager, Pipeline};

/// Central state handed to every route handler.
///
/// Cloning is cheap: everything shared lives behind an `Arc`.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub tools: Arc<ToolRegistry>,
    pub store: ArtifactStore,
    pub event_bus: Arc<EventBus>,
    pub jobs: Arc<JobManager>,
    pub pipeline: Arc<Pipeline>,
}

impl AppContext {
    /// Build a context driving the production engines.
    pub fn new(config: Config, tools: Arc<ToolRegistry>) -> Self {
        let store = ArtifactStore::new(&config.storage);
        let engines = default_engines(tools.clone(), &config, &store);
        Self::with_engines(config, tools, store, engines)
    }

    /// Build a context around caller-supplied engines.
    pub fn with_engines(
        config: Config,
        tools: Arc<ToolRegistry>,
        store: ArtifactStore,
        engines: Engines,
    ) -> Self {
        let config = Arc::new(config);
        let event_bus = Arc::new(EventBus::default());
        let jobs = Arc::new(JobManager::new(Some(event_bus.clone())));
        let pipeline = Arc::new(Pipeline::new(engines, store.clone(), config.clone()));
        Self {
            config,
            tools,
            store,
            event_bus,
            jobs,
            pipeline,
        }
    }
}
