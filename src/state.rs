use parking_lot::RwLock;
use std::sync::Arc;

use crate::config::{Config, LlmConfig};
use crate::llm::client::HttpModelClient;
use crate::llm::ModelClient;
use crate::search::WisdomSearch;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub llm_config: Arc<RwLock<LlmConfig>>,
    pub search: Arc<WisdomSearch>,
    pub search_semaphore: Arc<tokio::sync::Semaphore>,
}

impl AppState {
    /// State backed by the configured hosted model.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let llm_config = Arc::new(RwLock::new(config.llm.clone()));
        let model = HttpModelClient::new(llm_config.clone())?;
        Ok(Self::assemble(config, llm_config, Arc::new(model)))
    }

    /// State backed by any model, e.g. a scripted one in tests.
    pub fn with_model(config: Config, model: Arc<dyn ModelClient>) -> Self {
        let llm_config = Arc::new(RwLock::new(config.llm.clone()));
        Self::assemble(config, llm_config, model)
    }

    fn assemble(
        config: Config,
        llm_config: Arc<RwLock<LlmConfig>>,
        model: Arc<dyn ModelClient>,
    ) -> Self {
        let permits = config.max_concurrent_searches.max(1);
        Self {
            config,
            llm_config,
            search: Arc::new(WisdomSearch::new(model)),
            search_semaphore: Arc::new(tokio::sync::Semaphore::new(permits)),
        }
    }
}
