use std::sync::Arc;

use crate::config::Config;
use crate::llm::ModelClient;
use crate::translate::TranslationPipeline;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pipeline: Arc<TranslationPipeline>,
}

impl AppState {
    pub fn new(config: Config, llm: Arc<dyn ModelClient>) -> Self {
        Self {
            config: Arc::new(config),
            pipeline: Arc::new(TranslationPipeline::new(llm)),
        }
    }
}
