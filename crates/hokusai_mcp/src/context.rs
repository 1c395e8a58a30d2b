//! Shared service state wired into every tool.

use hokusai_error::HokusaiResult;
use hokusai_interface::RenderDriver;
use hokusai_registry::ReferenceRegistry;
use hokusai_render::{BatchOrchestrator, RequestBuilder};
use hokusai_storage::{DataLayout, PageStore};
use hokusai_validator::StoryboardValidator;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Default art style applied when a tool call does not name one.
pub const DEFAULT_STYLE: &str = "Japanese manga";

/// The assembled pipeline behind the tool surface.
///
/// One context is built at startup and shared by every tool; all state it
/// owns is safe for concurrent tool calls.
pub struct ServiceContext {
    driver: Arc<dyn RenderDriver>,
    registry: Arc<ReferenceRegistry>,
    store: Arc<PageStore>,
    builder: RequestBuilder,
    orchestrator: BatchOrchestrator,
    validator: StoryboardValidator,
}

impl ServiceContext {
    /// Wire the pipeline against a data directory and a render driver.
    pub async fn new(
        data_dir: impl AsRef<Path>,
        driver: Arc<dyn RenderDriver>,
        call_timeout: Duration,
    ) -> HokusaiResult<Self> {
        let layout = DataLayout::new(data_dir.as_ref().to_path_buf());
        let registry = Arc::new(ReferenceRegistry::open(layout.clone(), driver.clone()).await?);
        let store = Arc::new(PageStore::new(layout));
        let builder = RequestBuilder::new(registry.clone());
        let orchestrator = BatchOrchestrator::new(driver.clone(), store.clone(), call_timeout);

        Ok(Self {
            driver,
            registry,
            store,
            builder,
            orchestrator,
            validator: StoryboardValidator::new(),
        })
    }

    /// The render driver behind the pipeline.
    pub fn driver(&self) -> &Arc<dyn RenderDriver> {
        &self.driver
    }

    /// The reference registry.
    pub fn registry(&self) -> &Arc<ReferenceRegistry> {
        &self.registry
    }

    /// The page store.
    pub fn store(&self) -> &Arc<PageStore> {
        &self.store
    }

    /// The render request builder.
    pub fn builder(&self) -> &RequestBuilder {
        &self.builder
    }

    /// The batch orchestrator.
    pub fn orchestrator(&self) -> &BatchOrchestrator {
        &self.orchestrator
    }

    /// The storyboard validator.
    pub fn validator(&self) -> &StoryboardValidator {
        &self.validator
    }
}
