//! Application state for query service.

use std::sync::Arc;
use std::time::Duration;

use common::config::{AppConfig, EnvironmentRegistry, ServiceUrls};

use crate::advisor::{AiServiceAdvisor, SqlAdvisor};
use crate::warehouse::{PgWarehouse, Warehouse};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub environments: Arc<EnvironmentRegistry>,
    pub warehouse: Arc<dyn Warehouse>,
    pub advisor: Arc<dyn SqlAdvisor>,
}

impl AppState {
    /// Creates a new application state backed by the real warehouse and
    /// the `ai-service` advisor.
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        let service_urls = ServiceUrls::load();

        Ok(Self {
            environments: Arc::new(EnvironmentRegistry::load()),
            warehouse: Arc::new(PgWarehouse::new(Duration::from_secs(
                config.connect_timeout_secs,
            ))),
            advisor: Arc::new(AiServiceAdvisor::new(service_urls.ai_service, http_client)),
            config,
        })
    }
}
