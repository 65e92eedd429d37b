use std::path::PathBuf;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::gate::LatestGate;
use crate::models::StatsReport;
use crate::source::BenchmarkSource;

#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn BenchmarkSource>,
    /// Last published stats computation
    pub stats: Arc<LatestGate<Arc<StatsReport>>>,
    pub fetch_concurrency: usize,
    pub default_page_size: u32,
    pub cors_origin: String,
    pub static_dir: Option<PathBuf>,
}

impl AppState {
    pub fn new(source: Arc<dyn BenchmarkSource>, config: &AppConfig) -> Self {
        Self {
            source,
            stats: Arc::new(LatestGate::new()),
            fetch_concurrency: config.data.max_concurrent_fetches,
            default_page_size: config.view.default_page_size,
            cors_origin: config.server.cors_origin.clone(),
            static_dir: config.server.static_dir.clone(),
        }
    }

    /// State over a local data root with default settings.
    #[cfg(test)]
    pub(crate) fn for_tests(data_dir: &std::path::Path) -> Self {
        use crate::source::LocalSource;
        use crate::storage::StorageConfig;

        let source = Arc::new(LocalSource::new(StorageConfig::new(data_dir.to_path_buf())));
        Self::new(source, &AppConfig::default())
    }
}
