use camp_admin::camp::{InMemoryCampRepository, RepositoryError};
use camp_admin::config::StorageConfig;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::warn;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Build the camp store, loading the configured snapshot when there is one.
pub(crate) fn open_repository(
    storage: &StorageConfig,
) -> Result<InMemoryCampRepository, RepositoryError> {
    match &storage.data_file {
        Some(path) => InMemoryCampRepository::open(path.clone()),
        None => {
            warn!("APP_DATA_FILE not set; camp records will not survive a restart");
            Ok(InMemoryCampRepository::new())
        }
    }
}
