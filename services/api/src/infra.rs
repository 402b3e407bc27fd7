use admissions::config::AppConfig;
use admissions::error::AppError;
use admissions::students::{AdmissionService, DatabaseStore, UploadSink};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Connect the configured record store, creating the table when needed.
pub(crate) async fn open_store(config: &AppConfig) -> Result<DatabaseStore, AppError> {
    let store = DatabaseStore::connect(&config.storage).await?;
    Ok(store)
}

/// Wire the admission service over an open store and the configured upload directory.
pub(crate) fn admission_service(
    config: &AppConfig,
    store: DatabaseStore,
) -> Result<Arc<AdmissionService<DatabaseStore>>, AppError> {
    let uploads = UploadSink::create(&config.intake.upload_dir)?;
    info!(
        upload_dir = %uploads.dir().display(),
        backend = store.backend(),
        policy = ?config.intake.validation,
        "admission intake configured"
    );
    Ok(Arc::new(AdmissionService::new(
        Arc::new(store),
        uploads,
        config.intake.validation,
    )))
}
