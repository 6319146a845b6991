pub mod export;

use crate::adapters::http::HttpDataSource;
use crate::adapters::snapshot::SnapshotDataSource;
use crate::adapters::storage::LocalStorage;
use crate::config::SourceKind;
use crate::core::engine::{CheckupEngine, CheckupOutcome};
use crate::core::report::ReportGenerator;
use crate::core::{ConfigProvider, DataSource};
use crate::utils::error::{CheckupError, Result};
use export::ReportExporter;

/// Builds the data source the configuration asks for and runs a full checkup.
/// Snapshot paths are resolved relative to the working directory.
pub async fn run_checkup<C: ConfigProvider>(config: &C) -> Result<CheckupOutcome> {
    match config.source_kind() {
        SourceKind::Http => {
            tracing::info!(
                "Reading security groups from {}",
                config.source_endpoint().unwrap_or_default()
            );
            run_with(HttpDataSource::from_config(config)?, config).await
        }
        SourceKind::Snapshot => {
            let path = config
                .snapshot_path()
                .ok_or_else(|| CheckupError::MissingConfigError {
                    field: "source.path".to_string(),
                })?;
            tracing::info!("Reading security groups from snapshot {}", path);
            let source = SnapshotDataSource::new(LocalStorage::new(".".to_string()), path);
            run_with(source, config).await
        }
    }
}

async fn run_with<D: DataSource, C: ConfigProvider>(
    source: D,
    config: &C,
) -> Result<CheckupOutcome> {
    let generator = ReportGenerator::new(source, config.safe_ports());
    let storage = LocalStorage::new(config.output_path().to_string());
    let exporter = ReportExporter::from_config(storage, config);
    CheckupEngine::new(generator, exporter).run().await
}
