use crate::app::export::ReportExporter;
use crate::core::report::ReportGenerator;
use crate::core::{DataSource, Report, Status, Storage};
use crate::utils::error::Result;

#[derive(Debug, Clone)]
pub struct CheckupOutcome {
    pub report: Report,
    pub written: Vec<String>,
}

pub struct CheckupEngine<D: DataSource, S: Storage> {
    generator: ReportGenerator<D>,
    exporter: ReportExporter<S>,
}

impl<D: DataSource, S: Storage> CheckupEngine<D, S> {
    pub fn new(generator: ReportGenerator<D>, exporter: ReportExporter<S>) -> Self {
        Self {
            generator,
            exporter,
        }
    }

    pub async fn run(&self) -> Result<CheckupOutcome> {
        tracing::info!("Generating security group report");
        let report = self.generator.generate().await?;
        tracing::info!(
            "Classified {} groups: {} red, {} yellow, {} green",
            report.rows.len(),
            report.count(Status::Red),
            report.count(Status::Yellow),
            report.count(Status::Green)
        );

        tracing::info!("Exporting report");
        let written = self.exporter.export(&report).await?;
        for path in &written {
            tracing::debug!("Wrote {}", path);
        }

        Ok(CheckupOutcome { report, written })
    }
}
