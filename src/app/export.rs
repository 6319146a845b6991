use crate::config::OutputFormat;
use crate::core::{ConfigProvider, Report, Status, Storage};
use crate::utils::error::{CheckupError, Result};
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

/// Renders reports and writes them through a [`Storage`].
pub struct ReportExporter<S: Storage> {
    storage: S,
    output_path: String,
    formats: Vec<OutputFormat>,
    bundle_filename: Option<String>,
}

impl<S: Storage> ReportExporter<S> {
    pub fn new(storage: S, output_path: &str, formats: &[OutputFormat]) -> Self {
        Self {
            storage,
            output_path: output_path.to_string(),
            formats: formats.to_vec(),
            bundle_filename: None,
        }
    }

    pub fn from_config<C: ConfigProvider>(storage: S, config: &C) -> Self {
        Self::new(storage, config.output_path(), config.output_formats())
            .with_bundle(config.bundle_filename().map(str::to_string))
    }

    /// Pack every rendered file into one zip archive instead of writing them loose.
    pub fn with_bundle(mut self, filename: Option<String>) -> Self {
        self.bundle_filename = filename;
        self
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Returns the paths written.
    pub async fn export(&self, report: &Report) -> Result<Vec<String>> {
        let mut files = Vec::with_capacity(self.formats.len());
        for format in &self.formats {
            files.push((format.file_name(), render(report, *format)?));
        }

        let mut written = Vec::new();
        match &self.bundle_filename {
            Some(bundle) => {
                tracing::debug!("Creating ZIP file with {} files", files.len());
                let zip_data = {
                    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
                    for (name, content) in &files {
                        zip.start_file::<_, ()>(*name, FileOptions::default())?;
                        zip.write_all(content.as_bytes())?;
                    }
                    let cursor = zip.finish()?;
                    cursor.into_inner()
                };
                tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
                self.storage.write_file(bundle, &zip_data).await?;
                written.push(format!("{}/{}", self.output_path, bundle));
            }
            None => {
                for (name, content) in &files {
                    self.storage.write_file(name, content.as_bytes()).await?;
                    written.push(format!("{}/{}", self.output_path, name));
                }
            }
        }
        Ok(written)
    }
}

pub fn render(report: &Report, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(report)),
        OutputFormat::Csv => render_csv(report),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
    }
}

pub fn render_text(report: &Report) -> String {
    let meta = &report.metadata;
    let mut out = String::new();
    out.push_str("Security group report\n");
    out.push_str(&format!("Account:      {}\n", meta.account_id));
    out.push_str(&format!("Organization: {}\n", meta.organization));
    out.push_str(&format!("Imported:     {}\n", meta.imported_at.to_rfc3339()));
    out.push_str(&format!("Generated:    {}\n", meta.generated_at.to_rfc3339()));
    out.push_str(&format!(
        "Summary:      {} red, {} yellow, {} green\n\n",
        report.count(Status::Red),
        report.count(Status::Yellow),
        report.count(Status::Green)
    ));

    let region_width = report
        .rows
        .iter()
        .map(|r| r.region().len())
        .chain(std::iter::once("REGION".len()))
        .max()
        .unwrap_or(0);
    let name_width = report
        .rows
        .iter()
        .map(|r| r.name.len())
        .chain(std::iter::once("NAME".len()))
        .max()
        .unwrap_or(0);

    out.push_str(&format!(
        "{:<6}  {:<rw$}  {:<nw$}  NOTES\n",
        "STATUS",
        "REGION",
        "NAME",
        rw = region_width,
        nw = name_width
    ));
    for row in &report.rows {
        out.push_str(&format!(
            "{:<6}  {:<rw$}  {:<nw$}  {}\n",
            row.status.as_str(),
            row.region(),
            row.name,
            row.notes.join("; "),
            rw = region_width,
            nw = name_width
        ));
    }
    out
}

pub fn render_csv(report: &Report) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "status",
        "region",
        "arn",
        "name",
        "in_use",
        "is_default",
        "public_ips",
        "notes",
    ])?;
    for row in &report.rows {
        let public_ips = row.public_ips.join(";");
        let notes = row.notes.join(";");
        writer.write_record([
            row.status.as_str(),
            row.region(),
            row.arn.as_str(),
            row.name.as_str(),
            if row.in_use { "true" } else { "false" },
            if row.is_default { "true" } else { "false" },
            public_ips.as_str(),
            notes.as_str(),
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| CheckupError::ProcessingError {
            message: format!("Failed to flush CSV output: {}", e),
        })?;
    String::from_utf8(bytes).map_err(|e| CheckupError::ProcessingError {
        message: format!("CSV output is not UTF-8: {}", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ReportMetadata, ReportRow};
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                CheckupError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    fn sample_report() -> Report {
        Report {
            metadata: ReportMetadata {
                imported_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
                generated_at: Utc.with_ymd_and_hms(2024, 3, 2, 8, 30, 0).unwrap(),
                account_id: "123456789012".to_string(),
                organization: "Acme".to_string(),
            },
            rows: vec![
                ReportRow {
                    arn: "arn:aws:ec2:us-east-1:123456789012:security-group/sg-1".to_string(),
                    name: "web".to_string(),
                    status: Status::Red,
                    public_ips: vec!["1.2.3.4".to_string(), "5.6.7.8".to_string()],
                    in_use: true,
                    is_default: false,
                    notes: vec![
                        "Allows traffic from anywhere on TCP ports (3306)".to_string(),
                        "Contains 2 public IP address(es)".to_string(),
                    ],
                },
                ReportRow {
                    arn: "arn:aws:ec2:eu-west-1:123456789012:security-group/sg-2".to_string(),
                    name: "default".to_string(),
                    status: Status::Green,
                    public_ips: vec![],
                    in_use: false,
                    is_default: true,
                    notes: vec![
                        "Not in use".to_string(),
                        "No public IP addresses found".to_string(),
                    ],
                },
            ],
        }
    }

    #[test]
    fn test_render_csv() {
        let csv = render_csv(&sample_report()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "status,region,arn,name,in_use,is_default,public_ips,notes");
        assert!(lines[1].starts_with("red,us-east-1,arn:aws:ec2:us-east-1"));
        assert!(lines[1].contains("1.2.3.4;5.6.7.8"));
        assert!(lines[2].starts_with("green,eu-west-1,"));
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_render_text_lists_summary_and_rows() {
        let text = render_text(&sample_report());

        assert!(text.contains("Account:      123456789012"));
        assert!(text.contains("Summary:      1 red, 0 yellow, 1 green"));
        assert!(text.contains("red     us-east-1  web"));
        assert!(text.contains("Not in use; No public IP addresses found"));
    }

    #[test]
    fn test_render_json_round_trips_report() {
        let report = sample_report();
        let json = render(&report, OutputFormat::Json).unwrap();
        let parsed: Report = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);
    }

    #[tokio::test]
    async fn test_export_loose_files() {
        let storage = MockStorage::new();
        let exporter = ReportExporter::new(
            storage.clone(),
            "./out",
            &[OutputFormat::Csv, OutputFormat::Text],
        );

        let written = exporter.export(&sample_report()).await.unwrap();

        assert_eq!(written, vec!["./out/report.csv", "./out/report.txt"]);
        assert!(storage.get_file("report.csv").await.is_some());
        assert!(storage.get_file("report.json").await.is_none());
    }

    #[tokio::test]
    async fn test_export_zip_bundle() {
        let storage = MockStorage::new();
        let exporter = ReportExporter::new(
            storage.clone(),
            "./out",
            &[OutputFormat::Csv, OutputFormat::Json],
        )
        .with_bundle(Some("report.zip".to_string()));

        let written = exporter.export(&sample_report()).await.unwrap();
        assert_eq!(written, vec!["./out/report.zip"]);

        let zip_data = storage.get_file("report.zip").await.unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data)).unwrap();
        assert_eq!(archive.len(), 2);
        assert!(archive.by_name("report.csv").is_ok());
        assert!(archive.by_name("report.json").is_ok());
        assert!(storage.get_file("report.csv").await.is_none());
    }
}
