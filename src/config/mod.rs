pub mod toml_config;

use crate::core::ConfigProvider;
use crate::utils::error::{CheckupError, Result};
use crate::utils::validation;
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::collections::HashMap;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_BUNDLE_FILENAME: &str = "report.zip";
pub const MAX_PORT: u32 = 65535;

/// Where security group facts are read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Http,
    Snapshot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Csv,
    Json,
}

impl OutputFormat {
    pub fn file_name(self) -> &'static str {
        match self {
            OutputFormat::Text => "report.txt",
            OutputFormat::Csv => "report.csv",
            OutputFormat::Json => "report.json",
        }
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "sg-checkup")]
#[command(about = "Rates imported security groups by how exposed they are")]
pub struct CliConfig {
    #[arg(long, help = "Read settings from a TOML file instead of flags")]
    pub config: Option<String>,

    #[arg(long, value_enum, default_value = "snapshot")]
    pub source: SourceKind,

    #[arg(long, help = "Base URL of the HTTP export service")]
    pub endpoint: Option<String>,

    #[arg(long, help = "Path of a JSON snapshot of imported facts")]
    pub snapshot: Option<String>,

    #[arg(long, value_delimiter = ',', help = "Ports allowed to be open [default: 22,80,443]")]
    pub safe_ports: Vec<u32>,

    #[arg(long, default_value = "./report")]
    pub output_path: String,

    #[arg(long = "format", value_enum, value_delimiter = ',', default_value = "text")]
    pub formats: Vec<OutputFormat>,

    #[arg(long, help = "Pack all rendered files into this zip archive")]
    pub bundle: Option<String>,

    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECONDS)]
    pub timeout: u64,

    #[arg(long = "header", value_parser = parse_header, help = "Extra request header, NAME=VALUE")]
    pub headers: Vec<(String, String)>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

#[cfg(feature = "cli")]
fn parse_header(raw: &str) -> std::result::Result<(String, String), String> {
    raw.split_once('=')
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| format!("expected NAME=VALUE, got {:?}", raw))
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn source_kind(&self) -> SourceKind {
        self.source
    }

    fn source_endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    fn snapshot_path(&self) -> Option<&str> {
        self.snapshot.as_deref()
    }

    fn request_timeout_seconds(&self) -> u64 {
        self.timeout
    }

    fn source_headers(&self) -> HashMap<String, String> {
        self.headers.iter().cloned().collect()
    }

    fn safe_ports(&self) -> Option<&[u32]> {
        if self.safe_ports.is_empty() {
            None
        } else {
            Some(self.safe_ports.as_slice())
        }
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_formats(&self) -> &[OutputFormat] {
        &self.formats
    }

    fn bundle_filename(&self) -> Option<&str> {
        self.bundle.as_deref()
    }
}

#[cfg(feature = "cli")]
impl validation::Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_settings(self)
    }
}

/// Checks that a configuration is complete for the source it selects.
pub fn validate_settings<C: ConfigProvider + ?Sized>(config: &C) -> Result<()> {
    match config.source_kind() {
        SourceKind::Http => {
            let endpoint =
                validation::validate_required_field("source.endpoint", config.source_endpoint())?;
            validation::validate_url("source.endpoint", endpoint)?;
        }
        SourceKind::Snapshot => {
            let path =
                validation::validate_required_field("source.path", config.snapshot_path())?;
            validation::validate_path("source.path", path)?;
        }
    }

    validation::validate_positive_number(
        "source.timeout_seconds",
        config.request_timeout_seconds(),
        1,
    )?;

    if let Some(ports) = config.safe_ports() {
        for &port in ports {
            validation::validate_range("report.safe_ports", port, 0, MAX_PORT)?;
        }
    }

    validation::validate_path("output.path", config.output_path())?;
    if config.output_formats().is_empty() {
        return Err(CheckupError::InvalidConfigValueError {
            field: "output.formats".to_string(),
            value: String::new(),
            reason: "At least one output format is required".to_string(),
        });
    }
    if let Some(bundle) = config.bundle_filename() {
        validation::validate_non_empty_string("output.bundle.filename", bundle)?;
    }

    Ok(())
}
