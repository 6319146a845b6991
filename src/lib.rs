pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;
pub use crate::config::toml_config::TomlConfig;

pub use crate::adapters::{http::HttpDataSource, snapshot::SnapshotDataSource, storage::LocalStorage};
pub use crate::app::{export::ReportExporter, run_checkup};
pub use crate::core::{
    classifier::{Classifier, DEFAULT_SAFE_PORTS},
    engine::{CheckupEngine, CheckupOutcome},
    multirange::{MultiRange, ParseError, PortRange},
    report::{generate, ReportGenerator},
};
pub use crate::domain::model::{
    ImportRecord, Report, ReportMetadata, ReportRow, SecurityGroupFact, Status,
};
pub use crate::domain::ports::{ConfigProvider, DataSource, Storage};
pub use crate::utils::error::{CheckupError, Result};
