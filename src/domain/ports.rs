use crate::config::{OutputFormat, SourceKind};
use crate::domain::model::{ImportRecord, SecurityGroupFact};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Read side of the store holding imported security group facts.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Installs whatever query-time helpers the source needs. Safe to call on every run.
    async fn ensure_helpers(&self) -> Result<()>;

    async fn fetch_security_group_facts(&self) -> Result<Vec<SecurityGroupFact>>;

    /// Fails with `NotFoundError` when no import has ever completed.
    async fn fetch_most_recent_import(&self) -> Result<ImportRecord>;
}

pub trait ConfigProvider: Send + Sync {
    fn source_kind(&self) -> SourceKind;
    fn source_endpoint(&self) -> Option<&str>;
    fn snapshot_path(&self) -> Option<&str>;
    fn request_timeout_seconds(&self) -> u64;
    fn source_headers(&self) -> HashMap<String, String>;
    /// `None` means the operator supplied nothing and the default safe ports apply.
    fn safe_ports(&self) -> Option<&[u32]>;
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> &[OutputFormat];
    fn bundle_filename(&self) -> Option<&str>;
}
