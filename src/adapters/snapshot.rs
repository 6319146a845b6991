use crate::core::{DataSource, SecurityGroupFact, Storage};
use crate::domain::model::ImportRecord;
use crate::utils::error::{CheckupError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// On-disk export of an account import.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub imports: Vec<ImportRecord>,
    #[serde(default)]
    pub security_groups: Vec<SecurityGroupFact>,
}

/// Reads facts from a JSON snapshot file through a [`Storage`].
pub struct SnapshotDataSource<S: Storage> {
    storage: S,
    path: String,
}

impl<S: Storage> SnapshotDataSource<S> {
    pub fn new(storage: S, path: impl Into<String>) -> Self {
        Self {
            storage,
            path: path.into(),
        }
    }

    async fn load(&self, query: &str) -> Result<Snapshot> {
        let bytes = self
            .storage
            .read_file(&self.path)
            .await
            .map_err(|e| CheckupError::QueryError {
                query: query.to_string(),
                message: format!("cannot read snapshot {}: {}", self.path, e),
            })?;
        serde_json::from_slice(&bytes).map_err(|e| CheckupError::ScanError {
            query: query.to_string(),
            message: format!("snapshot {} is malformed: {}", self.path, e),
        })
    }
}

#[async_trait]
impl<S: Storage> DataSource for SnapshotDataSource<S> {
    async fn ensure_helpers(&self) -> Result<()> {
        // nothing to install, but a missing snapshot should fail here rather than mid-report
        self.storage
            .read_file(&self.path)
            .await
            .map_err(|e| CheckupError::SetupError {
                message: format!("snapshot {} is not readable: {}", self.path, e),
            })?;
        tracing::debug!("Using snapshot {}", self.path);
        Ok(())
    }

    async fn fetch_security_group_facts(&self) -> Result<Vec<SecurityGroupFact>> {
        Ok(self.load("security groups").await?.security_groups)
    }

    async fn fetch_most_recent_import(&self) -> Result<ImportRecord> {
        self.load("most recent import")
            .await?
            .imports
            .into_iter()
            .max_by_key(|import| import.imported_at)
            .ok_or_else(|| CheckupError::NotFoundError {
                message: format!("snapshot {} records no completed import", self.path),
            })
    }
}
