use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One imported security group, as read from a data source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityGroupFact {
    pub arn: String,
    #[serde(alias = "group_name")]
    pub name: String,
    #[serde(default)]
    pub public_ips: Vec<String>,
    pub in_use: bool,
    pub is_default: bool,
    /// Zero or one multirange-format strings such as `"22,80-90"`.
    #[serde(default)]
    pub port_range_specs: Vec<String>,
    #[serde(default)]
    pub is_large_public_block: bool,
    #[serde(default)]
    pub large_range_count: bool,
    #[serde(default)]
    pub is_restricted: bool,
    #[serde(default)]
    pub internal_only: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRecord {
    pub imported_at: DateTime<Utc>,
    pub organization: String,
}

/// Severity of a report row. Declaration order is the report order: red first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Red,
    Yellow,
    Green,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Red, Status::Yellow, Status::Green];

    pub fn rank(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Red => "red",
            Status::Yellow => "yellow",
            Status::Green => "green",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub arn: String,
    pub name: String,
    pub status: Status,
    pub public_ips: Vec<String>,
    pub in_use: bool,
    pub is_default: bool,
    pub notes: Vec<String>,
}

impl ReportRow {
    pub fn region(&self) -> &str {
        arn_field(&self.arn, ARN_REGION_FIELD)
    }

    pub fn account_id(&self) -> &str {
        arn_field(&self.arn, ARN_ACCOUNT_FIELD)
    }
}

pub const ARN_REGION_FIELD: usize = 3;
pub const ARN_ACCOUNT_FIELD: usize = 4;

/// Colon-delimited field of an ARN, or `""` when the ARN is too short.
pub fn arn_field(arn: &str, index: usize) -> &str {
    arn.split(':').nth(index).unwrap_or("")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub imported_at: DateTime<Utc>,
    pub generated_at: DateTime<Utc>,
    pub account_id: String,
    pub organization: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub rows: Vec<ReportRow>,
}

impl Report {
    pub fn count(&self, status: Status) -> usize {
        self.rows.iter().filter(|r| r.status == status).count()
    }
}
