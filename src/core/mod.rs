pub mod classifier;
pub mod engine;
pub mod multirange;
pub mod report;

pub use crate::domain::model::{Report, ReportMetadata, ReportRow, SecurityGroupFact, Status};
pub use crate::domain::ports::{ConfigProvider, DataSource, Storage};
pub use crate::utils::error::Result;
