use crate::core::classifier::Classifier;
use crate::domain::model::{ImportRecord, Report, ReportMetadata, ReportRow, Status};
use crate::domain::ports::DataSource;
use crate::utils::error::{Result, ResultExt};
use chrono::{DateTime, Utc};

/// Organizations whose name starts with this were synthesized by the importer.
pub const DUMMY_ORGANIZATION_PREFIX: &str = "OrgDummy";
pub const NO_ORGANIZATION: &str = "<NONE>";

pub struct ReportGenerator<D: DataSource> {
    source: D,
    classifier: Classifier,
}

impl<D: DataSource> ReportGenerator<D> {
    pub fn new(source: D, safe_ports: Option<&[u32]>) -> Self {
        Self {
            source,
            classifier: Classifier::new(safe_ports),
        }
    }

    pub fn source(&self) -> &D {
        &self.source
    }

    pub async fn generate(&self) -> Result<Report> {
        generate_with(&self.source, &self.classifier).await
    }
}

/// Produces a report assessing the risk of every imported security group.
/// Any failure aborts the whole run.
pub async fn generate<D: DataSource + ?Sized>(
    source: &D,
    safe_ports: Option<&[u32]>,
) -> Result<Report> {
    generate_with(source, &Classifier::new(safe_ports)).await
}

async fn generate_with<D: DataSource + ?Sized>(
    source: &D,
    classifier: &Classifier,
) -> Result<Report> {
    source
        .ensure_helpers()
        .await
        .stage("Failed to install query helpers")?;
    tracing::info!("Query helpers ready");

    let facts = source
        .fetch_security_group_facts()
        .await
        .stage("Failed to run security group query")?;
    tracing::info!("Fetched {} security groups", facts.len());

    let mut rows = facts
        .iter()
        .map(|fact| classifier.classify(fact))
        .collect::<Result<Vec<_>>>()
        .stage("Failed to generate report from query results")?;
    sort_rows(&mut rows);
    for status in Status::ALL {
        tracing::debug!(
            "{} groups rated {}",
            rows.iter().filter(|r| r.status == status).count(),
            status
        );
    }

    let import = source
        .fetch_most_recent_import()
        .await
        .stage("Failed to load metadata")?;
    let metadata = build_metadata(import, &rows, Utc::now());
    tracing::info!(
        "Report ready for account {} ({} rows)",
        metadata.account_id,
        rows.len()
    );

    Ok(Report { metadata, rows })
}

/// Stable sort by status, then region, then name.
pub fn sort_rows(rows: &mut [ReportRow]) {
    rows.sort_by(|a, b| {
        a.status
            .cmp(&b.status)
            .then_with(|| a.region().cmp(b.region()))
            .then_with(|| a.name.cmp(&b.name))
    });
}

pub fn normalize_organization(organization: String) -> String {
    if organization.starts_with(DUMMY_ORGANIZATION_PREFIX) {
        NO_ORGANIZATION.to_string()
    } else {
        organization
    }
}

/// The account comes from the first sorted row; with no rows it is left empty.
pub fn build_metadata(
    import: ImportRecord,
    rows: &[ReportRow],
    generated_at: DateTime<Utc>,
) -> ReportMetadata {
    let account_id = match rows.first() {
        Some(row) => row.account_id().to_string(),
        None => {
            tracing::warn!("No security groups imported, account id is unknown");
            String::new()
        }
    };
    ReportMetadata {
        imported_at: import.imported_at,
        generated_at,
        account_id,
        organization: normalize_organization(import.organization),
    }
}
