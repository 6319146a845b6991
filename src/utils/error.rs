use crate::core::multirange::ParseError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckupError {
    #[error("Cannot reach data source: {message}")]
    ConnectionError { message: String },

    #[error("Helper installation failed: {message}")]
    SetupError { message: String },

    #[error("Query for {query} failed: {message}")]
    QueryError { query: String, message: String },

    #[error("Failed to read a {query} row: {message}")]
    ScanError { query: String, message: String },

    #[error("Failed to parse port range {spec:?} for group {group}: {source}")]
    PortRangeError {
        group: String,
        spec: String,
        #[source]
        source: ParseError,
    },

    #[error("Not found: {message}")]
    NotFoundError { message: String },

    #[error("{stage}: {source}")]
    StageError {
        stage: String,
        #[source]
        source: Box<CheckupError>,
    },

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value {value:?} for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

pub type Result<T> = std::result::Result<T, CheckupError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    DataSource,
    Analysis,
    Configuration,
    Output,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CheckupError {
    /// Wraps the error with the name of the stage that was running when it happened.
    pub fn in_stage(self, stage: impl Into<String>) -> Self {
        CheckupError::StageError {
            stage: stage.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error once all stage wrappers are peeled off.
    pub fn root_cause(&self) -> &CheckupError {
        let mut current = self;
        while let CheckupError::StageError { source, .. } = current {
            current = source;
        }
        current
    }

    pub fn category(&self) -> ErrorCategory {
        match self.root_cause() {
            CheckupError::ConnectionError { .. }
            | CheckupError::SetupError { .. }
            | CheckupError::QueryError { .. }
            | CheckupError::ScanError { .. }
            | CheckupError::NotFoundError { .. }
            | CheckupError::ApiError(_) => ErrorCategory::DataSource,
            CheckupError::PortRangeError { .. } | CheckupError::ProcessingError { .. } => {
                ErrorCategory::Analysis
            }
            CheckupError::ConfigError { .. }
            | CheckupError::ConfigValidationError { .. }
            | CheckupError::InvalidConfigValueError { .. }
            | CheckupError::MissingConfigError { .. } => ErrorCategory::Configuration,
            CheckupError::ZipError(_)
            | CheckupError::CsvError(_)
            | CheckupError::SerializationError(_) => ErrorCategory::Output,
            CheckupError::IoError(_) | CheckupError::StageError { .. } => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::DataSource => ErrorSeverity::Medium,
            ErrorCategory::Analysis | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Output => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// Process exit code used by the binary for this error.
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Analysis | ErrorCategory::Output => 1,
            ErrorCategory::DataSource => 2,
            ErrorCategory::System => 3,
            ErrorCategory::Configuration => 4,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.root_cause() {
            CheckupError::ConnectionError { .. } | CheckupError::ApiError(_) => {
                "Check that the data source endpoint is reachable and retry"
            }
            CheckupError::SetupError { .. } => {
                "Check that the data source accepts helper installation requests"
            }
            CheckupError::QueryError { .. } | CheckupError::ScanError { .. } => {
                "Re-run the import; the stored security group facts look incomplete"
            }
            CheckupError::NotFoundError { .. } => {
                "Run an import of the account before generating a report"
            }
            CheckupError::PortRangeError { .. } => {
                "Inspect the imported port ranges for the named group and re-import"
            }
            CheckupError::ConfigError { .. }
            | CheckupError::ConfigValidationError { .. }
            | CheckupError::InvalidConfigValueError { .. }
            | CheckupError::MissingConfigError { .. } => {
                "Fix the configuration file or command line flags"
            }
            CheckupError::ZipError(_)
            | CheckupError::CsvError(_)
            | CheckupError::SerializationError(_)
            | CheckupError::IoError(_) => "Check that the output path is writable",
            CheckupError::ProcessingError { .. } | CheckupError::StageError { .. } => {
                "Retry the report generation"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::DataSource => format!("Could not read security group data: {}", self),
            ErrorCategory::Analysis => format!("Could not analyze security groups: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Output => format!("Could not write the report: {}", self),
            ErrorCategory::System => format!("Unexpected failure: {}", self),
        }
    }
}

pub trait ResultExt<T> {
    fn stage(self, stage: &str) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn stage(self, stage: &str) -> Result<T> {
        self.map_err(|e| e.in_stage(stage))
    }
}
