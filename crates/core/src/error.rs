use thiserror::Error;

pub type DashboardResult<T> = Result<T, DashboardError>;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing columns: {missing:?}\nExpected: {expected:?}")]
    MissingColumns {
        missing: Vec<String>,
        expected: Vec<String>,
    },

    #[error("Invalid value in row {row}, column '{column}': {reason}")]
    InvalidRecord {
        row: usize,
        column: String,
        reason: String,
    },

    #[error("Dataset contains no rows")]
    EmptyDataset,

    #[error(
        "Default dataset '{0}' not found.\nUpload a CSV or set env var DEFAULT_DATAFILE."
    )]
    DatasetNotFound(String),

    #[error("Dataset {0} is not loaded")]
    UnknownDataset(String),

    #[error("Load data first.")]
    NoData,

    #[error("Invalid allocation: {0}")]
    InvalidAllocation(String),

    #[error("Allocation names channel '{0}' which is not in the dataset")]
    UnknownChannel(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl DashboardError {
    /// True when the caller supplied bad input rather than the server failing.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MissingColumns { .. }
                | Self::InvalidRecord { .. }
                | Self::EmptyDataset
                | Self::NoData
                | Self::InvalidAllocation(_)
                | Self::UnknownChannel(_)
                | Self::Csv(_)
        )
    }

    /// Short machine-readable code used in API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "config_error",
            Self::MissingColumns { .. } => "missing_columns",
            Self::InvalidRecord { .. } => "invalid_record",
            Self::EmptyDataset => "empty_dataset",
            Self::DatasetNotFound(_) => "dataset_file_not_found",
            Self::UnknownDataset(_) => "dataset_not_loaded",
            Self::NoData => "no_data",
            Self::InvalidAllocation(_) => "invalid_allocation",
            Self::UnknownChannel(_) => "unknown_channel",
            Self::Csv(_) => "malformed_csv",
            Self::Serialization(_) => "serialization_error",
            Self::Io(_) => "io_error",
            Self::Internal(_) => "internal_error",
        }
    }
}
