use std::path::PathBuf;
use thiserror::Error;

/// Everything that can abort loading the dataset or producing one chart.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} has no header row", path.display())]
    EmptyFile { path: PathBuf },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("non-numeric value {value:?} in column {column:?} at row {row}")]
    InvalidNumber {
        column: String,
        row: usize,
        value: String,
    },

    #[error("nothing to draw for {0}: no local authorities in the data")]
    EmptyChart(&'static str),

    #[error("failed to render chart: {0}")]
    Render(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;
