use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Required field '{0}' has no column mapping")]
    UnmappedField(String),

    #[error("Mapped column '{column}' for field '{field}' not found in file header")]
    MissingColumn { field: String, column: String },

    #[error("Upload is empty or unreadable")]
    EmptyUpload,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;
