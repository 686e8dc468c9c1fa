use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueryEngineError {
    #[error("Invalid record at row {row}: {details}")]
    InvalidRecord { row: usize, details: String },

    #[error("Invalid project label '{0}': expected '<code> - <name>'")]
    InvalidProjectLabel(String),

    #[error("Invalid vocabulary: {0}")]
    InvalidVocabulary(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, QueryEngineError>;
