use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoordinatorError {
    #[error("Failed to ingest '{file_id}': {message}")]
    Ingestion { file_id: String, message: String },

    #[error("Failed to read submission directory '{path}': {source}")]
    Directory {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl CoordinatorError {
    pub fn ingestion(file_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Ingestion {
            file_id: file_id.into(),
            message: message.into(),
        }
    }
}

pub type CoordinatorResult<T> = Result<T, CoordinatorError>;
