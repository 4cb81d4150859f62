use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("{file_name} ({size} bytes) would exceed the {max} byte session limit")]
    SizeLimit { file_name: String, size: u64, max: u64 },

    #[error("failed to read {file_name}: {source}")]
    Read {
        file_name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("upload rejected with status {0}")]
    Rejected(StatusCode),

    #[error("delete rejected with status {0}")]
    DeleteRejected(StatusCode),
}
