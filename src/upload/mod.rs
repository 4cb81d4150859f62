mod delete;
mod manager;
mod transport;
mod types;

pub use manager::UploadManager;
pub use transport::HttpTransport;
pub use types::{EntryId, SelectedFile, TaskId, TaskStatus, UploadEvent, UploadTask, UploadedEntry};
