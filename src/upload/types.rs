use crate::error::UploadError;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

pub type TaskId = u64;
pub type EntryId = u64;

/// Where the bytes of a selected file come from. Native drops and the
/// file picker hand over paths; some platforms only deliver contents.
#[derive(Debug, Clone)]
pub enum FileSource {
    Path(PathBuf),
    Bytes(Arc<[u8]>),
}

#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub source: FileSource,
}

impl SelectedFile {
    pub fn from_path(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        Self {
            name,
            source: FileSource::Path(path),
        }
    }

    pub fn from_bytes(name: impl Into<String>, bytes: Arc<[u8]>) -> Self {
        Self {
            name: name.into(),
            source: FileSource::Bytes(bytes),
        }
    }

    pub fn size(&self) -> io::Result<u64> {
        match &self.source {
            FileSource::Path(path) => Ok(std::fs::metadata(path)?.len()),
            FileSource::Bytes(bytes) => Ok(bytes.len() as u64),
        }
    }

    pub async fn read(&self) -> io::Result<Vec<u8>> {
        match &self.source {
            FileSource::Path(path) => tokio::fs::read(path).await,
            FileSource::Bytes(bytes) => Ok(bytes.to_vec()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Uploading,
    Done,
    Error,
}

#[derive(Debug, Clone)]
pub struct UploadTask {
    pub id: TaskId,
    pub file_name: String,
    pub byte_size: u64,
    pub bytes_transferred: u64,
    pub status: TaskStatus,
}

impl UploadTask {
    pub fn new(id: TaskId, file_name: String, byte_size: u64) -> Self {
        Self {
            id,
            file_name,
            byte_size,
            bytes_transferred: 0,
            status: TaskStatus::Pending,
        }
    }

    pub fn fraction(&self) -> f32 {
        if self.byte_size == 0 {
            0.0
        } else {
            (self.bytes_transferred as f32 / self.byte_size as f32).min(1.0)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedEntry {
    pub id: EntryId,
    pub file_name: String,
    pub byte_size: u64,
    pub deleting: bool,
}

/// Messages sent from the runtime back to the UI thread.
#[derive(Debug)]
pub enum UploadEvent {
    Started {
        id: TaskId,
    },
    Progress {
        id: TaskId,
        loaded: u64,
        total: u64,
    },
    Finished {
        id: TaskId,
        result: Result<u64, UploadError>,
    },
    Deleted {
        id: EntryId,
        result: Result<(), UploadError>,
    },
}
