use crate::config::UploaderConfig;
use crate::error::UploadError;
use crate::upload::types::{TaskId, UploadEvent};
use futures_util::stream::{self, StreamExt};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, StatusCode};
use std::future::Future;
use std::sync::mpsc::Sender;

const CHUNK_SIZE: usize = 64 * 1024;

/// Reports byte progress for one upload back to the UI thread.
#[derive(Debug, Clone)]
pub struct ProgressSink {
    id: TaskId,
    sender: Sender<UploadEvent>,
}

impl ProgressSink {
    pub fn new(id: TaskId, sender: Sender<UploadEvent>) -> Self {
        Self { id, sender }
    }

    pub fn report(&self, loaded: u64, total: u64) {
        self.sender
            .send(UploadEvent::Progress {
                id: self.id,
                loaded,
                total,
            })
            .unwrap_or_default();
    }
}

/// The two server calls the widget makes. Implementations resolve with
/// the number of bytes sent for an upload.
pub trait Transport: Send + Sync + 'static {
    fn upload(
        &self,
        file_name: String,
        contents: Vec<u8>,
        progress: ProgressSink,
    ) -> impl Future<Output = Result<u64, UploadError>> + Send;

    fn delete(&self, file_name: String) -> impl Future<Output = Result<(), UploadError>> + Send;
}

pub struct HttpTransport {
    client: Client,
    upload_url: String,
    delete_url: String,
    field_name: String,
}

impl HttpTransport {
    pub fn new(config: &UploaderConfig) -> Result<Self, UploadError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            upload_url: config.upload_url(),
            delete_url: config.delete_url(),
            field_name: config.field_name.clone(),
        })
    }
}

impl Transport for HttpTransport {
    async fn upload(
        &self,
        file_name: String,
        contents: Vec<u8>,
        progress: ProgressSink,
    ) -> Result<u64, UploadError> {
        let total = contents.len() as u64;
        log::info!("Uploading '{}' ({} bytes) to {}", file_name, total, self.upload_url);

        // Progress is counted as the body pulls each chunk.
        let chunks: Vec<Vec<u8>> = contents.chunks(CHUNK_SIZE).map(<[u8]>::to_vec).collect();
        let mut loaded = 0u64;
        let body = stream::iter(chunks).map(move |chunk| {
            loaded += chunk.len() as u64;
            progress.report(loaded, total);
            Ok::<_, std::io::Error>(chunk)
        });

        let part = Part::stream_with_length(Body::wrap_stream(body), total).file_name(file_name.clone());
        let form = Form::new().part(self.field_name.clone(), part);

        let response = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            log::error!("Upload of '{}' failed with status: {}", file_name, status);
            return Err(UploadError::Rejected(status));
        }

        log::info!("Successfully uploaded '{}'", file_name);
        Ok(total)
    }

    async fn delete(&self, file_name: String) -> Result<(), UploadError> {
        log::info!("Attempting to delete file '{}'", file_name);

        let response = self
            .client
            .get(&self.delete_url)
            .query(&[("file", file_name.as_str())])
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                log::info!("Successfully deleted file '{}'", file_name);
                Ok(())
            }
            status => {
                log::warn!("Delete of '{}' failed with status: {}", file_name, status);
                Err(UploadError::DeleteRejected(status))
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use super::{ProgressSink, Transport};
    use crate::error::UploadError;
    use reqwest::StatusCode;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    /// In-memory transport that records calls instead of hitting a server.
    #[derive(Default)]
    pub struct FakeTransport {
        pub uploads: Mutex<Vec<(String, usize)>>,
        pub deletes: Mutex<Vec<String>>,
        pub delays: HashMap<String, Duration>,
        pub failing_uploads: Vec<String>,
        pub delete_status: Option<StatusCode>,
    }

    impl FakeTransport {
        pub fn uploaded_names(&self) -> Vec<String> {
            let uploads = self.uploads.lock().unwrap();
            uploads.iter().map(|(name, _)| name.clone()).collect()
        }
    }

    impl Transport for FakeTransport {
        async fn upload(
            &self,
            file_name: String,
            contents: Vec<u8>,
            progress: ProgressSink,
        ) -> Result<u64, UploadError> {
            self.uploads
                .lock()
                .unwrap()
                .push((file_name.clone(), contents.len()));
            if let Some(delay) = self.delays.get(&file_name) {
                tokio::time::sleep(*delay).await;
            }

            let total = contents.len() as u64;
            progress.report(total / 2, total);
            if self.failing_uploads.contains(&file_name) {
                return Err(UploadError::Rejected(StatusCode::INTERNAL_SERVER_ERROR));
            }
            progress.report(total, total);
            Ok(total)
        }

        async fn delete(&self, file_name: String) -> Result<(), UploadError> {
            self.deletes.lock().unwrap().push(file_name);
            match self.delete_status.unwrap_or(StatusCode::OK) {
                StatusCode::OK => Ok(()),
                status => Err(UploadError::DeleteRejected(status)),
            }
        }
    }
}
