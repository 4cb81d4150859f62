use crate::app::UploadState;
use crate::error::UploadError;
use crate::upload::delete::DeleteController;
use crate::upload::transport::{ProgressSink, Transport};
use crate::upload::types::{SelectedFile, TaskId, UploadEvent};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::Instant;
use tokio::runtime::Runtime;

/// Turns a file selection into one upload per admitted file and feeds
/// the lifecycle events back through a channel drained by the UI.
pub struct UploadManager<T: Transport> {
    transport: Arc<T>,
    runtime: Runtime,
    sender: Sender<UploadEvent>,
    receiver: Receiver<UploadEvent>,
    deletes: DeleteController<T>,
    next_id: TaskId,
}

impl<T: Transport> UploadManager<T> {
    pub fn new(transport: T) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("uploader")
            .enable_all()
            .build()?;
        let transport = Arc::new(transport);
        let (sender, receiver) = mpsc::channel();
        let deletes = DeleteController::new(
            Arc::clone(&transport),
            runtime.handle().clone(),
            sender.clone(),
        );

        Ok(Self {
            transport,
            runtime,
            sender,
            receiver,
            deletes,
            next_id: 1,
        })
    }

    pub fn deletes(&self) -> &DeleteController<T> {
        &self.deletes
    }

    /// Each file is checked on its own against the running total as it
    /// stands now, so a batch may be partly admitted. Returns the number
    /// of uploads started.
    pub fn handle_files(
        &mut self,
        files: Vec<SelectedFile>,
        state: &mut UploadState,
        now: Instant,
    ) -> usize {
        let mut started = 0;
        for file in files {
            let size = match file.size() {
                Ok(size) => size,
                Err(e) => {
                    log::error!("Could not read size of '{}': {}", file.name, e);
                    state.show_notice(format!("Could not read {}", file.name), now);
                    continue;
                }
            };

            if !state.admits(size) {
                let err = UploadError::SizeLimit {
                    file_name: file.name.clone(),
                    size,
                    max: state.max_upload_size(),
                };
                log::warn!("Skipping upload: {}", err);
                state.reject_oversize(now);
                continue;
            }

            let id = self.next_id;
            self.next_id += 1;
            state.begin_task(id, file.name.clone(), size);
            self.spawn_upload(id, file);
            started += 1;
        }
        started
    }

    fn spawn_upload(&self, id: TaskId, file: SelectedFile) {
        let transport = Arc::clone(&self.transport);
        let sender = self.sender.clone();

        self.runtime.spawn(async move {
            sender.send(UploadEvent::Started { id }).unwrap_or_default();

            let result = match file.read().await {
                Ok(contents) => {
                    let progress = ProgressSink::new(id, sender.clone());
                    transport.upload(file.name.clone(), contents, progress).await
                }
                Err(source) => Err(UploadError::Read {
                    file_name: file.name.clone(),
                    source,
                }),
            };

            sender
                .send(UploadEvent::Finished { id, result })
                .unwrap_or_default();
        });
    }

    pub fn try_recv(&self) -> Option<UploadEvent> {
        self.receiver.try_recv().ok()
    }

    #[cfg(test)]
    pub(crate) fn recv_timeout(&self, timeout: std::time::Duration) -> Option<UploadEvent> {
        self.receiver.recv_timeout(timeout).ok()
    }
}
