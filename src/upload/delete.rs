use crate::app::UploadState;
use crate::upload::transport::Transport;
use crate::upload::types::{EntryId, UploadEvent};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use tokio::runtime::Handle;

pub struct DeleteController<T: Transport> {
    transport: Arc<T>,
    handle: Handle,
    sender: Sender<UploadEvent>,
}

impl<T: Transport> DeleteController<T> {
    pub fn new(transport: Arc<T>, handle: Handle, sender: Sender<UploadEvent>) -> Self {
        Self {
            transport,
            handle,
            sender,
        }
    }

    /// Marks the entry as deleting and fires the request. Entries that are
    /// unknown or already being removed are left alone.
    pub fn request(&self, id: EntryId, state: &mut UploadState) -> bool {
        let Some(file_name) = state.begin_delete(id) else {
            log::debug!("Ignoring delete for entry {}", id);
            return false;
        };

        let transport = Arc::clone(&self.transport);
        let sender = self.sender.clone();
        self.handle.spawn(async move {
            let result = transport.delete(file_name).await;
            sender
                .send(UploadEvent::Deleted { id, result })
                .unwrap_or_default();
        });
        true
    }
}
