mod drop_zone;
mod state;
mod ui;

use crate::config::UploaderConfig;
use crate::upload::{EntryId, HttpTransport, SelectedFile, UploadManager};
use eframe::{egui, App};
pub use drop_zone::DropZoneController;
pub use state::UploadState;
use std::time::{Duration, Instant};

const BUSY_REPAINT: Duration = Duration::from_millis(100);

pub struct DropUploader {
    state: UploadState,
    manager: UploadManager<HttpTransport>,
    drop_zone: DropZoneController,
}

impl DropUploader {
    pub fn new(config: &UploaderConfig) -> anyhow::Result<Self> {
        log::info!(
            "Initializing uploader for {} (limit {} bytes)",
            config.upload_url(),
            config.max_upload_size
        );
        let transport = HttpTransport::new(config)?;
        Ok(Self {
            state: UploadState::new(config.max_upload_size, config.notice_duration()),
            manager: UploadManager::new(transport)?,
            drop_zone: DropZoneController::default(),
        })
    }

    pub fn handle_files(&mut self, files: Vec<SelectedFile>) {
        if files.is_empty() {
            return;
        }
        log::info!("Received {} file(s)", files.len());
        let started = self
            .manager
            .handle_files(files, &mut self.state, Instant::now());
        log::debug!("Started {} upload(s)", started);
    }

    pub fn delete_entry(&mut self, id: EntryId) {
        self.manager.deletes().request(id, &mut self.state);
    }

    pub fn update_state(&mut self, ctx: &egui::Context) {
        let now = Instant::now();

        while let Some(event) = self.manager.try_recv() {
            if let Some(task) = self.state.apply(event, now) {
                log::debug!("Upload {} '{}' settled as {:?}", task.id, task.file_name, task.status);
            }
        }
        self.state.tick(now);

        let dropped = self.drop_zone.poll(ctx);
        self.handle_files(dropped);

        let busy = self.state.in_flight() > 0 || self.state.uploaded.iter().any(|e| e.deleting);
        if busy {
            ctx.request_repaint_after(BUSY_REPAINT);
        }
        if let Some(deadline) = self.state.notice_deadline() {
            ctx.request_repaint_after(deadline.saturating_duration_since(now));
        }
    }
}

impl App for DropUploader {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_state(ctx);
        self.render(ctx);
    }
}
