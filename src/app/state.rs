use crate::config::DEFAULT_MAX_UPLOAD_SIZE;
use crate::upload::{EntryId, TaskId, TaskStatus, UploadEvent, UploadTask, UploadedEntry};
use crate::utils::file_size::FileSizeUtils;
use derivative::Derivative;
use std::time::{Duration, Instant};

pub const UPLOAD_FAILED: &str = "Error uploading your files!";

#[derive(Debug, Clone)]
struct Notice {
    text: String,
    expires_at: Instant,
}

/// Everything the widget shows: in-flight tasks, completed entries and
/// the session's running total.
#[derive(Derivative)]
#[derivative(Debug, Default)]
pub struct UploadState {
    pub tasks: Vec<UploadTask>,
    pub uploaded: Vec<UploadedEntry>,
    running_total: u64,
    #[derivative(Default(value = "DEFAULT_MAX_UPLOAD_SIZE"))]
    max_upload_size: u64,
    in_flight: usize,
    status_text: String,
    notice: Option<Notice>,
    #[derivative(Default(value = "Duration::from_secs(3)"))]
    notice_duration: Duration,
    last_entry_id: EntryId,
}

impl UploadState {
    pub fn new(max_upload_size: u64, notice_duration: Duration) -> Self {
        Self {
            max_upload_size,
            notice_duration,
            ..Self::default()
        }
    }

    pub fn running_total(&self) -> u64 {
        self.running_total
    }

    pub fn max_upload_size(&self) -> u64 {
        self.max_upload_size
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn upload_enabled(&self) -> bool {
        self.in_flight == 0
    }

    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    pub fn file_names(&self) -> Vec<String> {
        self.uploaded.iter().map(|e| e.file_name.clone()).collect()
    }

    pub fn admits(&self, size: u64) -> bool {
        self.running_total.saturating_add(size) <= self.max_upload_size
    }

    pub fn reject_oversize(&mut self, now: Instant) {
        let text = format!(
            "Sorry, you are not allowed to upload more than {}",
            FileSizeUtils::format_bytes(self.max_upload_size)
        );
        self.show_notice(text, now);
    }

    pub fn show_notice(&mut self, text: String, now: Instant) {
        self.notice = Some(Notice {
            text,
            expires_at: now + self.notice_duration,
        });
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_ref().map(|n| n.text.as_str())
    }

    pub fn notice_deadline(&self) -> Option<Instant> {
        self.notice.as_ref().map(|n| n.expires_at)
    }

    pub fn tick(&mut self, now: Instant) {
        if matches!(&self.notice, Some(n) if now >= n.expires_at) {
            self.notice = None;
        }
    }

    pub fn begin_task(&mut self, id: TaskId, file_name: String, byte_size: u64) {
        self.tasks.push(UploadTask::new(id, file_name, byte_size));
        self.in_flight += 1;
        self.status_text = "Uploading...".to_string();
    }

    /// Returns the task an upload event settled, carrying its final status.
    pub fn apply(&mut self, event: UploadEvent, now: Instant) -> Option<UploadTask> {
        match event {
            UploadEvent::Started { id } => {
                if let Some(task) = self.task_mut(id) {
                    task.status = TaskStatus::Uploading;
                }
                None
            }
            UploadEvent::Progress { id, loaded, total } => {
                if let Some(task) = self.task_mut(id) {
                    task.status = TaskStatus::Uploading;
                    if total > 0 {
                        task.byte_size = total;
                    }
                    task.bytes_transferred = loaded.min(task.byte_size);
                }
                None
            }
            UploadEvent::Finished { id, result } => {
                let index = self.tasks.iter().position(|t| t.id == id)?;
                let mut task = self.tasks.remove(index);
                self.in_flight = self.in_flight.saturating_sub(1);

                match result {
                    Ok(bytes) => {
                        task.status = TaskStatus::Done;
                        task.bytes_transferred = bytes;
                        self.running_total += bytes;
                        self.last_entry_id += 1;
                        self.uploaded.push(UploadedEntry {
                            id: self.last_entry_id,
                            file_name: task.file_name.clone(),
                            byte_size: bytes,
                            deleting: false,
                        });
                    }
                    Err(e) => {
                        task.status = TaskStatus::Error;
                        log::error!("Upload of '{}' failed: {}", task.file_name, e);
                        self.show_notice(UPLOAD_FAILED.to_string(), now);
                    }
                }
                self.refresh_status(false);
                Some(task)
            }
            UploadEvent::Deleted { id, result } => {
                let index = self
                    .uploaded
                    .iter()
                    .position(|e| e.deleting && e.id == id)?;

                match result {
                    Ok(()) => {
                        let entry = self.uploaded.remove(index);
                        self.running_total = self.running_total.saturating_sub(entry.byte_size);
                    }
                    Err(e) => {
                        let entry = &mut self.uploaded[index];
                        entry.deleting = false;
                        log::error!("Delete of '{}' failed: {}", entry.file_name, e);
                        let text = format!("Could not remove {}", entry.file_name);
                        self.show_notice(text, now);
                    }
                }
                self.refresh_status(true);
                None
            }
        }
    }

    /// Flags an idle entry as deleting and hands back its name. Unknown
    /// entries and ones already being removed yield `None`.
    pub fn begin_delete(&mut self, id: EntryId) -> Option<String> {
        let entry = self
            .uploaded
            .iter_mut()
            .find(|e| !e.deleting && e.id == id)?;
        entry.deleting = true;
        let file_name = entry.file_name.clone();
        self.status_text = "Removing file...".to_string();
        Some(file_name)
    }

    fn task_mut(&mut self, id: TaskId) -> Option<&mut UploadTask> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    /// Only a delete clears the line once nothing is left uploaded.
    fn refresh_status(&mut self, after_delete: bool) {
        self.status_text = if self.in_flight > 0 {
            "Uploading...".to_string()
        } else if self.uploaded.iter().any(|e| e.deleting) {
            "Removing file...".to_string()
        } else if after_delete && self.running_total == 0 {
            String::new()
        } else {
            format!(
                "Uploaded {} of max {}",
                FileSizeUtils::format_bytes(self.running_total),
                FileSizeUtils::format_bytes(self.max_upload_size)
            )
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UploadError;
    use reqwest::StatusCode;

    fn state() -> UploadState {
        UploadState::new(5_242_880, Duration::from_secs(3))
    }

    fn finish_ok(state: &mut UploadState, id: TaskId, bytes: u64) -> Option<UploadTask> {
        state.apply(
            UploadEvent::Finished {
                id,
                result: Ok(bytes),
            },
            Instant::now(),
        )
    }

    fn deleted(state: &mut UploadState, id: EntryId, result: Result<(), UploadError>) {
        state.apply(UploadEvent::Deleted { id, result }, Instant::now());
    }

    #[test]
    fn default_uses_the_five_megabyte_limit() {
        let state = UploadState::default();
        assert_eq!(state.max_upload_size(), 5_242_880);
        assert!(state.admits(5_242_880));
        assert!(!state.admits(5_242_881));
    }

    #[test]
    fn success_adds_exactly_one_entry_and_its_bytes() {
        let mut state = state();
        state.begin_task(1, "notes.txt".to_string(), 1536);
        assert_eq!(state.status_text(), "Uploading...");

        let task = finish_ok(&mut state, 1, 1536).unwrap();
        assert_eq!(task.status, TaskStatus::Done);
        assert_eq!(task.bytes_transferred, 1536);

        assert_eq!(state.running_total(), 1536);
        assert_eq!(
            state.uploaded,
            vec![UploadedEntry {
                id: 1,
                file_name: "notes.txt".to_string(),
                byte_size: 1536,
                deleting: false,
            }]
        );
        assert!(state.tasks.is_empty());
        assert_eq!(state.status_text(), "Uploaded 1.5 KB of max 5.0 MB");
    }

    #[test]
    fn progress_updates_the_bar() {
        let mut state = state();
        state.begin_task(4, "clip.mov".to_string(), 1000);
        state.apply(UploadEvent::Started { id: 4 }, Instant::now());
        state.apply(
            UploadEvent::Progress {
                id: 4,
                loaded: 250,
                total: 1000,
            },
            Instant::now(),
        );

        let task = &state.tasks[0];
        assert_eq!(task.status, TaskStatus::Uploading);
        assert_eq!(task.bytes_transferred, 250);
        assert!((task.fraction() - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn control_stays_disabled_until_the_last_upload_finishes() {
        let mut state = state();
        state.begin_task(1, "a".to_string(), 10);
        state.begin_task(2, "b".to_string(), 20);
        assert!(!state.upload_enabled());

        finish_ok(&mut state, 2, 20);
        assert!(!state.upload_enabled());
        assert_eq!(state.status_text(), "Uploading...");

        finish_ok(&mut state, 1, 10);
        assert!(state.upload_enabled());
        assert_eq!(state.file_names(), vec!["b", "a"]);
    }

    #[test]
    fn failure_discards_the_progress_entry() {
        let mut state = state();
        let now = Instant::now();
        state.begin_task(9, "lost.txt".to_string(), 99);
        let task = state
            .apply(
                UploadEvent::Finished {
                    id: 9,
                    result: Err(UploadError::Rejected(StatusCode::BAD_GATEWAY)),
                },
                now,
            )
            .unwrap();

        assert_eq!(task.status, TaskStatus::Error);
        assert_eq!(task.file_name, "lost.txt");

        assert!(state.tasks.is_empty());
        assert!(state.uploaded.is_empty());
        assert_eq!(state.running_total(), 0);
        assert!(state.upload_enabled());
        assert_eq!(state.notice(), Some(UPLOAD_FAILED));
        assert_eq!(state.status_text(), "Uploaded n/a of max 5.0 MB");
    }

    #[test]
    fn empty_upload_still_reports_the_total() {
        let mut state = state();
        state.begin_task(3, "empty.txt".to_string(), 0);
        finish_ok(&mut state, 3, 0);

        assert_eq!(state.file_names(), vec!["empty.txt"]);
        assert_eq!(state.status_text(), "Uploaded n/a of max 5.0 MB");
    }

    #[test]
    fn oversize_notice_clears_after_the_delay() {
        let mut state = state();
        let now = Instant::now();
        state.reject_oversize(now);
        assert_eq!(
            state.notice(),
            Some("Sorry, you are not allowed to upload more than 5.0 MB")
        );

        state.tick(now + Duration::from_millis(2999));
        assert!(state.notice().is_some());
        state.tick(now + Duration::from_secs(3));
        assert_eq!(state.notice(), None);
    }

    #[test]
    fn delete_subtracts_the_recorded_size() {
        let mut state = state();
        state.begin_task(1, "a.bin".to_string(), 500);
        state.begin_task(2, "b.bin".to_string(), 700);
        finish_ok(&mut state, 1, 500);
        finish_ok(&mut state, 2, 700);

        let id = state.uploaded[0].id;
        assert_eq!(state.begin_delete(id).as_deref(), Some("a.bin"));
        assert!(state.uploaded[0].deleting);
        assert_eq!(state.begin_delete(id), None);
        assert_eq!(state.status_text(), "Removing file...");

        deleted(&mut state, id, Ok(()));
        assert_eq!(state.file_names(), vec!["b.bin"]);
        assert_eq!(state.running_total(), 700);
        assert_eq!(state.status_text(), "Uploaded 700 Bytes of max 5.0 MB");

        let last = state.uploaded[0].id;
        state.begin_delete(last);
        deleted(&mut state, last, Ok(()));
        assert_eq!(state.running_total(), 0);
        assert_eq!(state.status_text(), "");
    }

    #[test]
    fn same_name_deletes_settle_their_own_rows() {
        let mut state = state();
        state.begin_task(1, "dup.txt".to_string(), 100);
        state.begin_task(2, "dup.txt".to_string(), 900);
        finish_ok(&mut state, 1, 100);
        finish_ok(&mut state, 2, 900);
        let (small, large) = (state.uploaded[0].id, state.uploaded[1].id);
        assert_ne!(small, large);

        state.begin_delete(small);
        state.begin_delete(large);

        // Replies arrive out of order: the large one succeeds first.
        deleted(&mut state, large, Ok(()));
        assert_eq!(state.running_total(), 100);
        assert_eq!(state.uploaded.len(), 1);
        assert_eq!(state.uploaded[0].id, small);
        assert!(state.uploaded[0].deleting);

        deleted(
            &mut state,
            small,
            Err(UploadError::DeleteRejected(StatusCode::NOT_FOUND)),
        );
        assert_eq!(state.running_total(), 100);
        assert_eq!(state.uploaded[0].byte_size, 100);
        assert!(!state.uploaded[0].deleting);
        assert_eq!(state.notice(), Some("Could not remove dup.txt"));
    }

    #[test]
    fn unsolicited_events_are_ignored() {
        let mut state = state();
        assert!(finish_ok(&mut state, 42, 100).is_none());
        deleted(&mut state, 7, Ok(()));

        assert_eq!(state.running_total(), 0);
        assert!(state.uploaded.is_empty());
        assert_eq!(state.in_flight(), 0);
    }
}
