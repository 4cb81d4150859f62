use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 5_242_880; // 5mb
pub const DEFAULT_UPLOAD_PATH: &str = "uploadHandling.php";
pub const DEFAULT_DELETE_PATH: &str = "deleteFile.php";
pub const DEFAULT_FIELD_NAME: &str = "uploadedFile[]";

/// Endpoints and limits for one uploader session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploaderConfig {
    pub server_url: String,
    pub upload_path: String,
    pub delete_path: String,
    pub field_name: String,
    pub max_upload_size: u64,
    pub notice_secs: u64,
    /// No timeout when unset.
    pub timeout_secs: Option<u64>,
}

impl Default for UploaderConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8080".to_string(),
            upload_path: DEFAULT_UPLOAD_PATH.to_string(),
            delete_path: DEFAULT_DELETE_PATH.to_string(),
            field_name: DEFAULT_FIELD_NAME.to_string(),
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
            notice_secs: 3,
            timeout_secs: None,
        }
    }
}

impl UploaderConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        log::info!("Reading uploader config from {:?}", path);
        let content = fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn upload_url(&self) -> String {
        Self::join(&self.server_url, &self.upload_path)
    }

    pub fn delete_url(&self) -> String {
        Self::join(&self.server_url, &self.delete_path)
    }

    pub fn notice_duration(&self) -> Duration {
        Duration::from_secs(self.notice_secs)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    fn join(base: &str, path: &str) -> String {
        format!(
            "{}/{}",
            base.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
