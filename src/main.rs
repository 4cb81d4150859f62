mod app;
mod config;
mod error;
mod upload;
mod utils;

use app::DropUploader;
use clap::{ArgAction, Parser};
use config::UploaderConfig;
use env_logger::Builder;
use log::LevelFilter;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "drop-uploader")]
#[command(about = "Drag-and-drop file uploader with per-file progress")]
struct Cli {
    /// JSON file with uploader settings; flags override it
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    #[arg(long, value_name = "URL")]
    server: Option<String>,
    #[arg(long)]
    upload_path: Option<String>,
    #[arg(long)]
    delete_path: Option<String>,
    #[arg(long)]
    field_name: Option<String>,
    #[arg(long, value_name = "BYTES")]
    max_upload_size: Option<u64>,
    #[arg(long)]
    notice_secs: Option<u64>,
    #[arg(long)]
    timeout_secs: Option<u64>,
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<UploaderConfig> {
        let mut config = match &self.config {
            Some(path) => UploaderConfig::from_file(path)?,
            None => UploaderConfig::default(),
        };

        if let Some(server) = self.server {
            config.server_url = server;
        }
        if let Some(path) = self.upload_path {
            config.upload_path = path;
        }
        if let Some(path) = self.delete_path {
            config.delete_path = path;
        }
        if let Some(name) = self.field_name {
            config.field_name = name;
        }
        if let Some(max) = self.max_upload_size {
            config.max_upload_size = max;
        }
        if let Some(secs) = self.notice_secs {
            config.notice_secs = secs;
        }
        if self.timeout_secs.is_some() {
            config.timeout_secs = self.timeout_secs;
        }
        Ok(config)
    }
}

fn init_logger(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                buf.timestamp_seconds(),
                record.level(),
                record.args()
            )
        })
        .filter(None, level)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if std::env::var("RUST_LOG").is_err() {
        init_logger(cli.verbose);
    } else {
        env_logger::init();
    }

    let config = cli.into_config()?;
    let app = DropUploader::new(&config)?;

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([600.0, 600.0])
            .with_min_inner_size([400.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native("File Uploader", options, Box::new(move |_cc| Box::new(app)))
        .map_err(|e| anyhow::anyhow!("eframe error: {}", e))
}
