use crate::upload::SelectedFile;
use eframe::egui;

/// Tracks the drag highlight over the window and turns drops into a
/// file selection.
#[derive(Debug, Default)]
pub struct DropZoneController {
    highlighted: bool,
}

impl DropZoneController {
    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    /// Takes this frame's drop out of the input so nothing else acts on it.
    pub fn poll(&mut self, ctx: &egui::Context) -> Vec<SelectedFile> {
        let (hovering, dropped) = ctx.input_mut(|i| {
            (
                !i.raw.hovered_files.is_empty(),
                std::mem::take(&mut i.raw.dropped_files),
            )
        });
        self.update(hovering, dropped)
    }

    pub fn update(&mut self, hovering: bool, dropped: Vec<egui::DroppedFile>) -> Vec<SelectedFile> {
        // enter/over: on, leave/drop: off
        self.highlighted = hovering && dropped.is_empty();

        dropped
            .into_iter()
            .filter_map(|file| {
                if let Some(path) = file.path {
                    Some(SelectedFile::from_path(path))
                } else if let Some(bytes) = file.bytes {
                    Some(SelectedFile::from_bytes(file.name, bytes))
                } else {
                    log::warn!("Dropped item '{}' carried no path or contents", file.name);
                    None
                }
            })
            .collect()
    }
}
