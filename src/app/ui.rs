use super::DropUploader;
use crate::upload::{EntryId, SelectedFile};
use crate::utils::file_size::FileSizeUtils;
use eframe::egui::{self, Align, Color32, RichText, Stroke};
use rfd::FileDialog;

const ACCENT: Color32 = Color32::from_rgb(161, 89, 225);
const ERROR_RED: Color32 = Color32::from_rgb(220, 50, 50);

impl DropUploader {
    pub fn render(&mut self, ctx: &egui::Context) {
        let mut picked = Vec::new();
        let mut to_delete = None;

        egui::CentralPanel::default().show(ctx, |ui| {
            let total_height = ui.available_height();
            let footer_height = 40.0;
            let footer_margin = 15.0;
            let content_height = total_height - footer_height - footer_margin;

            egui::ScrollArea::vertical()
                .max_height(content_height)
                .show(ui, |ui| {
                    ui.add_space(20.0);
                    ui.vertical_centered(|ui| {
                        ui.heading("File Uploader");
                        ui.add_space(5.0);
                        ui.label(
                            RichText::new("Drop files below or pick them from disk")
                                .color(ui.visuals().text_color().gamma_multiply(0.7)),
                        );
                    });

                    ui.add_space(20.0);
                    picked = self.render_drop_zone(ui);

                    ui.add_space(20.0);
                    self.render_in_flight(ui);

                    ui.add_space(10.0);
                    to_delete = self.render_uploaded(ui);
                    ui.add_space(20.0);
                });

            ui.with_layout(egui::Layout::bottom_up(Align::Center), |ui| {
                ui.add_space(footer_margin);
                self.render_footer(ui);
            });
        });

        self.handle_files(picked);
        if let Some(id) = to_delete {
            self.delete_entry(id);
        }
    }

    fn render_drop_zone(&self, ui: &mut egui::Ui) -> Vec<SelectedFile> {
        let mut picked = Vec::new();
        let stroke = if self.drop_zone.is_highlighted() {
            Stroke::new(2.0, ACCENT)
        } else {
            ui.visuals().widgets.noninteractive.bg_stroke
        };

        egui::Frame::group(ui.style())
            .stroke(stroke)
            .inner_margin(24.0)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.vertical_centered(|ui| {
                    let hint = if self.drop_zone.is_highlighted() {
                        "Release to upload"
                    } else {
                        "Drag files here"
                    };
                    ui.label(RichText::new(hint).size(16.0));
                    ui.add_space(10.0);

                    ui.add_enabled_ui(self.state.upload_enabled(), |ui| {
                        let button =
                            egui::Button::new("📤 Choose files").min_size(egui::vec2(200.0, 40.0));
                        if ui.add(button).clicked() {
                            if let Some(paths) = FileDialog::new().pick_files() {
                                picked = paths.into_iter().map(SelectedFile::from_path).collect();
                            }
                        }
                    });
                });
            });
        picked
    }

    fn render_in_flight(&self, ui: &mut egui::Ui) {
        if self.state.tasks.is_empty() {
            return;
        }

        ui.group(|ui| {
            for task in &self.state.tasks {
                ui.label(&task.file_name);
                let progress_bar = egui::ProgressBar::new(task.fraction())
                    .show_percentage()
                    .animate(false)
                    .fill(ACCENT);
                ui.add(progress_bar);
                ui.add_space(4.0);
            }
        });
    }

    fn render_uploaded(&self, ui: &mut egui::Ui) -> Option<EntryId> {
        if self.state.uploaded.is_empty() {
            return None;
        }

        let mut to_delete = None;
        egui::Frame::none()
            .fill(ui.style().visuals.extreme_bg_color)
            .inner_margin(8.0)
            .show(ui, |ui| {
                for entry in &self.state.uploaded {
                    ui.horizontal(|ui| {
                        ui.label(&entry.file_name);
                        ui.colored_label(
                            Color32::from_rgb(150, 150, 150),
                            FileSizeUtils::format_bytes(entry.byte_size),
                        );
                        ui.with_layout(egui::Layout::right_to_left(Align::Center), |ui| {
                            if entry.deleting {
                                ui.add(egui::Spinner::new());
                            } else if ui.button("🗑").on_hover_text("Delete").clicked() {
                                to_delete = Some(entry.id);
                            }
                        });
                    });
                    ui.add_space(4.0);
                }
            });
        to_delete
    }

    fn render_footer(&self, ui: &mut egui::Ui) {
        if let Some(notice) = self.state.notice() {
            ui.vertical_centered(|ui| {
                ui.colored_label(ERROR_RED, notice);
            });
            ui.add_space(5.0);
        }

        let status = self.state.status_text();
        if !status.is_empty() {
            ui.vertical_centered(|ui| {
                ui.label(status);
            });
        }
    }
}
