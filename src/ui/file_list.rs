//! Directory listing panel

use std::path::PathBuf;

use eframe::egui;

use crate::app::MarkdownsApp;
use crate::core::file_system;
use crate::core::navigation::FileEntry;
use crate::ui::dialog::{NameDialog, NameDialogKind};

/// What the user picked in the list this frame
enum ListAction {
    Open(PathBuf),
    Rename(FileEntry),
    Delete(PathBuf),
}

/// File list panel
pub struct FileListPanel;

impl FileListPanel {
    /// Show the file list panel
    pub fn show(ui: &mut egui::Ui, app: &mut MarkdownsApp) {
        let ctx = ui.ctx().clone();
        ui.vertical(|ui| {
            // Header
            ui.horizontal(|ui| {
                ui.heading("Files");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("\u{21BB}").on_hover_text("Refresh").clicked() {
                        app.refresh_entries();
                    }
                    if ui.button("+").on_hover_text("New file").clicked() {
                        app.dialog = Some(NameDialog::new(NameDialogKind::NewFile, ""));
                    }
                    if ui.button("\u{2B06}").on_hover_text("Parent folder").clicked() {
                        app.go_up(&ctx);
                    }
                });
            });

            if let Some(dir) = app.session.current_dir() {
                ui.label(egui::RichText::new(dir.display().to_string()).small().weak());
            }
            ui.separator();

            let mut action = None;
            let active = app.session.current_file();
            let show_hidden = app.config.show_hidden_files;

            egui::ScrollArea::vertical()
                .id_salt("file_list_scroll")
                .show(ui, |ui| {
                    if app.entries.is_empty() {
                        ui.label("No markdown files here");
                    }
                    for entry in app.entries.iter().filter(|e| show_hidden || !e.name.starts_with('.')) {
                        let is_active = active.as_ref() == Some(&entry.path);
                        let icon = if entry.is_directory { "\u{1F4C1}" } else { "\u{1F4DD}" };
                        let label = if is_active && app.document.as_ref().is_some_and(|d| d.modified) {
                            format!("{} {}*", icon, entry.name)
                        } else {
                            format!("{} {}", icon, entry.name)
                        };

                        let mut response = ui.selectable_label(is_active, label);
                        if !entry.is_directory {
                            response = response.on_hover_ui(|ui| {
                                if let Ok(preview) = file_system::content_preview(&entry.path) {
                                    ui.label(egui::RichText::new(preview).monospace());
                                }
                            });
                        }
                        if response.clicked() {
                            action = Some(ListAction::Open(entry.path.clone()));
                        }
                        response.context_menu(|ui| {
                            if ui.button("Rename...").clicked() {
                                action = Some(ListAction::Rename(entry.clone()));
                                ui.close();
                            }
                            if ui.button("Delete").clicked() {
                                action = Some(ListAction::Delete(entry.path.clone()));
                                ui.close();
                            }
                        });
                    }
                });

            match action {
                Some(ListAction::Open(path)) => app.open_path(&ctx, &path),
                Some(ListAction::Rename(entry)) => {
                    app.dialog = Some(NameDialog::new(NameDialogKind::Rename(entry.path), entry.name));
                }
                Some(ListAction::Delete(path)) => app.pending_delete = Some(path),
                None => {}
            }
        });
    }
}
