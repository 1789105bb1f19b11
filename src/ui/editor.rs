//! Markdown editor panel

use eframe::egui;

use crate::app::MarkdownsApp;

/// Markdown editor panel
pub struct EditorPanel;

impl EditorPanel {
    /// Show the editor panel
    pub fn show(ui: &mut egui::Ui, app: &mut MarkdownsApp) {
        ui.vertical(|ui| {
            if app.document.is_some() {
                Self::show_toolbar(ui, app);
                ui.separator();
            }

            // Editor area
            egui::ScrollArea::vertical()
                .id_salt("editor_scroll")
                .show(ui, |ui| {
                    if let Some(doc) = app.document.as_mut() {
                        let response = egui::TextEdit::multiline(&mut doc.content)
                            .font(egui::TextStyle::Monospace)
                            .code_editor()
                            .desired_width(f32::INFINITY)
                            .desired_rows(30)
                            .show(ui);

                        if response.response.changed() {
                            doc.modified = true;
                        }
                    } else {
                        Self::show_welcome(ui);
                    }
                });
        });
    }

    fn show_toolbar(ui: &mut egui::Ui, app: &mut MarkdownsApp) {
        ui.horizontal(|ui| {
            if let Some(doc) = &app.document {
                let title = if doc.modified {
                    format!("{}*", doc.title())
                } else {
                    doc.title()
                };
                ui.strong(title);
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Save").clicked() {
                    app.save_document();
                }
                if ui.button("Insert Image...").clicked() {
                    app.insert_image();
                }
            });
        });
    }

    /// Show welcome screen when no document is open
    fn show_welcome(ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(100.0);

            ui.heading("Markdowns");
            ui.add_space(20.0);

            ui.label("Pick a markdown file from the list to start editing.");
            ui.add_space(10.0);

            ui.label("Keyboard shortcuts:");
            ui.label("  Ctrl+S - Save");
            ui.label("  Ctrl+B - Toggle sidebar");
        });
    }
}
