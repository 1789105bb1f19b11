//! Markdown preview panel using egui_commonmark

use eframe::egui;
use egui_commonmark::CommonMarkViewer;

use crate::app::MarkdownsApp;
use crate::ui::asset_loader::ASSET_SCHEME;

/// Markdown preview panel
pub struct PreviewPanel;

impl PreviewPanel {
    /// Show the preview panel
    pub fn show(ui: &mut egui::Ui, app: &mut MarkdownsApp) {
        egui::ScrollArea::vertical()
            .id_salt("preview_scroll")
            .show(ui, |ui| {
                if let Some(doc) = &app.document {
                    // Scheme-less image references are served by the asset loader
                    CommonMarkViewer::new()
                        .default_implicit_uri_scheme(ASSET_SCHEME)
                        .show(ui, &mut app.commonmark_cache, &doc.content);
                } else {
                    Self::show_empty(ui);
                }
            });
    }

    /// Show empty state
    fn show_empty(ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(50.0);
            ui.label("No document selected");
            ui.label("Open a markdown file to see the preview");
        });
    }
}
