//! Name prompt for creating and renaming entries

use std::path::PathBuf;

use eframe::egui;

/// What the entered name is for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameDialogKind {
    NewFile,
    NewDirectory,
    Rename(PathBuf),
}

impl NameDialogKind {
    fn title(&self) -> &'static str {
        match self {
            Self::NewFile => "New File",
            Self::NewDirectory => "New Folder",
            Self::Rename(_) => "Rename",
        }
    }

    fn confirm_label(&self) -> &'static str {
        match self {
            Self::Rename(_) => "Rename",
            _ => "Create",
        }
    }
}

/// Dialog asking for a single file or directory name
pub struct NameDialog {
    pub kind: NameDialogKind,
    pub name: String,
}

impl NameDialog {
    pub fn new(kind: NameDialogKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }

    /// Name to submit; new files get a `.md` extension when none was typed
    pub fn submitted_name(&self) -> String {
        let name = self.name.trim();
        if self.kind == NameDialogKind::NewFile && !name.is_empty() && !name.contains('.') {
            format!("{name}.md")
        } else {
            name.to_string()
        }
    }

    /// `Some(Some(name))` when confirmed, `Some(None)` when cancelled
    pub fn show(&mut self, ctx: &egui::Context) -> Option<Option<String>> {
        let mut result = None;

        egui::Window::new(self.kind.title())
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                let mut submit = false;
                ui.horizontal(|ui| {
                    ui.label("Name:");
                    let response = ui.text_edit_singleline(&mut self.name);
                    submit = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                });

                ui.horizontal(|ui| {
                    if ui.button("Cancel").clicked() {
                        result = Some(None);
                    }
                    if ui.button(self.kind.confirm_label()).clicked() {
                        submit = true;
                    }
                });

                if submit && !self.name.trim().is_empty() {
                    result = Some(Some(self.submitted_name()));
                }
            });

        result
    }
}
