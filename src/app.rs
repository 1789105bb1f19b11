//! Main application state and UI coordination

use std::path::{Path, PathBuf};
use std::sync::Arc;

use eframe::egui;

use crate::core::config::{AppConfig, ConfigField};
use crate::core::document::{DiskSync, Document};
use crate::core::navigation::FileEntry;
use crate::core::session::{Session, IMAGE_EXTENSIONS};
use crate::ui::asset_loader::AssetLoader;
use crate::ui::dialog::{NameDialog, NameDialogKind};
use crate::ui::{editor::EditorPanel, file_list::FileListPanel, preview::PreviewPanel};

/// Seconds between checks of the open file for external changes
const DISK_POLL_SECS: f64 = 1.0;

/// View mode for the editor area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Editor,
    Preview,
    Split,
}

/// Main application state
pub struct MarkdownsApp {
    /// Navigation state shared with the preview's asset loader
    pub session: Arc<Session>,
    /// Buffer for the current file
    pub document: Option<Document>,
    /// Entries of the current directory, sorted for display
    pub entries: Vec<FileEntry>,
    /// Application configuration
    pub config: AppConfig,
    /// Current view mode
    pub view_mode: ViewMode,
    /// Whether sidebar is visible
    pub sidebar_visible: bool,
    /// Open name prompt, if any
    pub dialog: Option<NameDialog>,
    /// Path awaiting delete confirmation
    pub pending_delete: Option<PathBuf>,
    /// Last error or notice shown in the status bar
    pub status: Option<String>,
    /// The open file changed on disk while it had unsaved edits
    pub disk_conflict: bool,
    /// Commonmark cache for preview
    pub commonmark_cache: egui_commonmark::CommonMarkCache,
    last_disk_poll: f64,
}

impl MarkdownsApp {
    /// Create a new application instance
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let session = Arc::new(Session::from_config(&config));

        egui_extras::install_image_loaders(&cc.egui_ctx);
        AssetLoader::install(&cc.egui_ctx, Arc::clone(&session));
        Self::apply_theme(&cc.egui_ctx, &config);

        let mut app = Self {
            session,
            document: None,
            entries: Vec::new(),
            config,
            view_mode: ViewMode::Split,
            sidebar_visible: true,
            dialog: None,
            pending_delete: None,
            status: None,
            disk_conflict: false,
            commonmark_cache: egui_commonmark::CommonMarkCache::default(),
            last_disk_poll: 0.0,
        };
        app.load_current_document();
        app.refresh_entries();
        app
    }

    fn apply_theme(ctx: &egui::Context, config: &AppConfig) {
        if config.is_dark() {
            ctx.set_visuals(egui::Visuals::dark());
        } else {
            ctx.set_visuals(egui::Visuals::light());
        }
    }

    /// Log a failed action and show it in the status bar
    fn report(&mut self, action: &str, err: impl std::fmt::Display) {
        tracing::error!("{} failed: {}", action, err);
        self.status = Some(format!("{action} failed: {err}"));
    }

    fn persist_config(&mut self) {
        if let Err(e) = self.config.save() {
            tracing::warn!("Failed to save config: {:#}", e);
        }
    }

    /// Re-list the current directory
    pub fn refresh_entries(&mut self) {
        match self.session.list(Path::new("")) {
            Ok(listing) => {
                let listing = listing.sorted();
                if !listing.skipped.is_empty() {
                    self.status = Some(format!("Skipped {} unreadable entries", listing.skipped.len()));
                }
                self.entries = listing.entries;
            }
            Err(e) => {
                self.entries.clear();
                self.report("Listing", e);
            }
        }
    }

    /// Reload the editor buffer from the session's current file
    fn load_current_document(&mut self) {
        let Some(path) = self.session.current_file() else {
            self.document = None;
            return;
        };
        if self.document.as_ref().is_some_and(|doc| doc.path == path) {
            return;
        }

        match Document::open(&path) {
            Ok(doc) => {
                self.document = Some(doc);
                self.disk_conflict = false;
            }
            Err(e) => {
                self.document = None;
                self.report("Opening document", e);
            }
        }
    }

    /// Save pending edits before the buffer is replaced. Returns false when
    /// they could not be saved and the buffer must stay.
    fn settle_unsaved(&mut self) -> bool {
        if !self.document.as_ref().is_some_and(|doc| doc.modified) {
            return true;
        }
        self.save_document();
        if self.document.as_ref().is_some_and(|doc| doc.modified) {
            let reason = self.status.take().unwrap_or_default();
            self.status = Some(format!("{reason} (kept the open file)"));
            return false;
        }
        true
    }

    /// Open a directory or a markdown file
    pub fn open_path(&mut self, ctx: &egui::Context, path: &Path) {
        let replaces_buffer = path.is_file() && self.document.as_ref().is_some_and(|doc| doc.path != path);
        if replaces_buffer && !self.settle_unsaved() {
            return;
        }

        if let Err(e) = self.session.open(path) {
            self.report("Open", e);
            return;
        }
        ctx.forget_all_images();

        if path.is_dir() {
            self.config.apply(ConfigField::LastOpenedDirectory(path.to_path_buf()));
            self.refresh_entries();
        } else {
            self.config.apply(ConfigField::LastOpenedFile(path.to_path_buf()));
            self.config.add_recent_file(path.to_path_buf());
            self.load_current_document();
        }
        self.persist_config();
    }

    /// Navigate to the parent of the current directory
    pub fn go_up(&mut self, ctx: &egui::Context) {
        match self.session.go_up() {
            Ok(state) => {
                ctx.forget_all_images();
                if let Some(dir) = state.current_dir {
                    self.config.apply(ConfigField::LastOpenedDirectory(dir.path));
                    self.persist_config();
                }
                self.load_current_document();
                self.refresh_entries();
            }
            Err(e) => self.report("Go up", e),
        }
    }

    /// Save the open document
    pub fn save_document(&mut self) {
        let Some(doc) = self.document.as_mut() else {
            return;
        };
        match doc.save(&self.session) {
            Ok(()) => {
                self.disk_conflict = false;
                self.status = Some(format!("Saved {}", doc.title()));
            }
            Err(e) => self.report("Save", e),
        }
    }

    /// Ask for an image and append a reference to it to the document
    pub fn insert_image(&mut self) {
        if self.document.is_none() {
            return;
        }
        let Some(selection) = rfd::FileDialog::new()
            .set_title("Select Image")
            .add_filter("Images", IMAGE_EXTENSIONS)
            .pick_file()
        else {
            return;
        };

        let reference = self.session.image_reference(&selection);
        if let Err(e) = self.session.resolve_image_path(&reference) {
            self.report("Insert image", e);
            return;
        }
        if let Some(doc) = self.document.as_mut() {
            let mut content = doc.content.clone();
            if !content.is_empty() && !content.ends_with('\n') {
                content.push('\n');
            }
            content.push_str(&format!("![]({reference})\n"));
            doc.set_content(content);
        }
    }

    /// Apply a confirmed name prompt
    fn apply_dialog(&mut self, ctx: &egui::Context, kind: NameDialogKind, name: String) {
        match kind {
            NameDialogKind::NewFile => match self.session.create_file(&name, None) {
                Ok(created) => {
                    self.refresh_entries();
                    self.open_path(ctx, &created);
                }
                Err(e) => self.report("Create file", e),
            },
            NameDialogKind::NewDirectory => match self.session.create_directory(&name, None) {
                Ok(_) => self.refresh_entries(),
                Err(e) => self.report("Create folder", e),
            },
            NameDialogKind::Rename(old) => match self.session.rename(&old, &name) {
                Ok(new) => {
                    if let Some(doc) = self.document.as_mut() {
                        doc.follow_rename(&old, &new);
                    }
                    let stale = self.config.last_opened_file.as_deref().is_some_and(|f| f.starts_with(&old));
                    if let Some(file) = self.session.current_file().filter(|_| stale) {
                        self.config.apply(ConfigField::LastOpenedFile(file));
                        self.persist_config();
                    }
                    self.load_current_document();
                    self.refresh_entries();
                }
                Err(e) => self.report("Rename", e),
            },
        }
    }

    fn delete_path(&mut self, path: &Path) {
        match self.session.delete(path) {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                tracing::info!("{} was already removed", path.display());
            }
            Err(e) => self.report("Delete", e),
        }
        self.load_current_document();
        self.refresh_entries();
    }

    /// Compare the open document with the file on disk
    fn poll_disk(&mut self, ctx: &egui::Context) {
        let now = ctx.input(|i| i.time);
        if now - self.last_disk_poll < DISK_POLL_SECS {
            return;
        }
        self.last_disk_poll = now;

        let snapshot = self.session.snapshot();
        let Some(doc) = self.document.as_mut() else {
            return;
        };
        let Some(file) = snapshot.current_file.filter(|file| file.path == doc.path) else {
            return;
        };
        let Some(hash) = snapshot.content_hash else {
            return;
        };

        match doc.sync_with_disk(&hash) {
            Ok(DiskSync::Unchanged) => {}
            Ok(DiskSync::Reloaded) => {
                self.status = Some(format!("Reloaded {}", file.name));
            }
            Ok(DiskSync::Conflict) => self.disk_conflict = true,
            Err(e) => self.report("Reload", e),
        }
    }

    /// Render the top menu bar
    fn render_menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Folder...").clicked() {
                        if let Some(path) = rfd::FileDialog::new().pick_folder() {
                            self.open_path(ctx, &path);
                        }
                        ui.close();
                    }
                    if ui.button("Open File...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Markdown", &["md", "markdown"])
                            .pick_file()
                        {
                            self.open_path(ctx, &path);
                        }
                        ui.close();
                    }
                    ui.menu_button("Recent Files", |ui| {
                        for path in self.config.recent_files.clone() {
                            if ui.button(path.display().to_string()).clicked() {
                                self.open_path(ctx, &path);
                                ui.close();
                            }
                        }
                    });
                    ui.separator();
                    if ui.button("New File...").clicked() {
                        self.dialog = Some(NameDialog::new(NameDialogKind::NewFile, ""));
                        ui.close();
                    }
                    if ui.button("New Folder...").clicked() {
                        self.dialog = Some(NameDialog::new(NameDialogKind::NewDirectory, ""));
                        ui.close();
                    }
                    if ui.button("Save").clicked() {
                        self.save_document();
                        ui.close();
                    }
                    ui.separator();
                    if ui.button("Exit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("View", |ui| {
                    if ui.button("Toggle Sidebar").clicked() {
                        self.sidebar_visible = !self.sidebar_visible;
                        ui.close();
                    }
                    if ui
                        .checkbox(&mut self.config.show_hidden_files, "Show Hidden Files")
                        .changed()
                    {
                        self.persist_config();
                    }
                    if ui.button("Toggle Dark Mode").clicked() {
                        let theme = if self.config.is_dark() { "light" } else { "dark" };
                        self.config.apply(ConfigField::Theme(theme.to_string()));
                        Self::apply_theme(ctx, &self.config);
                        self.persist_config();
                        ui.close();
                    }
                    ui.separator();
                    if ui.selectable_label(self.view_mode == ViewMode::Editor, "Editor Only").clicked() {
                        self.view_mode = ViewMode::Editor;
                        ui.close();
                    }
                    if ui.selectable_label(self.view_mode == ViewMode::Preview, "Preview Only").clicked() {
                        self.view_mode = ViewMode::Preview;
                        ui.close();
                    }
                    if ui.selectable_label(self.view_mode == ViewMode::Split, "Split View").clicked() {
                        self.view_mode = ViewMode::Split;
                        ui.close();
                    }
                });
            });
        });
    }

    fn render_status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if self.disk_conflict {
                    ui.colored_label(ui.visuals().warn_fg_color, "Changed on disk");
                    if ui.button("Reload").clicked() {
                        self.document = None;
                        self.disk_conflict = false;
                        self.load_current_document();
                    }
                    ui.separator();
                }
                if let Some(status) = &self.status {
                    ui.label(status.as_str());
                }
            });
        });
    }

    fn render_dialogs(&mut self, ctx: &egui::Context) {
        if let Some(dialog) = self.dialog.as_mut() {
            match dialog.show(ctx) {
                Some(Some(name)) => {
                    let kind = dialog.kind.clone();
                    self.dialog = None;
                    self.apply_dialog(ctx, kind, name);
                }
                Some(None) => self.dialog = None,
                None => {}
            }
        }

        if let Some(path) = self.pending_delete.clone() {
            let mut close = false;
            egui::Window::new("Delete")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label(format!("Delete {} and everything in it?", path.display()));
                    ui.horizontal(|ui| {
                        if ui.button("Cancel").clicked() {
                            close = true;
                        }
                        if ui.button("Delete").clicked() {
                            self.delete_path(&path);
                            close = true;
                        }
                    });
                });
            if close {
                self.pending_delete = None;
            }
        }
    }
}

impl eframe::App for MarkdownsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some(title) = self.session.take_title_refresh() {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title));
        }

        // Handle keyboard shortcuts
        let (save, toggle_sidebar) = ctx.input(|i| {
            (
                i.modifiers.ctrl && i.key_pressed(egui::Key::S),
                i.modifiers.ctrl && i.key_pressed(egui::Key::B),
            )
        });
        if save {
            self.save_document();
        }
        if toggle_sidebar {
            self.sidebar_visible = !self.sidebar_visible;
        }

        self.poll_disk(ctx);

        self.render_menu_bar(ctx);
        self.render_status_bar(ctx);

        // Render sidebar with the directory listing
        if self.sidebar_visible {
            egui::SidePanel::left("sidebar")
                .resizable(true)
                .default_width(250.0)
                .min_width(150.0)
                .show(ctx, |ui| {
                    FileListPanel::show(ui, self);
                });
        }

        // Render main content area
        egui::CentralPanel::default().show(ctx, |ui| match self.view_mode {
            ViewMode::Editor => {
                EditorPanel::show(ui, self);
            }
            ViewMode::Preview => {
                PreviewPanel::show(ui, self);
            }
            ViewMode::Split => {
                // Split view: editor on left, preview on right
                let available_width = ui.available_width();
                ui.horizontal(|ui| {
                    ui.set_min_width(available_width);

                    ui.vertical(|ui| {
                        ui.set_width(available_width / 2.0 - 4.0);
                        EditorPanel::show(ui, self);
                    });

                    ui.separator();

                    ui.vertical(|ui| {
                        ui.set_width(available_width / 2.0 - 4.0);
                        PreviewPanel::show(ui, self);
                    });
                });
            }
        });

        self.render_dialogs(ctx);
    }
}
