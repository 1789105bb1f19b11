//! Markdowns - desktop markdown browser and editor
//!
//! Browse a directory of markdown notes, edit them, and preview them with
//! images resolved relative to the open note.

mod app;
mod core;
mod ui;

use app::MarkdownsApp;
use eframe::egui;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::core::config::AppConfig;
use crate::core::navigation::APP_TITLE;

fn main() -> eframe::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::filter::LevelFilter::INFO)
        .init();

    tracing::info!("Starting Markdowns...");

    let config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!("Error loading config, using defaults: {:#}", e);
        AppConfig::default()
    });

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window_width as f32, config.window_height as f32])
            .with_min_inner_size([640.0, 480.0])
            .with_title(APP_TITLE),
        ..Default::default()
    };

    eframe::run_native(
        "Markdowns",
        native_options,
        Box::new(|cc| Ok(Box::new(MarkdownsApp::new(cc, config)))),
    )
}
