//! UI components for Markdowns

pub mod asset_loader;
pub mod dialog;
pub mod editor;
pub mod file_list;
pub mod preview;
