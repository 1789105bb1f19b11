//! Navigation and content-resolution core: paths, hashing, session state,
//! file operations, asset serving and configuration

pub mod asset;
pub mod config;
pub mod document;
pub mod error;
pub mod file_system;
pub mod hasher;
pub mod navigation;
pub mod paths;
pub mod session;
