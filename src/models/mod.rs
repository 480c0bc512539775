//! Data models for the mod editor.
//!
//! This module contains the plain data exchanged between the engine and the GUI layer:
//! - [`AssetGroup`] and [`Category`]: the files grouped under one base name
//! - [`ModMetadata`] and [`ModVersion`]: the contents of a project mod's `METADATA.json`
//! - [`UserConfig`]: directories and scan cadence loaded from `DigiSModEditor Settings.yaml`
//!
//! None of these types reference UI toolkit types.

pub mod asset;
pub mod config;
pub mod metadata;

pub use asset::{AssetGroup, Category, NAME_MARKER_EXTENSION, SIBLING_DELIMITER, is_name_marker};
pub use config::{UserConfig, default_app_dir};
pub use metadata::{DESCRIPTION_FILE, METADATA_FILE, MODFILES_DIR, ModMetadata, ModVersion};
