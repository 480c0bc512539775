// DigiSModEditor - asset grouping, project mod metadata and packaging for
// Digimon Story modding.
//
// This is the library crate containing the core business logic and data structures.
// The binary crate (main.rs) provides a headless entry point.

pub mod config;
pub mod errors;
pub mod logging;
pub mod models;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use errors::{ModError, Result};
pub use models::{AssetGroup, Category, ModMetadata, ModVersion, UserConfig};
pub use services::{AssetScanner, ProjectMod, RescanPolicy, ScanEvent, ScanStatus};
pub use state::{AssetTreeModel, ModelRegistry};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
