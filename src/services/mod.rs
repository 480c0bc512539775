//! Services module - the scanning, grouping, metadata and packaging engine.
//!
//! Everything here is framework-agnostic: no GUI types, only plain data in and out,
//! which keeps it testable and reusable behind any front end.
//!
//! # Components
//!
//! - [`matcher`]: pure filename pattern matching, turning a `.name` file plus its
//!   siblings into an [`AssetGroup`](crate::models::AssetGroup)
//! - [`classifier`]: "is this an asset database / project mod directory" predicates
//! - [`scanner`]: cancellable background walker that emits asset groups as it finds them
//! - [`metadata`]: `METADATA.json` / `DESCRIPTION.html` persistence with dirty tracking
//! - [`transfer`]: crash-safe asset copy and zip packaging
//!
//! # Usage Example
//!
//! ```no_run
//! use digismod::services::{AssetScanner, ScanEvent};
//!
//! let scanner = AssetScanner::new("/games/dsdb");
//! let mut events = scanner.subscribe();
//! let worker = scanner.start()?;
//!
//! while let Some(event) = events.blocking_recv() {
//!     match event {
//!         ScanEvent::AssetFound(group) => println!("{}", group.base_name),
//!         ScanEvent::ScanFinished { groups, .. } => {
//!             println!("{groups} assets");
//!             break;
//!         }
//!     }
//! }
//! worker.join().ok();
//! # Ok::<(), digismod::ModError>(())
//! ```

pub mod classifier;
pub mod matcher;
pub mod metadata;
pub mod scanner;
pub mod transfer;

pub use classifier::{is_asset_database_directory, is_project_mod_directory, list_project_mods};
pub use matcher::match_asset_files;
pub use metadata::{ProjectMod, create_new_project, create_project_mod, read_description, read_metadata};
pub use scanner::{AssetScanner, RescanPolicy, ScanEvent, ScanSink, ScanStatus};
pub use transfer::{CopyOutcome, copy_many, copy_one, pack};
