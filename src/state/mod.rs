//! UI-facing state.
//!
//! - [`AssetTreeModel`]: arena of asset → category → file nodes with checkbox
//!   selection, fed through an [`AssetQueue`] that scanner threads push into
//! - [`ModelRegistry`]: one model + scanner per opened directory, keyed by path
//!
//! The GUI layer owns a [`ModelRegistry`], calls [`ModelRegistry::poll`] on a fixed
//! cadence (50 ms by default) and renders [`AssetTreeModel::rows`]. Nothing here
//! references UI toolkit types.
//!
//! # Threading
//!
//! The [`AssetQueue`] is the only structure shared between a scanner thread
//! (producer) and the UI thread (consumer). Everything else is owned by the UI
//! thread.

pub mod registry;
pub mod tree;

pub use registry::{ModelEntry, ModelRegistry, transfer_checked};
pub use tree::{AssetQueue, AssetTreeModel, LeafData, NodeId, NodeKind, TreeNode, TreeRow};
