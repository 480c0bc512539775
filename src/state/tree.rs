// Asset tree model
//
// Arena of nodes (asset -> category -> file) fed from a thread-safe FIFO that the
// scanner pushes into. The UI thread drains one group per tick, so the scan rate
// never dictates the UI mutation rate.

use crate::errors::Result;
use crate::models::{AssetGroup, Category};
use crate::services::metadata::ProjectMod;
use crate::services::scanner::ScanSink;
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Index of a node in an [`AssetTreeModel`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Data attached to a file node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafData {
    /// Filename without extension
    pub name: String,
    pub extension: String,
    pub filename: String,
    pub path: Utf8PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Top-level asset, checkbox-capable
    Root { checked: bool },
    Group(Category),
    Leaf(LeafData),
}

#[derive(Debug, Clone)]
pub struct TreeNode {
    pub text: String,
    pub kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl TreeNode {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Flattened row for a UI adapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    pub node: NodeId,
    pub depth: usize,
    pub text: String,
    pub checkable: bool,
    pub checked: bool,
}

/// FIFO shared between a scanner thread (producer) and the model (consumer).
#[derive(Debug, Clone, Default)]
pub struct AssetQueue {
    inner: Arc<Mutex<VecDeque<AssetGroup>>>,
}

impl AssetQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&self, group: AssetGroup) {
        self.inner.lock().push_back(group);
    }

    pub fn pop(&self) -> Option<AssetGroup> {
        self.inner.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}

impl ScanSink for AssetQueue {
    fn asset_found(&self, group: &AssetGroup) {
        self.enqueue(group.clone());
    }
}

/// Hierarchical asset model with checkbox selection.
///
/// One model type serves both the source database and project mods; a project
/// mod model additionally carries its [`ProjectMod`] metadata.
#[derive(Debug)]
pub struct AssetTreeModel {
    root_path: Utf8PathBuf,
    nodes: Vec<TreeNode>,
    roots: Vec<NodeId>,
    queue: AssetQueue,
    checked_indices: Vec<usize>,
    project: Option<ProjectMod>,
}

impl AssetTreeModel {
    /// Create an empty model for a source directory
    pub fn new(root_path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            root_path: root_path.into(),
            nodes: Vec::new(),
            roots: Vec::new(),
            queue: AssetQueue::new(),
            checked_indices: Vec::new(),
            project: None,
        }
    }

    /// Create an empty model over a project mod's `modfiles` directory
    pub fn with_project(project: ProjectMod) -> Self {
        let mut model = Self::new(project.modfiles_dir());
        model.project = Some(project);
        model
    }

    /// Directory the model's files live in
    pub fn root_path(&self) -> &Utf8Path {
        &self.root_path
    }

    pub fn project(&self) -> Option<&ProjectMod> {
        self.project.as_ref()
    }

    pub fn project_mut(&mut self) -> Option<&mut ProjectMod> {
        self.project.as_mut()
    }

    pub fn is_project_mod(&self) -> bool {
        self.project.is_some()
    }

    /// Producer handle for the model's queue
    pub fn queue(&self) -> AssetQueue {
        self.queue.clone()
    }

    pub fn enqueue(&self, group: AssetGroup) {
        self.queue.enqueue(group);
    }

    /// Number of groups waiting to be materialized
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Materialize the oldest queued group. No-op on an empty queue.
    pub fn drain_one(&mut self) -> Option<NodeId> {
        let group = self.queue.pop()?;
        Some(self.insert_group(&group))
    }

    /// Drop every node, pending group and selection
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.roots.clear();
        self.queue.clear();
        self.checked_indices.clear();
    }

    fn push_node(&mut self, text: String, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(TreeNode {
            text,
            kind,
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        id
    }

    fn push_leaf(&mut self, group_node: NodeId, group: &AssetGroup, filename: &str) -> NodeId {
        let file = Utf8Path::new(filename);
        let leaf = LeafData {
            name: file.file_stem().unwrap_or(filename).to_string(),
            extension: file.extension().unwrap_or_default().to_string(),
            filename: filename.to_string(),
            path: group
                .path_of(filename)
                .unwrap_or_else(|| self.root_path.join(filename)),
        };
        self.push_node(filename.to_string(), NodeKind::Leaf(leaf), Some(group_node))
    }

    /// Append a group as a new root with category and file children
    pub fn insert_group(&mut self, group: &AssetGroup) -> NodeId {
        let root = self.push_node(
            group.base_name.clone(),
            NodeKind::Root { checked: false },
            None,
        );
        self.roots.push(root);

        for (category, files) in &group.categories {
            let group_node = self.push_node(
                category.to_string(),
                NodeKind::Group(*category),
                Some(root),
            );
            for filename in files {
                self.push_leaf(group_node, group, filename);
            }
        }

        tracing::trace!("Materialized asset {} ({} files)", group.base_name, group.file_count());
        root
    }

    /// Merge a group into the tree: new root if unknown, otherwise add missing files
    pub fn merge_group(&mut self, group: &AssetGroup) -> NodeId {
        let Some(root) = self.find_root_by_name(&group.base_name) else {
            return self.insert_group(group);
        };

        for (category, files) in &group.categories {
            let existing_group = self.nodes[root.0]
                .children
                .iter()
                .copied()
                .find(|id| self.nodes[id.0].kind == NodeKind::Group(*category));
            let group_node = match existing_group {
                Some(id) => id,
                None => self.push_node(category.to_string(), NodeKind::Group(*category), Some(root)),
            };

            for filename in files {
                let present = self.nodes[group_node.0]
                    .children
                    .iter()
                    .any(|id| self.nodes[id.0].text == *filename);
                if !present {
                    self.push_leaf(group_node, group, filename);
                }
            }
        }

        root
    }

    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id.0)
    }

    /// Children of a node (empty for unknown ids)
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(TreeNode::children).unwrap_or(&[])
    }

    pub fn leaf(&self, id: NodeId) -> Option<&LeafData> {
        match &self.node(id)?.kind {
            NodeKind::Leaf(data) => Some(data),
            _ => None,
        }
    }

    /// Top-level asset nodes in insertion order
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    /// First top-level node whose text is exactly `name`
    pub fn find_root_by_name(&self, name: &str) -> Option<NodeId> {
        self.roots
            .iter()
            .copied()
            .find(|id| self.nodes[id.0].text == name)
    }

    /// File nodes two levels under `root` (category -> file)
    pub fn leaves_under(&self, root: NodeId) -> impl Iterator<Item = &LeafData> + '_ {
        self.children(root)
            .iter()
            .flat_map(move |group| self.children(*group).iter())
            .filter_map(move |leaf| self.leaf(*leaf))
    }

    pub fn paths_under(&self, root: NodeId) -> impl Iterator<Item = &Utf8Path> + '_ {
        self.leaves_under(root).map(|leaf| leaf.path.as_path())
    }

    pub fn filenames_under(&self, root: NodeId) -> impl Iterator<Item = &str> + '_ {
        self.leaves_under(root).map(|leaf| leaf.filename.as_str())
    }

    /// Rebuild the `{category: [filenames]}` structure of a root from tree state
    pub fn group_structure_of(&self, root: NodeId) -> IndexMap<Category, Vec<String>> {
        self.children(root)
            .iter()
            .filter_map(|id| {
                let NodeKind::Group(category) = self.node(*id)?.kind else {
                    return None;
                };
                let files = self
                    .children(*id)
                    .iter()
                    .filter_map(|leaf| self.leaf(*leaf))
                    .map(|leaf| leaf.filename.clone())
                    .collect();
                Some((category, files))
            })
            .collect()
    }

    /// Rebuild a full [`AssetGroup`] for a root
    pub fn group_of(&self, root: NodeId) -> Option<AssetGroup> {
        let node = self.node(root)?;
        if !matches!(node.kind, NodeKind::Root { .. }) {
            return None;
        }

        let directory = self
            .paths_under(root)
            .next()
            .and_then(Utf8Path::parent)
            .map(Utf8Path::to_path_buf);

        Some(AssetGroup {
            base_name: node.text.clone(),
            categories: self.group_structure_of(root),
            directory,
        })
    }

    /// Every root as an [`AssetGroup`], in tree order
    pub fn to_groups(&self) -> Vec<AssetGroup> {
        self.roots.iter().filter_map(|id| self.group_of(*id)).collect()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_groups())?)
    }

    pub fn is_checked(&self, root: NodeId) -> bool {
        matches!(
            self.node(root).map(|n| &n.kind),
            Some(NodeKind::Root { checked: true })
        )
    }

    fn set_checked_raw(&mut self, root: NodeId, value: bool) -> bool {
        match self.nodes.get_mut(root.0).map(|n| &mut n.kind) {
            Some(NodeKind::Root { checked }) if *checked != value => {
                *checked = value;
                true
            }
            _ => false,
        }
    }

    /// Set one root's checkbox. Returns whether it changed.
    pub fn set_checked(&mut self, root: NodeId, checked: bool) -> bool {
        let changed = self.set_checked_raw(root, checked);
        if changed {
            self.recompute_checked();
        }
        changed
    }

    /// Toggle `root`; if it is part of `selection`, every selected root follows.
    ///
    /// # Returns
    /// The new checked state of `root`; `false` without any change if `root` is
    /// not a top-level asset node
    pub fn toggle_checked(&mut self, root: NodeId, selection: &[NodeId]) -> bool {
        if !matches!(self.node(root).map(|n| &n.kind), Some(NodeKind::Root { .. })) {
            return false;
        }

        let value = !self.is_checked(root);
        self.set_checked_raw(root, value);

        if selection.contains(&root) {
            for &other in selection {
                self.set_checked_raw(other, value);
            }
        }

        self.recompute_checked();
        value
    }

    pub fn set_all_checked(&mut self, checked: bool) {
        for i in 0..self.roots.len() {
            let root = self.roots[i];
            self.set_checked_raw(root, checked);
        }
        self.recompute_checked();
    }

    fn recompute_checked(&mut self) {
        self.checked_indices = self
            .roots
            .iter()
            .enumerate()
            .filter(|(_, id)| self.is_checked(**id))
            .map(|(row, _)| row)
            .collect();
    }

    /// Row indices of checked roots, derived from node state
    pub fn checked_indices(&self) -> &[usize] {
        &self.checked_indices
    }

    pub fn checked_count(&self) -> usize {
        self.checked_indices.len()
    }

    pub fn checked_roots(&self) -> Vec<NodeId> {
        self.checked_indices.iter().map(|row| self.roots[*row]).collect()
    }

    /// Depth-first projection of the arena for a UI adapter
    pub fn rows(&self) -> Vec<TreeRow> {
        let mut rows = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<(NodeId, usize)> = self.roots.iter().rev().map(|id| (*id, 0)).collect();

        while let Some((id, depth)) = stack.pop() {
            let node = &self.nodes[id.0];
            let (checkable, checked) = match node.kind {
                NodeKind::Root { checked } => (true, checked),
                _ => (false, false),
            };
            rows.push(TreeRow {
                node: id,
                depth,
                text: node.text.clone(),
                checkable,
                checked,
            });
            stack.extend(node.children.iter().rev().map(|child| (*child, depth + 1)));
        }

        rows
    }
}
