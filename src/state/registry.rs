// Model registry
//
// Owns one (model, scanner) pair per opened directory, keyed by path. The GUI
// layer holds the registry and drives `poll()` on its timer.

use crate::errors::{ModError, Result};
use crate::models::{AssetGroup, UserConfig};
use crate::services::classifier::{is_asset_database_directory, is_project_mod_directory};
use crate::services::metadata::ProjectMod;
use crate::services::scanner::{AssetScanner, RescanPolicy, ScanStatus};
use crate::services::transfer::{CopyOutcome, copy_many};
use crate::state::tree::AssetTreeModel;
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// A tree model and the scanner that feeds it
pub struct ModelEntry {
    pub model: AssetTreeModel,
    pub scanner: AssetScanner,
    worker: Option<JoinHandle<ScanStatus>>,
}

impl ModelEntry {
    fn new(model: AssetTreeModel) -> Self {
        let scanner = AssetScanner::new(model.root_path());
        scanner.add_sink(Arc::new(model.queue()));
        Self {
            model,
            scanner,
            worker: None,
        }
    }

    /// Stop the scanner and wait for its worker thread
    fn shutdown(&mut self) {
        if let Some(worker) = self.worker.take() {
            self.scanner.stop();
            if worker.join().is_err() {
                tracing::error!("Scanner thread for {} panicked", self.scanner.root());
            }
        }
    }
}

/// Registry of opened directories, each with an independent scanner.
pub struct ModelRegistry {
    entries: IndexMap<Utf8PathBuf, ModelEntry>,
    policy: RescanPolicy,
}

impl ModelRegistry {
    pub fn new(policy: RescanPolicy) -> Self {
        Self {
            entries: IndexMap::new(),
            policy,
        }
    }

    pub fn from_config(config: &UserConfig) -> Self {
        Self::new(RescanPolicy::new(Duration::from_secs(config.rescan_cooldown_secs)))
    }

    fn insert(&mut self, key: Utf8PathBuf, model: AssetTreeModel) -> &mut AssetTreeModel {
        if let Some(mut previous) = self.entries.shift_remove(&key) {
            previous.shutdown();
        }

        let entry = self.entries.entry(key).or_insert(ModelEntry::new(model));
        &mut entry.model
    }

    /// Register a source asset database.
    ///
    /// # Errors
    /// [`ModError::InvalidDatabaseDirectory`] unless the directory holds more than two `.name` files.
    pub fn open_database(&mut self, path: &Utf8Path) -> Result<&mut AssetTreeModel> {
        if !is_asset_database_directory(path)? {
            return Err(ModError::InvalidDatabaseDirectory(format!(
                "Directory is not a DSDB directory: {}",
                path
            )));
        }

        tracing::info!("Opened asset database: {}", path);
        Ok(self.insert(path.to_path_buf(), AssetTreeModel::new(path)))
    }

    /// Register a project mod; its model is bound to `<path>/modfiles`.
    pub fn open_project_mod(&mut self, path: &Utf8Path) -> Result<&mut AssetTreeModel> {
        let project = ProjectMod::load(path)?;

        tracing::info!("Opened project mod: {} ({})", project.title(), path);
        Ok(self.insert(path.to_path_buf(), AssetTreeModel::with_project(project)))
    }

    /// Register either kind of game data directory.
    ///
    /// # Errors
    /// [`ModError::InvalidGameDataDirectory`] if the directory is neither kind.
    pub fn open(&mut self, path: &Utf8Path) -> Result<&mut AssetTreeModel> {
        if is_project_mod_directory(path)? {
            self.open_project_mod(path)
        } else if is_asset_database_directory(path)? {
            self.open_database(path)
        } else {
            Err(ModError::InvalidGameDataDirectory(format!(
                "Cannot open {}",
                path
            )))
        }
    }

    pub fn get(&self, path: &Utf8Path) -> Option<&AssetTreeModel> {
        self.entries.get(path).map(|e| &e.model)
    }

    pub fn get_mut(&mut self, path: &Utf8Path) -> Option<&mut AssetTreeModel> {
        self.entries.get_mut(path).map(|e| &mut e.model)
    }

    pub fn scanner(&self, path: &Utf8Path) -> Option<&AssetScanner> {
        self.entries.get(path).map(|e| &e.scanner)
    }

    /// Registered directories in opening order
    pub fn paths(&self) -> impl Iterator<Item = &Utf8Path> {
        self.entries.keys().map(Utf8PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Start a scan if the cooldown allows it.
    ///
    /// Clears the model first so the rebuilt tree reflects the directory.
    ///
    /// # Returns
    /// `true` if a scan was started; `false` if one is running or the cooldown
    /// has not elapsed
    pub fn rescan(&mut self, path: &Utf8Path, now: u64) -> Result<bool> {
        let policy = self.policy;
        let entry = self
            .entries
            .get_mut(path)
            .ok_or_else(|| ModError::InvalidDirectoryPath(path.to_path_buf()))?;

        if entry.scanner.is_running() {
            tracing::debug!("Scan already running for {}", path);
            return Ok(false);
        }
        if !policy.should_rescan(entry.scanner.last_scan_timestamp(), now) {
            tracing::debug!(
                "Skipping rescan of {}: cooldown of {}s not elapsed",
                path,
                policy.cooldown().as_secs()
            );
            return Ok(false);
        }

        if let Some(worker) = entry.worker.take() {
            let _ = worker.join();
        }
        entry.model.clear();
        entry.worker = Some(entry.scanner.start()?);
        Ok(true)
    }

    /// Drain one queued group into every registered model.
    ///
    /// # Returns
    /// Number of groups materialized
    pub fn poll(&mut self) -> usize {
        self.entries
            .values_mut()
            .filter_map(|entry| entry.model.drain_one())
            .count()
    }

    /// True while any scanner runs or any model has queued groups
    pub fn is_busy(&self) -> bool {
        self.entries
            .values()
            .any(|e| e.scanner.is_running() || e.model.pending() > 0)
    }

    /// Stop the scanner of a directory and drop its model
    pub fn close(&mut self, path: &Utf8Path) -> Option<AssetTreeModel> {
        let mut entry = self.entries.shift_remove(path)?;
        entry.shutdown();
        tracing::info!("Closed {}", path);
        Some(entry.model)
    }

    /// Copy the checked assets of `source` into `destination` and merge them into its tree.
    pub fn transfer_checked(
        &mut self,
        source: &Utf8Path,
        destination: &Utf8Path,
        replace: bool,
    ) -> Result<Vec<CopyOutcome>> {
        let source_model = self
            .get(source)
            .ok_or_else(|| ModError::InvalidDirectoryPath(source.to_path_buf()))?;
        let selection = checked_selection(source_model);

        let dest_model = self
            .get_mut(destination)
            .ok_or_else(|| ModError::InvalidDirectoryPath(destination.to_path_buf()))?;
        Ok(transfer_selection(selection, dest_model, replace))
    }
}

impl Drop for ModelRegistry {
    fn drop(&mut self) {
        for entry in self.entries.values_mut() {
            entry.shutdown();
        }
    }
}

/// Copy checked roots of `source` into `dest`'s directory and merge their structure.
pub fn transfer_checked(
    source: &AssetTreeModel,
    dest: &mut AssetTreeModel,
    replace: bool,
) -> Vec<CopyOutcome> {
    transfer_selection(checked_selection(source), dest, replace)
}

/// Checked roots as groups paired with their absolute file paths
fn checked_selection(source: &AssetTreeModel) -> Vec<(AssetGroup, Vec<Utf8PathBuf>)> {
    source
        .checked_roots()
        .into_iter()
        .filter_map(|root| {
            let group = source.group_of(root)?;
            let paths = source.paths_under(root).map(Utf8Path::to_path_buf).collect();
            Some((group, paths))
        })
        .collect()
}

fn transfer_selection(
    selection: Vec<(AssetGroup, Vec<Utf8PathBuf>)>,
    dest: &mut AssetTreeModel,
    replace: bool,
) -> Vec<CopyOutcome> {
    let dest_dir = dest.root_path().to_path_buf();
    let mut outcomes = Vec::new();

    for (mut group, files) in selection {
        let copied: Vec<CopyOutcome> = copy_many(files, &dest_dir, replace).collect();
        let succeeded = copied.iter().filter(|o| o.success).count();
        tracing::info!(
            "Transferred {}: {}/{} files",
            group.base_name,
            succeeded,
            copied.len()
        );

        if succeeded > 0 {
            group.directory = Some(dest_dir.clone());
            dest.merge_group(&group);
        }
        outcomes.extend(copied);
    }

    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ModVersion;
    use crate::services::metadata::create_project_mod;
    use std::fs;
    use tempfile::TempDir;

    fn temp_dir() -> (TempDir, Utf8PathBuf) {
        let temp = TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(temp.path().to_path_buf()).unwrap();
        (temp, path)
    }

    fn database(root: &Utf8Path) -> Utf8PathBuf {
        let db = root.join("db");
        fs::create_dir_all(&db).unwrap();
        for file in ["a.name", "a.geom", "b.name", "c.name"] {
            fs::write(db.join(file), file).unwrap();
        }
        db
    }

    #[test]
    fn test_open_rejects_plain_directory() {
        let (_temp, root) = temp_dir();
        let mut registry = ModelRegistry::new(RescanPolicy::default());

        assert!(matches!(
            registry.open_database(&root),
            Err(ModError::InvalidDatabaseDirectory(_))
        ));
        assert!(matches!(
            registry.open_project_mod(&root),
            Err(ModError::InvalidProjectModDirectory(_))
        ));
        assert!(matches!(
            registry.open(&root),
            Err(ModError::InvalidGameDataDirectory(_))
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_open_dispatches_by_kind() {
        let (_temp, root) = temp_dir();
        let db = database(&root);
        let project = create_project_mod(&root, "proj", "a", ModVersion::new(1, 0), "c", "d").unwrap();

        let mut registry = ModelRegistry::new(RescanPolicy::default());
        assert!(!registry.open(&db).unwrap().is_project_mod());

        let model = registry.open(&project).unwrap();
        assert!(model.is_project_mod());
        assert_eq!(model.root_path(), project.join("modfiles"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_rescan_respects_cooldown() {
        let (_temp, root) = temp_dir();
        let db = database(&root);
        let mut registry = ModelRegistry::new(RescanPolicy::default());
        registry.open_database(&db).unwrap();

        assert!(registry.rescan(&db, crate::services::scanner::unix_timestamp()).unwrap());
        while registry.is_busy() {
            registry.poll();
        }
        assert_eq!(registry.get(&db).unwrap().root_count(), 3);

        // Immediately again: throttled
        let now = registry.scanner(&db).unwrap().last_scan_timestamp();
        assert!(!registry.rescan(&db, now + 10).unwrap());
        assert!(registry.rescan(&db, now + 120).unwrap());
        assert!(registry.close(&db).is_some());
    }

    #[test]
    fn test_transfer_checked_copies_and_merges() {
        let (_temp, root) = temp_dir();
        let db = database(&root);
        let project = create_project_mod(&root, "proj", "a", ModVersion::new(1, 0), "c", "d").unwrap();

        let mut registry = ModelRegistry::new(RescanPolicy::default());
        registry.open_database(&db).unwrap();
        registry.open_project_mod(&project).unwrap();

        let source = registry.get_mut(&db).unwrap();
        source.enqueue(crate::services::matcher::match_asset_files("a.name", "a.name;a.geom").with_directory(&db));
        source.drain_one();
        let root_a = source.find_root_by_name("a").unwrap();
        source.set_checked(root_a, true);

        let outcomes = registry.transfer_checked(&db, &project, true).unwrap();

        // a.name and a.geom exist, a.skel is synthesized only
        assert_eq!(outcomes.iter().filter(|o| o.success).count(), 2);
        assert_eq!(outcomes.iter().filter(|o| !o.success).count(), 1);
        assert!(project.join("modfiles/a.geom").exists());

        let dest = registry.get(&project).unwrap();
        let merged = dest.find_root_by_name("a").unwrap();
        let leaf_path = dest.paths_under(merged).next().unwrap();
        assert!(leaf_path.starts_with(project.join("modfiles")));
    }
}
