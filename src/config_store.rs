//! Configuration store
//!
//! Owns the active [`Collection`] and everything about its persistence:
//! discovering snapshot files, loading and saving them, the dirty flag, the
//! "last used" pointer, and picking a directory for new snapshots.
//!
//! # Failure policy
//!
//! - A failed load leaves the active collection untouched. If the failed
//!   snapshot was the last-used one, the pointer is cleared.
//! - A failed save leaves the dirty flag set so the caller can retry.
//! - Validation on load is advisory: the reports are returned, never enforced.
//!
//! Every outcome is also announced on the [`NotificationBus`].

use crate::collection::Collection;
use crate::config::EngineConfig;
use crate::error::{Result, ShelfError};
use crate::notify::{Notification, NotificationBus};
use crate::preferences::{LAST_USED_KEY, Preferences};
use crate::reorder::DropOutcome;
use crate::snapshot::{self, SnapshotId};
use crate::validation::{
    self, HandleResolver, PresenceOnly, ReferenceReport, StructuralReport,
};
use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Snapshots found by [`ConfigStore::discover`], as parallel lists
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovery {
    pub identifiers: Vec<SnapshotId>,
    pub display_names: Vec<String>,
}

impl Discovery {
    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SnapshotId> {
        self.identifiers.get(index)
    }

    /// Index of the first snapshot with this display name
    pub fn find_by_name(&self, name: &str) -> Option<usize> {
        self.display_names.iter().position(|n| n == name)
    }

    fn push(&mut self, id: SnapshotId) {
        self.display_names.push(id.display_name());
        self.identifiers.push(id);
    }
}

/// Result of a successful load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOutcome {
    pub id: SnapshotId,
    pub structural: StructuralReport,
    pub references: ReferenceReport,
}

/// Whether an edit closure changed the collection.
///
/// Lets [`ConfigStore::edit`] mark the store dirty only for real changes.
pub trait Mutation {
    fn changed(&self) -> bool;
}

impl Mutation for () {
    fn changed(&self) -> bool {
        true
    }
}

impl Mutation for bool {
    fn changed(&self) -> bool {
        *self
    }
}

impl<T, E> Mutation for std::result::Result<T, E> {
    fn changed(&self) -> bool {
        self.is_ok()
    }
}

impl<T> Mutation for Option<T> {
    fn changed(&self) -> bool {
        self.is_some()
    }
}

impl Mutation for DropOutcome {
    fn changed(&self) -> bool {
        self.moved()
    }
}

#[derive(Debug)]
struct Active {
    id: SnapshotId,
    collection: Collection,
}

/// Discovers, loads, saves and tracks the active collection.
pub struct ConfigStore {
    config: EngineConfig,
    preferences: Box<dyn Preferences>,
    resolver: Box<dyn HandleResolver>,
    bus: NotificationBus,
    discovered: Discovery,
    active: Option<Active>,
    dirty: bool,
}

impl ConfigStore {
    pub fn new(
        config: EngineConfig,
        preferences: Box<dyn Preferences>,
        bus: NotificationBus,
    ) -> Self {
        Self {
            config,
            preferences,
            resolver: Box::new(PresenceOnly),
            bus,
            discovered: Discovery::default(),
            active: None,
            dirty: false,
        }
    }

    /// Use `resolver` for reference validation on load
    pub fn with_resolver(mut self, resolver: Box<dyn HandleResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn bus(&self) -> &NotificationBus {
        &self.bus
    }

    pub fn active(&self) -> Option<&Collection> {
        self.active.as_ref().map(|a| &a.collection)
    }

    pub fn active_id(&self) -> Option<&SnapshotId> {
        self.active.as_ref().map(|a| &a.id)
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Result of the last [`ConfigStore::discover`] call
    pub fn discovered(&self) -> &Discovery {
        &self.discovered
    }

    /// Identifier stored in the last-used pointer
    pub fn last_used(&self) -> Option<SnapshotId> {
        self.preferences
            .get(LAST_USED_KEY)
            .filter(|s| !s.is_empty())
            .map(SnapshotId::new)
    }

    /// Scan every search root for snapshot files. Loads nothing.
    pub fn discover(&mut self) -> &Discovery {
        let mut found = Discovery::default();
        let mut seen = HashSet::new();

        for root in self.config.effective_search_roots() {
            if !root.is_dir() {
                debug!(root = %root.display(), "search root missing, skipped");
                continue;
            }
            let entries = WalkDir::new(&root)
                .sort_by_file_name()
                .into_iter()
                .filter_map(std::result::Result::ok);
            for entry in entries {
                let path = entry.path();
                if entry.file_type().is_file()
                    && snapshot::is_snapshot_path(path)
                    && seen.insert(path.to_path_buf())
                {
                    found.push(SnapshotId::new(path));
                }
            }
        }

        info!(count = found.len(), "snapshot discovery finished");
        self.bus.publish(Notification::Discovered { count: found.len() });
        self.discovered = found;
        &self.discovered
    }

    /// Load the `index`-th discovered snapshot
    pub fn load_by_index(&mut self, index: usize) -> Result<LoadOutcome> {
        let id = self
            .discovered
            .get(index)
            .cloned()
            .ok_or(ShelfError::UnknownSnapshot {
                index,
                count: self.discovered.len(),
            })?;
        self.load_by_identifier(&id)
    }

    /// Load a snapshot and make it the active collection.
    ///
    /// On success the structural and reference reports are returned and the
    /// snapshot becomes the last-used one. On failure nothing changes except
    /// that a matching last-used pointer is cleared.
    pub fn load_by_identifier(&mut self, id: &SnapshotId) -> Result<LoadOutcome> {
        let collection = match snapshot::read_snapshot(id.path()) {
            Ok(collection) => collection,
            Err(source) => {
                warn!(snapshot = %id, error = %source, "snapshot load failed");
                if self.last_used().as_ref() == Some(id) {
                    self.clear_last_used();
                }
                self.bus.publish(Notification::LoadFailed {
                    id: id.clone(),
                    reason: source.to_string(),
                });
                return Err(ShelfError::Load {
                    id: id.clone(),
                    source,
                });
            }
        };

        let structural = validation::validate(&collection);
        if !structural.ok {
            warn!(snapshot = %id, problems = %structural.message, "snapshot is structurally invalid");
        }
        let references = validation::check_references(&collection, self.resolver.as_ref());
        for problem in &references.details {
            warn!(
                snapshot = %id,
                group = %problem.group_name,
                item = problem.item_index,
                "{}",
                problem.message
            );
        }

        if self.dirty {
            if let Some(previous) = self.active_id() {
                warn!(snapshot = %previous, "discarding unsaved changes");
            }
        }
        self.active = Some(Active {
            id: id.clone(),
            collection,
        });
        self.dirty = false;

        if let Err(e) = self
            .preferences
            .set(LAST_USED_KEY, &id.path().to_string_lossy())
        {
            warn!(error = %e, "failed to record last used snapshot");
        }

        info!(snapshot = %id, invalid_references = references.invalid_count, "snapshot loaded");
        self.bus.publish(Notification::Loaded { id: id.clone() });

        Ok(LoadOutcome {
            id: id.clone(),
            structural,
            references,
        })
    }

    /// Reopen the last-used snapshot, if one is recorded
    pub fn restore_last_used(&mut self) -> Result<Option<LoadOutcome>> {
        match self.last_used() {
            Some(id) => self.load_by_identifier(&id).map(Some),
            None => Ok(None),
        }
    }

    fn clear_last_used(&mut self) {
        if let Err(e) = self.preferences.remove(LAST_USED_KEY) {
            warn!(error = %e, "failed to clear last used snapshot");
        } else {
            debug!("last used pointer cleared");
        }
    }

    /// Write the active collection back to its snapshot.
    pub fn save(&mut self) -> Result<()> {
        let active = self.active.as_ref().ok_or(ShelfError::NoActiveCollection)?;

        if let Err(source) = snapshot::write_snapshot(active.id.path(), &active.collection) {
            warn!(snapshot = %active.id, error = %source, "snapshot save failed");
            self.bus.publish(Notification::SaveFailed {
                id: active.id.clone(),
                reason: source.to_string(),
            });
            return Err(ShelfError::Save {
                id: active.id.clone(),
                source,
            });
        }

        let id = active.id.clone();
        self.dirty = false;
        info!(snapshot = %id, "snapshot saved");
        self.bus.publish(Notification::Saved { id });
        Ok(())
    }

    /// Like [`ConfigStore::save`], but refuses a structurally invalid collection
    pub fn save_checked(&mut self) -> Result<()> {
        let report = self
            .validate_active()
            .ok_or(ShelfError::NoActiveCollection)?;
        if !report.ok {
            return Err(ShelfError::invalid(report.message));
        }
        self.save()
    }

    /// Flag unsaved changes; no-op without an active collection
    pub fn mark_dirty(&mut self) {
        if self.active.is_none() || self.dirty {
            return;
        }
        self.dirty = true;
        debug!("collection marked dirty");
        self.bus.publish(Notification::Dirtied);
    }

    pub fn validate_active(&self) -> Option<StructuralReport> {
        self.active().map(validation::validate)
    }

    /// Apply an edit to the active collection, marking it dirty if it changed
    pub fn edit<R: Mutation>(&mut self, f: impl FnOnce(&mut Collection) -> R) -> Result<R> {
        let active = self.active.as_mut().ok_or(ShelfError::NoActiveCollection)?;
        let result = f(&mut active.collection);
        if result.changed() {
            self.mark_dirty();
        }
        Ok(result)
    }

    /// Directory used for new snapshots when no location is given.
    ///
    /// Falls back from the active snapshot's directory, to the directory of
    /// the first discovered snapshot, to the configured default root.
    pub fn default_location(&self) -> PathBuf {
        self.active_id()
            .and_then(SnapshotId::directory)
            .or_else(|| self.discovered.identifiers.iter().find_map(SnapshotId::directory))
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.config.default_root.clone())
    }

    /// Create a snapshot holding one empty default group and make it active.
    ///
    /// Refuses to overwrite an existing file, and refuses names that are
    /// not a single plain file name.
    pub fn create_new(&mut self, name: &str, location: Option<&Path>) -> Result<LoadOutcome> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ShelfError::invalid("Snapshot name must not be empty"));
        }
        let mut components = Path::new(name).components();
        let single = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );
        if !single || name.chars().any(std::path::is_separator) {
            return Err(ShelfError::invalid(format!(
                "Snapshot name '{}' must be a plain file name",
                name
            )));
        }

        let dir = match location {
            Some(dir) => dir.to_path_buf(),
            None => self.default_location(),
        };
        fs::create_dir_all(&dir)?;

        let id = SnapshotId::new(dir.join(snapshot::snapshot_file_name(name)));
        if id.path().exists() {
            return Err(ShelfError::invalid(format!("Snapshot {} already exists", id)));
        }

        snapshot::write_snapshot(id.path(), &Collection::with_default_group()).map_err(
            |source| ShelfError::Save {
                id: id.clone(),
                source,
            },
        )?;
        info!(snapshot = %id, "snapshot created");
        self.bus.publish(Notification::Created { id: id.clone() });

        self.discover();
        self.load_by_identifier(&id)
    }
}
