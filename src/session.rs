//! Shelf session: the context object tying the core together.
//!
//! A session is built once per editing window and owns one notification
//! bus, the configuration store, and one drag engine per draggable kind.
//! The presentation layer talks only to the session: it forwards intents
//! (add a group, pointer events, save) and reads state back.
//!
//! # Lifecycle
//!
//! The session subscribes to its own bus on construction to keep a status
//! line current. Every session operation that can publish folds the pending
//! notifications into that line before returning, so the subscription never
//! holds more than one operation's worth of messages. Dropping the session
//! drops the subscription, which unregisters it.

use crate::collection::{Collection, DEFAULT_GROUP_NAME, Group, ModelError};
use crate::config::EngineConfig;
use crate::config_store::{ConfigStore, Discovery, LoadOutcome};
use crate::error::{Result, ShelfError};
use crate::item::Item;
use crate::notify::{Notification, NotificationBus, Subscription};
use crate::preferences::Preferences;
use crate::render::{ItemRenderer, RenderResponse};
use crate::reorder::{self, DragEngine, DragKind, DropOutcome, Point, Slot};
use crate::snapshot::SnapshotId;
use std::path::Path;
use tracing::debug;

/// Context object owning the store and the drag engines
pub struct ShelfSession {
    bus: NotificationBus,
    store: ConfigStore,
    group_drag: DragEngine,
    item_drag: DragEngine,
    status_feed: Subscription,
    status: String,
}

impl ShelfSession {
    pub fn new(config: EngineConfig, preferences: Box<dyn Preferences>) -> Self {
        let bus = NotificationBus::new();
        let store = ConfigStore::new(config, preferences, bus.clone());
        Self::with_store(store)
    }

    /// Build a session around an existing store, sharing its bus
    pub fn with_store(store: ConfigStore) -> Self {
        let bus = store.bus().clone();
        let status_feed = bus.subscribe();
        Self {
            bus,
            store,
            group_drag: DragEngine::new(DragKind::Group),
            item_drag: DragEngine::new(DragKind::Item),
            status_feed,
            status: "No shelf loaded".to_string(),
        }
    }

    pub fn bus(&self) -> &NotificationBus {
        &self.bus
    }

    /// New subscription for a presentation component
    pub fn subscribe(&self) -> Subscription {
        self.bus.subscribe()
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn collection(&self) -> Option<&Collection> {
        self.store.active()
    }

    pub fn is_dirty(&self) -> bool {
        self.store.is_dirty()
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    pub fn discover(&mut self) -> &Discovery {
        self.store.discover();
        self.settle();
        self.store.discovered()
    }

    pub fn load_by_index(&mut self, index: usize) -> Result<LoadOutcome> {
        let result = self.store.load_by_index(index);
        let outcome = self.settled(result)?;
        self.reset_drags();
        Ok(outcome)
    }

    pub fn load_by_identifier(&mut self, id: &SnapshotId) -> Result<LoadOutcome> {
        let result = self.store.load_by_identifier(id);
        let outcome = self.settled(result)?;
        self.reset_drags();
        Ok(outcome)
    }

    pub fn restore_last_used(&mut self) -> Result<Option<LoadOutcome>> {
        let result = self.store.restore_last_used();
        let outcome = self.settled(result)?;
        if outcome.is_some() {
            self.reset_drags();
        }
        Ok(outcome)
    }

    pub fn create_new(&mut self, name: &str, location: Option<&Path>) -> Result<LoadOutcome> {
        let result = self.store.create_new(name, location);
        let outcome = self.settled(result)?;
        self.reset_drags();
        Ok(outcome)
    }

    pub fn save(&mut self) -> Result<()> {
        let result = self.store.save();
        self.settled(result)
    }

    pub fn save_checked(&mut self) -> Result<()> {
        let result = self.store.save_checked();
        self.settled(result)
    }

    // ------------------------------------------------------------------
    // Structural edits
    // ------------------------------------------------------------------

    /// Append a group; `None` uses the default name
    pub fn add_group(&mut self, name: Option<&str>) -> Result<usize> {
        let name = name.unwrap_or(DEFAULT_GROUP_NAME);
        let result = self.store.edit(|c| c.add_group(name));
        Ok(self.settled(result)??)
    }

    pub fn remove_group(&mut self, index: usize) -> Result<Group> {
        let result = self.store.edit(|c| c.remove_group(index));
        Ok(self.settled(result)??)
    }

    pub fn rename_group(&mut self, index: usize, name: &str) -> Result<()> {
        let result = self.store.edit(|c| c.rename_group(index, name));
        Ok(self.settled(result)??)
    }

    /// Append a copy of the user-edited `template` to a group
    pub fn add_item(&mut self, group: usize, template: &Item) -> Result<usize> {
        let result = self.store.edit(|c| c.add_item(group, template));
        Ok(self.settled(result)??)
    }

    pub fn remove_item(&mut self, group: usize, index: usize) -> Result<Item> {
        let result = self.store.edit(|c| c.remove_item(group, index));
        Ok(self.settled(result)??)
    }

    /// Edit one item in place
    pub fn edit_item(
        &mut self,
        group: usize,
        index: usize,
        f: impl FnOnce(&mut Item),
    ) -> Result<()> {
        let result = self.store.edit(|c| c.item_mut(group, index).map(f));
        Ok(self.settled(result)??)
    }

    /// Move a group given a tentative (pre-removal) insertion index
    pub fn move_group_to(&mut self, from: usize, tentative: usize) -> Result<bool> {
        let count = self.collection_or_err()?.group_count();
        let Some(to) = reorder::final_index(from, tentative, count) else {
            return Ok(false);
        };
        let moved = self.store.edit(|c| c.move_group(from, to))?;
        if moved {
            self.announce_reorder(DragKind::Group, None, from, to);
        }
        Ok(self.settled(moved))
    }

    /// Move an item within its group given a tentative (pre-removal) insertion index
    pub fn move_item_to(&mut self, group: usize, from: usize, tentative: usize) -> Result<bool> {
        let count = self
            .collection_or_err()?
            .item_count(group)
            .unwrap_or_default();
        let Some(to) = reorder::final_index(from, tentative, count) else {
            return Ok(false);
        };
        let moved = self.store.edit(|c| c.move_item(group, from, to))?;
        if moved {
            self.announce_reorder(DragKind::Item, Some(group), from, to);
        }
        Ok(self.settled(moved))
    }

    fn collection_or_err(&self) -> Result<&Collection> {
        self.store.active().ok_or(ShelfError::NoActiveCollection)
    }

    // ------------------------------------------------------------------
    // Drag and drop
    // ------------------------------------------------------------------

    pub fn engine(&self, kind: DragKind) -> &DragEngine {
        match kind {
            DragKind::Group => &self.group_drag,
            DragKind::Item => &self.item_drag,
        }
    }

    fn engine_mut(&mut self, kind: DragKind) -> &mut DragEngine {
        match kind {
            DragKind::Group => &mut self.group_drag,
            DragKind::Item => &mut self.item_drag,
        }
    }

    /// Pointer pressed on candidate `index`; item drags name their group
    pub fn pointer_down(&mut self, kind: DragKind, index: usize, group: Option<usize>) -> bool {
        if self.store.active().is_none() {
            return false;
        }
        self.engine_mut(kind).pointer_down(index, group)
    }

    pub fn pointer_move(&mut self, kind: DragKind, pointer: Point, slots: &[Slot]) -> Option<usize> {
        self.engine_mut(kind).pointer_move(pointer, slots)
    }

    /// Pointer released: commit or cancel the session for `kind`
    pub fn pointer_up(&mut self, kind: DragKind) -> DropOutcome {
        let group = self.engine(kind).captured_group();
        let engine = match kind {
            DragKind::Group => &mut self.group_drag,
            DragKind::Item => &mut self.item_drag,
        };
        let outcome = match self.store.edit(|c| engine.pointer_up(c)) {
            Ok(outcome) => outcome,
            Err(_) => {
                engine.reset();
                DropOutcome::Cancelled
            }
        };
        if let DropOutcome::Moved { from, to } = outcome {
            self.announce_reorder(kind, group, from, to);
        }
        self.settled(outcome)
    }

    /// Abandon every drag session without committing
    pub fn reset_drags(&mut self) {
        if self.group_drag.is_active() || self.item_drag.is_active() {
            debug!("drag sessions reset");
        }
        self.group_drag.reset();
        self.item_drag.reset();
    }

    fn announce_reorder(&self, kind: DragKind, group: Option<usize>, from: usize, to: usize) {
        self.bus.publish(Notification::Reordered {
            kind,
            group,
            from,
            to,
        });
    }

    fn settle(&mut self) {
        if let Some(last) = self.status_feed.drain().last() {
            self.status = describe(last);
        }
    }

    /// Pass `value` through after folding pending notifications into the status line
    fn settled<T>(&mut self, value: T) -> T {
        self.settle();
        value
    }

    // ------------------------------------------------------------------
    // Presentation
    // ------------------------------------------------------------------

    /// Render one group; items whose renderer asks for removal are removed.
    ///
    /// Returns the number of removed items.
    pub fn render_group(&mut self, group: usize, renderer: &mut dyn ItemRenderer) -> Result<usize> {
        let doomed: Vec<usize> = {
            let collection = self.collection_or_err()?;
            let g = collection.group(group).ok_or_else(|| {
                ShelfError::from(ModelError::IndexOutOfRange {
                    what: "Group",
                    index: group,
                    len: collection.group_count(),
                })
            })?;
            g.items()
                .iter()
                .enumerate()
                .filter(|(_, item)| item.render(renderer) == RenderResponse::RemoveRequested)
                .map(|(i, _)| i)
                .collect()
        };

        for &index in doomed.iter().rev() {
            self.remove_item(group, index)?;
        }
        Ok(doomed.len())
    }

    /// Latest status line
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Fold notifications published from outside the session into the
    /// status line and return it
    pub fn poll_status(&mut self) -> &str {
        self.settle();
        &self.status
    }
}

fn describe(notification: &Notification) -> String {
    match notification {
        Notification::Discovered { count } => format!("Found {} shelves", count),
        Notification::Loaded { id } => format!("Loaded {}", id.display_name()),
        Notification::LoadFailed { id, reason } => {
            format!("Could not load {}: {}", id.display_name(), reason)
        }
        Notification::Saved { id } => format!("Saved {}", id.display_name()),
        Notification::SaveFailed { id, reason } => {
            format!("Could not save {}: {}", id.display_name(), reason)
        }
        Notification::Created { id } => format!("Created {}", id.display_name()),
        Notification::Dirtied => "Unsaved changes".to_string(),
        Notification::Reordered { kind, from, to, .. } => {
            format!("Moved {} {} to {}", kind, from, to)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::MemoryPreferences;
    use tempfile::TempDir;

    fn session_in(dir: &Path) -> ShelfSession {
        ShelfSession::new(
            EngineConfig::in_dir(dir),
            Box::new(MemoryPreferences::new()),
        )
    }

    #[test]
    fn test_edits_require_active_collection() {
        let dir = TempDir::new().unwrap();
        let mut session = session_in(dir.path());
        assert!(matches!(
            session.add_group(None),
            Err(ShelfError::NoActiveCollection)
        ));
        assert!(!session.pointer_down(DragKind::Group, 0, None));
        assert_eq!(session.pointer_up(DragKind::Group), DropOutcome::Cancelled);
    }

    #[test]
    fn test_add_group_default_name() {
        let dir = TempDir::new().unwrap();
        let mut session = session_in(dir.path());
        session.create_new("Main", None).unwrap();
        let index = session.add_group(None).unwrap();
        assert_eq!(index, 1);
        assert_eq!(session.collection().unwrap().groups()[1].name, DEFAULT_GROUP_NAME);
        assert!(session.is_dirty());
    }

    #[test]
    fn test_status_follows_notifications() {
        let dir = TempDir::new().unwrap();
        let mut session = session_in(dir.path());
        assert_eq!(session.status(), "No shelf loaded");
        session.create_new("Main", None).unwrap();
        assert_eq!(session.status(), "Loaded Main");
        session.add_group(Some("Extra")).unwrap();
        assert_eq!(session.status(), "Unsaved changes");
        session.save().unwrap();
        assert_eq!(session.status(), "Saved Main");
    }

    #[test]
    fn test_status_feed_does_not_accumulate() {
        let dir = TempDir::new().unwrap();
        let mut session = session_in(dir.path());
        for _ in 0..100 {
            session.discover();
        }
        assert!(session.status_feed.drain().is_empty());
        assert_eq!(session.status(), "Found 0 shelves");

        session.create_new("Main", None).unwrap();
        for _ in 0..10 {
            session.add_group(None).unwrap();
            session.move_group_to(0, 2).unwrap();
        }
        assert!(session.status_feed.drain().is_empty());
        assert_eq!(session.status(), "Moved group 0 to 1");
    }

    #[test]
    fn test_poll_status_picks_up_outside_publishes() {
        let dir = TempDir::new().unwrap();
        let mut session = session_in(dir.path());
        session.bus().publish(Notification::Dirtied);
        assert_eq!(session.status(), "No shelf loaded");
        assert_eq!(session.poll_status(), "Unsaved changes");
    }

    #[test]
    fn test_subscription_released_with_session() {
        let dir = TempDir::new().unwrap();
        let session = session_in(dir.path());
        let bus = session.bus().clone();
        assert_eq!(bus.subscriber_count(), 1);
        drop(session);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_edit_item_out_of_range() {
        let dir = TempDir::new().unwrap();
        let mut session = session_in(dir.path());
        session.create_new("Main", None).unwrap();
        let err = session.edit_item(0, 0, |_| {}).unwrap_err();
        assert!(matches!(err, ShelfError::Index(_)));
        assert!(!session.is_dirty());
    }
}
