//! Ordered group store
//!
//! A `Collection` is an ordered list of named groups, each an ordered list of
//! items. All structural edits go through the methods here; they are
//! index-addressed and synchronous.
//!
//! # Index rules
//!
//! - `remove_*` and `rename_group` report `IndexOutOfRange` for bad indices.
//! - `move_*` take the destination in post-removal index space and are
//!   silent no-ops (returning `false`) for bad or equal indices.
//! - Group name uniqueness is not enforced here; see [`crate::validation`].
//!
//! Group and item lists are optional so that a snapshot with a `null` list
//! survives loading and can be reported. Any mutation that reaches a missing
//! list aborts with an error and leaves the collection untouched.

use crate::item::{AssetHandle, Item};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name given to groups created without an explicit name
pub const DEFAULT_GROUP_NAME: &str = "New Group";

/// Errors raised by direct (non drag-driven) store calls
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// Index outside `[0, len)`
    #[error("{what} index {index} is out of range (count {len})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    /// The collection has no group list at all
    #[error("Collection has no group list")]
    MissingGroupList,

    /// A group has no item list
    #[error("Group '{group}' has no item list")]
    MissingItemList { group: String },
}

/// Top-level settings persisted alongside the groups
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShelfSettings {
    /// Number of log files to keep
    pub log_retention: u32,
    /// Directory screenshots are written to
    pub screenshot_dir: String,
    /// Scene opened when entering online mode
    pub online_start_scene: Option<AssetHandle>,
}

impl Default for ShelfSettings {
    fn default() -> Self {
        Self {
            log_retention: 30,
            screenshot_dir: "Screenshots".to_string(),
            online_start_scene: None,
        }
    }
}

/// A named, ordered container of items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    #[serde(default)]
    items: Option<Vec<Item>>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: Some(Vec::new()),
        }
    }

    /// Builds a group whose item list is absent, as read from a damaged snapshot
    pub fn without_item_list(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: None,
        }
    }

    /// Items in order; empty when the list is absent
    pub fn items(&self) -> &[Item] {
        self.items.as_deref().unwrap_or_default()
    }

    pub fn has_item_list(&self) -> bool {
        self.items.is_some()
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    fn items_mut(&mut self) -> Result<&mut Vec<Item>, ModelError> {
        match self.items.as_mut() {
            Some(items) => Ok(items),
            None => Err(ModelError::MissingItemList {
                group: self.name.clone(),
            }),
        }
    }
}

/// The root aggregate: an ordered sequence of groups plus settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    #[serde(default)]
    pub settings: ShelfSettings,
    #[serde(default)]
    groups: Option<Vec<Group>>,
}

impl Default for Collection {
    fn default() -> Self {
        Self::new()
    }
}

impl Collection {
    /// Create an empty collection with default settings
    pub fn new() -> Self {
        Self {
            settings: ShelfSettings::default(),
            groups: Some(Vec::new()),
        }
    }

    /// Create a collection holding a single empty, default-named group
    pub fn with_default_group() -> Self {
        Self {
            settings: ShelfSettings::default(),
            groups: Some(vec![Group::new(DEFAULT_GROUP_NAME)]),
        }
    }

    pub fn from_groups(groups: Vec<Group>) -> Self {
        Self {
            settings: ShelfSettings::default(),
            groups: Some(groups),
        }
    }

    /// Builds a collection whose group list is absent, as read from a damaged snapshot
    pub fn without_group_list() -> Self {
        Self {
            settings: ShelfSettings::default(),
            groups: None,
        }
    }

    pub fn groups(&self) -> &[Group] {
        self.groups.as_deref().unwrap_or_default()
    }

    pub fn has_group_list(&self) -> bool {
        self.groups.is_some()
    }

    pub fn group_count(&self) -> usize {
        self.groups().len()
    }

    pub fn group(&self, index: usize) -> Option<&Group> {
        self.groups().get(index)
    }

    /// Item count of a group, if the group exists
    pub fn item_count(&self, group: usize) -> Option<usize> {
        self.group(group).map(Group::len)
    }

    fn groups_mut(&mut self) -> Result<&mut Vec<Group>, ModelError> {
        self.groups.as_mut().ok_or(ModelError::MissingGroupList)
    }

    fn group_mut(&mut self, index: usize) -> Result<&mut Group, ModelError> {
        let groups = self.groups_mut()?;
        let len = groups.len();
        groups.get_mut(index).ok_or(ModelError::IndexOutOfRange {
            what: "Group",
            index,
            len,
        })
    }

    /// Append a new empty group and return its index
    pub fn add_group(&mut self, name: impl Into<String>) -> Result<usize, ModelError> {
        let groups = self.groups_mut()?;
        groups.push(Group::new(name));
        Ok(groups.len() - 1)
    }

    /// Remove a group together with all of its items
    pub fn remove_group(&mut self, index: usize) -> Result<Group, ModelError> {
        let groups = self.groups_mut()?;
        if index >= groups.len() {
            return Err(ModelError::IndexOutOfRange {
                what: "Group",
                index,
                len: groups.len(),
            });
        }
        Ok(groups.remove(index))
    }

    pub fn rename_group(&mut self, index: usize, name: impl Into<String>) -> Result<(), ModelError> {
        self.group_mut(index)?.name = name.into();
        Ok(())
    }

    /// Move a group; `to` is already expressed in post-removal index space.
    ///
    /// Returns false (and changes nothing) for out-of-range or equal indices.
    pub fn move_group(&mut self, from: usize, to: usize) -> bool {
        match self.groups.as_mut() {
            Some(groups) => move_within(groups, from, to),
            None => false,
        }
    }

    /// Append a copy of `template` to a group and return the new item's index
    pub fn add_item(&mut self, group: usize, template: &Item) -> Result<usize, ModelError> {
        let items = self.group_mut(group)?.items_mut()?;
        items.push(template.clone());
        Ok(items.len() - 1)
    }

    pub fn remove_item(&mut self, group: usize, index: usize) -> Result<Item, ModelError> {
        let items = self.group_mut(group)?.items_mut()?;
        if index >= items.len() {
            return Err(ModelError::IndexOutOfRange {
                what: "Item",
                index,
                len: items.len(),
            });
        }
        Ok(items.remove(index))
    }

    /// Move an item within one group; same contract as [`Collection::move_group`]
    pub fn move_item(&mut self, group: usize, from: usize, to: usize) -> bool {
        match self.group_mut(group).and_then(Group::items_mut) {
            Ok(items) => move_within(items, from, to),
            Err(_) => false,
        }
    }

    /// Mutable access to one item for in-place edits
    pub fn item_mut(&mut self, group: usize, index: usize) -> Result<&mut Item, ModelError> {
        let items = self.group_mut(group)?.items_mut()?;
        let len = items.len();
        items.get_mut(index).ok_or(ModelError::IndexOutOfRange {
            what: "Item",
            index,
            len,
        })
    }
}

fn move_within<T>(list: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from == to || from >= list.len() || to >= list.len() {
        return false;
    }
    let element = list.remove(from);
    list.insert(to, element);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(collection: &Collection) -> Vec<&str> {
        collection.groups().iter().map(|g| g.name.as_str()).collect()
    }

    fn labels(collection: &Collection, group: usize) -> Vec<String> {
        collection.groups()[group]
            .items()
            .iter()
            .map(Item::label)
            .collect()
    }

    fn abcd() -> Collection {
        let mut c = Collection::new();
        let g = c.add_group("Tools").unwrap();
        for label in ["A", "B", "C", "D"] {
            c.add_item(g, &Item::command(label, "Menu/Item")).unwrap();
        }
        c
    }

    #[test]
    fn test_new_collection_is_empty() {
        let c = Collection::new();
        assert_eq!(c.group_count(), 0);
        assert!(c.has_group_list());
        assert_eq!(c.settings, ShelfSettings::default());
    }

    #[test]
    fn test_with_default_group() {
        let c = Collection::with_default_group();
        assert_eq!(names(&c), vec![DEFAULT_GROUP_NAME]);
        assert!(c.groups()[0].is_empty());
    }

    #[test]
    fn test_add_and_remove_groups() {
        let mut c = Collection::new();
        assert_eq!(c.add_group("A").unwrap(), 0);
        assert_eq!(c.add_group("B").unwrap(), 1);
        assert_eq!(c.add_group("C").unwrap(), 2);

        let removed = c.remove_group(1).unwrap();
        assert_eq!(removed.name, "B");
        assert_eq!(names(&c), vec!["A", "C"]);
    }

    #[test]
    fn test_remove_group_out_of_range() {
        let mut c = Collection::new();
        c.add_group("A").unwrap();
        let err = c.remove_group(1).unwrap_err();
        assert_eq!(
            err,
            ModelError::IndexOutOfRange {
                what: "Group",
                index: 1,
                len: 1
            }
        );
        assert_eq!(c.group_count(), 1);
    }

    #[test]
    fn test_duplicate_names_are_accepted_at_insert() {
        let mut c = Collection::new();
        c.add_group("A").unwrap();
        c.add_group("A").unwrap();
        assert_eq!(c.group_count(), 2);
    }

    #[test]
    fn test_rename_group() {
        let mut c = Collection::new();
        c.add_group("Old").unwrap();
        c.rename_group(0, "New").unwrap();
        assert_eq!(names(&c), vec!["New"]);
        assert!(c.rename_group(3, "X").is_err());
    }

    #[test]
    fn test_move_group_post_removal_index() {
        let mut c = Collection::new();
        for n in ["A", "B", "C", "D"] {
            c.add_group(n).unwrap();
        }
        assert!(c.move_group(0, 2));
        assert_eq!(names(&c), vec!["B", "C", "A", "D"]);
        assert!(c.move_group(3, 0));
        assert_eq!(names(&c), vec!["D", "B", "C", "A"]);
    }

    #[test]
    fn test_move_group_out_of_range_is_noop() {
        let mut c = Collection::new();
        c.add_group("A").unwrap();
        c.add_group("B").unwrap();
        assert!(!c.move_group(0, 2));
        assert!(!c.move_group(5, 0));
        assert_eq!(names(&c), vec!["A", "B"]);
    }

    #[test]
    fn test_move_item_equal_indices_is_noop() {
        let mut c = abcd();
        assert!(!c.move_item(0, 2, 2));
        assert_eq!(labels(&c, 0), vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_move_item_within_group() {
        let mut c = abcd();
        assert!(c.move_item(0, 0, 2));
        assert_eq!(labels(&c, 0), vec!["B", "C", "A", "D"]);
        assert!(!c.move_item(1, 0, 1), "missing group is a no-op");
    }

    #[test]
    fn test_add_item_copies_template() {
        let mut c = Collection::new();
        let g = c.add_group("G").unwrap();
        let mut template = Item::command("Build", "File/Build");
        c.add_item(g, &template).unwrap();

        if let Item::Command(cmd) = &mut template {
            cmd.label = "Changed".to_string();
        }
        assert_eq!(labels(&c, 0), vec!["Build"]);
    }

    #[test]
    fn test_remove_item() {
        let mut c = abcd();
        let removed = c.remove_item(0, 1).unwrap();
        assert_eq!(removed.label(), "B");
        assert_eq!(labels(&c, 0), vec!["A", "C", "D"]);
        assert!(matches!(
            c.remove_item(0, 3),
            Err(ModelError::IndexOutOfRange { what: "Item", .. })
        ));
        assert!(c.remove_item(4, 0).is_err());
    }

    #[test]
    fn test_removing_group_drops_its_items() {
        let mut c = abcd();
        let removed = c.remove_group(0).unwrap();
        assert_eq!(removed.len(), 4);
        assert_eq!(c.group_count(), 0);
    }

    #[test]
    fn test_missing_item_list_aborts_mutation() {
        let mut c = Collection::from_groups(vec![Group::without_item_list("Broken")]);
        let before = c.clone();

        let err = c.add_item(0, &Item::note("x")).unwrap_err();
        assert_eq!(
            err,
            ModelError::MissingItemList {
                group: "Broken".to_string()
            }
        );
        assert!(!c.move_item(0, 0, 1));
        assert_eq!(c, before);
    }

    #[test]
    fn test_missing_group_list_aborts_mutation() {
        let mut c = Collection::without_group_list();
        assert_eq!(c.add_group("A"), Err(ModelError::MissingGroupList));
        assert!(!c.move_group(0, 1));
        assert_eq!(c.group_count(), 0);
    }

    #[test]
    fn test_item_mut_edits_in_place() {
        let mut c = abcd();
        if let Item::Command(cmd) = c.item_mut(0, 3).unwrap() {
            cmd.menu_path = "Window/General".to_string();
        }
        match &c.groups()[0].items()[3] {
            Item::Command(cmd) => assert_eq!(cmd.menu_path, "Window/General"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
