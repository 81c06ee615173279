//! Structural and reference validation of a collection.
//!
//! Both checks are read-only and advisory. Structural problems (missing
//! lists, empty or duplicated group names) come back as a
//! [`StructuralReport`]; stale item references come back as a
//! [`ReferenceReport`]. Neither ever modifies the collection.

use crate::collection::Collection;
use crate::item::{AssetHandle, Item};
use crate::types::ItemKind;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// Outcome of [`validate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuralReport {
    pub ok: bool,
    pub message: String,
}

impl StructuralReport {
    fn valid() -> Self {
        Self {
            ok: true,
            message: "Collection is valid".to_string(),
        }
    }
}

impl fmt::Display for StructuralReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Check the structural integrity of a collection.
///
/// Reports, in order: a missing group list, groups with an empty name,
/// duplicated group names (exact match, each listed once), and groups with
/// a missing item list.
pub fn validate(collection: &Collection) -> StructuralReport {
    if !collection.has_group_list() {
        return StructuralReport {
            ok: false,
            message: "Group list is missing".to_string(),
        };
    }

    let mut problems = Vec::new();

    for (index, group) in collection.groups().iter().enumerate() {
        if group.name.trim().is_empty() {
            problems.push(format!("Group {} has an empty name", index));
        }
    }

    let duplicates = duplicate_names(collection);
    if !duplicates.is_empty() {
        problems.push(format!("Duplicate group names: {}", duplicates.join(", ")));
    }

    for group in collection.groups() {
        if !group.has_item_list() {
            problems.push(format!("Group '{}' has no item list", group.name));
        }
    }

    if problems.is_empty() {
        StructuralReport::valid()
    } else {
        StructuralReport {
            ok: false,
            message: problems.join("\n"),
        }
    }
}

/// Names occurring more than once, in first-occurrence order
pub fn duplicate_names(collection: &Collection) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for group in collection.groups() {
        *counts.entry(group.name.as_str()).or_default() += 1;
    }

    let mut seen = Vec::new();
    for group in collection.groups() {
        let name = group.name.as_str();
        if counts.get(name).copied().unwrap_or(0) > 1 && !seen.iter().any(|s: &String| s == name) {
            seen.push(name.to_string());
        }
    }
    seen
}

/// Decides whether a set handle still points at something that exists.
pub trait HandleResolver {
    fn resolves(&self, handle: &AssetHandle) -> bool;
}

/// Treats every set handle as resolvable; only unset handles are reported
#[derive(Debug, Clone, Copy, Default)]
pub struct PresenceOnly;

impl HandleResolver for PresenceOnly {
    fn resolves(&self, _handle: &AssetHandle) -> bool {
        true
    }
}

/// Resolves handles as paths relative to a project directory
#[derive(Debug, Clone)]
pub struct DirectoryResolver {
    pub root: PathBuf,
}

impl DirectoryResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl HandleResolver for DirectoryResolver {
    fn resolves(&self, handle: &AssetHandle) -> bool {
        self.root.join(handle.as_str()).exists()
    }
}

/// One invalid item found by [`check_references`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceProblem {
    pub group_name: String,
    pub item_index: usize,
    pub kind: ItemKind,
    pub item_label: String,
    pub message: String,
}

/// Advisory report of items whose references are unset or stale
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceReport {
    pub invalid_count: usize,
    pub details: Vec<ReferenceProblem>,
}

impl ReferenceReport {
    pub fn is_clean(&self) -> bool {
        self.invalid_count == 0
    }
}

/// Problem message for a single item, if it has the validator capability
/// and fails it
pub fn item_problem(item: &Item, resolver: &dyn HandleResolver) -> Option<String> {
    let validator = item.reference_validator()?;
    if !validator.is_valid() {
        return Some(validator.describe_problem());
    }
    validator
        .handles()
        .into_iter()
        .find(|h| !resolver.resolves(h))
        .map(|h| format!("Reference '{}' no longer resolves", h))
}

/// Run the reference validator of every capable item
pub fn check_references(collection: &Collection, resolver: &dyn HandleResolver) -> ReferenceReport {
    let details: Vec<ReferenceProblem> = collection
        .groups()
        .iter()
        .flat_map(|group| {
            group
                .items()
                .iter()
                .enumerate()
                .filter_map(move |(index, item)| {
                    item_problem(item, resolver).map(|message| ReferenceProblem {
                        group_name: group.name.clone(),
                        item_index: index,
                        kind: item.kind(),
                        item_label: item.label(),
                        message,
                    })
                })
        })
        .collect();

    ReferenceReport {
        invalid_count: details.len(),
        details,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::Group;
    use crate::item::{AssetLocator, SceneOpener};

    fn named(names: &[&str]) -> Collection {
        let mut c = Collection::new();
        for n in names {
            c.add_group(*n).unwrap();
        }
        c
    }

    #[test]
    fn test_valid_collection() {
        let report = validate(&named(&["A", "B"]));
        assert!(report.ok);
        assert_eq!(report.message, "Collection is valid");
    }

    #[test]
    fn test_duplicate_names_reported() {
        let report = validate(&named(&["A", "B", "A"]));
        assert!(!report.ok);
        assert!(report.message.contains("A"));
        assert_eq!(duplicate_names(&named(&["A", "B", "A"])), vec!["A"]);
    }

    #[test]
    fn test_duplicates_are_case_sensitive() {
        assert!(validate(&named(&["Tools", "tools"])).ok);
    }

    #[test]
    fn test_duplicate_listed_once_in_first_order() {
        let c = named(&["B", "A", "B", "A", "B"]);
        assert_eq!(duplicate_names(&c), vec!["B", "A"]);
    }

    #[test]
    fn test_empty_name_reported() {
        let report = validate(&named(&["A", "  "]));
        assert!(!report.ok);
        assert!(report.message.contains("Group 1 has an empty name"));
    }

    #[test]
    fn test_missing_lists_reported() {
        let report = validate(&Collection::without_group_list());
        assert!(!report.ok);
        assert_eq!(report.message, "Group list is missing");

        let c = Collection::from_groups(vec![Group::new("A"), Group::without_item_list("B")]);
        let report = validate(&c);
        assert!(!report.ok);
        assert!(report.message.contains("'B' has no item list"));
    }

    #[test]
    fn test_reference_report_lists_invalid_items() {
        let mut c = named(&["Scenes"]);
        c.add_item(
            0,
            &Item::SceneOpener(SceneOpener {
                label: "Main".to_string(),
                button_label: "Open".to_string(),
                scene: Some(AssetHandle::new("Scenes/Main.scene")),
            }),
        )
        .unwrap();
        c.add_item(
            0,
            &Item::AssetLocator(AssetLocator {
                label: "Lost".to_string(),
                ..Default::default()
            }),
        )
        .unwrap();
        c.add_item(0, &Item::note("notes are never checked")).unwrap();

        let report = check_references(&c, &PresenceOnly);
        assert_eq!(report.invalid_count, 1);
        assert_eq!(report.details[0].group_name, "Scenes");
        assert_eq!(report.details[0].item_index, 1);
        assert_eq!(report.details[0].kind, ItemKind::AssetLocator);
        assert!(report.details[0].message.contains("Lost"));
    }

    #[test]
    fn test_directory_resolver_flags_stale_handles() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("present.asset"), "x").unwrap();

        let mut c = named(&["Assets"]);
        for handle in ["present.asset", "gone.asset"] {
            c.add_item(
                0,
                &Item::AssetLocator(AssetLocator {
                    label: handle.to_string(),
                    button_label: "Ping".to_string(),
                    asset: Some(AssetHandle::new(handle)),
                }),
            )
            .unwrap();
        }

        let report = check_references(&c, &DirectoryResolver::new(dir.path()));
        assert_eq!(report.invalid_count, 1);
        assert!(report.details[0].message.contains("gone.asset"));
        assert!(check_references(&c, &PresenceOnly).is_clean());
    }
}
