//! Shelf items: the polymorphic action descriptors held by each group.
//!
//! `Item` is a closed sum type with one variant per action kind. Snapshots
//! carry an explicit `"type"` tag naming the variant, followed by that
//! variant's fields.
//!
//! Cloning an item is a plain value copy. External resources (assets,
//! scenes) are referenced by an immutable [`AssetHandle`] identifier, so a
//! clone never shares mutable state with its source.

use crate::types::{ItemKind, SeparatorStyle};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Opaque identifier of an externally held resource (asset or scene).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetHandle(String);

impl AssetHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Capability of items whose external handles may stop resolving.
///
/// Checked once per load to build an advisory report; never mutates the item.
pub trait ReferenceValidator {
    /// Returns true if every required handle is set
    fn is_valid(&self) -> bool;

    /// Explains why the item is invalid, for display next to the item
    fn describe_problem(&self) -> String;

    /// Handles currently set on the item
    fn handles(&self) -> Vec<&AssetHandle>;
}

/// Runs an editor menu command by its menu path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandItem {
    pub label: String,
    pub menu_path: String,
}

/// Selects and pings an asset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetLocator {
    pub label: String,
    pub button_label: String,
    pub asset: Option<AssetHandle>,
}

/// Selects a named object inside a scene
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneObjectLocator {
    pub label: String,
    pub button_label: String,
    pub object_name: String,
    pub scene: Option<AssetHandle>,
}

/// Free-form note; `locked` notes are read-only in the editor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextNote {
    pub text: String,
    pub locked: bool,
}

/// Opens a folder or file with the system handler
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathOpener {
    pub path: PathBuf,
}

/// Opens a scene
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneOpener {
    pub label: String,
    pub button_label: String,
    pub scene: Option<AssetHandle>,
}

/// Opens a URL, either in the system browser or an embedded one
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkOpener {
    pub label: String,
    pub button_label: String,
    pub url: String,
    pub use_internal_browser: bool,
}

/// Visual divider between items
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Separator {
    pub title: String,
    pub style: SeparatorStyle,
}

/// One action descriptor on a shelf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Item {
    Command(CommandItem),
    AssetLocator(AssetLocator),
    SceneObjectLocator(SceneObjectLocator),
    TextNote(TextNote),
    PathOpener(PathOpener),
    SceneOpener(SceneOpener),
    LinkOpener(LinkOpener),
    Separator(Separator),
}

impl Item {
    pub fn command(label: impl Into<String>, menu_path: impl Into<String>) -> Self {
        Self::Command(CommandItem {
            label: label.into(),
            menu_path: menu_path.into(),
        })
    }

    pub fn note(text: impl Into<String>) -> Self {
        Self::TextNote(TextNote {
            text: text.into(),
            locked: false,
        })
    }

    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::PathOpener(PathOpener { path: path.into() })
    }

    pub fn link(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self::LinkOpener(LinkOpener {
            label: label.into(),
            button_label: "Open".to_string(),
            url: url.into(),
            use_internal_browser: false,
        })
    }

    pub fn separator(title: impl Into<String>, style: SeparatorStyle) -> Self {
        Self::Separator(Separator {
            title: title.into(),
            style,
        })
    }

    /// Empty template for a kind, as offered by the "add item" form
    pub fn template(kind: ItemKind) -> Self {
        match kind {
            ItemKind::Command => Self::Command(CommandItem::default()),
            ItemKind::AssetLocator => Self::AssetLocator(AssetLocator::default()),
            ItemKind::SceneObjectLocator => {
                Self::SceneObjectLocator(SceneObjectLocator::default())
            }
            ItemKind::TextNote => Self::TextNote(TextNote::default()),
            ItemKind::PathOpener => Self::PathOpener(PathOpener::default()),
            ItemKind::SceneOpener => Self::SceneOpener(SceneOpener::default()),
            ItemKind::LinkOpener => Self::LinkOpener(LinkOpener::default()),
            ItemKind::Separator => Self::Separator(Separator::default()),
        }
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            Self::Command(_) => ItemKind::Command,
            Self::AssetLocator(_) => ItemKind::AssetLocator,
            Self::SceneObjectLocator(_) => ItemKind::SceneObjectLocator,
            Self::TextNote(_) => ItemKind::TextNote,
            Self::PathOpener(_) => ItemKind::PathOpener,
            Self::SceneOpener(_) => ItemKind::SceneOpener,
            Self::LinkOpener(_) => ItemKind::LinkOpener,
            Self::Separator(_) => ItemKind::Separator,
        }
    }

    /// Short title shown in lists and reports
    pub fn label(&self) -> String {
        match self {
            Self::Command(c) => c.label.clone(),
            Self::AssetLocator(a) => a.label.clone(),
            Self::SceneObjectLocator(s) => s.label.clone(),
            Self::TextNote(n) => n.text.lines().next().unwrap_or_default().to_string(),
            Self::PathOpener(p) => p.path.display().to_string(),
            Self::SceneOpener(s) => s.label.clone(),
            Self::LinkOpener(l) => l.label.clone(),
            Self::Separator(s) => s.title.clone(),
        }
    }

    /// The reference validation capability, for variants that have one
    pub fn reference_validator(&self) -> Option<&dyn ReferenceValidator> {
        match self {
            Self::AssetLocator(a) => Some(a),
            Self::SceneObjectLocator(s) => Some(s),
            Self::SceneOpener(s) => Some(s),
            _ => None,
        }
    }
}

impl ReferenceValidator for AssetLocator {
    fn is_valid(&self) -> bool {
        self.asset.is_some()
    }

    fn describe_problem(&self) -> String {
        if self.asset.is_none() {
            format!("Asset for '{}' is missing", self.label)
        } else {
            String::new()
        }
    }

    fn handles(&self) -> Vec<&AssetHandle> {
        self.asset.iter().collect()
    }
}

impl ReferenceValidator for SceneObjectLocator {
    fn is_valid(&self) -> bool {
        self.scene.is_some() && !self.object_name.is_empty()
    }

    fn describe_problem(&self) -> String {
        match (self.scene.is_some(), self.object_name.is_empty()) {
            (false, true) => format!("Scene and object name for '{}' are missing", self.label),
            (false, false) => format!("Scene for '{}' is missing", self.label),
            (true, true) => format!("Object name for '{}' is empty", self.label),
            (true, false) => String::new(),
        }
    }

    fn handles(&self) -> Vec<&AssetHandle> {
        self.scene.iter().collect()
    }
}

impl ReferenceValidator for SceneOpener {
    fn is_valid(&self) -> bool {
        self.scene.is_some()
    }

    fn describe_problem(&self) -> String {
        if self.scene.is_none() {
            format!("Scene for '{}' is missing", self.label)
        } else {
            String::new()
        }
    }

    fn handles(&self) -> Vec<&AssetHandle> {
        self.scene.iter().collect()
    }
}

impl LinkOpener {
    /// Checks the URL shape (scheme and host); existence is never checked.
    pub fn format_problem(&self) -> Option<String> {
        let url = self.url.trim();
        if url.is_empty() {
            return Some("URL is empty".to_string());
        }
        let rest = url
            .strip_prefix("https://")
            .or_else(|| url.strip_prefix("http://"));
        match rest {
            None => Some(format!("URL '{}' must start with http:// or https://", url)),
            Some(rest) => {
                let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
                if host.is_empty() || host.contains(char::is_whitespace) {
                    Some(format!("URL '{}' has no valid host", url))
                } else {
                    None
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_template_matches_kind() {
        for kind in ItemKind::iter() {
            assert_eq!(Item::template(kind).kind(), kind);
        }
    }

    #[test]
    fn test_validator_present_only_for_handle_kinds() {
        for kind in ItemKind::iter() {
            let item = Item::template(kind);
            assert_eq!(
                item.reference_validator().is_some(),
                kind.has_reference_validator(),
                "{:?}",
                kind
            );
        }
    }

    #[test]
    fn test_asset_locator_requires_handle() {
        let mut locator = AssetLocator {
            label: "Player prefab".to_string(),
            button_label: "Ping".to_string(),
            asset: None,
        };
        assert!(!locator.is_valid());
        assert!(locator.describe_problem().contains("Player prefab"));

        locator.asset = Some(AssetHandle::new("guid-1"));
        assert!(locator.is_valid());
        assert!(locator.describe_problem().is_empty());
        assert_eq!(locator.handles(), vec![&AssetHandle::new("guid-1")]);
    }

    #[test]
    fn test_scene_object_locator_needs_scene_and_name() {
        let mut locator = SceneObjectLocator {
            label: "Spawn".to_string(),
            scene: Some(AssetHandle::new("scene-1")),
            ..Default::default()
        };
        assert!(!locator.is_valid());
        assert!(locator.describe_problem().contains("Object name"));

        locator.object_name = "SpawnPoint".to_string();
        assert!(locator.is_valid());

        locator.scene = None;
        assert!(!locator.is_valid());
        assert!(locator.describe_problem().contains("Scene"));
    }

    #[test]
    fn test_clone_does_not_share_state() {
        let original = Item::SceneOpener(SceneOpener {
            label: "Main".to_string(),
            button_label: "Open".to_string(),
            scene: Some(AssetHandle::new("scene-main")),
        });
        let mut copy = original.clone();
        if let Item::SceneOpener(s) = &mut copy {
            s.label.push_str(" (copy)");
            s.scene = None;
        }
        match &original {
            Item::SceneOpener(s) => {
                assert_eq!(s.label, "Main");
                assert_eq!(s.scene, Some(AssetHandle::new("scene-main")));
            }
            other => panic!("unexpected variant {:?}", other),
        }
    }

    #[test]
    fn test_link_format_problem() {
        let mut link = LinkOpener {
            url: "https://docs.example.com/manual".to_string(),
            ..Default::default()
        };
        assert!(link.format_problem().is_none());

        link.url = "ftp://example.com".to_string();
        assert!(link.format_problem().is_some());

        link.url = "https://".to_string();
        assert!(link.format_problem().is_some());

        link.url = "   ".to_string();
        assert_eq!(link.format_problem().as_deref(), Some("URL is empty"));
    }

    #[test]
    fn test_label_for_note_is_first_line() {
        let note = Item::note("Remember\nto bake lighting");
        assert_eq!(note.label(), "Remember");
        assert_eq!(Item::note("").label(), "");
    }

    #[test]
    fn test_serialized_tag_is_variant_name() {
        let json = serde_json::to_value(Item::command("Build", "File/Build")).unwrap();
        assert_eq!(json["type"], "Command");
        assert_eq!(json["menu_path"], "File/Build");
    }
}
