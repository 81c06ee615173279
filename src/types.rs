//! Type-safe enums shared across the shelf model
//!
//! These replace stringly-typed tags in snapshots and on the command line
//! with enums that serialize to stable, lowercase-free identifiers.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// How a separator item is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
pub enum SeparatorStyle {
    /// A plain horizontal rule
    #[default]
    #[strum(serialize = "Line")]
    Line,
    /// A titled box framing the items that follow
    #[strum(serialize = "TitledBox")]
    TitledBox,
}

/// Tag naming each item variant.
///
/// The string form is the `type` tag written into snapshot files, so it must
/// never change once shipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
pub enum ItemKind {
    #[strum(serialize = "Command")]
    Command,
    #[strum(serialize = "AssetLocator")]
    AssetLocator,
    #[strum(serialize = "SceneObjectLocator")]
    SceneObjectLocator,
    #[strum(serialize = "TextNote")]
    TextNote,
    #[strum(serialize = "PathOpener")]
    PathOpener,
    #[strum(serialize = "SceneOpener")]
    SceneOpener,
    #[strum(serialize = "LinkOpener")]
    LinkOpener,
    #[strum(serialize = "Separator")]
    Separator,
}

impl ItemKind {
    /// Returns true if items of this kind hold external handles that can go stale
    pub const fn has_reference_validator(self) -> bool {
        matches!(
            self,
            Self::AssetLocator | Self::SceneObjectLocator | Self::SceneOpener
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_item_kind_string_roundtrip() {
        for kind in ItemKind::iter() {
            let s = kind.to_string();
            assert_eq!(ItemKind::from_str(&s).unwrap(), kind);
        }
    }

    #[test]
    fn test_only_handle_variants_validate_references() {
        let with_validator: Vec<_> = ItemKind::iter()
            .filter(|k| k.has_reference_validator())
            .collect();
        assert_eq!(
            with_validator,
            vec![
                ItemKind::AssetLocator,
                ItemKind::SceneObjectLocator,
                ItemKind::SceneOpener
            ]
        );
    }

    #[test]
    fn test_separator_style_default_is_line() {
        assert_eq!(SeparatorStyle::default(), SeparatorStyle::Line);
        assert_eq!(SeparatorStyle::TitledBox.to_string(), "TitledBox");
    }
}
