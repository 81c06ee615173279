//! Render hook boundary.
//!
//! Drawing items is the presentation layer's job. The core only dispatches
//! each item to an [`ItemRenderer`] and hands back what the renderer asked
//! for; a `RemoveRequested` answer is turned into a `remove_item` call by
//! [`crate::session::ShelfSession::render_group`]. Items never remove
//! themselves.
//!
//! [`TextRenderer`] is a plain-text implementation used by the CLI.

use crate::collection::Collection;
use crate::item::{
    AssetLocator, CommandItem, Item, LinkOpener, PathOpener, SceneObjectLocator, SceneOpener,
    Separator, TextNote,
};
use crate::types::SeparatorStyle;

/// What a renderer wants done with the item it just drew
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderResponse {
    #[default]
    Keep,
    RemoveRequested,
}

/// Presentation-side drawing of each item variant
pub trait ItemRenderer {
    fn command(&mut self, item: &CommandItem) -> RenderResponse;
    fn asset_locator(&mut self, item: &AssetLocator) -> RenderResponse;
    fn scene_object_locator(&mut self, item: &SceneObjectLocator) -> RenderResponse;
    fn text_note(&mut self, item: &TextNote) -> RenderResponse;
    fn path_opener(&mut self, item: &PathOpener) -> RenderResponse;
    fn scene_opener(&mut self, item: &SceneOpener) -> RenderResponse;
    fn link_opener(&mut self, item: &LinkOpener) -> RenderResponse;
    fn separator(&mut self, item: &Separator) -> RenderResponse;

    /// Drawn instead of the normal control when a reference is unset
    fn invalid_reference(&mut self, item: &Item, problem: &str) -> RenderResponse;
}

impl Item {
    /// Draw this item through `renderer`
    pub fn render(&self, renderer: &mut dyn ItemRenderer) -> RenderResponse {
        if let Some(validator) = self.reference_validator() {
            if !validator.is_valid() {
                return renderer.invalid_reference(self, &validator.describe_problem());
            }
        }
        match self {
            Self::Command(c) => renderer.command(c),
            Self::AssetLocator(a) => renderer.asset_locator(a),
            Self::SceneObjectLocator(s) => renderer.scene_object_locator(s),
            Self::TextNote(n) => renderer.text_note(n),
            Self::PathOpener(p) => renderer.path_opener(p),
            Self::SceneOpener(s) => renderer.scene_opener(s),
            Self::LinkOpener(l) => renderer.link_opener(l),
            Self::Separator(s) => renderer.separator(s),
        }
    }
}

/// Renders items as indented text lines
#[derive(Debug, Default)]
pub struct TextRenderer {
    lines: Vec<String>,
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    /// Render every group of a collection with a numbered heading
    pub fn render_collection(&mut self, collection: &Collection) {
        for (gi, group) in collection.groups().iter().enumerate() {
            self.lines.push(format!("[{}] {}", gi, group.name));
            if !group.has_item_list() {
                self.lines.push("    ! item list missing".to_string());
                continue;
            }
            for item in group.items() {
                item.render(&mut *self);
            }
        }
    }

    fn line(&mut self, text: String) -> RenderResponse {
        self.lines.push(format!("    {}", text));
        RenderResponse::Keep
    }
}

impl ItemRenderer for TextRenderer {
    fn command(&mut self, item: &CommandItem) -> RenderResponse {
        self.line(format!("> {}  ({})", item.label, item.menu_path))
    }

    fn asset_locator(&mut self, item: &AssetLocator) -> RenderResponse {
        let handle = item.asset.as_ref().map(|h| h.to_string()).unwrap_or_default();
        self.line(format!("{}  [{}] {}", item.label, item.button_label, handle))
    }

    fn scene_object_locator(&mut self, item: &SceneObjectLocator) -> RenderResponse {
        let scene = item.scene.as_ref().map(|h| h.to_string()).unwrap_or_default();
        self.line(format!(
            "{}  [{}] {} in {}",
            item.label, item.button_label, item.object_name, scene
        ))
    }

    fn text_note(&mut self, item: &TextNote) -> RenderResponse {
        let marker = if item.locked { "#" } else { "\"" };
        for text in item.text.lines() {
            self.lines.push(format!("    {} {}", marker, text));
        }
        RenderResponse::Keep
    }

    fn path_opener(&mut self, item: &PathOpener) -> RenderResponse {
        self.line(format!("open {}", item.path.display()))
    }

    fn scene_opener(&mut self, item: &SceneOpener) -> RenderResponse {
        let scene = item.scene.as_ref().map(|h| h.to_string()).unwrap_or_default();
        self.line(format!("{}  [{}] {}", item.label, item.button_label, scene))
    }

    fn link_opener(&mut self, item: &LinkOpener) -> RenderResponse {
        if let Some(problem) = item.format_problem() {
            return self.line(format!("! {}: {}", item.label, problem));
        }
        let target = if item.use_internal_browser {
            "internal"
        } else {
            "browser"
        };
        self.line(format!(
            "{}  [{}] {} ({})",
            item.label, item.button_label, item.url, target
        ))
    }

    fn separator(&mut self, item: &Separator) -> RenderResponse {
        match item.style {
            SeparatorStyle::Line => self.line("----".to_string()),
            SeparatorStyle::TitledBox => self.line(format!("== {} ==", item.title)),
        }
    }

    fn invalid_reference(&mut self, item: &Item, problem: &str) -> RenderResponse {
        self.line(format!("! {} ({})", problem, item.kind()))
    }
}
