//! Toolshelf library
//!
//! Core of a configurable shortcut panel: groups of heterogeneous items
//! (commands, locators, notes, openers, separators) persisted as JSON
//! snapshots, with drag-to-reorder, validation and change notification.

pub mod cli;
pub mod collection;
pub mod config;
pub mod config_store;
pub mod error;
pub mod item;
pub mod notify;
pub mod preferences;
pub mod render;
pub mod reorder;
pub mod session;
pub mod snapshot;
pub mod types;
pub mod validation;

// Re-export main types for convenience
pub use collection::{Collection, Group, ModelError, ShelfSettings, DEFAULT_GROUP_NAME};
pub use config::EngineConfig;
pub use config_store::{ConfigStore, Discovery, LoadOutcome, Mutation};
pub use error::{Result, ShelfError};
pub use item::{AssetHandle, Item, ReferenceValidator};
pub use notify::{Notification, NotificationBus, Subscription};
pub use preferences::{FilePreferences, MemoryPreferences, Preferences};
pub use render::{ItemRenderer, RenderResponse, TextRenderer};
pub use reorder::{DragEngine, DragKind, DragState, DropOutcome, Point, Rect, Slot};
pub use session::ShelfSession;
pub use snapshot::{SnapshotError, SnapshotId};
pub use types::{ItemKind, SeparatorStyle};
pub use validation::{HandleResolver, ReferenceReport, StructuralReport};
