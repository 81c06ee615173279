//! Drag-and-drop reorder engine
//!
//! Converts pointer events into index-accurate moves on a [`Collection`].
//! One [`DragEngine`] exists per draggable kind (groups, items); each is a
//! small state machine:
//!
//! ```text
//! Idle ──pointer_down──▶ Armed(source)
//!                          │ pointer_move over a slot
//!                          ▼
//!                 Tracking(source, target) ◀─┐ pointer_move
//!                          │                 │
//!                          ├─────────────────┘
//!                          │ pointer_up
//!                          ▼
//!               Commit (move) | Cancel ──▶ Idle
//!
//! (reset() returns to Idle from any state without committing)
//! ```
//!
//! # Index spaces
//!
//! While tracking, the target is an insertion index in the *pre-removal*
//! ordering: hovering the upper half of slot `i` targets `i`, the lower half
//! targets `i + 1`. The store's move primitives expect a *post-removal*
//! index, so a target after the source is shifted down by one before the
//! move is applied (see [`final_index`]).
//!
//! The engine keeps only transient indices between events and re-reads the
//! collection at commit time. A stale index turns the commit into a no-op.

use crate::collection::Collection;
use strum::{Display, EnumIter, EnumString};
use tracing::debug;

/// What is being dragged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum DragKind {
    #[strum(serialize = "group")]
    Group,
    #[strum(serialize = "item")]
    Item,
}

/// Pointer position in presentation coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned bounding region; `y` grows downwards
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.x + self.width && p.y >= self.y && p.y < self.y + self.height
    }

    fn in_upper_half(&self, p: Point) -> bool {
        p.y < self.y + self.height / 2.0
    }
}

/// A drop candidate as laid out by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slot {
    /// Index of the candidate in its list
    pub index: usize,
    /// Group owning the candidate; `None` for group slots
    pub group: Option<usize>,
    pub rect: Rect,
}

impl Slot {
    pub const fn group(index: usize, rect: Rect) -> Self {
        Self {
            index,
            group: None,
            rect,
        }
    }

    pub const fn item(group: usize, index: usize, rect: Rect) -> Self {
        Self {
            index,
            group: Some(group),
            rect,
        }
    }
}

/// Drag session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Armed {
        source: usize,
    },
    Tracking {
        source: usize,
        target: usize,
    },
}

impl DragState {
    pub const fn is_idle(self) -> bool {
        matches!(self, Self::Idle)
    }

    pub const fn source(self) -> Option<usize> {
        match self {
            Self::Idle => None,
            Self::Armed { source } | Self::Tracking { source, .. } => Some(source),
        }
    }

    pub const fn target(self) -> Option<usize> {
        match self {
            Self::Tracking { target, .. } => Some(target),
            _ => None,
        }
    }
}

/// Result of releasing the pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// The element moved from `from` to the post-removal index `to`
    Moved { from: usize, to: usize },
    /// A commit was attempted but resolved to no change (same slot or stale indices)
    Unchanged,
    /// No valid target, or no session was active
    Cancelled,
}

impl DropOutcome {
    pub const fn moved(self) -> bool {
        matches!(self, Self::Moved { .. })
    }
}

/// Corrected destination for a drop, in post-removal index space.
///
/// Returns `None` when nothing should move: equal indices or an empty list.
/// The result is clamped to `[0, count - 1]`.
pub fn final_index(source: usize, tentative: usize, count: usize) -> Option<usize> {
    if source == tentative || count == 0 {
        return None;
    }
    let corrected = if source < tentative {
        tentative - 1
    } else {
        tentative
    };
    Some(corrected.min(count - 1))
}

/// Reorder state machine for one draggable kind.
#[derive(Debug, Clone)]
pub struct DragEngine {
    kind: DragKind,
    state: DragState,
    /// Group captured when an item drag is armed
    group: Option<usize>,
}

impl DragEngine {
    pub fn new(kind: DragKind) -> Self {
        Self {
            kind,
            state: DragState::Idle,
            group: None,
        }
    }

    #[inline]
    pub fn kind(&self) -> DragKind {
        self.kind
    }

    #[inline]
    pub fn state(&self) -> DragState {
        self.state
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        !self.state.is_idle()
    }

    /// Group an item drag is scoped to
    #[inline]
    pub fn captured_group(&self) -> Option<usize> {
        self.group
    }

    /// Arm a session on `source`.
    ///
    /// Item drags must name their group. Ignored (returns false) if a
    /// session of this kind is already running.
    pub fn pointer_down(&mut self, source: usize, group: Option<usize>) -> bool {
        if !self.state.is_idle() {
            return false;
        }
        let group = match self.kind {
            DragKind::Group => None,
            DragKind::Item => match group {
                Some(g) => Some(g),
                None => return false,
            },
        };
        self.group = group;
        self.state = DragState::Armed { source };
        debug!(kind = %self.kind, source, ?group, "drag armed");
        true
    }

    /// Update the tentative target from the pointer position.
    ///
    /// Slots belonging to another group than the captured one are ignored.
    /// If the pointer is over no slot the previous target is kept. Returns
    /// the current tentative target.
    pub fn pointer_move(&mut self, pointer: Point, slots: &[Slot]) -> Option<usize> {
        let source = self.state.source()?;

        for slot in slots {
            if slot.group != self.group || !slot.rect.contains(pointer) {
                continue;
            }
            let target = if slot.rect.in_upper_half(pointer) {
                slot.index
            } else {
                slot.index + 1
            };
            self.state = DragState::Tracking { source, target };
        }

        self.state.target()
    }

    /// Release the pointer: commit the move if a target is set, then return to Idle.
    pub fn pointer_up(&mut self, collection: &mut Collection) -> DropOutcome {
        let state = self.state;
        let group = self.group;
        self.reset();

        let DragState::Tracking { source, target } = state else {
            debug!(kind = %self.kind, "drag cancelled: no target");
            return DropOutcome::Cancelled;
        };
        if source == target {
            debug!(kind = %self.kind, source, "drag cancelled: dropped on itself");
            return DropOutcome::Cancelled;
        }

        let count = match (self.kind, group) {
            (DragKind::Group, _) => Some(collection.group_count()),
            (DragKind::Item, Some(g)) => collection.item_count(g),
            (DragKind::Item, None) => None,
        };
        let Some(to) = count.and_then(|count| final_index(source, target, count)) else {
            return DropOutcome::Unchanged;
        };

        let moved = match (self.kind, group) {
            (DragKind::Group, _) => collection.move_group(source, to),
            (DragKind::Item, Some(g)) => collection.move_item(g, source, to),
            (DragKind::Item, None) => false,
        };

        if moved {
            debug!(kind = %self.kind, from = source, to, ?group, "drag committed");
            DropOutcome::Moved { from: source, to }
        } else {
            debug!(kind = %self.kind, from = source, to, ?group, "drag resolved to no change");
            DropOutcome::Unchanged
        }
    }

    /// Abandon any session without committing
    pub fn reset(&mut self) {
        self.state = DragState::Idle;
        self.group = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Item;

    const ROW: f32 = 20.0;

    fn rows(count: usize, group: Option<usize>) -> Vec<Slot> {
        (0..count)
            .map(|i| Slot {
                index: i,
                group,
                rect: Rect::new(0.0, i as f32 * ROW, 100.0, ROW),
            })
            .collect()
    }

    fn upper(index: usize) -> Point {
        Point::new(10.0, index as f32 * ROW + 2.0)
    }

    fn lower(index: usize) -> Point {
        Point::new(10.0, index as f32 * ROW + ROW - 2.0)
    }

    fn groups(names: &[&str]) -> Collection {
        let mut c = Collection::new();
        for n in names {
            c.add_group(*n).unwrap();
        }
        c
    }

    fn group_names(c: &Collection) -> Vec<&str> {
        c.groups().iter().map(|g| g.name.as_str()).collect()
    }

    #[test]
    fn test_final_index_correction() {
        assert_eq!(final_index(0, 3, 4), Some(2));
        assert_eq!(final_index(3, 0, 4), Some(0));
        assert_eq!(final_index(1, 4, 4), Some(3));
        assert_eq!(final_index(2, 2, 4), None);
        assert_eq!(final_index(0, 9, 4), Some(3));
        assert_eq!(final_index(0, 1, 0), None);
    }

    #[test]
    fn test_state_transitions() {
        let mut engine = DragEngine::new(DragKind::Group);
        assert_eq!(engine.state(), DragState::Idle);

        assert!(engine.pointer_down(1, None));
        assert_eq!(engine.state(), DragState::Armed { source: 1 });

        assert_eq!(engine.pointer_move(lower(2), &rows(4, None)), Some(3));
        assert_eq!(
            engine.state(),
            DragState::Tracking {
                source: 1,
                target: 3
            }
        );
    }

    #[test]
    fn test_second_pointer_down_ignored_while_active() {
        let mut engine = DragEngine::new(DragKind::Group);
        assert!(engine.pointer_down(0, None));
        assert!(!engine.pointer_down(2, None));
        assert_eq!(engine.state().source(), Some(0));
    }

    #[test]
    fn test_item_drag_requires_group() {
        let mut engine = DragEngine::new(DragKind::Item);
        assert!(!engine.pointer_down(0, None));
        assert!(engine.state().is_idle());
        assert!(engine.pointer_down(0, Some(2)));
        assert_eq!(engine.captured_group(), Some(2));
    }

    #[test]
    fn test_move_while_idle_is_ignored() {
        let mut engine = DragEngine::new(DragKind::Group);
        assert_eq!(engine.pointer_move(upper(0), &rows(3, None)), None);
        assert!(engine.state().is_idle());
    }

    #[test]
    fn test_pointer_outside_slots_keeps_target() {
        let mut engine = DragEngine::new(DragKind::Group);
        engine.pointer_down(0, None);
        engine.pointer_move(lower(1), &rows(3, None));
        let outside = Point::new(500.0, 500.0);
        assert_eq!(engine.pointer_move(outside, &rows(3, None)), Some(2));
    }

    #[test]
    fn test_drag_first_to_after_third() {
        let mut c = groups(&["A", "B", "C", "D"]);
        let mut engine = DragEngine::new(DragKind::Group);
        engine.pointer_down(0, None);
        engine.pointer_move(upper(3), &rows(4, None));
        assert_eq!(engine.pointer_up(&mut c), DropOutcome::Moved { from: 0, to: 2 });
        assert_eq!(group_names(&c), vec!["B", "C", "A", "D"]);
        assert!(engine.state().is_idle());
    }

    #[test]
    fn test_drag_last_to_front() {
        let mut c = groups(&["A", "B", "C", "D"]);
        let mut engine = DragEngine::new(DragKind::Group);
        engine.pointer_down(3, None);
        engine.pointer_move(upper(0), &rows(4, None));
        assert_eq!(engine.pointer_up(&mut c), DropOutcome::Moved { from: 3, to: 0 });
        assert_eq!(group_names(&c), vec!["D", "A", "B", "C"]);
    }

    #[test]
    fn test_drop_below_self_is_unchanged() {
        let mut c = groups(&["A", "B", "C"]);
        let mut engine = DragEngine::new(DragKind::Group);
        engine.pointer_down(1, None);
        engine.pointer_move(lower(1), &rows(3, None));
        assert_eq!(engine.pointer_up(&mut c), DropOutcome::Unchanged);
        assert_eq!(group_names(&c), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_release_without_target_cancels() {
        let mut c = groups(&["A", "B"]);
        let mut engine = DragEngine::new(DragKind::Group);
        engine.pointer_down(0, None);
        assert_eq!(engine.pointer_up(&mut c), DropOutcome::Cancelled);
        assert_eq!(group_names(&c), vec!["A", "B"]);
        assert_eq!(engine.pointer_up(&mut c), DropOutcome::Cancelled);
    }

    #[test]
    fn test_reset_discards_session() {
        let mut c = groups(&["A", "B", "C"]);
        let mut engine = DragEngine::new(DragKind::Group);
        engine.pointer_down(0, None);
        engine.pointer_move(lower(2), &rows(3, None));
        engine.reset();
        assert!(engine.state().is_idle());
        assert_eq!(engine.pointer_up(&mut c), DropOutcome::Cancelled);
        assert_eq!(group_names(&c), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_stale_source_is_noop() {
        let mut c = groups(&["A", "B", "C", "D"]);
        let mut engine = DragEngine::new(DragKind::Group);
        engine.pointer_down(3, None);
        engine.pointer_move(upper(0), &rows(4, None));

        c.remove_group(3).unwrap();
        c.remove_group(2).unwrap();

        assert_eq!(engine.pointer_up(&mut c), DropOutcome::Unchanged);
        assert_eq!(group_names(&c), vec!["A", "B"]);
    }

    #[test]
    fn test_item_drag_ignores_other_groups() {
        let mut c = groups(&["G0", "G1"]);
        for label in ["A", "B", "C"] {
            c.add_item(0, &Item::command(label, "M")).unwrap();
            c.add_item(1, &Item::command(label, "M")).unwrap();
        }

        let mut engine = DragEngine::new(DragKind::Item);
        engine.pointer_down(0, Some(0));

        // Same geometry, but the slots belong to group 1
        assert_eq!(engine.pointer_move(lower(2), &rows(3, Some(1))), None);
        assert_eq!(engine.pointer_up(&mut c), DropOutcome::Cancelled);

        engine.pointer_down(0, Some(0));
        engine.pointer_move(lower(2), &rows(3, Some(0)));
        assert_eq!(engine.pointer_up(&mut c), DropOutcome::Moved { from: 0, to: 2 });

        let g0: Vec<String> = c.groups()[0].items().iter().map(Item::label).collect();
        let g1: Vec<String> = c.groups()[1].items().iter().map(Item::label).collect();
        assert_eq!(g0, vec!["B", "C", "A"]);
        assert_eq!(g1, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_item_drag_on_removed_group_is_noop() {
        let mut c = groups(&["G0"]);
        c.add_item(0, &Item::note("a")).unwrap();
        c.add_item(0, &Item::note("b")).unwrap();

        let mut engine = DragEngine::new(DragKind::Item);
        engine.pointer_down(0, Some(0));
        engine.pointer_move(lower(1), &rows(2, Some(0)));
        c.remove_group(0).unwrap();
        assert_eq!(engine.pointer_up(&mut c), DropOutcome::Unchanged);
    }
}
