//! Notification channel between the shelf core and its presentation layer.
//!
//! The core publishes typed [`Notification`]s; any number of subscribers
//! receive every notification published after they subscribed, in order.
//! Each subscriber owns an `mpsc` receiver and drains it whenever it
//! refreshes, so delivery never calls back into subscriber code.
//!
//! A [`Subscription`] unsubscribes itself when dropped, which ties a
//! subscriber's registration to its own lifetime.

use crate::reorder::DragKind;
use crate::snapshot::SnapshotId;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use tracing::trace;

/// Identifier handed out per subscription
pub type SubscriberId = u64;

/// State changes announced by the core
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// Discovery finished
    Discovered { count: usize },
    /// A snapshot became the active collection
    Loaded { id: SnapshotId },
    /// A load attempt failed; the active collection is unchanged
    LoadFailed { id: SnapshotId, reason: String },
    /// The active collection was written
    Saved { id: SnapshotId },
    /// A write failed; the collection stays dirty
    SaveFailed { id: SnapshotId, reason: String },
    /// A new snapshot was created on disk
    Created { id: SnapshotId },
    /// The active collection has unsaved changes
    Dirtied,
    /// A drag session committed a move
    Reordered {
        kind: DragKind,
        group: Option<usize>,
        from: usize,
        to: usize,
    },
}

#[derive(Default)]
struct BusInner {
    next_id: SubscriberId,
    subscribers: Vec<(SubscriberId, Sender<Notification>)>,
}

/// Cheaply clonable handle to one publish/subscribe channel.
///
/// Single-threaded: handles share state through `Rc`.
#[derive(Clone, Default)]
pub struct NotificationBus {
    inner: Rc<RefCell<BusInner>>,
}

impl NotificationBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::channel();
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.subscribers.push((id, tx));
        trace!(subscriber = id, "subscribed");

        Subscription {
            id,
            rx,
            bus: Rc::downgrade(&self.inner),
        }
    }

    /// Remove a subscriber by id. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.subscribers.len();
        inner.subscribers.retain(|(sid, _)| *sid != id);
        let removed = inner.subscribers.len() != before;
        if removed {
            trace!(subscriber = id, "unsubscribed");
        }
        removed
    }

    /// Deliver a notification to every live subscriber.
    ///
    /// Returns the number of subscribers it reached. Subscribers whose
    /// receiver is gone are pruned.
    pub fn publish(&self, notification: Notification) -> usize {
        let mut inner = self.inner.borrow_mut();
        inner
            .subscribers
            .retain(|(_, tx)| tx.send(notification.clone()).is_ok());
        inner.subscribers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }
}

/// Receiving end of one subscription
pub struct Subscription {
    id: SubscriberId,
    rx: Receiver<Notification>,
    bus: Weak<RefCell<BusInner>>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Next pending notification, if any
    pub fn try_recv(&self) -> Option<Notification> {
        match self.rx.try_recv() {
            Ok(n) => Some(n),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// All pending notifications, oldest first
    pub fn drain(&self) -> Vec<Notification> {
        self.rx.try_iter().collect()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.bus.upgrade() {
            inner
                .borrow_mut()
                .subscribers
                .retain(|(sid, _)| *sid != self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
