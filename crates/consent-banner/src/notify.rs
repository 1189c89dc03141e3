//! Single-threaded change notifications.
//!
//! Every external signal the banner reacts to (store writes made elsewhere,
//! OS color-scheme flips) is delivered through a [`Notifier`]. Subscribers
//! hold a [`Subscription`], a queue the notifier pushes into. Nothing runs
//! inside `publish`: the owner of the subscription drains its queue when its
//! event loop gets to it, so one notification is always handled to completion
//! before the next one is looked at.
//!
//! Dropping a [`Subscription`] unsubscribes it. The notifier only keeps weak
//! references and prunes dead slots lazily.
//!
//! ## Execution contexts
//!
//! Subscriptions can be tagged with a [`ContextId`]. A value published *from*
//! a context is not delivered to subscriptions tagged with the same context,
//! which is how storage events behave in browsers: a tab is not told about
//! its own writes.
//!
//! ```rust
//! use consent_banner::notify::Notifier;
//!
//! let notifier: Notifier<u32> = Notifier::new();
//! let here = notifier.subscribe_in(1);
//! let there = notifier.subscribe_in(2);
//!
//! notifier.publish_from(Some(1), 7);
//!
//! assert_eq!(here.poll(), None);
//! assert_eq!(there.poll(), Some(7));
//! ```

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

/// Identifies one execution context (a tab, a frame) sharing a store.
pub type ContextId = u64;

/// Opaque identifier of a registered subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Queue<T> = RefCell<VecDeque<T>>;

struct Slot<T> {
    id: SubscriptionId,
    context: Option<ContextId>,
    queue: Weak<Queue<T>>,
}

/// Fan-out point for values of type `T`.
pub struct Notifier<T> {
    next_id: Cell<u64>,
    slots: RefCell<Vec<Slot<T>>>,
}

impl<T: Clone> Notifier<T> {
    /// Creates a notifier with no subscribers.
    pub fn new() -> Self {
        Self {
            next_id: Cell::new(1),
            slots: RefCell::new(Vec::new()),
        }
    }

    /// Subscribes without a context tag; receives every published value.
    pub fn subscribe(&self) -> Subscription<T> {
        self.register(None)
    }

    /// Subscribes on behalf of `context`; values published from the same
    /// context are skipped.
    pub fn subscribe_in(&self, context: ContextId) -> Subscription<T> {
        self.register(Some(context))
    }

    fn register(&self, context: Option<ContextId>) -> Subscription<T> {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);

        let queue = Rc::new(RefCell::new(VecDeque::new()));
        let mut slots = self.slots.borrow_mut();
        slots.retain(|slot| slot.queue.strong_count() > 0);
        slots.push(Slot {
            id,
            context,
            queue: Rc::downgrade(&queue),
        });
        Subscription { id, queue }
    }

    /// Publishes `value` to every live subscriber.
    ///
    /// Returns how many subscribers received it.
    pub fn publish(&self, value: T) -> usize {
        self.publish_from(None, value)
    }

    /// Publishes `value` as originating from `origin`.
    ///
    /// Subscribers tagged with the same context do not receive it.
    pub fn publish_from(&self, origin: Option<ContextId>, value: T) -> usize {
        let mut slots = self.slots.borrow_mut();
        slots.retain(|slot| slot.queue.strong_count() > 0);

        let mut delivered = 0;
        for slot in slots.iter() {
            if origin.is_some() && slot.context == origin {
                continue;
            }
            if let Some(queue) = slot.queue.upgrade() {
                queue.borrow_mut().push_back(value.clone());
                delivered += 1;
            }
        }
        delivered
    }

    /// Number of subscriptions still alive.
    pub fn subscriber_count(&self) -> usize {
        let mut slots = self.slots.borrow_mut();
        slots.retain(|slot| slot.queue.strong_count() > 0);
        slots.len()
    }
}

impl<T: Clone> Default for Notifier<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Notifier<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<SubscriptionId> = self.slots.borrow().iter().map(|s| s.id).collect();
        f.debug_struct("Notifier").field("subscriptions", &ids).finish()
    }
}

/// Receiving end of a [`Notifier`].
///
/// Values queue up until taken with [`poll`](Self::poll) or
/// [`drain`](Self::drain). Dropping the subscription unsubscribes.
pub struct Subscription<T> {
    id: SubscriptionId,
    queue: Rc<Queue<T>>,
}

impl<T> Subscription<T> {
    /// This subscription's identifier.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Takes the oldest pending value.
    pub fn poll(&self) -> Option<T> {
        self.queue.borrow_mut().pop_front()
    }

    /// Takes every pending value, oldest first.
    pub fn drain(&self) -> Vec<T> {
        self.queue.borrow_mut().drain(..).collect()
    }

    /// Number of values waiting to be taken.
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Unsubscribes explicitly. Equivalent to dropping.
    pub fn cancel(self) {}
}

impl<T> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_reaches_all_untagged_subscribers() {
        let notifier = Notifier::new();
        let a = notifier.subscribe();
        let b = notifier.subscribe();

        assert_eq!(notifier.publish("x"), 2);
        assert_eq!(a.drain(), vec!["x"]);
        assert_eq!(b.drain(), vec!["x"]);
    }

    #[test]
    fn test_origin_context_is_skipped() {
        let notifier = Notifier::new();
        let own = notifier.subscribe_in(1);
        let other = notifier.subscribe_in(2);

        assert_eq!(notifier.publish_from(Some(1), 5), 1);
        assert_eq!(own.pending(), 0);
        assert_eq!(other.poll(), Some(5));
    }

    #[test]
    fn test_untagged_publish_reaches_tagged_subscribers() {
        let notifier = Notifier::new();
        let tagged = notifier.subscribe_in(3);

        notifier.publish(1);
        assert_eq!(tagged.poll(), Some(1));
    }

    #[test]
    fn test_drop_unsubscribes() {
        let notifier: Notifier<u8> = Notifier::new();
        let a = notifier.subscribe();
        let b = notifier.subscribe();
        assert_eq!(notifier.subscriber_count(), 2);

        drop(a);
        assert_eq!(notifier.subscriber_count(), 1);

        b.cancel();
        assert_eq!(notifier.subscriber_count(), 0);
        assert_eq!(notifier.publish(9), 0);
    }

    #[test]
    fn test_values_are_queued_in_order() {
        let notifier = Notifier::new();
        let sub = notifier.subscribe();
        notifier.publish(1);
        notifier.publish(2);
        notifier.publish(3);

        assert_eq!(sub.poll(), Some(1));
        assert_eq!(sub.drain(), vec![2, 3]);
        assert_eq!(sub.poll(), None);
    }

    #[test]
    fn test_resubscribing_prunes_dropped_slots() {
        let notifier: Notifier<u8> = Notifier::new();
        for _ in 0..500 {
            let sub = notifier.subscribe_in(1);
            drop(sub);
        }
        let _live = notifier.subscribe();

        assert_eq!(notifier.slots.borrow().len(), 1);
    }

    #[test]
    fn test_subscription_ids_are_unique() {
        let notifier: Notifier<()> = Notifier::new();
        let a = notifier.subscribe();
        let b = notifier.subscribe();
        assert_ne!(a.id(), b.id());
    }
}
