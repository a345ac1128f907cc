//! # Event Channels
//!
//! Typed publish/subscribe over bounded crossbeam channels.
//!
//! ```text
//! ┌───────────┐  publish   ┌──────────────┐  drain   ┌──────────────┐
//! │ Collision │───────────>│ EventChannel │────────> │ Subscription │ (script host)
//! │  system   │            │   <E>        │────────> │ Subscription │ (game code)
//! └───────────┘            └──────────────┘          └──────────────┘
//! ```
//!
//! Subscribers are explicit: `subscribe` hands back a [`Subscription`],
//! `unsubscribe` removes it. Delivery order is subscription order. A full
//! subscriber queue drops the event for that subscriber only; a dropped
//! `Subscription` is pruned on the next publish.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use tracing::warn;

/// Identifies a subscription within one channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u32);

impl SubscriptionId {
    /// Returns the raw id.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Receiving end of one subscription.
pub struct Subscription<E> {
    id: SubscriptionId,
    receiver: Receiver<E>,
}

impl<E> Subscription<E> {
    /// Returns the id to pass to [`EventChannel::unsubscribe`].
    #[inline]
    #[must_use]
    pub const fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Receives all pending events (non-blocking).
    #[inline]
    pub fn drain(&self) -> Vec<E> {
        self.receiver.try_iter().collect()
    }

    /// Receives one event (non-blocking).
    #[inline]
    pub fn try_recv(&self) -> Option<E> {
        self.receiver.try_recv().ok()
    }

    /// Returns the number of pending events.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Checks if there are pending events.
    #[inline]
    #[must_use]
    pub fn has_events(&self) -> bool {
        !self.receiver.is_empty()
    }
}

/// Typed event channel with explicit subscribers.
pub struct EventChannel<E> {
    subscribers: Vec<(SubscriptionId, Sender<E>)>,
    capacity: usize,
    next_id: u32,
    dropped: u64,
}

impl<E: Clone> EventChannel<E> {
    /// Creates a channel whose subscriber queues hold `capacity` events each.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            subscribers: Vec::new(),
            capacity: capacity.max(1),
            next_id: 0,
            dropped: 0,
        }
    }

    /// Adds a subscriber after all existing ones.
    pub fn subscribe(&mut self) -> Subscription<E> {
        let id = SubscriptionId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        let (sender, receiver) = bounded(self.capacity);
        self.subscribers.push((id, sender));
        Subscription { id, receiver }
    }

    /// Removes a subscriber.
    ///
    /// Events already queued stay readable from the `Subscription`.
    /// Returns `false` if the id is unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    /// Delivers an event to every subscriber in subscription order.
    ///
    /// # Returns
    ///
    /// Number of subscribers that received the event.
    pub fn publish(&mut self, event: &E) -> usize {
        let mut delivered = 0;
        let mut dropped = 0;
        self.subscribers
            .retain(|(id, sender)| match sender.try_send(event.clone()) {
                Ok(()) => {
                    delivered += 1;
                    true
                }
                Err(TrySendError::Full(_)) => {
                    // Dropped to keep the frame moving
                    warn!(subscription = id.raw(), "event queue full, event dropped");
                    dropped += 1;
                    true
                }
                Err(TrySendError::Disconnected(_)) => false,
            });
        self.dropped += dropped;
        delivered
    }

    /// Returns the number of live subscribers.
    #[inline]
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Returns how many deliveries were dropped because a queue was full.
    #[inline]
    #[must_use]
    pub const fn dropped_count(&self) -> u64 {
        self.dropped
    }
}
