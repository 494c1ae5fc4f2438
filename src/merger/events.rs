use std::sync::mpsc;

use crate::foundation::core::{Canvas, ItemId};
use crate::merger::item::ItemSnapshot;

/// Notifications sent to subscribers after a mutation completes.
#[derive(Clone, Debug, PartialEq)]
pub enum MergerEvent {
    /// The full item set after the change, in insertion order.
    ItemsChanged(Vec<ItemSnapshot>),
    /// Items added by one append call.
    ItemsCreated(Vec<ItemId>),
    CanvasCreated(Canvas),
    CanvasUpdated(Canvas),
    /// New total duration in 10 ms units.
    DurationChanged(u32),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Receiving end of one subscription.
#[derive(Debug)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub events: mpsc::Receiver<MergerEvent>,
}

impl Subscription {
    /// Everything queued so far, without blocking.
    pub fn drain(&self) -> Vec<MergerEvent> {
        self.events.try_iter().collect()
    }
}

#[derive(Debug, Default)]
pub(crate) struct EventBus {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, mpsc::Sender<MergerEvent>)>,
}

impl EventBus {
    pub(crate) fn subscribe(&mut self) -> Subscription {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        let (tx, rx) = mpsc::channel();
        self.subscribers.push((id, tx));
        Subscription { id, events: rx }
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Send to every live subscriber; dropped receivers are pruned.
    pub(crate) fn emit(&mut self, event: MergerEvent) {
        if self.subscribers.is_empty() {
            return;
        }
        self.subscribers
            .retain(|(_, tx)| tx.send(event.clone()).is_ok());
    }

    pub(crate) fn len(&self) -> usize {
        self.subscribers.len()
    }
}
