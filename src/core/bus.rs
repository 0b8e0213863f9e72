use crate::core::events::{BusEvent, EventSender, ScreenEvent};
use log::debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type SubscriberList = Vec<(u64, EventSender)>;

/// Cross-component notification bus.
///
/// Publishers may live on any thread. Each subscriber is the sender half of
/// a screen loop queue, so delivery always re-dispatches onto the thread that
/// owns the receiving screen.
#[derive(Clone, Default)]
pub struct NotificationBus {
    subscribers: Arc<Mutex<SubscriberList>>,
    next_id: Arc<AtomicU64>,
}

impl NotificationBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a queue. Delivery stops when the returned guard is dropped.
    pub fn subscribe(&self, sender: EventSender) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.lock().push((id, sender));
        debug!("bus: subscriber {} added", id);

        Subscription {
            id,
            subscribers: Arc::clone(&self.subscribers),
        }
    }

    /// Deliver an event to every live subscriber, dropping the ones whose
    /// queue is gone.
    pub fn publish(&self, event: BusEvent) {
        self.lock().retain(|(id, sender)| {
            let delivered = sender.send(ScreenEvent::Bus(event.clone())).is_ok();
            if !delivered {
                debug!("bus: pruning disconnected subscriber {}", id);
            }
            delivered
        });
    }

    fn lock(&self) -> MutexGuard<'_, SubscriberList> {
        self.subscribers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
impl NotificationBus {
    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }
}

/// Keeps a bus registration alive
pub struct Subscription {
    id: u64,
    subscribers: Arc<Mutex<SubscriberList>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let mut subscribers = self.subscribers.lock().unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|(id, _)| *id != self.id);
        debug!("bus: subscriber {} removed", self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    #[test]
    fn publish_reaches_every_subscriber() {
        let bus = NotificationBus::new();
        let (tx_a, rx_a) = unbounded();
        let (tx_b, rx_b) = unbounded();
        let _a = bus.subscribe(tx_a);
        let _b = bus.subscribe(tx_b);

        bus.publish(BusEvent::PlayStateChanged);

        assert!(matches!(rx_a.try_recv(), Ok(ScreenEvent::Bus(BusEvent::PlayStateChanged))));
        assert!(matches!(rx_b.try_recv(), Ok(ScreenEvent::Bus(BusEvent::PlayStateChanged))));
    }

    #[test]
    fn dropping_subscription_stops_delivery() {
        let bus = NotificationBus::new();
        let (tx, rx) = unbounded();
        let subscription = bus.subscribe(tx);
        drop(subscription);

        bus.publish(BusEvent::SleepStateChanged);

        assert_eq!(bus.subscriber_count(), 0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn disconnected_receivers_are_pruned() {
        let bus = NotificationBus::new();
        let (tx, rx) = unbounded();
        let _subscription = bus.subscribe(tx);
        drop(rx);

        bus.publish(BusEvent::PlayStateChanged);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn publish_from_another_thread_lands_in_queue() {
        let bus = NotificationBus::new();
        let (tx, rx) = unbounded();
        let _subscription = bus.subscribe(tx);

        let publisher = bus.clone();
        std::thread::spawn(move || publisher.publish(BusEvent::SleepStateChanged))
            .join()
            .unwrap();

        assert!(matches!(rx.try_recv(), Ok(ScreenEvent::Bus(BusEvent::SleepStateChanged))));
    }
}
