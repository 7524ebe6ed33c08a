//! Observer registry (single mutation point for subscriptions).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

use crate::event::Event;

/// Something that wants to hear about events of type `E`.
///
/// `on_event` runs on the emitter's thread. Implementations must return
/// quickly; anything slow belongs on the observer's own worker.
pub trait Observer<E: Event>: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    fn on_event(&self, event: &E);
}

/// Handle returned by [`ObserverRegistry::register`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Registry of observers for one event type.
///
/// - `register` / `unregister` are the only mutation points
/// - `notify` delivers synchronously, in registration order
/// - a poisoned lock degrades to "no delivery" rather than panicking the emitter
pub struct ObserverRegistry<E: Event> {
    observers: RwLock<Vec<(ObserverId, Arc<dyn Observer<E>>)>>,
    next_id: AtomicU64,
}

impl<E: Event> ObserverRegistry<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, observer: Arc<dyn Observer<E>>) -> ObserverId {
        let id = ObserverId(self.next_id.fetch_add(1, Ordering::Relaxed));
        match self.observers.write() {
            Ok(mut observers) => {
                debug!(observer = observer.name(), "observer registered");
                observers.push((id, observer));
            }
            Err(_) => warn!(observer = observer.name(), "observer registry poisoned; not registered"),
        }
        id
    }

    /// Returns `true` when an observer with this id was removed.
    pub fn unregister(&self, id: ObserverId) -> bool {
        let Ok(mut observers) = self.observers.write() else {
            return false;
        };
        let before = observers.len();
        observers.retain(|(existing, _)| *existing != id);
        observers.len() != before
    }

    pub fn len(&self) -> usize {
        self.observers.read().map(|o| o.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver `event` to every registered observer.
    pub fn notify(&self, event: &E) {
        // Snapshot so observers may (un)register from inside `on_event`.
        let observers: Vec<Arc<dyn Observer<E>>> = match self.observers.read() {
            Ok(observers) => observers.iter().map(|(_, o)| o.clone()).collect(),
            Err(_) => {
                warn!(event_type = event.event_type(), "observer registry poisoned; event dropped");
                return;
            }
        };

        for observer in observers {
            debug!(
                event_type = event.event_type(),
                observer = observer.name(),
                "delivering event"
            );
            observer.on_event(event);
        }
    }
}

impl<E: Event> Default for ObserverRegistry<E> {
    fn default() -> Self {
        Self {
            observers: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl<E: Event> core::fmt::Debug for ObserverRegistry<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("observers", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use std::sync::Mutex;

    #[derive(Debug, Clone)]
    struct Ping(u32);

    impl Event for Ping {
        fn event_type(&self) -> &'static str {
            "test.ping"
        }

        fn occurred_at(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<u32>>,
    }

    impl Observer<Ping> for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }

        fn on_event(&self, event: &Ping) {
            self.seen.lock().unwrap().push(event.0);
        }
    }

    #[test]
    fn notify_reaches_every_registered_observer() {
        let registry = ObserverRegistry::<Ping>::new();
        let a = Arc::new(Recorder::default());
        let b = Arc::new(Recorder::default());
        registry.register(a.clone());
        registry.register(b.clone());

        registry.notify(&Ping(7));

        assert_eq!(*a.seen.lock().unwrap(), vec![7]);
        assert_eq!(*b.seen.lock().unwrap(), vec![7]);
    }

    #[test]
    fn unregistered_observer_stops_receiving() {
        let registry = ObserverRegistry::<Ping>::new();
        let a = Arc::new(Recorder::default());
        let id = registry.register(a.clone());

        registry.notify(&Ping(1));
        assert!(registry.unregister(id));
        assert!(!registry.unregister(id));
        registry.notify(&Ping(2));

        assert_eq!(*a.seen.lock().unwrap(), vec![1]);
        assert!(registry.is_empty());
    }
}
