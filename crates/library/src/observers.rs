//! Change notification for the presentation layer

use chrono::NaiveDate;
use std::fmt;

/// Something the engine wants its observers to know about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibraryEvent {
    /// Emitted after every successful mutating operation
    DataChanged,
    /// Emitted when the clock override is set or cleared, with the new "today"
    CurrentDateChanged(NaiveDate),
}

/// Trait for change observation
pub trait LibraryObserver {
    /// Called synchronously, after the state has been updated
    fn on_event(&self, event: &LibraryEvent);
}

impl<F> LibraryObserver for F
where
    F: Fn(&LibraryEvent),
{
    fn on_event(&self, event: &LibraryEvent) {
        self(event)
    }
}

/// Handle returned by `subscribe`, used to unsubscribe later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Registered observers, in no guaranteed order
#[derive(Default)]
pub(crate) struct ObserverRegistry {
    next_id: u64,
    observers: Vec<(SubscriptionId, Box<dyn LibraryObserver>)>,
}

impl ObserverRegistry {
    pub(crate) fn subscribe(&mut self, observer: Box<dyn LibraryObserver>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, observer));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }

    pub(crate) fn notify(&self, event: LibraryEvent) {
        for (_, observer) in &self.observers {
            observer.on_event(&event);
        }
    }
}

impl fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("next_id", &self.next_id)
            .field("observers_count", &self.observers.len())
            .finish()
    }
}

/// Logs every event at debug level
#[derive(Debug, Default)]
pub struct LoggingObserver;

impl LibraryObserver for LoggingObserver {
    fn on_event(&self, event: &LibraryEvent) {
        match event {
            LibraryEvent::DataChanged => log::debug!("Library data changed"),
            LibraryEvent::CurrentDateChanged(date) => {
                log::debug!("Library date is now {}", date)
            }
        }
    }
}
