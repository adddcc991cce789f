//! Change notifications.
//!
//! Events raised while a command runs are buffered and delivered to every
//! observer once, when the command completes.

use super::types::Status;
use crate::topo::EntityId;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlaneEvent {
    ItemAdded { id: EntityId, name: String, kind: &'static str },
    ItemRemoved { id: EntityId, name: String },
    StatusChanged { id: EntityId, name: String, status: Status, reason: Option<String> },
    Moved { id: EntityId },
    Solved { passes: usize },
}

pub type Observer = Box<dyn FnMut(&PlaneEvent) + Send>;

#[derive(Default)]
pub struct EventQueue {
    observers: Vec<Observer>,
    pending: Vec<PlaneEvent>,
}

impl EventQueue {
    pub fn subscribe(&mut self, observer: Observer) {
        self.observers.push(observer);
    }

    pub fn push(&mut self, event: PlaneEvent) {
        self.pending.push(event);
    }

    pub fn pending(&self) -> &[PlaneEvent] {
        &self.pending
    }

    /// Deliver the buffered burst. Returns how many events were delivered.
    pub fn flush(&mut self) -> usize {
        let burst = std::mem::take(&mut self.pending);
        for observer in self.observers.iter_mut() {
            for event in &burst {
                observer(event);
            }
        }
        burst.len()
    }
}

impl std::fmt::Debug for EventQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventQueue")
            .field("observers", &self.observers.len())
            .field("pending", &self.pending)
            .finish()
    }
}
