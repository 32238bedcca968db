use std::fmt;
use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::model::PaymentSource;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BillEvent {
    BillPaid {
        bill_id: String,
        due_date: String,
        source: PaymentSource,
        transaction_id: Option<String>,
    },
    CycleSkipped {
        bill_id: String,
        due_date: String,
    },
    MatchApproved {
        bill_id: String,
        transaction_id: String,
        confidence: f64,
    },
    MatchRejected {
        bill_id: String,
        transaction_id: String,
        confidence: f64,
        reason: String,
    },
    OccurrenceGenerated {
        bill_id: String,
        source_bill_id: String,
        due_date: String,
    },
}

pub trait BillEventListener: Send + Sync {
    fn on_event(&self, event: &BillEvent);
}

/// Listeners registered on one engine; dropped with it.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<Box<dyn BillEventListener>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: Box<dyn BillEventListener>) {
        self.listeners.push(listener);
    }

    pub fn publish(&self, event: &BillEvent) {
        for listener in &self.listeners {
            listener.on_event(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Keeps every event it sees. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct RecordingListener {
    events: Arc<Mutex<Vec<BillEvent>>>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<BillEvent> {
        match self.events.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl BillEventListener for RecordingListener {
    fn on_event(&self, event: &BillEvent) {
        match self.events.lock() {
            Ok(mut guard) => guard.push(event.clone()),
            Err(poisoned) => poisoned.into_inner().push(event.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BillEvent, EventBus, RecordingListener};

    #[test]
    fn published_events_reach_every_listener() {
        let first = RecordingListener::new();
        let second = RecordingListener::new();
        let mut bus = EventBus::new();
        bus.subscribe(Box::new(first.clone()));
        bus.subscribe(Box::new(second.clone()));
        assert_eq!(bus.listener_count(), 2);

        bus.publish(&BillEvent::CycleSkipped {
            bill_id: "b1".to_string(),
            due_date: "2025-01-01".to_string(),
        });
        assert_eq!(first.snapshot().len(), 1);
        assert_eq!(second.snapshot(), first.snapshot());
    }

    #[test]
    fn events_serialize_with_kind_tag() {
        let value = serde_json::to_value(BillEvent::MatchApproved {
            bill_id: "b1".to_string(),
            transaction_id: "t1".to_string(),
            confidence: 1.0,
        });
        assert!(value.is_ok());
        if let Ok(value) = value {
            assert_eq!(value["kind"], "match_approved");
            assert_eq!(value["transaction_id"], "t1");
        }
    }
}
