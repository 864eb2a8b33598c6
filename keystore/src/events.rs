use log::info;
use state::update::RecordUpdated;
use std::sync::Mutex;

/// Receives a `RecordUpdated` for every committed update, after the write has landed.
pub trait EmitEvent {
    fn emit(&self, event: &RecordUpdated);
}

/// Emits record updates as log lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEventSink;

impl EmitEvent for LogEventSink {
    fn emit(&self, event: &RecordUpdated) {
        info!(
            "RecordUpdated id={} account={} new_value_hash={}",
            event.id, event.account, event.new_value_hash
        );
    }
}

/// Keeps every emitted event in memory.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<RecordUpdated>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RecordUpdated> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EmitEvent for EventLog {
    fn emit(&self, event: &RecordUpdated) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(*event);
    }
}

impl<A: EmitEvent, B: EmitEvent> EmitEvent for (A, B) {
    fn emit(&self, event: &RecordUpdated) {
        self.0.emit(event);
        self.1.emit(event);
    }
}
