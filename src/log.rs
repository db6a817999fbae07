use std::collections::VecDeque;
use std::sync::Mutex;

const CAPACITY: usize = 25;

/// Operator-visible occurrence. Mirrors the small set of lines the original
/// firmware wrote into its rolling web log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    MessageSent { len: usize },
    MessageReceived { text: String },
    FileQueued { name: String, len: usize },
    FileSaved { name: String },
    FileFailed { name: String },
    Stalled { seq: u8 },
}

/// Bounded ring buffer of recent events, guarded by its own mutex so a slow
/// subscriber never blocks the sender or receiver tasks.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<VecDeque<Event>>,
}

impl EventLog {
    pub fn new() -> Self {
        EventLog { events: Mutex::new(VecDeque::with_capacity(CAPACITY)) }
    }

    pub fn push(&self, event: Event) {
        let mut events = self.events.lock().unwrap();
        if events.len() == CAPACITY {
            events.pop_front();
        }
        events.push_back(event);
    }

    pub fn snapshot(&self) -> Vec<Event> {
        self.events.lock().unwrap().iter().cloned().collect()
    }
}
