// User interactions travel from the UI to the controller through this bus.
// The UI only ever emits; whoever subscribed drains. Dropping a Subscription
// unregisters it, after which events of that kind are discarded.
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use crate::app::models::{NewTask, TaskId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Toggle(TaskId),
    Add(NewTask),
    Delete(TaskId),
    CycleFilter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Toggle,
    Add,
    Delete,
    CycleFilter,
}

impl UiEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            UiEvent::Toggle(_) => EventKind::Toggle,
            UiEvent::Add(_) => EventKind::Add,
            UiEvent::Delete(_) => EventKind::Delete,
            UiEvent::CycleFilter => EventKind::CycleFilter,
        }
    }
}

#[derive(Default)]
struct BusState {
    next_id: u64,
    listeners: Vec<(u64, EventKind)>,
    pending: VecDeque<UiEvent>,
}

// Cheap to clone; every clone talks to the same queue.
#[derive(Clone, Default)]
pub struct InputBus {
    state: Rc<RefCell<BusState>>,
}

impl InputBus {
    pub fn new() -> Self {
        InputBus::default()
    }

    pub fn subscribe(&self, kind: EventKind) -> Subscription {
        let mut state = self.state.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;
        state.listeners.push((id, kind));
        Subscription {
            id,
            bus: Rc::downgrade(&self.state),
        }
    }

    pub fn is_subscribed(&self, kind: EventKind) -> bool {
        self.state
            .borrow()
            .listeners
            .iter()
            .any(|(_, listening)| *listening == kind)
    }

    // Queues the event if anyone listens for its kind. Returns whether it was queued.
    pub fn emit(&self, event: UiEvent) -> bool {
        if !self.is_subscribed(event.kind()) {
            tracing::trace!(?event, "dropping event without subscriber");
            return false;
        }
        self.state.borrow_mut().pending.push_back(event);
        true
    }

    pub fn drain(&self) -> Vec<UiEvent> {
        self.state.borrow_mut().pending.drain(..).collect()
    }
}

// Handle returned by InputBus::subscribe; unsubscribes on drop.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    bus: Weak<RefCell<BusState>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(state) = self.bus.upgrade() {
            state
                .borrow_mut()
                .listeners
                .retain(|(id, _)| *id != self.id);
        }
    }
}
