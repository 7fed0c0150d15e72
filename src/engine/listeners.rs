//! Listener registry with copy-on-iterate fan-out.
//!
//! `emit` snapshots the registered listeners under the lock and invokes
//! them after releasing it, so a listener may subscribe or unsubscribe
//! (itself included) from inside its own callback.

use core::cell::RefCell;
use std::sync::{Arc, Weak};

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use log::debug;

use crate::app::events::EngineEvent;
use crate::app::ports::EngineListener;

/// Opaque listener identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Registry {
    next_id: u64,
    entries: Vec<(ListenerId, Arc<dyn EngineListener>)>,
}

/// Thread-safe set of engine listeners.
pub struct ListenerSet {
    inner: Mutex<CriticalSectionRawMutex, RefCell<Registry>>,
}

impl Default for ListenerSet {
    fn default() -> Self {
        Self::new()
    }
}

impl ListenerSet {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Registry {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    pub fn add(&self, listener: Arc<dyn EngineListener>) -> ListenerId {
        self.inner.lock(|cell| {
            let mut reg = cell.borrow_mut();
            let id = ListenerId(reg.next_id);
            reg.next_id += 1;
            reg.entries.push((id, listener));
            debug!("listener added, count={}", reg.entries.len());
            id
        })
    }

    /// Remove one listener.  Returns `false` if it was already gone.
    pub fn remove(&self, id: ListenerId) -> bool {
        self.inner.lock(|cell| {
            let mut reg = cell.borrow_mut();
            let before = reg.entries.len();
            reg.entries.retain(|(entry_id, _)| *entry_id != id);
            let removed = reg.entries.len() != before;
            if removed {
                debug!("listener removed, count={}", reg.entries.len());
            }
            removed
        })
    }

    pub fn len(&self) -> usize {
        self.inner.lock(|cell| cell.borrow().entries.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver `event` to every listener registered at the time of the call.
    pub fn emit(&self, event: &EngineEvent) {
        let snapshot: Vec<Arc<dyn EngineListener>> = self.inner.lock(|cell| {
            cell.borrow()
                .entries
                .iter()
                .map(|(_, l)| Arc::clone(l))
                .collect()
        });
        for listener in snapshot {
            listener.on_event(event);
        }
    }
}

/// Handle returned by [`Engine::subscribe`](super::Engine::subscribe).
///
/// Dropping the handle does **not** unsubscribe; call
/// [`unsubscribe`](Self::unsubscribe) to remove exactly this listener.
#[derive(Debug)]
pub struct Subscription {
    id: ListenerId,
    set: Weak<ListenerSet>,
}

impl Subscription {
    pub(crate) fn new(id: ListenerId, set: &Arc<ListenerSet>) -> Self {
        Self {
            id,
            set: Arc::downgrade(set),
        }
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Remove the listener.  Returns `false` if it was already removed or
    /// the engine is gone.
    pub fn unsubscribe(self) -> bool {
        self.set.upgrade().is_some_and(|set| set.remove(self.id))
    }
}
