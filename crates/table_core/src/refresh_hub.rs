//! Registration point through which out-of-band mutators request a
//! dataset refresh without the table polling.

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use tracing::debug;

type Handler = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Updated,
    Added,
}

#[derive(Default)]
struct SlotState {
    handler: Option<Handler>,
    token: u64,
}

#[derive(Default)]
struct HubState {
    updated: SlotState,
    added: SlotState,
    next_token: u64,
}

/// One current handler per slot; registering replaces the previous handler
/// and returns a guard that deregisters on drop. The hub carries no
/// payload — handlers re-derive whatever state they need.
pub struct RefreshHub {
    state: Mutex<HubState>,
}

impl RefreshHub {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(HubState::default()),
        })
    }

    pub fn register_on_updated(
        self: &Arc<Self>,
        handler: impl Fn() + Send + Sync + 'static,
    ) -> HubRegistration {
        self.register(Slot::Updated, Arc::new(handler))
    }

    pub fn register_on_added(
        self: &Arc<Self>,
        handler: impl Fn() + Send + Sync + 'static,
    ) -> HubRegistration {
        self.register(Slot::Added, Arc::new(handler))
    }

    /// Invokes the current "data updated" handler; a vacant slot is a
    /// no-op, not an error.
    pub fn notify_updated(&self) {
        self.notify(Slot::Updated);
    }

    pub fn notify_added(&self) {
        self.notify(Slot::Added);
    }

    fn register(self: &Arc<Self>, slot: Slot, handler: Handler) -> HubRegistration {
        let mut state = self.lock();
        state.next_token += 1;
        let token = state.next_token;
        let slot_state = slot_state_mut(&mut state, slot);
        slot_state.handler = Some(handler);
        slot_state.token = token;
        HubRegistration {
            hub: Arc::downgrade(self),
            slot,
            token,
        }
    }

    fn notify(&self, slot: Slot) {
        // Clone the handler out of the lock so a handler re-registering or
        // notifying again cannot deadlock.
        let handler = {
            let mut state = self.lock();
            slot_state_mut(&mut state, slot).handler.clone()
        };
        match handler {
            Some(handler) => handler(),
            None => debug!(?slot, "refresh signal dropped: no handler registered"),
        }
    }

    fn deregister(&self, slot: Slot, token: u64) {
        let mut state = self.lock();
        let slot_state = slot_state_mut(&mut state, slot);
        // A guard from a superseded registration must not evict its successor.
        if slot_state.token == token {
            slot_state.handler = None;
        }
    }

    fn lock(&self) -> MutexGuard<'_, HubState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn slot_state_mut(state: &mut HubState, slot: Slot) -> &mut SlotState {
    match slot {
        Slot::Updated => &mut state.updated,
        Slot::Added => &mut state.added,
    }
}

/// Deregisters its handler when dropped.
pub struct HubRegistration {
    hub: Weak<RefreshHub>,
    slot: Slot,
    token: u64,
}

impl Drop for HubRegistration {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            hub.deregister(self.slot, self.token);
        }
    }
}
