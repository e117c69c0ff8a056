use parking_lot::{Condvar, Mutex};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::thread;

enum GateState<T> {
    Pending { remaining: usize, poisoned: bool },
    Open(Arc<T>),
    Poisoned,
}

/// Countdown latch between the map and reduce phases.
///
/// Producers `arrive` once each; the last arrival builds the value that every
/// `wait`er receives. Waiters block with no timeout until the gate opens.
/// If any producer arrived while panicking the gate opens poisoned, nothing is
/// published and waiters receive `None`.
pub struct PhaseGate<T> {
    state: Mutex<GateState<T>>,
    opened: Condvar,
}

impl<T> PhaseGate<T> {
    pub fn new(participants: NonZeroUsize) -> Self {
        Self {
            state: Mutex::new(GateState::Pending { remaining: participants.get(), poisoned: false }),
            opened: Condvar::new(),
        }
    }

    /// Registers one arrival. The last one runs `publish` and opens the gate;
    /// returns whether this call opened it. Arrivals after opening are ignored.
    pub fn arrive(&self, publish: impl FnOnce() -> T) -> bool {
        self.arrive_with(publish, false)
    }

    fn arrive_with(&self, publish: impl FnOnce() -> T, panicked: bool) -> bool {
        let (last, poisoned) = {
            let mut state = self.state.lock();
            match &mut *state {
                GateState::Pending { remaining, poisoned } => {
                    *remaining = remaining.saturating_sub(1);
                    *poisoned |= panicked;
                    (*remaining == 0, *poisoned)
                }
                GateState::Open(_) | GateState::Poisoned => (false, false),
            }
        };
        if !last {
            return false;
        }

        let opened = if poisoned {
            GateState::Poisoned
        } else {
            // publish runs outside the gate lock so it can take other locks freely
            GateState::Open(Arc::new(publish()))
        };
        *self.state.lock() = opened;
        self.opened.notify_all();
        true
    }

    /// Guard that arrives when dropped. Dropping it during a panic unwind
    /// poisons the gate.
    pub fn arrival<F: FnOnce() -> T>(&self, publish: F) -> Arrival<'_, T, F> {
        Arrival { gate: self, publish: Some(publish) }
    }

    /// Blocks until the gate opens. Returns the published value, or `None`
    /// when a producer panicked.
    pub fn wait(&self) -> Option<Arc<T>> {
        let mut state = self.state.lock();
        loop {
            match &*state {
                GateState::Open(value) => return Some(Arc::clone(value)),
                GateState::Poisoned => return None,
                GateState::Pending { .. } => {}
            }
            self.opened.wait(&mut state);
        }
    }

    pub fn is_open(&self) -> bool {
        !matches!(*self.state.lock(), GateState::Pending { .. })
    }
}

pub struct Arrival<'a, T, F: FnOnce() -> T> {
    gate: &'a PhaseGate<T>,
    publish: Option<F>,
}

impl<T, F: FnOnce() -> T> Drop for Arrival<'_, T, F> {
    fn drop(&mut self) {
        if let Some(publish) = self.publish.take() {
            self.gate.arrive_with(publish, thread::panicking());
        }
    }
}
