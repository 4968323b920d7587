//! Signal/slot notifications for Horizon Carousel.
//!
//! A [`Signal<Args>`] owns a set of connected slots (closures) and invokes all
//! of them when the signal is emitted. The carousel uses signals for page and
//! click notifications, and builds its single-listener "slots" on top of
//! [`Signal::emit_to`] so that a late subscriber can be replayed the current
//! value without disturbing the other connections.
//!
//! # Threading
//!
//! All carousel state lives on one logical UI thread, so slots are always
//! invoked directly in the emitting thread. The signal itself is still
//! `Send + Sync` so it can be stored inside widgets that cross thread
//! boundaries before being attached.
//!
//! # Example
//!
//! ```
//! use horizon_carousel_core::Signal;
//!
//! let page_selected = Signal::<usize>::new();
//!
//! let id = page_selected.connect(|page| {
//!     println!("now showing page {page}");
//! });
//!
//! page_selected.emit(2);
//! page_selected.disconnect(id);
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a signal-slot connection.
    ///
    /// Returned by [`Signal::connect`] and accepted by [`Signal::disconnect`]
    /// and [`Signal::emit_to`]. The ID stays valid until the connection is
    /// removed or the signal is dropped.
    pub struct ConnectionId;
}

/// A connected slot. Stored behind an `Arc` so emission can snapshot the
/// connection list and release the lock before invoking anything.
type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

/// A type-safe signal that can have multiple connected slots.
///
/// # Type Parameter
///
/// - `Args`: The argument type passed to connected slots. Use `()` for
///   signals with no arguments, or a tuple for several.
///
/// # Re-entrancy
///
/// Slots are invoked after the connection lock is released, so a slot may
/// connect, disconnect, or even emit on the same signal.
pub struct Signal<Args> {
    connections: Mutex<SlotMap<ConnectionId, Slot<Args>>>,
    blocked: AtomicBool,
}

impl<Args> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args> Signal<Args> {
    /// Create a new signal with no connections.
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(SlotMap::with_key()),
            blocked: AtomicBool::new(false),
        }
    }

    /// Connect a slot (closure) to this signal.
    ///
    /// Returns a `ConnectionId` that can be used to disconnect the slot later.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.connections.lock().insert(Arc::new(slot))
    }

    /// Disconnect a specific slot by its connection ID.
    ///
    /// Returns `true` if the connection was found and removed.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.lock().remove(id).is_some()
    }

    /// Disconnect all slots from this signal.
    pub fn disconnect_all(&self) {
        self.connections.lock().clear();
    }

    /// Get the number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Check whether a connection is still live.
    pub fn is_connected(&self, id: ConnectionId) -> bool {
        self.connections.lock().contains_key(id)
    }

    /// Block signal emission temporarily.
    ///
    /// While blocked, [`emit`](Self::emit) and [`emit_to`](Self::emit_to)
    /// do nothing.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }

    /// Check if signal emission is currently blocked.
    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }

    /// Emit the signal, invoking every connected slot in connection order.
    pub fn emit(&self, args: Args) {
        if self.is_blocked() {
            tracing::trace!(target: targets::SIGNAL, "signal blocked, skipping emit");
            return;
        }

        let slots: Vec<Slot<Args>> = self.connections.lock().values().cloned().collect();
        tracing::trace!(target: targets::SIGNAL, connection_count = slots.len(), "emitting signal");

        for slot in slots {
            slot(&args);
        }
    }

    /// Invoke a single connection with `args`.
    ///
    /// Used to replay the current state to a slot that was just connected.
    /// Returns `false` if the signal is blocked or the connection is gone.
    pub fn emit_to(&self, id: ConnectionId, args: Args) -> bool {
        if self.is_blocked() {
            return false;
        }

        let slot = self.connections.lock().get(id).cloned();
        match slot {
            Some(slot) => {
                slot(&args);
                true
            }
            None => false,
        }
    }
}

impl<Args> fmt::Debug for Signal<Args> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("connections", &self.connection_count())
            .field("blocked", &self.is_blocked())
            .finish()
    }
}

static_assertions::assert_impl_all!(Signal<usize>: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_connect_emit() {
        let signal = Signal::<i32>::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        let received_clone = received.clone();
        signal.connect(move |&value| {
            received_clone.lock().push(value);
        });

        signal.emit(42);
        signal.emit(100);

        assert_eq!(*received.lock(), vec![42, 100]);
    }

    #[test]
    fn test_signal_disconnect() {
        let signal = Signal::<i32>::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        let received_clone = received.clone();
        let id = signal.connect(move |&value| {
            received_clone.lock().push(value);
        });

        signal.emit(1);
        assert!(signal.disconnect(id));
        assert!(!signal.disconnect(id));
        signal.emit(2);

        assert_eq!(*received.lock(), vec![1]);
        assert_eq!(signal.connection_count(), 0);
    }

    #[test]
    fn test_signal_blocked() {
        let signal = Signal::<i32>::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        let received_clone = received.clone();
        let id = signal.connect(move |&value| {
            received_clone.lock().push(value);
        });

        signal.set_blocked(true);
        signal.emit(1);
        assert!(!signal.emit_to(id, 1));
        signal.set_blocked(false);
        signal.emit(2);

        assert_eq!(*received.lock(), vec![2]);
    }

    #[test]
    fn test_emit_to_reaches_one_slot() {
        let signal = Signal::<&'static str>::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        let first = received.clone();
        signal.connect(move |&s| first.lock().push(format!("first:{s}")));
        let second = received.clone();
        let id = signal.connect(move |&s| second.lock().push(format!("second:{s}")));

        assert!(signal.emit_to(id, "replay"));
        assert_eq!(*received.lock(), vec!["second:replay".to_string()]);
    }

    #[test]
    fn test_slot_may_disconnect_itself() {
        let signal = Arc::new(Signal::<()>::new());
        let calls = Arc::new(Mutex::new(0));
        let own_id = Arc::new(Mutex::new(None::<ConnectionId>));

        let signal_clone = signal.clone();
        let calls_clone = calls.clone();
        let own_id_clone = own_id.clone();
        let id = signal.connect(move |_| {
            *calls_clone.lock() += 1;
            if let Some(id) = *own_id_clone.lock() {
                signal_clone.disconnect(id);
            }
        });
        *own_id.lock() = Some(id);

        signal.emit(());
        signal.emit(());

        assert_eq!(*calls.lock(), 1);
        assert!(!signal.is_connected(id));
    }
}
