//! Keyboard hub
//!
//! The surface forwards key presses to [`KeyboardHub::dispatch`]. A
//! controller that wants keys holds a [`KeyListener`]; dropping the listener
//! detaches it, so a binding can never outlive the state that created it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;
use tracing::trace;

/// Keys the media controllers react to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Escape,
    Enter,
    Other(char),
}

type Listeners = HashMap<u64, mpsc::UnboundedSender<Key>>;

#[derive(Debug, Clone, Default)]
pub struct KeyboardHub {
    listeners: Arc<Mutex<Listeners>>,
    next_id: Arc<AtomicU64>,
}

impl KeyboardHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start receiving keys until the returned listener is dropped
    pub fn attach(&self) -> KeyListener {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().insert(id, tx);
        trace!(listener = id, "Keyboard listener attached");

        KeyListener {
            id,
            rx,
            listeners: Arc::clone(&self.listeners),
        }
    }

    /// Deliver a key to every attached listener, returning how many got it
    pub fn dispatch(&self, key: Key) -> usize {
        let mut listeners = self.lock();
        listeners.retain(|_, tx| tx.send(key).is_ok());
        listeners.len()
    }

    pub fn listener_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, Listeners> {
        self.listeners.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Attached keyboard binding, detached on drop
#[derive(Debug)]
pub struct KeyListener {
    id: u64,
    rx: mpsc::UnboundedReceiver<Key>,
    listeners: Arc<Mutex<Listeners>>,
}

impl KeyListener {
    /// Next pending key, without waiting
    pub fn try_next(&mut self) -> Option<Key> {
        self.rx.try_recv().ok()
    }

    /// Wait for the next key
    pub async fn next(&mut self) -> Option<Key> {
        self.rx.recv().await
    }
}

impl Drop for KeyListener {
    fn drop(&mut self) {
        let mut listeners = self
            .listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        listeners.remove(&self.id);
        trace!(listener = self.id, "Keyboard listener detached");
    }
}
