use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::debug;

/// Window-wide pointer press, in the same coordinates as [`Region`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerPress {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Region {
    pub fn contains(&self, press: PointerPress) -> bool {
        (self.left..=self.right).contains(&press.x) && (self.top..=self.bottom).contains(&press.y)
    }
}

#[derive(Debug, Default)]
struct Registry {
    next_id: u64,
    listeners: BTreeMap<u64, UnboundedSender<PointerPress>>,
}

/// Fan-out point for global pointer presses. Cloning shares the registry.
#[derive(Debug, Clone, Default)]
pub struct PointerHub {
    registry: Arc<Mutex<Registry>>,
}

impl PointerHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener; it stays registered until the returned
    /// subscription is dropped.
    pub fn subscribe(&self) -> PointerSubscription {
        let (press_tx, press_rx) = unbounded_channel();
        let mut registry = self.lock();
        let id = registry.next_id;
        registry.next_id = registry.next_id.wrapping_add(1);
        registry.listeners.insert(id, press_tx);
        debug!(listener = id, "pointer listener registered");

        PointerSubscription {
            id,
            hub: self.clone(),
            press_rx,
        }
    }

    pub fn dispatch(&self, press: PointerPress) {
        let registry = self.lock();
        for sender in registry.listeners.values() {
            let _ = sender.send(press);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    fn unsubscribe(&self, id: u64) {
        if self.lock().listeners.remove(&id).is_some() {
            debug!(listener = id, "pointer listener released");
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Live registration with a [`PointerHub`]; dropping it deregisters.
#[derive(Debug)]
pub struct PointerSubscription {
    id: u64,
    hub: PointerHub,
    press_rx: UnboundedReceiver<PointerPress>,
}

impl PointerSubscription {
    /// Presses dispatched since the last drain, oldest first.
    pub fn drain(&mut self) -> Vec<PointerPress> {
        let mut presses = Vec::new();
        loop {
            match self.press_rx.try_recv() {
                Ok(press) => presses.push(press),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        presses
    }
}

impl Drop for PointerSubscription {
    fn drop(&mut self) {
        self.hub.unsubscribe(self.id);
    }
}
