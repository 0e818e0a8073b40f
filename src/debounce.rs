use std::future;
use std::time::{Duration, Instant};

use tokio::runtime::Handle;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::time::sleep_until;
use tracing::debug;

pub const DEFAULT_RESIZE_DEBOUNCE: Duration = Duration::from_millis(100);

/// Collapses a burst of values into the last one, released once `window`
/// has passed without a new value.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<T>,
    deadline: Option<Instant>,
}

impl<T> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
            deadline: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Replaces any pending value and restarts the quiet window.
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some(value);
        self.deadline = Some(now + self.window);
    }

    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                self.pending.take()
            }
            _ => None,
        }
    }

    /// Releases the pending value immediately, ignoring the window.
    pub fn flush(&mut self) -> Option<T> {
        self.deadline = None;
        self.pending.take()
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
        self.pending = None;
    }
}

#[derive(Debug, Clone)]
pub struct ResizeDebounceHandle {
    command_tx: UnboundedSender<ResizeCommand>,
}

impl ResizeDebounceHandle {
    pub fn notify_resize(&self, width: f32) {
        let _ = self.command_tx.send(ResizeCommand::Resized(width));
    }

    /// Stops the worker, dropping any width still inside the window.
    pub fn shutdown(&self) {
        let _ = self.command_tx.send(ResizeCommand::Shutdown);
    }
}

#[derive(Debug)]
enum ResizeCommand {
    Resized(f32),
    Shutdown,
}

/// Runs a debouncer for resize notifications delivered from other tasks.
///
/// Settled widths arrive on the returned receiver. When every handle is
/// dropped the pending width, if any, is released before the worker exits.
pub fn spawn_resize_debouncer(
    handle: &Handle,
    window: Duration,
) -> (ResizeDebounceHandle, UnboundedReceiver<f32>) {
    let (command_tx, command_rx) = unbounded_channel();
    let (settled_tx, settled_rx) = unbounded_channel();

    let _task = handle.spawn(run_resize_debounce_loop(window, command_rx, settled_tx));

    (ResizeDebounceHandle { command_tx }, settled_rx)
}

async fn run_resize_debounce_loop(
    window: Duration,
    mut command_rx: UnboundedReceiver<ResizeCommand>,
    settled_tx: UnboundedSender<f32>,
) {
    let mut debouncer = Debouncer::new(window);
    let mut coalesced: u32 = 0;

    loop {
        let deadline = debouncer.deadline();
        tokio::select! {
            maybe_command = command_rx.recv() => {
                match maybe_command {
                    Some(ResizeCommand::Resized(width)) => {
                        coalesced = coalesced.saturating_add(1);
                        debouncer.push(width, Instant::now());
                    }
                    Some(ResizeCommand::Shutdown) => break,
                    None => {
                        if let Some(width) = debouncer.flush() {
                            let _ = settled_tx.send(width);
                        }
                        break;
                    }
                }
            }
            _ = async {
                match deadline {
                    Some(deadline) => sleep_until(deadline.into()).await,
                    None => future::pending::<()>().await,
                }
            } => {}
        }

        if let Some(width) = debouncer.poll(Instant::now()) {
            debug!(width, coalesced, "resize settled");
            coalesced = 0;
            if settled_tx.send(width).is_err() {
                break;
            }
        }
    }
}
