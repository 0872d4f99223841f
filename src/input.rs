//! Key scanning and the key-event queue.
//!
//! A scanner polls its input source once per driver-loop iteration and pushes
//! detected edges into the key queue; the node's run loop consumes the queue
//! and drives the key-press path. Debouncing and edge detection live in the
//! scanner implementation.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::{Duration, Instant};

/// A detected key-press edge carrying the key identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: u8,
}

/// Depth of the key-event queue.
pub const KEY_QUEUE_SIZE: usize = 4;

/// Bounded queue carrying key edges from the scanner to the node.
pub type KeyQueue = embassy_sync::channel::Channel<CriticalSectionRawMutex, KeyEvent, KEY_QUEUE_SIZE>;
/// Sender side of the key queue.
pub type KeyQueueSender = embassy_sync::channel::Sender<'static, CriticalSectionRawMutex, KeyEvent, KEY_QUEUE_SIZE>;
/// Receiver side of the key queue.
pub type KeyQueueReceiver = embassy_sync::channel::Receiver<'static, CriticalSectionRawMutex, KeyEvent, KEY_QUEUE_SIZE>;

/// Polled once per driver-loop iteration.
pub trait KeyScanner {
    fn scan(&mut self);
}

/// Scanner with no input source; never produces an edge.
pub struct NullScanner;

impl KeyScanner for NullScanner {
    fn scan(&mut self) {}
}

/// Simulation stand-in for a GPIO key scanner: emits one edge for `code`
/// every `interval`, measured from creation.
pub struct IntervalScanner {
    tx: KeyQueueSender,
    code: u8,
    interval: Duration,
    next_due: Instant,
}

impl IntervalScanner {
    pub fn new(tx: KeyQueueSender, code: u8, interval: Duration) -> Self {
        Self {
            tx,
            code,
            interval,
            next_due: Instant::now() + interval,
        }
    }
}

impl KeyScanner for IntervalScanner {
    fn scan(&mut self) {
        if Instant::now() >= self.next_due {
            self.next_due += self.interval;
            if self.tx.try_send(KeyEvent { code: self.code }).is_err() {
                log::warn!("key queue full, dropping edge for key {}", self.code);
            }
        }
    }
}
