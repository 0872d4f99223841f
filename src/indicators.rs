//! Signaling outputs driven over a bounded command queue.
//!
//! The node and its handlers only ever switch indicators on and off; the
//! actual output driver (GPIO on hardware, a log line here) consumes
//! `IndicatorCommand`s from the queue in its own task.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::{Duration, Timer};

/// The three independent indicator outputs (LED1..LED3 on the reference board).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    Status1,
    Status2,
    Status3,
}

pub const ALL_INDICATORS: [Indicator; 3] = [Indicator::Status1, Indicator::Status2, Indicator::Status3];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorCommand {
    On(Indicator),
    Off(Indicator),
}

/// Depth of the indicator command queue. Commands are fire-and-forget; a full
/// queue drops the command rather than stalling the driver loop.
pub const INDICATOR_QUEUE_SIZE: usize = 16;

/// Bounded queue carrying indicator commands to the output driver.
pub type IndicatorQueue = embassy_sync::channel::Channel<CriticalSectionRawMutex, IndicatorCommand, INDICATOR_QUEUE_SIZE>;
/// Sender side of the indicator queue.
pub type IndicatorQueueSender = embassy_sync::channel::Sender<'static, CriticalSectionRawMutex, IndicatorCommand, INDICATOR_QUEUE_SIZE>;
/// Receiver side of the indicator queue.
pub type IndicatorQueueReceiver = embassy_sync::channel::Receiver<'static, CriticalSectionRawMutex, IndicatorCommand, INDICATOR_QUEUE_SIZE>;

/// Cheaply cloneable handle used by the node and handlers to signal.
#[derive(Clone, Copy)]
pub struct IndicatorPanel {
    tx: IndicatorQueueSender,
}

impl IndicatorPanel {
    pub fn new(tx: IndicatorQueueSender) -> Self {
        Self { tx }
    }

    pub fn on(&self, id: Indicator) {
        let _ = self.tx.try_send(IndicatorCommand::On(id));
    }

    pub fn off(&self, id: Indicator) {
        let _ = self.tx.try_send(IndicatorCommand::Off(id));
    }

    /// Switch an indicator on for `duration`, then off again.
    pub async fn pulse(&self, id: Indicator, duration: Duration) {
        self.on(id);
        Timer::after(duration).await;
        self.off(id);
    }
}
