//! Link state machine gating when transport operations are safe to issue.

use embassy_time::{Duration, Instant, Timer};

use crate::transport::Transport;

/// Readiness of the radio link. Transitions are strictly forward; `Active`
/// is terminal for the lifetime of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Uninitialized,
    PoweringUp,
    Active,
}

/// Sequences transceiver power-up.
///
/// The transceiver needs a settling time after power application before
/// register access is reliable. The wait is measured against `started_at`
/// (node start, not state entry) so time consumed by initialization is not
/// waited twice.
pub struct LinkStateMachine {
    state: LinkState,
    started_at: Instant,
    settle: Duration,
}

impl LinkStateMachine {
    pub fn new(settle: Duration, started_at: Instant) -> Self {
        Self {
            state: LinkState::Uninitialized,
            started_at,
            settle,
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == LinkState::Active
    }

    /// Advance to a stable state. The only suspension is the bounded settle
    /// wait on the first call; every later call returns immediately.
    pub async fn advance<T: Transport>(&mut self, transport: &mut T) {
        loop {
            match self.state {
                LinkState::Uninitialized => {
                    // Fall through to the power-up arm within the same call
                    self.state = LinkState::PoweringUp;
                }
                LinkState::PoweringUp => {
                    let settle_deadline = self.started_at + self.settle;
                    if Instant::now() < settle_deadline {
                        Timer::at(settle_deadline).await;
                    }
                    if let Err(e) = transport.power_up().await {
                        // Ignore-and-proceed policy: no recovery action is
                        // defined by the transport layer.
                        log::warn!("transceiver power-up command failed ({e:?}), continuing");
                    }
                    self.state = LinkState::Active;
                    log::info!("radio link active");
                    return;
                }
                LinkState::Active => return,
            }
        }
    }
}
