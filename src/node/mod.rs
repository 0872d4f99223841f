//! Node application core.
//!
//! - `state`: Link state machine gating when transport operations are safe
//! - `task`: Periodic driver loop, heartbeat cadence, and the key-press path
//!
//! The driver loop is the sole owner of the state machine, the heartbeat
//! counter, and the message sequence counter. Transport access from both the
//! heartbeat and key-press paths goes through the shared transport mutex.

pub mod state;
pub mod task;

pub use state::{LinkState, LinkStateMachine};
pub use task::{FatalError, Node};
