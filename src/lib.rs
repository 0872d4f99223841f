//! Radio node application core.
//!
//! Sequences transceiver power-up, periodic heartbeat transmission, and
//! inbound-message dispatch for a single radio node, hosted on the Embassy
//! executor. The radio stack, indicator outputs, and key input are external
//! collaborators consumed through narrow interfaces.
//!
//! ## Module Organization
//!
//! - `message`: Wire vocabulary (addresses, message types, frames)
//! - `transport`: Packet transport trait and the channel-backed device
//! - `indicators`: Signaling outputs driven over a command queue
//! - `input`: Key scanning and the key-event queue
//! - `dispatch`: Ordered handler table and the two concrete handlers
//! - `node`: Link state machine and the periodic driver loop
//! - `config`: TOML node configuration
//! - `time_driver`: embassy-time driver for the std build
//!
//! ## Public API
//!
//! The main entry point is [`node::Node`], constructed with a transport and a
//! registered [`dispatch::Dispatcher`] and driven forever by `Node::run`.

#![allow(async_fn_in_trait)] // Transport is only used generically

pub mod config;
pub mod dispatch;
pub mod indicators;
pub mod input;
pub mod message;
pub mod node;
pub mod time_driver;
pub mod transport;

pub use message::{InboundMessage, MessageType, NodeAddress, OutboundFrame, PacketFlags};
pub use node::{FatalError, LinkState, Node};
