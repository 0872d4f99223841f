//! Periodic driver loop hosting the node application logic.
//!
//! High-level flow each loop tick:
//! 1) Advance the link state machine (transceiver power-up on the first
//!    pass); once active, let the transport process pending radio work and
//!    drain received messages.
//! 2) Dispatch drained messages through the handler table.
//! 3) Scan the key input for edges.
//! 4) On the heartbeat cadence, broadcast the sequence-stamped heartbeat with
//!    indicator #3 pulsed around the emission.
//!
//! Key edges are consumed between ticks via `select`, off the tick cadence;
//! every transport send from either path takes the shared transport mutex.

use embassy_futures::select::{Either, select};
use embassy_time::{Instant, Ticker, Timer};

use crate::config::NodeConfig;
use crate::dispatch::Dispatcher;
use crate::indicators::{ALL_INDICATORS, Indicator, IndicatorPanel};
use crate::input::{KeyEvent, KeyQueueReceiver, KeyScanner};
use crate::message::{InboundMessage, MessageType, NodeAddress, PacketFlags};
use crate::node::state::LinkStateMachine;
use crate::transport::{SharedTransport, Transport, TransportError};

/// Unrecoverable startup failures. The host decides how to surface these;
/// the node itself never retries them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatalError {
    /// The transport rejected the node address assignment.
    AddressRejected(TransportError),
}

/// Heartbeat cadence bookkeeping, owned exclusively by the driver loop.
struct HeartbeatSchedule {
    counter: u32,
    threshold: u32,
    sequence: u8,
}

/// A single radio node: state machine, dispatcher, heartbeat schedule, and
/// the peripherals it drives.
pub struct Node<T: Transport + 'static, S: KeyScanner> {
    address: NodeAddress,
    transport: &'static SharedTransport<T>,
    dispatcher: Dispatcher,
    indicators: IndicatorPanel,
    scanner: S,
    keys: KeyQueueReceiver,
    link: LinkStateMachine,
    heartbeat: HeartbeatSchedule,
    config: NodeConfig,
}

impl<T: Transport, S: KeyScanner> Node<T, S> {
    /// Assign the node address and build the node. Address rejection is
    /// fatal: without an address the transport cannot deliver anything.
    pub async fn init(
        config: NodeConfig,
        transport: &'static SharedTransport<T>,
        dispatcher: Dispatcher,
        indicators: IndicatorPanel,
        scanner: S,
        keys: KeyQueueReceiver,
    ) -> Result<Self, FatalError> {
        let address = config.node_address();
        transport
            .lock()
            .await
            .set_node_address(address)
            .map_err(FatalError::AddressRejected)?;
        log::info!("node {address} initialized");

        Ok(Self {
            address,
            transport,
            dispatcher,
            indicators,
            scanner,
            keys,
            // The settle window is measured from the embassy epoch, i.e.
            // process start, not from when power-up begins.
            link: LinkStateMachine::new(config.power_settle(), Instant::from_ticks(0)),
            heartbeat: HeartbeatSchedule {
                counter: 0,
                threshold: config.heartbeat_ticks,
                sequence: 0,
            },
            config,
        })
    }

    /// One driver-loop iteration, excluding the quantum sleep.
    pub async fn tick(&mut self) {
        let mut inbound: Vec<InboundMessage> = Vec::new();
        {
            let mut transport = self.transport.lock().await;
            if self.link.is_active() {
                transport.process();
                while let Some(msg) = transport.poll_inbound() {
                    inbound.push(msg);
                }
            }
            self.link.advance(&mut *transport).await;
        }

        // Dispatch outside the transport lock so handlers can pulse (or
        // respond) without holding up the radio.
        for msg in &inbound {
            self.dispatcher.dispatch(msg).await;
        }

        self.scanner.scan();

        self.heartbeat_tick().await;
    }

    /// Advance the heartbeat counter; at the threshold, broadcast the
    /// sequence-stamped heartbeat and blink indicator #3 around it.
    async fn heartbeat_tick(&mut self) {
        self.heartbeat.counter += 1;
        if self.heartbeat.counter < self.heartbeat.threshold {
            return;
        }

        let sequence = self.heartbeat.sequence;
        self.indicators.on(Indicator::Status3);
        {
            let mut transport = self.transport.lock().await;
            if let Err(e) = transport
                .send_payload(&[sequence], MessageType::Ping, NodeAddress::BROADCAST, PacketFlags::NONE)
                .await
            {
                // Ignore-and-proceed: the cadence is kept regardless.
                log::warn!("heartbeat {sequence} send failed ({e:?})");
            }
        }
        self.heartbeat.sequence = self.heartbeat.sequence.wrapping_add(1);
        self.heartbeat.counter = 0;
        Timer::after(self.config.heartbeat_pulse()).await;
        self.indicators.off(Indicator::Status3);
        log::debug!("heartbeat {sequence} sent");
    }

    /// Key-press path: all indicators on, one Button broadcast carrying the
    /// key code, short hold, all indicators off.
    pub async fn key_pressed(&mut self, key: KeyEvent) {
        for id in ALL_INDICATORS {
            self.indicators.on(id);
        }
        {
            let mut transport = self.transport.lock().await;
            if let Err(e) = transport
                .send_payload(&[key.code], MessageType::Button, NodeAddress::BROADCAST, PacketFlags::NONE)
                .await
            {
                log::warn!("button message for key {} failed ({e:?})", key.code);
            }
        }
        Timer::after(self.config.key_pulse()).await;
        for id in ALL_INDICATORS {
            self.indicators.off(id);
        }
    }

    /// Drive the node forever at the configured quantum. Never returns.
    pub async fn run(mut self) -> ! {
        log::info!("node {} driver loop starting", self.address);
        let keys = self.keys;
        let mut ticker = Ticker::every(self.config.tick_interval());
        loop {
            match select(ticker.next(), keys.receive()).await {
                Either::First(()) => self.tick().await,
                Either::Second(key) => self.key_pressed(key).await,
            }
        }
    }
}
