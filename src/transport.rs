//! Packet transport interface and the channel-backed device.
//!
//! The radio stack is consumed as a black box: the node assigns its address,
//! powers the transceiver up, sends payloads, and drains received messages.
//! `ChannelTransport` is the in-memory implementation used by the binary and
//! by integration-style tests; it moves frames over a bounded channel pair so
//! a peer task can sit on the far end.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;

use crate::message::{InboundMessage, MessageType, NodeAddress, OutboundFrame, PacketFlags};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// The transport rejected the address assignment.
    AddressRejected,
    /// A send was attempted before the transceiver was powered up.
    NotPowered,
    /// The outbound queue is full; the frame was dropped.
    QueueFull,
}

/// Narrow interface to the radio stack.
///
/// Methods are async so hardware-backed implementations can await the bus;
/// the trait is only used generically (no trait objects).
pub trait Transport {
    /// Assign this node's link-layer address. Called once at startup;
    /// rejection is fatal for the node.
    fn set_node_address(&mut self, addr: NodeAddress) -> Result<(), TransportError>;

    /// Apply power to the transceiver. The caller guarantees the settle time
    /// has elapsed before issuing this.
    async fn power_up(&mut self) -> Result<(), TransportError>;

    /// Queue a payload for transmission.
    async fn send_payload(
        &mut self,
        payload: &[u8],
        message_type: MessageType,
        dest: NodeAddress,
        flags: PacketFlags,
    ) -> Result<(), TransportError>;

    /// Drive the internal radio state machine. Non-blocking; called once per
    /// loop iteration while the node is active.
    fn process(&mut self);

    /// Take the next pending received message, if any.
    fn poll_inbound(&mut self) -> Option<InboundMessage>;
}

/// Single-writer gate around the transport. Every send and power operation
/// goes through this lock so the heartbeat and key-press paths never
/// interleave their transport access.
pub type SharedTransport<T> = Mutex<CriticalSectionRawMutex, T>;

/// Depth of the frame queues between the node and its peer.
pub const TRANSPORT_QUEUE_SIZE: usize = 16;

/// Frame as it travels between transport endpoints: the sender's address plus
/// the outbound frame content.
#[derive(Debug, Clone)]
pub struct LinkFrame {
    pub source: NodeAddress,
    pub frame: OutboundFrame,
}

/// Bounded queue carrying frames in one direction between endpoints.
pub type FrameQueue = embassy_sync::channel::Channel<CriticalSectionRawMutex, LinkFrame, TRANSPORT_QUEUE_SIZE>;
/// Sender side of a frame queue.
pub type FrameQueueSender = embassy_sync::channel::Sender<'static, CriticalSectionRawMutex, LinkFrame, TRANSPORT_QUEUE_SIZE>;
/// Receiver side of a frame queue.
pub type FrameQueueReceiver = embassy_sync::channel::Receiver<'static, CriticalSectionRawMutex, LinkFrame, TRANSPORT_QUEUE_SIZE>;

/// In-memory transport backed by a bounded channel pair.
pub struct ChannelTransport {
    address: NodeAddress,
    powered: bool,
    tx: FrameQueueSender,
    rx: FrameQueueReceiver,
    pending: Option<InboundMessage>,
}

impl ChannelTransport {
    /// Create a transport endpoint from the two directions of the link.
    pub fn with(tx: FrameQueueSender, rx: FrameQueueReceiver) -> Self {
        Self {
            address: NodeAddress::BROADCAST,
            powered: false,
            tx,
            rx,
            pending: None,
        }
    }

    fn accepts(&self, dest: NodeAddress) -> bool {
        dest.is_broadcast() || dest == self.address
    }
}

impl Transport for ChannelTransport {
    fn set_node_address(&mut self, addr: NodeAddress) -> Result<(), TransportError> {
        self.address = addr;
        Ok(())
    }

    async fn power_up(&mut self) -> Result<(), TransportError> {
        self.powered = true;
        Ok(())
    }

    async fn send_payload(
        &mut self,
        payload: &[u8],
        message_type: MessageType,
        dest: NodeAddress,
        flags: PacketFlags,
    ) -> Result<(), TransportError> {
        if !self.powered {
            return Err(TransportError::NotPowered);
        }
        let frame = LinkFrame {
            source: self.address,
            frame: OutboundFrame {
                message_type,
                dest,
                flags,
                payload: payload.to_vec(),
            },
        };
        self.tx.try_send(frame).map_err(|_| TransportError::QueueFull)
    }

    fn process(&mut self) {
        // Pull at most one frame per tick into the pending slot, dropping
        // frames addressed elsewhere.
        if self.pending.is_some() {
            return;
        }
        while let Ok(link_frame) = self.rx.try_receive() {
            if !self.accepts(link_frame.frame.dest) {
                continue;
            }
            self.pending = Some(InboundMessage {
                message_type: link_frame.frame.message_type,
                source: link_frame.source,
                payload: link_frame.frame.payload,
            });
            break;
        }
    }

    fn poll_inbound(&mut self) -> Option<InboundMessage> {
        self.pending.take()
    }
}
