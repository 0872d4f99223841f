//! Wire vocabulary shared by the transport and the application layer.

/// Logical node address on the link layer. Assigned once at startup and
/// immutable for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeAddress(pub u8);

impl NodeAddress {
    /// Destination reaching all nodes on the transport.
    pub const BROADCAST: NodeAddress = NodeAddress(0xFF);

    pub fn is_broadcast(&self) -> bool {
        *self == Self::BROADCAST
    }
}

impl core::fmt::Display for NodeAddress {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.is_broadcast() {
            write!(f, "broadcast")
        } else {
            write!(f, "#{}", self.0)
        }
    }
}

/// Application message types carried in each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageType {
    /// Heartbeat / liveness probe. The periodic heartbeat is a `Ping`
    /// carrying the one-byte message sequence counter.
    Ping = 0x01,
    /// Key-press notification carrying the key identifier.
    Button = 0x02,
}

impl TryFrom<u8> for MessageType {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(MessageType::Ping),
            0x02 => Ok(MessageType::Button),
            other => Err(other),
        }
    }
}

/// Link-layer flags passed through to the transport unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketFlags(pub u8);

impl PacketFlags {
    pub const NONE: PacketFlags = PacketFlags(0);
}

/// A message received from the transport, ready for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub message_type: MessageType,
    pub source: NodeAddress,
    pub payload: Vec<u8>,
}

/// A frame handed to the transport for transmission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundFrame {
    pub message_type: MessageType,
    pub dest: NodeAddress,
    pub flags: PacketFlags,
    pub payload: Vec<u8>,
}
