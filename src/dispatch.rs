//! Ordered handler table and the two concrete message handlers.
//!
//! Handlers are tried in registration order; the first one that claims a
//! message ends the dispatch. Unclaimed messages are dropped. Handlers run on
//! the driver-loop context and must only suspend for short, bounded pulses.

use futures::future::BoxFuture;

use crate::indicators::{Indicator, IndicatorPanel};
use crate::message::{InboundMessage, MessageType};
use embassy_time::Duration;

/// Whether a handler claimed the message it was offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    Claimed,
    Ignored,
}

/// A unit of logic that may claim and act on one message type.
///
/// Object-safe: implementations return a boxed future so the dispatcher can
/// hold a heterogeneous ordered table.
pub trait MessageHandler: Send {
    fn handle<'a>(&'a mut self, msg: &'a InboundMessage) -> BoxFuture<'a, Claim>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterError {
    /// An empty handler table would silently drop every message.
    EmptyTable,
    /// More handlers than the table supports.
    TableFull,
}

/// Upper bound on registered handlers.
pub const MAX_HANDLERS: usize = 8;

/// Ordered handler table, built once before the driver loop starts and
/// immutable thereafter.
pub struct Dispatcher {
    handlers: Vec<Box<dyn MessageHandler>>,
}

impl Dispatcher {
    /// Register the handler table. Rejection is fatal at startup.
    pub fn register(handlers: Vec<Box<dyn MessageHandler>>) -> Result<Self, RegisterError> {
        if handlers.is_empty() {
            return Err(RegisterError::EmptyTable);
        }
        if handlers.len() > MAX_HANDLERS {
            return Err(RegisterError::TableFull);
        }
        Ok(Self { handlers })
    }

    /// Offer `msg` to each handler in registration order, stopping at the
    /// first claim. Returns whether any handler claimed it.
    pub async fn dispatch(&mut self, msg: &InboundMessage) -> bool {
        for handler in self.handlers.iter_mut() {
            if handler.handle(msg).await == Claim::Claimed {
                return true;
            }
        }
        log::debug!("dropping unclaimed {:?} message from {}", msg.message_type, msg.source);
        false
    }
}

/// Claims `Ping` messages and blinks indicator #2.
pub struct PingHandler {
    indicators: IndicatorPanel,
    pulse: Duration,
}

impl PingHandler {
    pub fn new(indicators: IndicatorPanel, pulse: Duration) -> Self {
        Self { indicators, pulse }
    }
}

impl MessageHandler for PingHandler {
    fn handle<'a>(&'a mut self, msg: &'a InboundMessage) -> BoxFuture<'a, Claim> {
        Box::pin(async move {
            if msg.message_type != MessageType::Ping {
                return Claim::Ignored;
            }
            self.indicators.pulse(Indicator::Status2, self.pulse).await;
            Claim::Claimed
        })
    }
}

/// Claims `Button` messages and blinks indicator #1.
pub struct ButtonHandler {
    indicators: IndicatorPanel,
    pulse: Duration,
}

impl ButtonHandler {
    pub fn new(indicators: IndicatorPanel, pulse: Duration) -> Self {
        Self { indicators, pulse }
    }
}

impl MessageHandler for ButtonHandler {
    fn handle<'a>(&'a mut self, msg: &'a InboundMessage) -> BoxFuture<'a, Claim> {
        Box::pin(async move {
            if msg.message_type != MessageType::Button {
                return Claim::Ignored;
            }
            self.indicators.pulse(Indicator::Status1, self.pulse).await;
            Claim::Claimed
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{IndicatorCommand, IndicatorQueue};
    use crate::message::NodeAddress;
    use futures::executor::block_on;
    use std::sync::Arc;
    use std::sync::Mutex as StdMutex;

    /// Records every offer and claims only the configured type (or all).
    struct RecordingHandler {
        name: &'static str,
        claims: Option<MessageType>,
        log: Arc<StdMutex<Vec<&'static str>>>,
    }

    impl MessageHandler for RecordingHandler {
        fn handle<'a>(&'a mut self, msg: &'a InboundMessage) -> BoxFuture<'a, Claim> {
            Box::pin(async move {
                self.log.lock().unwrap().push(self.name);
                match self.claims {
                    Some(t) if t != msg.message_type => Claim::Ignored,
                    _ => Claim::Claimed,
                }
            })
        }
    }

    fn ping_from(source: NodeAddress) -> InboundMessage {
        InboundMessage {
            message_type: MessageType::Ping,
            source,
            payload: vec![0],
        }
    }

    #[test]
    fn first_claim_short_circuits_in_registration_order() {
        let log = Arc::new(StdMutex::new(Vec::new()));
        let a = RecordingHandler {
            name: "a",
            claims: Some(MessageType::Ping),
            log: log.clone(),
        };
        let b = RecordingHandler {
            name: "b",
            claims: None, // claims everything
            log: log.clone(),
        };
        let mut dispatcher = Dispatcher::register(vec![Box::new(a), Box::new(b)]).unwrap();

        let handled = block_on(dispatcher.dispatch(&ping_from(NodeAddress(1))));
        assert!(handled);
        assert_eq!(*log.lock().unwrap(), vec!["a"]);
    }

    #[test]
    fn unclaimed_message_falls_through_every_handler() {
        let log = Arc::new(StdMutex::new(Vec::new()));
        let a = RecordingHandler {
            name: "a",
            claims: Some(MessageType::Ping),
            log: log.clone(),
        };
        let b = RecordingHandler {
            name: "b",
            claims: Some(MessageType::Ping),
            log: log.clone(),
        };
        let mut dispatcher = Dispatcher::register(vec![Box::new(a), Box::new(b)]).unwrap();

        let msg = InboundMessage {
            message_type: MessageType::Button,
            source: NodeAddress(2),
            payload: vec![1],
        };
        assert!(!block_on(dispatcher.dispatch(&msg)));
        assert_eq!(*log.lock().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn registration_rejects_empty_and_oversized_tables() {
        assert_eq!(Dispatcher::register(Vec::new()).err(), Some(RegisterError::EmptyTable));

        let log = Arc::new(StdMutex::new(Vec::new()));
        let handlers: Vec<Box<dyn MessageHandler>> = (0..MAX_HANDLERS + 1)
            .map(|_| {
                Box::new(RecordingHandler {
                    name: "x",
                    claims: None,
                    log: log.clone(),
                }) as Box<dyn MessageHandler>
            })
            .collect();
        assert_eq!(Dispatcher::register(handlers).err(), Some(RegisterError::TableFull));
    }

    #[test]
    fn ping_handler_pulses_indicator_two() {
        let queue: &'static IndicatorQueue = Box::leak(Box::new(IndicatorQueue::new()));
        let panel = IndicatorPanel::new(queue.sender());
        let mut handler = PingHandler::new(panel, Duration::from_millis(1));

        let claim = block_on(handler.handle(&ping_from(NodeAddress(4))));
        assert_eq!(claim, Claim::Claimed);
        assert_eq!(queue.receiver().try_receive().ok(), Some(IndicatorCommand::On(Indicator::Status2)));
        assert_eq!(queue.receiver().try_receive().ok(), Some(IndicatorCommand::Off(Indicator::Status2)));

        // A button message is not for this handler
        let msg = InboundMessage {
            message_type: MessageType::Button,
            source: NodeAddress(4),
            payload: vec![1],
        };
        assert_eq!(block_on(handler.handle(&msg)), Claim::Ignored);
        assert!(queue.receiver().try_receive().is_err());
    }

    #[test]
    fn button_handler_pulses_indicator_one() {
        let queue: &'static IndicatorQueue = Box::leak(Box::new(IndicatorQueue::new()));
        let panel = IndicatorPanel::new(queue.sender());
        let mut handler = ButtonHandler::new(panel, Duration::from_millis(1));

        let msg = InboundMessage {
            message_type: MessageType::Button,
            source: NodeAddress(9),
            payload: vec![3],
        };
        assert_eq!(block_on(handler.handle(&msg)), Claim::Claimed);
        assert_eq!(queue.receiver().try_receive().ok(), Some(IndicatorCommand::On(Indicator::Status1)));
        assert_eq!(queue.receiver().try_receive().ok(), Some(IndicatorCommand::Off(Indicator::Status1)));
    }
}
