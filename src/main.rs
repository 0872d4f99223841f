//! Headless node runner.
//!
//! Wires a node to an in-memory transport and runs it on the Embassy
//! executor. A peer task sits on the far end of the link: it logs every
//! heartbeat (with sequence-gap detection) and answers with a ping of its
//! own, so the dispatch path is exercised end to end. Key presses are
//! simulated at a fixed interval.

use embassy_executor::Executor;
use embassy_sync::mutex::Mutex;
use embassy_time::Duration;
use env_logger::Builder;
use log::{LevelFilter, error, info, warn};
use std::path::PathBuf;

use radio_node::config::NodeConfig;
use radio_node::dispatch::{ButtonHandler, Dispatcher, MessageHandler, PingHandler};
use radio_node::indicators::{IndicatorCommand, IndicatorPanel, IndicatorQueue, IndicatorQueueReceiver};
use radio_node::input::{IntervalScanner, KeyQueue, KeyQueueReceiver, KeyQueueSender};
use radio_node::message::{MessageType, NodeAddress, OutboundFrame, PacketFlags};
use radio_node::node::Node;
use radio_node::transport::{
    ChannelTransport, FrameQueue, FrameQueueReceiver, FrameQueueSender, LinkFrame, SharedTransport,
};

/// Address the peer task stamps on its replies.
const PEER_ADDRESS: NodeAddress = NodeAddress(1);

/// Key code emitted by the simulated key scanner.
const DEMO_KEY_CODE: u8 = 1;

/// Interval between simulated key presses.
const DEMO_KEY_INTERVAL: Duration = Duration::from_secs(5);

/// Consumes indicator commands and logs the transitions in lieu of GPIO.
#[embassy_executor::task]
async fn indicator_driver_task(rx: IndicatorQueueReceiver) {
    loop {
        match rx.receive().await {
            IndicatorCommand::On(id) => info!("indicator {id:?} on"),
            IndicatorCommand::Off(id) => info!("indicator {id:?} off"),
        }
    }
}

/// Far end of the in-memory link: logs heartbeats and button presses coming
/// from the node and answers each heartbeat with a ping.
#[embassy_executor::task]
async fn peer_task(rx: FrameQueueReceiver, tx: FrameQueueSender) {
    let mut expected_sequence: Option<u8> = None;
    loop {
        let link_frame = rx.receive().await;
        match link_frame.frame.message_type {
            MessageType::Ping => {
                let sequence = link_frame.frame.payload.first().copied().unwrap_or(0);
                if let Some(expected) = expected_sequence {
                    if sequence != expected {
                        warn!("heartbeat sequence gap: expected {expected}, got {sequence}");
                    }
                }
                expected_sequence = Some(sequence.wrapping_add(1));
                info!("heartbeat {sequence} from {}", link_frame.source);

                let reply = LinkFrame {
                    source: PEER_ADDRESS,
                    frame: OutboundFrame {
                        message_type: MessageType::Ping,
                        dest: NodeAddress::BROADCAST,
                        flags: PacketFlags::NONE,
                        payload: vec![sequence],
                    },
                };
                if tx.try_send(reply).is_err() {
                    warn!("peer reply queue full, dropping ping");
                }
            }
            MessageType::Button => {
                let key = link_frame.frame.payload.first().copied().unwrap_or(0);
                info!("button {key} pressed on {}", link_frame.source);
            }
        }
    }
}

#[embassy_executor::task]
async fn node_task(
    config: NodeConfig,
    transport: &'static SharedTransport<ChannelTransport>,
    panel: IndicatorPanel,
    keys: KeyQueueReceiver,
    key_tx: KeyQueueSender,
) {
    let handlers: Vec<Box<dyn MessageHandler>> = vec![
        Box::new(PingHandler::new(panel, config.handler_pulse())),
        Box::new(ButtonHandler::new(panel, config.handler_pulse())),
    ];
    let dispatcher = match Dispatcher::register(handlers) {
        Ok(dispatcher) => dispatcher,
        Err(e) => {
            error!("handler table rejected: {e:?}");
            std::process::exit(2);
        }
    };

    let scanner = IntervalScanner::new(key_tx, DEMO_KEY_CODE, DEMO_KEY_INTERVAL);
    let node = match Node::init(config, transport, dispatcher, panel, scanner, keys).await {
        Ok(node) => node,
        Err(e) => {
            error!("node initialization failed: {e:?}");
            std::process::exit(2);
        }
    };
    node.run().await
}

fn main() {
    // Logging setup
    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter(Some("radio_node"), LevelFilter::Debug)
        .init();

    info!("Starting up");

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));
    let config = if config_path.exists() {
        match NodeConfig::load(&config_path) {
            Ok(config) => config,
            Err(e) => {
                error!("{e:#}");
                std::process::exit(1);
            }
        }
    } else {
        info!("no config file at {}, using the reference cadence", config_path.display());
        NodeConfig::default()
    };

    let node_to_peer: &'static FrameQueue = Box::leak(Box::new(FrameQueue::new()));
    let peer_to_node: &'static FrameQueue = Box::leak(Box::new(FrameQueue::new()));
    let indicator_queue: &'static IndicatorQueue = Box::leak(Box::new(IndicatorQueue::new()));
    let key_queue: &'static KeyQueue = Box::leak(Box::new(KeyQueue::new()));

    let transport = ChannelTransport::with(node_to_peer.sender(), peer_to_node.receiver());
    let transport: &'static SharedTransport<ChannelTransport> = Box::leak(Box::new(Mutex::new(transport)));
    let panel = IndicatorPanel::new(indicator_queue.sender());

    // Leak the executor to satisfy the 'static lifetime required by run()
    let executor: &'static mut Executor = Box::leak(Box::new(Executor::new()));
    executor.run(|spawner| {
        // Task creation failure at startup is fatal
        spawner
            .spawn(indicator_driver_task(indicator_queue.receiver()))
            .expect("failed to spawn indicator driver task");
        spawner
            .spawn(peer_task(node_to_peer.receiver(), peer_to_node.sender()))
            .expect("failed to spawn peer task");
        spawner
            .spawn(node_task(config, transport, panel, key_queue.receiver(), key_queue.sender()))
            .expect("failed to spawn node task");
    });
}
